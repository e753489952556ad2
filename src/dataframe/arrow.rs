use super::{DataFrame, Series};
use crate::error::{PlyError, Result};
use arrow::array::{
    Array as ArrowArray, ArrayRef, BooleanArray, Float64Array, Int64Array, StringArray,
};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use std::sync::Arc;

impl DataFrame {
    /// Convert DataFrame to Apache Arrow RecordBatch. Row labels are not kept.
    pub fn to_arrow(&self) -> Result<RecordBatch> {
        let mut fields = Vec::new();
        let mut arrays: Vec<ArrayRef> = Vec::new();

        for (column_name, series) in self.iter() {
            match series {
                Series::Int64(values) => {
                    fields.push(Field::new(column_name, DataType::Int64, false));
                    arrays.push(Arc::new(Int64Array::from(values.clone())));
                }
                Series::Float64(values) => {
                    fields.push(Field::new(column_name, DataType::Float64, false));
                    arrays.push(Arc::new(Float64Array::from(values.clone())));
                }
                Series::Bool(values) => {
                    fields.push(Field::new(column_name, DataType::Boolean, false));
                    arrays.push(Arc::new(BooleanArray::from(values.clone())));
                }
                Series::Utf8(values) => {
                    fields.push(Field::new(column_name, DataType::Utf8, false));
                    arrays.push(Arc::new(StringArray::from(values.clone())));
                }
            }
        }

        let schema = Arc::new(Schema::new(fields));
        Ok(RecordBatch::try_new(schema, arrays)?)
    }

    /// Create DataFrame from Apache Arrow RecordBatch
    pub fn from_arrow(batch: &RecordBatch) -> Result<Self> {
        let schema = batch.schema();
        let mut columns = Vec::new();

        for (i, field) in schema.fields().iter().enumerate() {
            let array = batch.column(i);
            if array.null_count() > 0 {
                return Err(PlyError::value(format!(
                    "column '{}' contains nulls",
                    field.name()
                )));
            }

            let series = match field.data_type() {
                DataType::Int64 => {
                    let int_array = downcast::<Int64Array>(array, field.name())?;
                    Series::Int64(int_array.values().to_vec())
                }
                DataType::Float64 => {
                    let float_array = downcast::<Float64Array>(array, field.name())?;
                    Series::Float64(float_array.values().to_vec())
                }
                DataType::Boolean => {
                    let bool_array = downcast::<BooleanArray>(array, field.name())?;
                    Series::Bool((0..bool_array.len()).map(|i| bool_array.value(i)).collect())
                }
                DataType::Utf8 => {
                    let string_array = downcast::<StringArray>(array, field.name())?;
                    Series::Utf8(
                        (0..string_array.len())
                            .map(|i| string_array.value(i).to_string())
                            .collect(),
                    )
                }
                other => {
                    return Err(PlyError::type_error(format!(
                        "unsupported arrow data type {:?} for column '{}'",
                        other,
                        field.name()
                    )))
                }
            };

            columns.push((field.name().clone(), series));
        }

        DataFrame::new(columns)
    }
}

fn downcast<'a, T: 'static>(array: &'a ArrayRef, name: &str) -> Result<&'a T> {
    array
        .as_any()
        .downcast_ref::<T>()
        .ok_or_else(|| PlyError::type_error(format!("failed to downcast column '{}'", name)))
}
