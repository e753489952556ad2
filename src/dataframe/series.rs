use super::Value;
use crate::error::{PlyError, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum Series {
    Int64(Vec<i64>),
    Float64(Vec<f64>),
    Bool(Vec<bool>),
    Utf8(Vec<String>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesType {
    Int64,
    Float64,
    Bool,
    Utf8,
}

impl Series {
    pub fn len(&self) -> usize {
        match self {
            Series::Int64(v) => v.len(),
            Series::Float64(v) => v.len(),
            Series::Bool(v) => v.len(),
            Series::Utf8(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn dtype(&self) -> SeriesType {
        match self {
            Series::Int64(_) => SeriesType::Int64,
            Series::Float64(_) => SeriesType::Float64,
            Series::Bool(_) => SeriesType::Bool,
            Series::Utf8(_) => SeriesType::Utf8,
        }
    }

    pub fn empty(dtype: SeriesType) -> Self {
        match dtype {
            SeriesType::Int64 => Series::Int64(Vec::new()),
            SeriesType::Float64 => Series::Float64(Vec::new()),
            SeriesType::Bool => Series::Bool(Vec::new()),
            SeriesType::Utf8 => Series::Utf8(Vec::new()),
        }
    }

    /// Value at position `i`, or `None` past the end.
    pub fn get(&self, i: usize) -> Option<Value> {
        match self {
            Series::Int64(v) => v.get(i).map(|&x| Value::Int(x)),
            Series::Float64(v) => v.get(i).map(|&x| Value::Float(x)),
            Series::Bool(v) => v.get(i).map(|&x| Value::Bool(x)),
            Series::Utf8(v) => v.get(i).map(|x| Value::Str(x.clone())),
        }
    }

    pub fn values(&self) -> Vec<Value> {
        (0..self.len()).filter_map(|i| self.get(i)).collect()
    }

    /// Gather rows by position. Positions must be in bounds.
    pub fn take(&self, indices: &[usize]) -> Series {
        match self {
            Series::Int64(v) => Series::Int64(indices.iter().map(|&i| v[i]).collect()),
            Series::Float64(v) => Series::Float64(indices.iter().map(|&i| v[i]).collect()),
            Series::Bool(v) => Series::Bool(indices.iter().map(|&i| v[i]).collect()),
            Series::Utf8(v) => Series::Utf8(indices.iter().map(|&i| v[i].clone()).collect()),
        }
    }

    pub fn filter(&self, mask: &[bool]) -> Series {
        fn keep<T: Clone>(v: &[T], mask: &[bool]) -> Vec<T> {
            v.iter()
                .zip(mask)
                .filter_map(|(val, &keep)| if keep { Some(val.clone()) } else { None })
                .collect()
        }

        match self {
            Series::Int64(v) => Series::Int64(keep(v, mask)),
            Series::Float64(v) => Series::Float64(keep(v, mask)),
            Series::Bool(v) => Series::Bool(keep(v, mask)),
            Series::Utf8(v) => Series::Utf8(keep(v, mask)),
        }
    }

    /// Repeat a scalar `n` times.
    pub fn broadcast(value: &Value, n: usize) -> Series {
        match value {
            Value::Int(v) => Series::Int64(vec![*v; n]),
            Value::Float(v) => Series::Float64(vec![*v; n]),
            Value::Bool(v) => Series::Bool(vec![*v; n]),
            Value::Str(v) => Series::Utf8(vec![v.clone(); n]),
        }
    }

    /// Build a column from loose values, promoting ints to floats when
    /// both occur. An empty input yields an empty Float64 column.
    pub fn from_values(values: Vec<Value>) -> Result<Series> {
        if values.is_empty() {
            return Ok(Series::Float64(Vec::new()));
        }

        let all_int = values.iter().all(|v| matches!(v, Value::Int(_)));
        let all_numeric = values
            .iter()
            .all(|v| matches!(v, Value::Int(_) | Value::Float(_)));

        if all_int {
            return Ok(Series::Int64(
                values.iter().filter_map(Value::as_i64).collect(),
            ));
        }
        if all_numeric {
            return Ok(Series::Float64(
                values.iter().filter_map(Value::as_f64).collect(),
            ));
        }

        if values.iter().all(|v| matches!(v, Value::Bool(_))) {
            return Ok(Series::Bool(
                values.iter().filter_map(Value::as_bool).collect(),
            ));
        }
        if values.iter().all(|v| matches!(v, Value::Str(_))) {
            return Ok(Series::Utf8(
                values.into_iter().map(|v| v.to_string()).collect(),
            ));
        }

        Err(PlyError::type_error(
            "cannot build a column from values of mixed types",
        ))
    }

    /// Numeric view of the column; bools count as 0/1.
    pub fn to_f64(&self) -> Result<Vec<f64>> {
        match self {
            Series::Int64(v) => Ok(v.iter().map(|&x| x as f64).collect()),
            Series::Float64(v) => Ok(v.clone()),
            Series::Bool(v) => Ok(v.iter().map(|&x| if x { 1.0 } else { 0.0 }).collect()),
            Series::Utf8(_) => Err(PlyError::type_error(
                "expected a numeric column, found strings",
            )),
        }
    }

    /// A non-empty Float64 column holding only NaN, as produced by reducers
    /// that run out of rows.
    pub fn is_all_nan(&self) -> bool {
        matches!(self, Series::Float64(v) if !v.is_empty() && v.iter().all(|x| x.is_nan()))
    }

    /// Append `parts` end to end. Int64 and Float64 parts promote to
    /// Float64; zero-length parts take on whatever type the others have.
    ///
    /// All-NaN Float64 parts stand for missing values and may sit next to
    /// any type: with Utf8 they become the text `"NaN"`, with Bool the column
    /// is promoted to Float64.
    pub fn concat(parts: &[&Series]) -> Result<Series> {
        let non_empty: Vec<&Series> = parts.iter().copied().filter(|s| !s.is_empty()).collect();
        let (missing, typed): (Vec<&Series>, Vec<&Series>) =
            non_empty.iter().copied().partition(|s| s.is_all_nan());
        let Some(first) = typed.first().or(non_empty.first()).or(parts.first()) else {
            return Ok(Series::Float64(Vec::new()));
        };

        let mut dtype = first.dtype();
        for part in &typed {
            dtype = match (dtype, part.dtype()) {
                (a, b) if a == b => a,
                (SeriesType::Int64, SeriesType::Float64)
                | (SeriesType::Float64, SeriesType::Int64) => SeriesType::Float64,
                (a, b) => {
                    return Err(PlyError::type_error(format!(
                        "cannot concatenate {:?} and {:?} columns",
                        a, b
                    )))
                }
            };
        }
        if !missing.is_empty() && dtype != SeriesType::Utf8 {
            dtype = SeriesType::Float64;
        }

        let series = match dtype {
            SeriesType::Int64 => Series::Int64(
                non_empty
                    .iter()
                    .flat_map(|s| match s {
                        Series::Int64(v) => v.clone(),
                        _ => Vec::new(),
                    })
                    .collect(),
            ),
            SeriesType::Float64 => {
                let mut out = Vec::new();
                for part in &non_empty {
                    out.extend(part.to_f64()?);
                }
                Series::Float64(out)
            }
            SeriesType::Bool => Series::Bool(
                non_empty
                    .iter()
                    .flat_map(|s| match s {
                        Series::Bool(v) => v.clone(),
                        _ => Vec::new(),
                    })
                    .collect(),
            ),
            SeriesType::Utf8 => Series::Utf8(
                non_empty
                    .iter()
                    .flat_map(|s| match s {
                        Series::Utf8(v) => v.clone(),
                        Series::Float64(v) => v.iter().map(|x| x.to_string()).collect(),
                        _ => Vec::new(),
                    })
                    .collect(),
            ),
        };
        Ok(series)
    }
}

impl From<Vec<i64>> for Series {
    fn from(v: Vec<i64>) -> Self {
        Series::Int64(v)
    }
}

impl From<Vec<f64>> for Series {
    fn from(v: Vec<f64>) -> Self {
        Series::Float64(v)
    }
}

impl From<Vec<bool>> for Series {
    fn from(v: Vec<bool>) -> Self {
        Series::Bool(v)
    }
}

impl From<Vec<&str>> for Series {
    fn from(v: Vec<&str>) -> Self {
        Series::Utf8(v.into_iter().map(|s| s.to_string()).collect())
    }
}

impl From<Vec<String>> for Series {
    fn from(v: Vec<String>) -> Self {
        Series::Utf8(v)
    }
}
