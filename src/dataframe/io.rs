use super::{DataFrame, Series};
use crate::error::Result;
use csv::{ReaderBuilder, WriterBuilder};
use std::path::Path;

impl DataFrame {
    /// Read a CSV file with a header row, inferring one type per column.
    pub fn from_csv(path: impl AsRef<Path>) -> Result<Self> {
        let mut rdr = ReaderBuilder::new().from_path(path)?;
        let headers = rdr.headers()?.clone();
        let mut cols: Vec<Vec<String>> = vec![Vec::new(); headers.len()];

        for result in rdr.records() {
            let record = result?;
            for (i, field) in record.iter().enumerate() {
                if let Some(col) = cols.get_mut(i) {
                    col.push(field.to_string());
                }
            }
        }

        let series: Vec<Series> = cols.into_iter().map(infer_series).collect();
        DataFrame::new(headers.iter().map(|h| h.to_string()).zip(series).collect())
    }

    pub fn to_csv(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut wtr = WriterBuilder::new().from_path(path)?;
        wtr.write_record(self.columns())?;

        let columns: Vec<&Series> = self.iter().map(|(_, s)| s).collect();
        for row in 0..self.len() {
            let record: Vec<String> = columns
                .iter()
                .map(|s| s.get(row).map(|v| v.to_string()).unwrap_or_default())
                .collect();
            wtr.write_record(&record)?;
        }
        wtr.flush()?;
        Ok(())
    }
}

/// Narrowest type that parses every field: Int64, then Float64, then Bool,
/// falling back to Utf8.
fn infer_series(raw: Vec<String>) -> Series {
    if let Ok(ints) = raw
        .iter()
        .map(|s| s.trim().parse::<i64>())
        .collect::<std::result::Result<Vec<_>, _>>()
    {
        return Series::Int64(ints);
    }
    if let Ok(floats) = raw
        .iter()
        .map(|s| s.trim().parse::<f64>())
        .collect::<std::result::Result<Vec<_>, _>>()
    {
        return Series::Float64(floats);
    }
    let bools: Option<Vec<bool>> = raw
        .iter()
        .map(|s| match s.trim().to_ascii_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        })
        .collect();
    match bools {
        Some(b) => Series::Bool(b),
        None => Series::Utf8(raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_csv_io_with_inference() -> Result<()> {
        let mut temp_file = NamedTempFile::new()?;
        writeln!(temp_file, "name,age,salary,active")?;
        writeln!(temp_file, "Alice,25,50000.5,true")?;
        writeln!(temp_file, "Bob,30,60000.0,false")?;
        writeln!(temp_file, "Charlie,35,70000.25,True")?;

        let df = DataFrame::from_csv(temp_file.path())?;
        assert_eq!(df.shape(), (3, 4));
        assert!(matches!(df.get_column("name"), Some(Series::Utf8(_))));
        assert!(matches!(df.get_column("age"), Some(Series::Int64(_))));
        assert!(matches!(df.get_column("salary"), Some(Series::Float64(_))));
        assert_eq!(
            df.get_column("active"),
            Some(&Series::Bool(vec![true, false, true]))
        );

        let output_file = NamedTempFile::new()?;
        df.to_csv(output_file.path())?;
        let df2 = DataFrame::from_csv(output_file.path())?;
        assert_eq!(df2, df);

        Ok(())
    }
}
