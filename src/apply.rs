//! Split-apply-combine over a grouped frame.

use crate::dataframe::{DataFrame, GroupedDataFrame, Partition};
use crate::error::Result;
use rayon::prelude::*;
use tracing::debug;

/// Apply `f` to every partition of `grouped` and stack the results.
///
/// Partitions are visited in ascending key order, and results are combined
/// in that order whether or not they were computed in parallel. The first
/// error aborts the whole operation. The combined frame is relabelled
/// `0..n`. A grouped frame with no rows yields a zero-row frame of its key
/// columns.
pub fn split_apply_combine<F>(grouped: &GroupedDataFrame, parallel: bool, f: F) -> Result<DataFrame>
where
    F: Fn(&Partition) -> Result<DataFrame> + Send + Sync,
{
    let partitions = grouped.partitions()?;
    debug!(
        partitions = partitions.len(),
        groups = ?grouped.groups(),
        parallel,
        "split-apply-combine"
    );

    if partitions.is_empty() {
        let mut empty = grouped.frame().select(grouped.groups())?;
        empty.reset_index();
        return Ok(empty);
    }

    let results = if parallel {
        partitions
            .par_iter()
            .map(&f)
            .collect::<Result<Vec<DataFrame>>>()?
    } else {
        partitions
            .iter()
            .map(&f)
            .collect::<Result<Vec<DataFrame>>>()?
    };

    DataFrame::concat(&results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataframe::{Series, Value};
    use crate::error::PlyError;

    fn grouped() -> GroupedDataFrame {
        let df = DataFrame::new(vec![
            ("k".to_string(), Series::from(vec!["b", "a", "b", "a", "c"])),
            ("v".to_string(), Series::from(vec![1, 2, 3, 4, 5])),
        ])
        .unwrap();
        GroupedDataFrame::new(df, &["k"]).unwrap()
    }

    #[test]
    fn test_combines_in_key_order() {
        for parallel in [false, true] {
            let out = split_apply_combine(&grouped(), parallel, |p| Ok(p.frame.clone())).unwrap();
            assert_eq!(out.column("k").unwrap(), &Series::from(vec!["a", "a", "b", "b", "c"]));
            assert_eq!(out.column("v").unwrap(), &Series::from(vec![2, 4, 1, 3, 5]));
            assert_eq!(out.index().to_vec(), vec![0, 1, 2, 3, 4]);
        }
    }

    #[test]
    fn test_error_aborts() {
        let result = split_apply_combine(&grouped(), false, |p| {
            if p.key[0] == Value::from("c") {
                Err(PlyError::value("boom"))
            } else {
                Ok(p.frame.clone())
            }
        });
        assert!(matches!(result, Err(PlyError::ValueError(_))));
    }

    #[test]
    fn test_empty_input_keeps_key_columns() {
        let df = DataFrame::new(vec![
            ("k".to_string(), Series::Utf8(vec![])),
            ("v".to_string(), Series::Int64(vec![])),
        ])
        .unwrap();
        let gdf = GroupedDataFrame::new(df, &["k"]).unwrap();
        let out = split_apply_combine(&gdf, false, |p| Ok(p.frame.clone())).unwrap();
        assert_eq!(out.shape(), (0, 1));
        assert_eq!(out.columns(), &["k".to_string()]);
    }
}
