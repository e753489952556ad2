use super::dispatch::Context;
use super::modify::evaluate_all;
use super::NamedExpr;
use crate::dataframe::{Dataset, GroupedDataFrame};
use crate::error::{PlyError, Result};
use tracing::warn;

/// Explicit keys followed by the new column names, without repeats.
fn effective_keys(keys: &[String], new_columns: &[NamedExpr]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(keys.len() + new_columns.len());
    for key in keys.iter().chain(new_columns.iter().map(|(name, _)| name)) {
        if !out.contains(key) {
            out.push(key.clone());
        }
    }
    out
}

pub(super) fn group_by(
    ctx: &Context,
    data: &mut Dataset,
    keys: &[String],
    new_columns: &[NamedExpr],
) -> Result<Dataset> {
    let keys = effective_keys(keys, new_columns);
    let columns = evaluate_all(ctx.env, data.frame(), new_columns)?;
    ctx.write(data, |out| {
        let mut frame = out.frame().clone();
        for (name, series) in columns {
            frame.set_column(name, series)?;
        }
        *out = Dataset::Grouped(GroupedDataFrame::new(frame, &keys)?);
        Ok(())
    })
}

pub(super) fn ungroup(data: &Dataset) -> Dataset {
    Dataset::Plain(data.frame().clone())
}

pub(super) fn group_indices(
    ctx: &Context,
    data: &Dataset,
    keys: &[String],
    new_columns: &[NamedExpr],
) -> Result<Vec<usize>> {
    match data {
        Dataset::Grouped(gdf) => {
            if !keys.is_empty() || !new_columns.is_empty() {
                let extra = effective_keys(keys, new_columns);
                warn!(
                    ignored = ?extra,
                    groups = ?gdf.groups(),
                    "grouped dataset ignored extra groups"
                );
            }
            gdf.group_indices()
        }
        Dataset::Plain(df) => {
            let effective = effective_keys(keys, new_columns);
            if effective.is_empty() {
                return Err(PlyError::config(
                    "group_indices on an ungrouped dataset needs at least one key",
                ));
            }
            let mut frame = df.select(keys)?;
            for (name, series) in evaluate_all(ctx.env, df, new_columns)? {
                frame.set_column(name, series)?;
            }
            GroupedDataFrame::new(frame, &effective)?.group_indices()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataframe::{DataFrame, Series};
    use crate::expr::{Environment, Expression};
    use crate::options::Options;

    fn ctx(env: &Environment, in_place: bool) -> Context<'_> {
        Context {
            env,
            options: Options::new().modify_input_data(in_place),
        }
    }

    fn data() -> Dataset {
        DataFrame::new(vec![
            ("x".to_string(), Series::from(vec!["c", "a", "b", "a", "c", "b"])),
            ("y".to_string(), Series::from(vec![0, 1, 2, 3, 4, 5])),
        ])
        .unwrap()
        .into()
    }

    #[test]
    fn test_group_by_with_new_column() {
        let env = Environment::new();
        let mut input = data();
        let new = vec![("big".to_string(), Expression::from("y > 2"))];
        let out = group_by(&ctx(&env, false), &mut input, &["x".to_string()], &new).unwrap();
        assert_eq!(out.groups(), &["x".to_string(), "big".to_string()]);
        assert!(!input.is_grouped());
    }

    #[test]
    fn test_group_by_missing_key() {
        let env = Environment::new();
        let mut input = data();
        let result = group_by(&ctx(&env, false), &mut input, &["nope".to_string()], &[]);
        assert!(matches!(result, Err(PlyError::KeyError(_))));
    }

    #[test]
    fn test_group_by_in_place_regroups_input() {
        let env = Environment::new();
        let mut input = data();
        group_by(&ctx(&env, true), &mut input, &["x".to_string()], &[]).unwrap();
        assert_eq!(input.groups(), &["x".to_string()]);

        group_by(&ctx(&env, true), &mut input, &["y".to_string()], &[]).unwrap();
        assert_eq!(input.groups(), &["y".to_string()]);
    }

    #[test]
    fn test_group_indices_ungrouped() {
        let env = Environment::new();
        let labels = group_indices(&ctx(&env, false), &data(), &["x".to_string()], &[]).unwrap();
        assert_eq!(labels, vec![2, 0, 1, 0, 2, 1]);

        let parity = vec![("odd".to_string(), Expression::from("y % 2 == 1"))];
        let labels = group_indices(&ctx(&env, false), &data(), &[], &parity).unwrap();
        assert_eq!(labels, vec![0, 1, 0, 1, 0, 1]);
    }

    #[test]
    fn test_group_indices_grouped_ignores_extra_keys() {
        let env = Environment::new();
        let grouped = data().group_by(&["x"]).unwrap();
        let labels = group_indices(&ctx(&env, false), &grouped, &["y".to_string()], &[]).unwrap();
        assert_eq!(labels, vec![2, 0, 1, 0, 2, 1]);
    }

    #[test]
    fn test_group_indices_needs_keys() {
        let env = Environment::new();
        let result = group_indices(&ctx(&env, false), &data(), &[], &[]);
        assert!(matches!(result, Err(PlyError::ConfigError(_))));
    }

    #[test]
    fn test_ungroup() {
        let grouped = data().group_by(&["x"]).unwrap();
        let out = ungroup(&grouped);
        assert!(!out.is_grouped());
        assert_eq!(out.frame(), grouped.frame());
    }
}
