//! Verbs evaluated once per group through split-apply-combine.

use super::dispatch::Context;
use super::{DoSpec, NamedExpr};
use crate::apply::split_apply_combine;
use crate::dataframe::{DataFrame, Dataset, GroupedDataFrame, Partition};
use crate::error::Result;
use crate::expr::{aggregate_functions, evaluate_unsized, Evaluated};

/// Build a frame column by column. The first value decides the row count,
/// later scalars are broadcast to it.
#[derive(Default)]
struct FrameBuilder {
    frame: Option<DataFrame>,
}

impl FrameBuilder {
    fn push(&mut self, name: &str, value: Evaluated) -> Result<()> {
        let rows = value.len().unwrap_or(1);
        let frame = self
            .frame
            .get_or_insert_with(|| DataFrame::with_index_len(rows));
        let series = value.into_series(frame.len())?;
        frame.set_column(name, series)
    }

    fn finish(self) -> DataFrame {
        self.frame.unwrap_or_else(|| DataFrame::with_index_len(1))
    }
}

/// Insert the partition's key values as leading columns. Keys the frame
/// already has are left alone when `skip_present` is set.
fn insert_keys(
    frame: &mut DataFrame,
    partition: &Partition,
    groups: &[String],
    skip_present: bool,
) -> Result<()> {
    let n = frame.len();
    for (i, (name, series)) in partition.key_columns(groups, n).enumerate() {
        if skip_present && frame.has_column(name) {
            continue;
        }
        frame.insert_column(i, name, series)?;
    }
    Ok(())
}

pub(super) fn summarize(ctx: &Context, data: &Dataset, exprs: &[NamedExpr]) -> Result<Dataset> {
    let env = ctx.env.with_outer_namespace(aggregate_functions());
    let reduce = |frame: &DataFrame| -> Result<DataFrame> {
        let mut builder = FrameBuilder::default();
        for (name, expr) in exprs {
            builder.push(name, evaluate_unsized(expr, frame, &env)?)?;
        }
        Ok(builder.finish())
    };

    let frame = match data {
        Dataset::Plain(df) => reduce(df)?,
        Dataset::Grouped(gdf) => split_apply_combine(gdf, ctx.options.parallel, |partition| {
            let mut out = reduce(&partition.frame)?;
            insert_keys(&mut out, partition, gdf.groups(), false)?;
            Ok(out)
        })?,
    };
    Ok(Dataset::Plain(frame))
}

fn run_do(spec: &DoSpec, frame: &DataFrame) -> Result<DataFrame> {
    match spec {
        DoSpec::Single(f) => f(frame),
        DoSpec::Columns(functions) => {
            let mut builder = FrameBuilder::default();
            for (name, f) in functions {
                builder.push(name, f(frame)?)?;
            }
            Ok(builder.finish())
        }
    }
}

pub(super) fn do_(ctx: &Context, data: &Dataset, spec: &DoSpec) -> Result<Dataset> {
    match data {
        Dataset::Plain(df) => Ok(Dataset::Plain(run_do(spec, df)?)),
        Dataset::Grouped(gdf) => {
            let frame = split_apply_combine(gdf, ctx.options.parallel, |partition| {
                let mut out = run_do(spec, &partition.frame)?;
                insert_keys(&mut out, partition, gdf.groups(), true)?;
                Ok(out)
            })?;
            Ok(Dataset::Grouped(GroupedDataFrame::new(frame, gdf.groups())?))
        }
    }
}

fn per_group<F>(ctx: &Context, data: &Dataset, f: F) -> Result<Dataset>
where
    F: Fn(&DataFrame) -> DataFrame + Send + Sync,
{
    match data {
        Dataset::Plain(df) => Ok(Dataset::Plain(f(df))),
        Dataset::Grouped(gdf) if gdf.is_empty() => Ok(data.clone()),
        Dataset::Grouped(gdf) => {
            let frame = split_apply_combine(gdf, ctx.options.parallel, |partition| {
                Ok(f(&partition.frame))
            })?;
            Ok(Dataset::Grouped(GroupedDataFrame::new(frame, gdf.groups())?))
        }
    }
}

pub(super) fn head(ctx: &Context, data: &Dataset, n: usize) -> Result<Dataset> {
    per_group(ctx, data, |frame| frame.head(n))
}

pub(super) fn tail(ctx: &Context, data: &Dataset, n: usize) -> Result<Dataset> {
    per_group(ctx, data, |frame| frame.tail(n))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataframe::{Series, Value};
    use crate::error::PlyError;
    use crate::expr::{Environment, Expression};
    use crate::options::Options;
    use crate::verbs::ColumnFn;
    use std::sync::Arc;

    fn ctx(env: &Environment, parallel: bool) -> Context<'_> {
        Context {
            env,
            options: Options::new().parallel(parallel),
        }
    }

    fn grouped() -> Dataset {
        let df = DataFrame::new(vec![
            ("x".to_string(), Series::from(vec!["b", "a", "b", "a", "a"])),
            ("y".to_string(), Series::from(vec![1, 2, 3, 4, 5])),
        ])
        .unwrap();
        Dataset::from(df).group_by(&["x"]).unwrap()
    }

    fn named(name: &str, expr: &str) -> NamedExpr {
        (name.to_string(), Expression::from(expr))
    }

    #[test]
    fn test_summarize_grouped() {
        let env = Environment::new();
        for parallel in [false, true] {
            let out = summarize(
                &ctx(&env, parallel),
                &grouped(),
                &[named("n", "{n}"), named("total", "sum(y)")],
            )
            .unwrap();
            assert!(!out.is_grouped());
            let frame = out.frame();
            assert_eq!(frame.columns(), &["x".to_string(), "n".to_string(), "total".to_string()]);
            assert_eq!(frame.column("x").unwrap(), &Series::from(vec!["a", "b"]));
            assert_eq!(frame.column("n").unwrap(), &Series::from(vec![3, 2]));
            assert_eq!(frame.column("total").unwrap(), &Series::from(vec![11, 4]));
        }
    }

    #[test]
    fn test_summarize_column_valued_expression() {
        let env = Environment::new();
        let out = summarize(&ctx(&env, false), &grouped(), &[named("sq", "y ** 2")]).unwrap();
        assert_eq!(out.frame().column("x").unwrap(), &Series::from(vec!["a", "a", "a", "b", "b"]));
        assert_eq!(out.frame().column("sq").unwrap(), &Series::from(vec![4, 16, 25, 1, 9]));
    }

    #[test]
    fn test_summarize_ungrouped_and_empty() {
        let env = Environment::new();
        let plain = Dataset::Plain(grouped().ungroup());
        let out = summarize(&ctx(&env, false), &plain, &[named("m", "max(y)"), named("k", "1")]).unwrap();
        assert_eq!(out.frame().shape(), (1, 2));
        assert_eq!(out.frame().column("m").unwrap().get(0), Some(Value::Int(5)));

        let keys_only = summarize(&ctx(&env, false), &grouped(), &[]).unwrap();
        assert_eq!(keys_only.frame().column("x").unwrap(), &Series::from(vec!["a", "b"]));
    }

    #[test]
    fn test_summarize_key_collision() {
        let env = Environment::new();
        let result = summarize(&ctx(&env, false), &grouped(), &[named("x", "first(y)")]);
        assert!(matches!(result, Err(PlyError::ValueError(_))));
    }

    #[test]
    fn test_do_single_backfills_keys() {
        let env = Environment::new();
        let spec = DoSpec::Single(Arc::new(|df: &DataFrame| {
            df.select(&["y".to_string()]).map(|f| f.head(1))
        }));
        let out = do_(&ctx(&env, false), &grouped(), &spec).unwrap();
        assert_eq!(out.groups(), &["x".to_string()]);
        assert_eq!(out.frame().columns(), &["x".to_string(), "y".to_string()]);
        assert_eq!(out.frame().column("y").unwrap(), &Series::from(vec![2, 1]));
    }

    #[test]
    fn test_do_single_keeps_returned_keys() {
        let env = Environment::new();
        let spec = DoSpec::Single(Arc::new(|df: &DataFrame| {
            let mut out = df.head(1);
            out.set_column("x", Series::from(vec!["zz"]))?;
            Ok(out)
        }));
        let out = do_(&ctx(&env, false), &grouped(), &spec).unwrap();
        assert_eq!(out.frame().columns(), &["x".to_string(), "y".to_string()]);
        assert_eq!(out.frame().column("x").unwrap(), &Series::from(vec!["zz", "zz"]));
        assert_eq!(out.frame().column("y").unwrap(), &Series::from(vec![2, 1]));
    }

    #[test]
    fn test_do_columns() {
        let env = Environment::new();
        let rows: ColumnFn =
            Arc::new(|df: &DataFrame| Ok(Evaluated::Scalar(Value::Int(df.len() as i64))));
        let spec = DoSpec::Columns(vec![("rows".to_string(), rows)]);
        let out = do_(&ctx(&env, false), &grouped(), &spec).unwrap();
        assert_eq!(out.frame().column("rows").unwrap(), &Series::from(vec![3, 2]));
    }

    #[test]
    fn test_head_and_tail_per_group() {
        let env = Environment::new();
        let out = head(&ctx(&env, false), &grouped(), 1).unwrap();
        assert_eq!(out.groups(), &["x".to_string()]);
        assert_eq!(out.frame().column("y").unwrap(), &Series::from(vec![2, 1]));

        let out = tail(&ctx(&env, false), &grouped(), 1).unwrap();
        assert_eq!(out.frame().column("y").unwrap(), &Series::from(vec![5, 3]));
        assert_eq!(out.frame().index().to_vec(), vec![0, 1]);
    }
}
