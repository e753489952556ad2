//! Verbs that keep the shape of the grouping: they change columns or pick
//! rows, and the result carries the input's group keys.

use super::dispatch::Context;
use super::{Distinct, NamedExpr};
use crate::dataframe::{DataFrame, Dataset, GroupedDataFrame, SampleSpec, Series, Value};
use crate::error::{PlyError, Result};
use crate::expr::{evaluate_column, Environment, Evaluated, Expression};

/// Evaluate every expression against `frame` before anything is assigned.
pub(super) fn evaluate_all(
    env: &Environment,
    frame: &DataFrame,
    exprs: &[NamedExpr],
) -> Result<Vec<(String, Series)>> {
    exprs
        .iter()
        .map(|(name, expr)| Ok((name.clone(), evaluate_column(expr, frame, env)?)))
        .collect()
}

fn assign(data: &mut Dataset, columns: Vec<(String, Series)>) -> Result<()> {
    let frame = data.frame_mut();
    for (name, series) in columns {
        frame.set_column(name, series)?;
    }
    Ok(())
}

pub(super) fn mutate(ctx: &Context, data: &mut Dataset, exprs: &[NamedExpr]) -> Result<Dataset> {
    let columns = evaluate_all(ctx.env, data.frame(), exprs)?;
    ctx.write(data, |out| assign(out, columns))
}

pub(super) fn transmute(ctx: &Context, data: &Dataset, exprs: &[NamedExpr]) -> Result<Dataset> {
    let columns = evaluate_all(ctx.env, data.frame(), exprs)?;
    let mut out = match data {
        Dataset::Plain(df) => Dataset::Plain(df.empty_like()),
        Dataset::Grouped(gdf) => Dataset::Grouped(GroupedDataFrame::new(
            gdf.frame().select(gdf.groups())?,
            gdf.groups(),
        )?),
    };
    assign(&mut out, columns)?;
    Ok(out)
}

pub(super) fn rename(ctx: &Context, data: &mut Dataset, mapping: &[(String, String)]) -> Result<Dataset> {
    ctx.write(data, |out| {
        let mut frame = out.frame().clone();
        frame.rename(mapping)?;

        let groups: Vec<&str> = out
            .groups()
            .iter()
            .map(|g| {
                mapping
                    .iter()
                    .rev()
                    .find(|(from, _)| from == g)
                    .map_or(g.as_str(), |(_, to)| to.as_str())
            })
            .collect();
        *out = if groups.is_empty() {
            Dataset::Plain(frame)
        } else {
            Dataset::Grouped(GroupedDataFrame::new(frame, &groups)?)
        };
        Ok(())
    })
}

pub(super) fn distinct(ctx: &Context, data: &mut Dataset, spec: &Distinct) -> Result<Dataset> {
    let mutated;
    let source = if spec.new_columns.is_empty() {
        &*data
    } else {
        mutated = mutate(ctx, data, &spec.new_columns)?;
        &mutated
    };

    let frame = source
        .frame()
        .drop_duplicates(spec.columns.as_deref(), spec.keep)?;
    Ok(source.retag(frame))
}

pub(super) fn arrange(ctx: &Context, data: &Dataset, exprs: &[Expression]) -> Result<Dataset> {
    if exprs.is_empty() {
        return Ok(data.clone());
    }

    let frame = data.frame();
    let keys = exprs
        .iter()
        .map(|expr| evaluate_column(expr, frame, ctx.env))
        .collect::<Result<Vec<_>>>()?;
    let order = frame.sort_indices(&keys)?;
    Ok(data.retag(frame.gather(&order)))
}

pub(super) fn query(ctx: &Context, data: &Dataset, expr: &str) -> Result<Dataset> {
    let frame = data.frame();
    let mask = match ctx.env.eval(expr, frame)? {
        Evaluated::Column(Series::Bool(mask)) => mask,
        Evaluated::Scalar(Value::Bool(keep)) => vec![keep; frame.len()],
        other => {
            let found = match other {
                Evaluated::Column(s) => format!("{:?} column", s.dtype()),
                Evaluated::Scalar(v) => v.type_name().to_string(),
            };
            return Err(PlyError::type_error(format!(
                "query expression must be boolean, got {}",
                found
            )));
        }
    };
    Ok(data.retag(frame.filter(&mask)?))
}

pub(super) fn sample(data: &Dataset, spec: &SampleSpec) -> Result<Dataset> {
    Ok(data.retag(data.frame().sample(spec)?))
}
