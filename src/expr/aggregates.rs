//! Reducers made available to `summarize` expressions.
//!
//! The table is read-only. Each evaluation layers it under the caller's
//! environment with [`Environment::with_outer_namespace`], so nothing here is
//! ever mutated per call.
//!
//! [`Environment::with_outer_namespace`]: super::Environment::with_outer_namespace

use super::environment::{Function, Namespace};
use super::eval::Evaluated;
use crate::dataframe::{Series, Value};
use crate::error::{PlyError, Result};
use once_cell::sync::Lazy;
use std::collections::HashSet;
use std::sync::Arc;
use wide::f64x4;

static AGGREGATES: Lazy<Arc<Namespace>> = Lazy::new(|| {
    let table: [(&str, fn(&[Evaluated]) -> Result<Evaluated>); 12] = [
        ("min", min),
        ("max", max),
        ("sum", sum),
        ("cumsum", cumsum),
        ("mean", mean),
        ("median", median),
        ("std", std),
        ("first", first),
        ("last", last),
        ("nth", nth),
        ("n_distinct", n_distinct),
        ("n_unique", n_distinct),
    ];
    Arc::new(
        table
            .into_iter()
            .map(|(name, f)| (name.to_string(), Arc::new(f) as Function))
            .collect(),
    )
});

/// The shared name → reducer table.
pub fn aggregate_functions() -> Arc<Namespace> {
    Arc::clone(&AGGREGATES)
}

fn column_arg(name: &str, args: &[Evaluated], arity: usize) -> Result<Series> {
    if args.len() != arity {
        return Err(PlyError::type_error(format!(
            "{}() takes {} argument(s) ({} given)",
            name,
            arity,
            args.len()
        )));
    }
    Ok(args[0].as_column())
}

fn non_empty(name: &str, s: &Series) -> Result<()> {
    if s.is_empty() {
        return Err(PlyError::value(format!(
            "zero-size array to reduction operation {}",
            name
        )));
    }
    Ok(())
}

/// SIMD accelerated sum using `wide::f64x4`
fn simd_sum(values: &[f64]) -> f64 {
    let mut acc = f64x4::from([0.0; 4]);
    let chunks = values.chunks_exact(4);
    let remainder = chunks.remainder();

    for chunk in chunks {
        acc += f64x4::from([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }

    let arr: [f64; 4] = acc.into();
    let mut total: f64 = arr.iter().sum();
    for &r in remainder {
        total += r;
    }

    total
}

fn extreme(name: &str, args: &[Evaluated], pick_max: bool) -> Result<Evaluated> {
    let s = column_arg(name, args, 1)?;
    non_empty(name, &s)?;

    let value = match &s {
        Series::Float64(v) if v.iter().any(|x| x.is_nan()) => Value::Float(f64::NAN),
        Series::Float64(v) => Value::Float(if pick_max {
            v.iter().copied().fold(f64::NEG_INFINITY, f64::max)
        } else {
            v.iter().copied().fold(f64::INFINITY, f64::min)
        }),
        _ => {
            let values = s.values();
            let best = if pick_max {
                values.into_iter().max()
            } else {
                values.into_iter().min()
            };
            best.ok_or_else(|| PlyError::value(format!("{} of an empty column", name)))?
        }
    };
    Ok(Evaluated::Scalar(value))
}

fn min(args: &[Evaluated]) -> Result<Evaluated> {
    extreme("min", args, false)
}

fn max(args: &[Evaluated]) -> Result<Evaluated> {
    extreme("max", args, true)
}

fn checked_int_sum(v: &[i64]) -> Result<i64> {
    v.iter()
        .try_fold(0i64, |acc, &x| acc.checked_add(x))
        .ok_or_else(|| PlyError::value("integer overflow in sum"))
}

fn sum(args: &[Evaluated]) -> Result<Evaluated> {
    let s = column_arg("sum", args, 1)?;
    let value = match &s {
        Series::Int64(v) => Value::Int(checked_int_sum(v)?),
        Series::Float64(v) => Value::Float(simd_sum(v)),
        Series::Bool(v) => Value::Int(v.iter().filter(|&&b| b).count() as i64),
        Series::Utf8(_) => return Err(PlyError::type_error("cannot sum a string column")),
    };
    Ok(Evaluated::Scalar(value))
}

fn cumsum(args: &[Evaluated]) -> Result<Evaluated> {
    let s = column_arg("cumsum", args, 1)?;
    let series = match &s {
        Series::Int64(v) => {
            let mut acc = 0i64;
            let mut out = Vec::with_capacity(v.len());
            for &x in v {
                acc = acc
                    .checked_add(x)
                    .ok_or_else(|| PlyError::value("integer overflow in cumsum"))?;
                out.push(acc);
            }
            Series::Int64(out)
        }
        Series::Bool(v) => Series::Int64(
            v.iter()
                .scan(0i64, |acc, &b| {
                    *acc += b as i64;
                    Some(*acc)
                })
                .collect(),
        ),
        Series::Float64(v) => Series::Float64(
            v.iter()
                .scan(0.0, |acc, &x| {
                    *acc += x;
                    Some(*acc)
                })
                .collect(),
        ),
        Series::Utf8(_) => return Err(PlyError::type_error("cannot cumsum a string column")),
    };
    Ok(Evaluated::Column(series))
}

fn mean(args: &[Evaluated]) -> Result<Evaluated> {
    let v = column_arg("mean", args, 1)?.to_f64()?;
    let value = if v.is_empty() {
        f64::NAN
    } else {
        simd_sum(&v) / v.len() as f64
    };
    Ok(Evaluated::Scalar(Value::Float(value)))
}

fn median(args: &[Evaluated]) -> Result<Evaluated> {
    let mut v = column_arg("median", args, 1)?.to_f64()?;
    if v.is_empty() || v.iter().any(|x| x.is_nan()) {
        return Ok(Evaluated::Scalar(Value::Float(f64::NAN)));
    }
    v.sort_by(f64::total_cmp);
    let mid = v.len() / 2;
    let value = if v.len() % 2 == 0 {
        (v[mid - 1] + v[mid]) / 2.0
    } else {
        v[mid]
    };
    Ok(Evaluated::Scalar(Value::Float(value)))
}

/// Population standard deviation.
fn std(args: &[Evaluated]) -> Result<Evaluated> {
    let v = column_arg("std", args, 1)?.to_f64()?;
    if v.is_empty() {
        return Ok(Evaluated::Scalar(Value::Float(f64::NAN)));
    }
    let n = v.len() as f64;
    let mean = simd_sum(&v) / n;
    let variance = v.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
    Ok(Evaluated::Scalar(Value::Float(variance.sqrt())))
}

/// Element at `n` (negative counts from the end), NaN when out of range.
fn element(s: &Series, n: i64) -> Value {
    let len = s.len() as i64;
    let pos = if n < 0 { len + n } else { n };
    if pos < 0 || pos >= len {
        return Value::Float(f64::NAN);
    }
    s.get(pos as usize).unwrap_or(Value::Float(f64::NAN))
}

fn first(args: &[Evaluated]) -> Result<Evaluated> {
    let s = column_arg("first", args, 1)?;
    Ok(Evaluated::Scalar(element(&s, 0)))
}

fn last(args: &[Evaluated]) -> Result<Evaluated> {
    let s = column_arg("last", args, 1)?;
    Ok(Evaluated::Scalar(element(&s, -1)))
}

fn nth(args: &[Evaluated]) -> Result<Evaluated> {
    let s = column_arg("nth", args, 2)?;
    let n = match &args[1] {
        Evaluated::Scalar(Value::Int(n)) => *n,
        _ => return Err(PlyError::type_error("nth() index must be an integer")),
    };
    Ok(Evaluated::Scalar(element(&s, n)))
}

fn n_distinct(args: &[Evaluated]) -> Result<Evaluated> {
    let s = column_arg("n_distinct", args, 1)?;
    let distinct: HashSet<Value> = s.values().into_iter().collect();
    Ok(Evaluated::Scalar(Value::Int(distinct.len() as i64)))
}
