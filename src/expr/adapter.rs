//! What verbs accept as "an expression", and how each kind is evaluated.

use super::environment::Environment;
use super::eval::Evaluated;
use crate::dataframe::{DataFrame, Series, Value};
use crate::error::{PlyError, Result};

/// An expression argument to a verb.
///
/// Text is parsed and evaluated against the frame. Materialised values are
/// used as they are: a series must match the frame's row count, a scalar is
/// broadcast.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Text(String),
    Series(Series),
    Scalar(Value),
    /// A whole frame. Accepted by the type so callers can pass it through,
    /// but it cannot stand in for a column.
    Frame(DataFrame),
}

impl Expression {
    fn type_name(&self) -> &'static str {
        match self {
            Expression::Text(_) => "str",
            Expression::Series(_) => "Series",
            Expression::Scalar(v) => v.type_name(),
            Expression::Frame(_) => "DataFrame",
        }
    }
}

/// Evaluate `expr` with `frame` as the row namespace.
pub fn evaluate(expr: &Expression, frame: &DataFrame, env: &Environment) -> Result<Evaluated> {
    match expr {
        Expression::Text(text) => env.eval(text, frame),
        Expression::Series(s) if s.len() == frame.len() => Ok(Evaluated::Column(s.clone())),
        Expression::Series(s) => Err(PlyError::value(format!(
            "value of length {} not equal to length of dataframe {}",
            s.len(),
            frame.len()
        ))),
        Expression::Scalar(v) => Ok(Evaluated::Scalar(v.clone())),
        Expression::Frame(_) => Err(PlyError::type_error(format!(
            "cannot handle expression of type {}",
            expr.type_name()
        ))),
    }
}

/// Like [`evaluate`], but a materialised series is taken as is, whatever its
/// length. Used where the result is not tied to the frame's rows.
pub fn evaluate_unsized(expr: &Expression, frame: &DataFrame, env: &Environment) -> Result<Evaluated> {
    match expr {
        Expression::Series(s) => Ok(Evaluated::Column(s.clone())),
        _ => evaluate(expr, frame, env),
    }
}

/// Evaluate `expr` into a column with one value per row of `frame`.
pub fn evaluate_column(expr: &Expression, frame: &DataFrame, env: &Environment) -> Result<Series> {
    evaluate(expr, frame, env)?.into_series(frame.len())
}

impl From<&str> for Expression {
    fn from(text: &str) -> Self {
        Expression::Text(text.to_string())
    }
}

impl From<String> for Expression {
    fn from(text: String) -> Self {
        Expression::Text(text)
    }
}

impl From<Series> for Expression {
    fn from(s: Series) -> Self {
        Expression::Series(s)
    }
}

impl From<Value> for Expression {
    fn from(v: Value) -> Self {
        Expression::Scalar(v)
    }
}

impl From<i64> for Expression {
    fn from(v: i64) -> Self {
        Expression::Scalar(Value::Int(v))
    }
}

impl From<f64> for Expression {
    fn from(v: f64) -> Self {
        Expression::Scalar(Value::Float(v))
    }
}

impl From<bool> for Expression {
    fn from(v: bool) -> Self {
        Expression::Scalar(Value::Bool(v))
    }
}

impl From<DataFrame> for Expression {
    fn from(frame: DataFrame) -> Self {
        Expression::Frame(frame)
    }
}
