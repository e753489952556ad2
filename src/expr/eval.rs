//! Vectorized evaluation of parsed expressions against a row namespace.

use super::ast::{BinaryOp, Expr, UnaryOp};
use super::environment::{Environment, ROW_COUNT_FUNCTION};
use crate::dataframe::{DataFrame, Series, SeriesType, Value};
use crate::error::{PlyError, Result};

/// Result of evaluating an expression: a whole column or a single value.
#[derive(Debug, Clone, PartialEq)]
pub enum Evaluated {
    Column(Series),
    Scalar(Value),
}

impl Evaluated {
    /// Number of values, `None` for a scalar.
    pub fn len(&self) -> Option<usize> {
        match self {
            Evaluated::Column(s) => Some(s.len()),
            Evaluated::Scalar(_) => None,
        }
    }

    /// Materialise as a column of `n` rows, broadcasting scalars.
    pub fn into_series(self, n: usize) -> Result<Series> {
        match self {
            Evaluated::Scalar(v) => Ok(Series::broadcast(&v, n)),
            Evaluated::Column(s) if s.len() == n => Ok(s),
            Evaluated::Column(s) => Err(PlyError::value(format!(
                "value of length {} not equal to length of dataframe {}",
                s.len(),
                n
            ))),
        }
    }

    /// The column itself, or a one-row column for a scalar.
    pub fn as_column(&self) -> Series {
        match self {
            Evaluated::Column(s) => s.clone(),
            Evaluated::Scalar(v) => Series::broadcast(v, 1),
        }
    }
}

impl From<Series> for Evaluated {
    fn from(s: Series) -> Self {
        Evaluated::Column(s)
    }
}

impl From<Value> for Evaluated {
    fn from(v: Value) -> Self {
        Evaluated::Scalar(v)
    }
}

/// One evaluation call: the row namespace, the outer environment and the
/// size reported by the row-count placeholder.
pub(crate) struct EvalContext<'a> {
    frame: &'a DataFrame,
    env: &'a Environment,
    rows: usize,
}

impl<'a> EvalContext<'a> {
    pub(crate) fn new(frame: &'a DataFrame, env: &'a Environment) -> Self {
        EvalContext {
            frame,
            env,
            rows: frame.len(),
        }
    }

    pub(crate) fn evaluate(&self, expr: &Expr) -> Result<Evaluated> {
        match expr {
            Expr::Literal(v) => Ok(Evaluated::Scalar(v.clone())),
            Expr::Name(name) => match self.frame.get_column(name) {
                Some(series) => Ok(Evaluated::Column(series.clone())),
                None => Err(PlyError::key(format!("name '{}' is not defined", name))),
            },
            Expr::Call { name, args } => self.call(name, args),
            Expr::Unary { op, expr } => unary(*op, self.evaluate(expr)?),
            Expr::Binary { op, left, right } => {
                binary(*op, self.evaluate(left)?, self.evaluate(right)?)
            }
        }
    }

    fn call(&self, name: &str, args: &[Expr]) -> Result<Evaluated> {
        if self.frame.has_column(name) {
            return Err(PlyError::type_error(format!(
                "column '{}' is not callable",
                name
            )));
        }

        let args = args
            .iter()
            .map(|a| self.evaluate(a))
            .collect::<Result<Vec<_>>>()?;

        if name == ROW_COUNT_FUNCTION {
            if !args.is_empty() {
                return Err(PlyError::type_error("{n} takes no arguments"));
            }
            return Ok(Evaluated::Scalar(Value::Int(self.rows as i64)));
        }
        if let Some(f) = self.env.lookup(name) {
            return f(&args);
        }
        match builtin(name) {
            Some(f) => f(&args),
            None => Err(PlyError::key(format!("name '{}' is not defined", name))),
        }
    }
}

fn unary(op: UnaryOp, operand: Evaluated) -> Result<Evaluated> {
    let apply = |v: &Value| -> Result<Value> {
        match (op, v) {
            (UnaryOp::Neg, Value::Int(x)) => x
                .checked_neg()
                .map(Value::Int)
                .ok_or_else(|| PlyError::value("integer overflow")),
            (UnaryOp::Neg, Value::Float(x)) => Ok(Value::Float(-x)),
            (UnaryOp::Not, Value::Bool(x)) => Ok(Value::Bool(!x)),
            (UnaryOp::Neg, other) => Err(PlyError::type_error(format!(
                "bad operand type for unary -: '{}'",
                other.type_name()
            ))),
            (UnaryOp::Not, other) => Err(PlyError::type_error(format!(
                "bad operand type for ~: '{}'",
                other.type_name()
            ))),
        }
    };

    match operand {
        Evaluated::Scalar(v) => Ok(Evaluated::Scalar(apply(&v)?)),
        Evaluated::Column(s) => {
            let dtype = s.dtype();
            let values = s.values().iter().map(apply).collect::<Result<Vec<_>>>()?;
            Ok(Evaluated::Column(collect_series(values, dtype)?))
        }
    }
}

/// Build a column, keeping `empty_dtype` when there are no values.
fn collect_series(values: Vec<Value>, empty_dtype: SeriesType) -> Result<Series> {
    if values.is_empty() {
        Ok(Series::empty(empty_dtype))
    } else {
        Series::from_values(values)
    }
}

pub(crate) fn binary(op: BinaryOp, left: Evaluated, right: Evaluated) -> Result<Evaluated> {
    let empty_dtype = |s: &Series| {
        if op.is_predicate() {
            SeriesType::Bool
        } else {
            s.dtype()
        }
    };

    match (left, right) {
        (Evaluated::Scalar(a), Evaluated::Scalar(b)) => Ok(Evaluated::Scalar(apply_binary(op, &a, &b)?)),
        (Evaluated::Column(a), Evaluated::Scalar(b)) => {
            let values = a
                .values()
                .iter()
                .map(|x| apply_binary(op, x, &b))
                .collect::<Result<Vec<_>>>()?;
            Ok(Evaluated::Column(collect_series(values, empty_dtype(&a))?))
        }
        (Evaluated::Scalar(a), Evaluated::Column(b)) => {
            let values = b
                .values()
                .iter()
                .map(|y| apply_binary(op, &a, y))
                .collect::<Result<Vec<_>>>()?;
            Ok(Evaluated::Column(collect_series(values, empty_dtype(&b))?))
        }
        (Evaluated::Column(a), Evaluated::Column(b)) => {
            if a.len() != b.len() {
                return Err(PlyError::value(format!(
                    "operands could not be broadcast together with lengths {} and {}",
                    a.len(),
                    b.len()
                )));
            }
            let values = a
                .values()
                .iter()
                .zip(b.values().iter())
                .map(|(x, y)| apply_binary(op, x, y))
                .collect::<Result<Vec<_>>>()?;
            Ok(Evaluated::Column(collect_series(values, empty_dtype(&a))?))
        }
    }
}

fn unsupported(op: BinaryOp, a: &Value, b: &Value) -> PlyError {
    PlyError::type_error(format!(
        "unsupported operand types for {}: '{}' and '{}'",
        op.symbol(),
        a.type_name(),
        b.type_name()
    ))
}

fn floor_div_i64(a: i64, b: i64) -> Result<i64> {
    if b == 0 {
        return Err(PlyError::value("integer division by zero"));
    }
    let q = a.wrapping_div(b);
    if a.wrapping_rem(b) != 0 && ((a < 0) != (b < 0)) {
        Ok(q - 1)
    } else {
        Ok(q)
    }
}

fn mod_i64(a: i64, b: i64) -> Result<i64> {
    if b == 0 {
        return Err(PlyError::value("integer modulo by zero"));
    }
    let r = a.wrapping_rem(b);
    if r != 0 && ((r < 0) != (b < 0)) {
        Ok(r + b)
    } else {
        Ok(r)
    }
}

fn int_arith(op: BinaryOp, a: i64, b: i64) -> Result<Value> {
    let overflow = || PlyError::value("integer overflow");
    let v = match op {
        BinaryOp::Add => Value::Int(a.checked_add(b).ok_or_else(overflow)?),
        BinaryOp::Sub => Value::Int(a.checked_sub(b).ok_or_else(overflow)?),
        BinaryOp::Mul => Value::Int(a.checked_mul(b).ok_or_else(overflow)?),
        BinaryOp::Div => Value::Float(a as f64 / b as f64),
        BinaryOp::FloorDiv => Value::Int(floor_div_i64(a, b)?),
        BinaryOp::Mod => Value::Int(mod_i64(a, b)?),
        BinaryOp::Pow if b >= 0 => {
            let exp = u32::try_from(b).map_err(|_| overflow())?;
            Value::Int(a.checked_pow(exp).ok_or_else(overflow)?)
        }
        BinaryOp::Pow => Value::Float((a as f64).powf(b as f64)),
        _ => unreachable!("int_arith called with a predicate operator"),
    };
    Ok(v)
}

fn float_arith(op: BinaryOp, a: f64, b: f64) -> Value {
    Value::Float(match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div => a / b,
        BinaryOp::FloorDiv => (a / b).floor(),
        BinaryOp::Mod => a - b * (a / b).floor(),
        BinaryOp::Pow => a.powf(b),
        _ => unreachable!("float_arith called with a predicate operator"),
    })
}

fn compare(op: BinaryOp, a: &Value, b: &Value) -> Result<bool> {
    use std::cmp::Ordering;

    let ord: Option<Ordering> = match (a, b) {
        (Value::Str(x), Value::Str(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        (Value::Int(x), Value::Int(y)) => Some(x.cmp(y)),
        _ => match (a.as_f64(), b.as_f64()) {
            // NaN compares unequal to everything
            (Some(x), Some(y)) => x.partial_cmp(&y),
            _ => {
                return match op {
                    BinaryOp::Eq => Ok(false),
                    BinaryOp::Ne => Ok(true),
                    _ => Err(unsupported(op, a, b)),
                }
            }
        },
    };

    Ok(match (op, ord) {
        (BinaryOp::Ne, None) => true,
        (_, None) => false,
        (BinaryOp::Eq, Some(o)) => o == Ordering::Equal,
        (BinaryOp::Ne, Some(o)) => o != Ordering::Equal,
        (BinaryOp::Lt, Some(o)) => o == Ordering::Less,
        (BinaryOp::Le, Some(o)) => o != Ordering::Greater,
        (BinaryOp::Gt, Some(o)) => o == Ordering::Greater,
        (BinaryOp::Ge, Some(o)) => o != Ordering::Less,
        _ => unreachable!("compare called with a non-comparison operator"),
    })
}

fn apply_binary(op: BinaryOp, a: &Value, b: &Value) -> Result<Value> {
    match op {
        BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
            compare(op, a, b).map(Value::Bool)
        }
        BinaryOp::And | BinaryOp::Or => match (a, b) {
            (Value::Bool(x), Value::Bool(y)) => Ok(Value::Bool(if op == BinaryOp::And {
                *x && *y
            } else {
                *x || *y
            })),
            _ => Err(unsupported(op, a, b)),
        },
        _ => match (a, b) {
            (Value::Str(x), Value::Str(y)) if op == BinaryOp::Add => {
                Ok(Value::Str(format!("{}{}", x, y)))
            }
            (Value::Str(_), _) | (_, Value::Str(_)) => Err(unsupported(op, a, b)),
            (Value::Float(_), _) | (_, Value::Float(_)) => {
                match (a.as_f64(), b.as_f64()) {
                    (Some(x), Some(y)) => Ok(float_arith(op, x, y)),
                    _ => Err(unsupported(op, a, b)),
                }
            }
            _ => match (a.as_i64(), b.as_i64()) {
                (Some(x), Some(y)) => int_arith(op, x, y),
                _ => Err(unsupported(op, a, b)),
            },
        },
    }
}

type Builtin = fn(&[Evaluated]) -> Result<Evaluated>;

/// Elementwise numeric functions available to every expression.
fn builtin(name: &str) -> Option<Builtin> {
    let f: Builtin = match name {
        "abs" => |args| map_numeric("abs", args, |v| match v {
            Value::Int(x) => Value::Int(x.wrapping_abs()),
            other => Value::Float(other.as_f64().unwrap_or(f64::NAN).abs()),
        }),
        "sqrt" => |args| map_float("sqrt", args, f64::sqrt),
        "exp" => |args| map_float("exp", args, f64::exp),
        "log" => |args| map_float("log", args, f64::ln),
        "round" => round,
        _ => return None,
    };
    Some(f)
}

fn single_arg<'a>(name: &str, args: &'a [Evaluated]) -> Result<&'a Evaluated> {
    match args {
        [arg] => Ok(arg),
        _ => Err(PlyError::type_error(format!(
            "{}() takes exactly one argument ({} given)",
            name,
            args.len()
        ))),
    }
}

fn map_numeric(name: &str, args: &[Evaluated], f: impl Fn(&Value) -> Value) -> Result<Evaluated> {
    let check = |v: &Value| -> Result<Value> {
        match v {
            Value::Int(_) | Value::Float(_) => Ok(f(v)),
            other => Err(PlyError::type_error(format!(
                "{}() expects numbers, got '{}'",
                name,
                other.type_name()
            ))),
        }
    };

    match single_arg(name, args)? {
        Evaluated::Scalar(v) => Ok(Evaluated::Scalar(check(v)?)),
        Evaluated::Column(s) => {
            let values = s.values().iter().map(check).collect::<Result<Vec<_>>>()?;
            Ok(Evaluated::Column(collect_series(values, s.dtype())?))
        }
    }
}

fn map_float(name: &str, args: &[Evaluated], f: fn(f64) -> f64) -> Result<Evaluated> {
    map_numeric(name, args, |v| Value::Float(f(v.as_f64().unwrap_or(f64::NAN))))
}

fn round(args: &[Evaluated]) -> Result<Evaluated> {
    let (value, digits) = match args {
        [value] => (value, 0),
        [value, Evaluated::Scalar(Value::Int(d))] => (value, *d),
        _ => {
            return Err(PlyError::type_error(
                "round() takes a value and an optional integer number of digits",
            ))
        }
    };
    let scale = 10f64.powi(digits.clamp(-308, 308) as i32);
    map_numeric("round", std::slice::from_ref(value), |v| match v {
        Value::Int(x) if digits >= 0 => Value::Int(*x),
        other => {
            let x = other.as_f64().unwrap_or(f64::NAN);
            let rounded = (x * scale).round_ties_even() / scale;
            Value::Float(rounded)
        }
    })
}
