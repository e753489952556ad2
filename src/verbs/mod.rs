//! Verb descriptors and their constructors.
//!
//! A [`Verb`] is an immutable description of one operation. Nothing happens
//! until it is handed to a [`Dispatcher`] together with a dataset.
//!
//! ```
//! use plyframes::prelude::*;
//!
//! let df = DataFrame::new(vec![
//!     ("x".to_string(), Series::from(vec!["a", "a", "b"])),
//!     ("y".to_string(), Series::from(vec![1, 2, 3])),
//! ])?;
//!
//! let dispatcher = Dispatcher::new(Options::default());
//! let mut data = Dataset::from(df);
//! let mut grouped = dispatcher.apply(&mut data, &group_by(["x"], vec![]))?.into_dataset()?;
//! let out = dispatcher
//!     .apply(&mut grouped, &summarize([("total", "sum(y)"), ("count", "{n}")]))?
//!     .into_dataset()?;
//!
//! assert_eq!(out.frame().column("total")?, &Series::from(vec![3, 3]));
//! # Ok::<(), plyframes::PlyError>(())
//! ```

mod dispatch;
mod group;
mod modify;
mod reduce;
mod select;

pub use dispatch::{Dispatcher, VerbOutput};

use crate::dataframe::{DataFrame, Keep, SampleSize, SampleSpec};
use crate::error::{PlyError, Result};
use crate::expr::{Evaluated, Expression};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// A new column name paired with the expression that computes it.
pub type NamedExpr = (String, Expression);

/// Function applied to a whole partition by `do_single`.
pub type FrameFn = Arc<dyn Fn(&DataFrame) -> Result<DataFrame> + Send + Sync>;

/// Function computing one column of a partition's result for `do_columns`.
pub type ColumnFn = Arc<dyn Fn(&DataFrame) -> Result<Evaluated> + Send + Sync>;

/// Every kind of verb the dispatcher knows how to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VerbKind {
    Select,
    Rename,
    Mutate,
    Transmute,
    Distinct,
    Arrange,
    GroupBy,
    Ungroup,
    GroupIndices,
    Summarize,
    Query,
    Do,
    Head,
    Tail,
    SampleN,
    SampleFrac,
}

impl VerbKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Select => "select",
            Self::Rename => "rename",
            Self::Mutate => "mutate",
            Self::Transmute => "transmute",
            Self::Distinct => "distinct",
            Self::Arrange => "arrange",
            Self::GroupBy => "group_by",
            Self::Ungroup => "ungroup",
            Self::GroupIndices => "group_indices",
            Self::Summarize => "summarize",
            Self::Query => "query",
            Self::Do => "do",
            Self::Head => "head",
            Self::Tail => "tail",
            Self::SampleN => "sample_n",
            Self::SampleFrac => "sample_frac",
        }
    }
}

impl fmt::Display for VerbKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for VerbKind {
    type Err = PlyError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "select" => Ok(Self::Select),
            "rename" => Ok(Self::Rename),
            "mutate" => Ok(Self::Mutate),
            "transmute" => Ok(Self::Transmute),
            "distinct" => Ok(Self::Distinct),
            "arrange" => Ok(Self::Arrange),
            "group_by" => Ok(Self::GroupBy),
            "ungroup" => Ok(Self::Ungroup),
            "group_indices" => Ok(Self::GroupIndices),
            "summarize" => Ok(Self::Summarize),
            "query" => Ok(Self::Query),
            "do" => Ok(Self::Do),
            "head" => Ok(Self::Head),
            "tail" => Ok(Self::Tail),
            "sample_n" => Ok(Self::SampleN),
            "sample_frac" => Ok(Self::SampleFrac),
            _ => Err(PlyError::config(format!("unknown verb '{}'", s))),
        }
    }
}

/// Column selection parameters.
///
/// A column is selected when it matches any of the given criteria. On a
/// grouped dataset the group keys always match. `drop` inverts the final
/// selection, keys included.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Select {
    pub names: Vec<String>,
    pub startswith: Option<String>,
    pub endswith: Option<String>,
    pub contains: Option<String>,
    /// Regular expression anchored at the start of the column name.
    pub matches: Option<String>,
    pub drop: bool,
}

impl Select {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.names = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn startswith(mut self, prefix: impl Into<String>) -> Self {
        self.startswith = Some(prefix.into());
        self
    }

    pub fn endswith(mut self, suffix: impl Into<String>) -> Self {
        self.endswith = Some(suffix.into());
        self
    }

    pub fn contains(mut self, needle: impl Into<String>) -> Self {
        self.contains = Some(needle.into());
        self
    }

    pub fn matches(mut self, pattern: impl Into<String>) -> Self {
        self.matches = Some(pattern.into());
        self
    }

    pub fn drop(mut self, drop: bool) -> Self {
        self.drop = drop;
        self
    }
}

/// Duplicate-row removal parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Distinct {
    /// Columns that decide whether rows are duplicates; all when `None`.
    pub columns: Option<Vec<String>>,
    pub keep: Keep,
    /// Columns computed, as by `mutate`, before duplicates are removed.
    pub new_columns: Vec<NamedExpr>,
}

impl Distinct {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    pub fn keep(mut self, keep: Keep) -> Self {
        self.keep = keep;
        self
    }

    pub fn new_column(mut self, name: impl Into<String>, expr: impl Into<Expression>) -> Self {
        self.new_columns.push((name.into(), expr.into()));
        self
    }
}

/// The functions run by a `do` verb.
#[derive(Clone)]
pub enum DoSpec {
    /// One function producing a whole frame per partition.
    Single(FrameFn),
    /// Named functions, each producing one column per partition.
    Columns(Vec<(String, ColumnFn)>),
}

impl fmt::Debug for DoSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DoSpec::Single(_) => f.write_str("Single(<fn>)"),
            DoSpec::Columns(cols) => f
                .debug_tuple("Columns")
                .field(&cols.iter().map(|(name, _)| name).collect::<Vec<_>>())
                .finish(),
        }
    }
}

/// A verb with all of its arguments.
#[derive(Debug, Clone)]
pub enum Verb {
    Select(Select),
    Rename(Vec<(String, String)>),
    Mutate(Vec<NamedExpr>),
    Transmute(Vec<NamedExpr>),
    Distinct(Distinct),
    Arrange(Vec<Expression>),
    GroupBy {
        keys: Vec<String>,
        new_columns: Vec<NamedExpr>,
    },
    Ungroup,
    GroupIndices {
        keys: Vec<String>,
        new_columns: Vec<NamedExpr>,
    },
    Summarize(Vec<NamedExpr>),
    Query(String),
    Do(DoSpec),
    Head(usize),
    Tail(usize),
    Sample(SampleSpec),
}

impl Verb {
    pub fn kind(&self) -> VerbKind {
        match self {
            Verb::Select(_) => VerbKind::Select,
            Verb::Rename(_) => VerbKind::Rename,
            Verb::Mutate(_) => VerbKind::Mutate,
            Verb::Transmute(_) => VerbKind::Transmute,
            Verb::Distinct(_) => VerbKind::Distinct,
            Verb::Arrange(_) => VerbKind::Arrange,
            Verb::GroupBy { .. } => VerbKind::GroupBy,
            Verb::Ungroup => VerbKind::Ungroup,
            Verb::GroupIndices { .. } => VerbKind::GroupIndices,
            Verb::Summarize(_) => VerbKind::Summarize,
            Verb::Query(_) => VerbKind::Query,
            Verb::Do(_) => VerbKind::Do,
            Verb::Head(_) => VerbKind::Head,
            Verb::Tail(_) => VerbKind::Tail,
            Verb::Sample(spec) => match spec.size {
                SampleSize::N(_) => VerbKind::SampleN,
                SampleSize::Frac(_) => VerbKind::SampleFrac,
            },
        }
    }
}

fn named_exprs<I, N, E>(exprs: I) -> Vec<NamedExpr>
where
    I: IntoIterator<Item = (N, E)>,
    N: Into<String>,
    E: Into<Expression>,
{
    exprs
        .into_iter()
        .map(|(name, expr)| (name.into(), expr.into()))
        .collect()
}

fn strings<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    items.into_iter().map(Into::into).collect()
}

/// Pair a column name with an expression.
pub fn named(name: impl Into<String>, expr: impl Into<Expression>) -> NamedExpr {
    (name.into(), expr.into())
}

pub fn select(spec: Select) -> Verb {
    Verb::Select(spec)
}

/// Rename columns, `(old, new)` pairs.
pub fn rename<I, A, B>(mapping: I) -> Verb
where
    I: IntoIterator<Item = (A, B)>,
    A: Into<String>,
    B: Into<String>,
{
    Verb::Rename(
        mapping
            .into_iter()
            .map(|(from, to)| (from.into(), to.into()))
            .collect(),
    )
}

/// Add or overwrite columns. Every expression sees the columns as they were
/// before the verb ran.
pub fn mutate<I, N, E>(exprs: I) -> Verb
where
    I: IntoIterator<Item = (N, E)>,
    N: Into<String>,
    E: Into<Expression>,
{
    Verb::Mutate(named_exprs(exprs))
}

/// Like [`mutate`], keeping only the group keys and the new columns.
pub fn transmute<I, N, E>(exprs: I) -> Verb
where
    I: IntoIterator<Item = (N, E)>,
    N: Into<String>,
    E: Into<Expression>,
{
    Verb::Transmute(named_exprs(exprs))
}

pub fn distinct(spec: Distinct) -> Verb {
    Verb::Distinct(spec)
}

/// Stable sort by the given expressions, first one most significant.
pub fn arrange<I, E>(exprs: I) -> Verb
where
    I: IntoIterator<Item = E>,
    E: Into<Expression>,
{
    Verb::Arrange(exprs.into_iter().map(Into::into).collect())
}

/// Group by `keys` plus any columns computed from `new_columns`.
pub fn group_by<I, S>(keys: I, new_columns: Vec<NamedExpr>) -> Verb
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Verb::GroupBy {
        keys: strings(keys),
        new_columns,
    }
}

pub fn ungroup() -> Verb {
    Verb::Ungroup
}

/// Label each row with the ordinal of its group.
///
/// On a grouped dataset the existing keys are used and any keys given here
/// are ignored with a warning.
pub fn group_indices<I, S>(keys: I, new_columns: Vec<NamedExpr>) -> Verb
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Verb::GroupIndices {
        keys: strings(keys),
        new_columns,
    }
}

/// Reduce each group to the rows produced by the expressions. Aggregate
/// functions such as `mean` and `n_distinct` are in scope.
pub fn summarize<I, N, E>(exprs: I) -> Verb
where
    I: IntoIterator<Item = (N, E)>,
    N: Into<String>,
    E: Into<Expression>,
{
    Verb::Summarize(named_exprs(exprs))
}

/// Keep the rows for which `expr` is true.
pub fn query(expr: impl Into<String>) -> Verb {
    Verb::Query(expr.into())
}

pub fn do_single<F>(f: F) -> Verb
where
    F: Fn(&DataFrame) -> Result<DataFrame> + Send + Sync + 'static,
{
    Verb::Do(DoSpec::Single(Arc::new(f)))
}

pub fn do_columns<I, N>(functions: I) -> Verb
where
    I: IntoIterator<Item = (N, ColumnFn)>,
    N: Into<String>,
{
    Verb::Do(DoSpec::Columns(
        functions
            .into_iter()
            .map(|(name, f)| (name.into(), f))
            .collect(),
    ))
}

pub fn head(n: usize) -> Verb {
    Verb::Head(n)
}

pub fn tail(n: usize) -> Verb {
    Verb::Tail(n)
}

/// Sample `n` rows without replacement.
pub fn sample_n(n: usize) -> Verb {
    Verb::Sample(SampleSpec::n(n))
}

/// Sample a fraction of the rows without replacement.
pub fn sample_frac(frac: f64) -> Verb {
    Verb::Sample(SampleSpec::frac(frac))
}

/// Sample with full control over replacement, weights and seed.
pub fn sample(spec: SampleSpec) -> Verb {
    Verb::Sample(spec)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names_round_trip() {
        for kind in [
            VerbKind::Select,
            VerbKind::GroupBy,
            VerbKind::GroupIndices,
            VerbKind::Do,
            VerbKind::SampleFrac,
        ] {
            assert_eq!(kind.name().parse::<VerbKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_unknown_kind_is_config_error() {
        let err = "pivot".parse::<VerbKind>().unwrap_err();
        assert!(matches!(err, PlyError::ConfigError(_)));
    }

    #[test]
    fn test_constructors_record_kind() {
        assert_eq!(mutate([("z", "x + 1")]).kind(), VerbKind::Mutate);
        assert_eq!(sample_n(3).kind(), VerbKind::SampleN);
        assert_eq!(sample_frac(0.5).kind(), VerbKind::SampleFrac);
        assert_eq!(
            group_by(["x"], vec![named("y", "x * 2")]).kind(),
            VerbKind::GroupBy
        );
        assert_eq!(do_single(|df| Ok(df.clone())).kind(), VerbKind::Do);
    }

    #[test]
    fn test_select_builder() {
        let spec = Select::new().names(["a", "b"]).startswith("x").drop(true);
        assert_eq!(spec.names, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(spec.startswith.as_deref(), Some("x"));
        assert!(spec.drop);
    }
}
