use super::{group, modify, reduce, select, Verb};
use crate::dataframe::Dataset;
use crate::error::{PlyError, Result};
use crate::expr::Environment;
use crate::options::{default_options, Options};
use tracing::debug;

/// What a verb produced.
#[derive(Debug, Clone, PartialEq)]
pub enum VerbOutput {
    Data(Dataset),
    /// Per-row group labels, from `group_indices`.
    Indices(Vec<usize>),
}

impl VerbOutput {
    pub fn into_dataset(self) -> Result<Dataset> {
        match self {
            VerbOutput::Data(data) => Ok(data),
            VerbOutput::Indices(_) => Err(PlyError::type_error(
                "verb produced group indices, not a dataset",
            )),
        }
    }

    pub fn into_indices(self) -> Result<Vec<usize>> {
        match self {
            VerbOutput::Indices(indices) => Ok(indices),
            VerbOutput::Data(_) => Err(PlyError::type_error(
                "verb produced a dataset, not group indices",
            )),
        }
    }
}

/// State shared by the handlers for one `apply` call.
pub(super) struct Context<'a> {
    pub(super) env: &'a Environment,
    pub(super) options: Options,
}

impl Context<'_> {
    /// Run `f` on the input itself when modifying input data, otherwise on a
    /// copy. Returns the modified dataset.
    pub(super) fn write<F>(&self, data: &mut Dataset, f: F) -> Result<Dataset>
    where
        F: FnOnce(&mut Dataset) -> Result<()>,
    {
        if self.options.modify_input_data {
            f(data)?;
            Ok(data.clone())
        } else {
            let mut out = data.clone();
            f(&mut out)?;
            Ok(out)
        }
    }
}

/// Runs verbs against datasets.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    /// `None` follows the process-wide defaults, read on every `apply`.
    options: Option<Options>,
    env: Environment,
}

impl Default for Dispatcher {
    /// A dispatcher that follows the process-wide default options, including
    /// changes made after it was built.
    fn default() -> Self {
        Dispatcher {
            options: None,
            env: Environment::default(),
        }
    }
}

impl Dispatcher {
    pub fn new(options: Options) -> Self {
        Dispatcher {
            options: Some(options),
            env: Environment::default(),
        }
    }

    /// Use `env` for names that are not columns.
    pub fn with_environment(mut self, env: Environment) -> Self {
        self.env = env;
        self
    }

    /// Options the next `apply` will use.
    pub fn options(&self) -> Options {
        self.options.unwrap_or_else(default_options)
    }

    pub fn environment(&self) -> &Environment {
        &self.env
    }

    /// Apply `verb` to `data`.
    ///
    /// Unless `modify_input_data` is set, `data` is left untouched. When it
    /// is set, verbs that modify columns (mutate, rename, group_by and the
    /// column step of distinct) change `data` itself, and a failure part way
    /// through may leave it partially modified.
    pub fn apply(&self, data: &mut Dataset, verb: &Verb) -> Result<VerbOutput> {
        let ctx = Context {
            env: &self.env,
            options: self.options(),
        };
        debug!(
            verb = %verb.kind(),
            rows = data.len(),
            groups = ?data.groups(),
            in_place = ctx.options.modify_input_data,
            "applying verb"
        );

        let out = match verb {
            Verb::Select(spec) => select::select(data, spec)?,
            Verb::Rename(mapping) => modify::rename(&ctx, data, mapping)?,
            Verb::Mutate(exprs) => modify::mutate(&ctx, data, exprs)?,
            Verb::Transmute(exprs) => modify::transmute(&ctx, data, exprs)?,
            Verb::Distinct(spec) => modify::distinct(&ctx, data, spec)?,
            Verb::Arrange(exprs) => modify::arrange(&ctx, data, exprs)?,
            Verb::GroupBy { keys, new_columns } => group::group_by(&ctx, data, keys, new_columns)?,
            Verb::Ungroup => group::ungroup(data),
            Verb::GroupIndices { keys, new_columns } => {
                return group::group_indices(&ctx, data, keys, new_columns).map(VerbOutput::Indices);
            }
            Verb::Summarize(exprs) => reduce::summarize(&ctx, data, exprs)?,
            Verb::Query(expr) => modify::query(&ctx, data, expr)?,
            Verb::Do(spec) => reduce::do_(&ctx, data, spec)?,
            Verb::Head(n) => reduce::head(&ctx, data, *n)?,
            Verb::Tail(n) => reduce::tail(&ctx, data, *n)?,
            Verb::Sample(spec) => modify::sample(data, spec)?,
        };
        Ok(VerbOutput::Data(out))
    }

    /// Apply `verbs` one after another, each to the previous result.
    ///
    /// `group_indices` can only appear last.
    pub fn pipe(&self, data: &mut Dataset, verbs: &[Verb]) -> Result<VerbOutput> {
        let Some((last, init)) = verbs.split_last() else {
            return Ok(VerbOutput::Data(data.clone()));
        };

        let mut current: Option<Dataset> = None;
        for verb in init {
            let input = match current.as_mut() {
                Some(prev) => prev,
                None => &mut *data,
            };
            current = Some(self.apply(input, verb)?.into_dataset()?);
        }
        let input = match current.as_mut() {
            Some(prev) => prev,
            None => &mut *data,
        };
        self.apply(input, last)
    }
}
