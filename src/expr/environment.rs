use super::eval::{EvalContext, Evaluated};
use super::parser::parse;
use crate::dataframe::DataFrame;
use crate::error::Result;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A callable visible to expressions by name.
pub type Function = Arc<dyn Fn(&[Evaluated]) -> Result<Evaluated> + Send + Sync>;

/// Named callables not bound to columns.
pub type Namespace = HashMap<String, Function>;

/// Placeholder for the number of rows in the frame being evaluated.
pub const ROW_COUNT_PLACEHOLDER: &str = "{n}";

/// Name the placeholder is rewritten to. It is resolved per call and never
/// stored in any namespace.
pub(crate) const ROW_COUNT_FUNCTION: &str = "__n__";

/// Names available to expressions beyond the row namespace.
///
/// Lookups try the environment's own functions first, then each outer
/// namespace in the order it was layered on.
#[derive(Clone, Default)]
pub struct Environment {
    locals: Arc<Namespace>,
    outer: Vec<Arc<Namespace>>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a function under `name`, replacing any previous one.
    pub fn with_function<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&[Evaluated]) -> Result<Evaluated> + Send + Sync + 'static,
    {
        Arc::make_mut(&mut self.locals).insert(name.into(), Arc::new(f));
        self
    }

    /// A new environment that also searches `namespace`, after everything
    /// this one already searches.
    pub fn with_outer_namespace(&self, namespace: Arc<Namespace>) -> Environment {
        let mut env = self.clone();
        env.outer.push(namespace);
        env
    }

    pub fn lookup(&self, name: &str) -> Option<&Function> {
        self.locals
            .get(name)
            .or_else(|| self.outer.iter().find_map(|ns| ns.get(name)))
    }

    /// Evaluate `text` with `frame` as the row namespace.
    ///
    /// `{n}` in the text stands for the row count of `frame`.
    pub fn eval(&self, text: &str, frame: &DataFrame) -> Result<Evaluated> {
        let text = text.replace(ROW_COUNT_PLACEHOLDER, &format!("{}()", ROW_COUNT_FUNCTION));
        let expr = parse(&text)?;
        EvalContext::new(frame, self).evaluate(&expr)
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut locals: Vec<&String> = self.locals.keys().collect();
        locals.sort();
        f.debug_struct("Environment")
            .field("locals", &locals)
            .field("outer_namespaces", &self.outer.len())
            .finish()
    }
}
