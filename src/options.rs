//! Behaviour switches read by the dispatcher at the start of every verb.

use once_cell::sync::Lazy;
use std::sync::RwLock;

/// Options controlling how verbs are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Options {
    /// Mutate the input dataset instead of working on a copy.
    pub modify_input_data: bool,
    /// Evaluate partitions of a grouped dataset on the rayon pool.
    pub parallel: bool,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn modify_input_data(mut self, enabled: bool) -> Self {
        self.modify_input_data = enabled;
        self
    }

    pub fn parallel(mut self, enabled: bool) -> Self {
        self.parallel = enabled;
        self
    }
}

/// Process-wide defaults picked up by `Dispatcher::default()`.
static DEFAULT_OPTIONS: Lazy<RwLock<Options>> = Lazy::new(|| RwLock::new(Options::default()));

/// Replace the process-wide default options. Dispatchers built with
/// `Dispatcher::default()` see the change on their next `apply`.
pub fn set_default_options(options: Options) {
    let mut guard = DEFAULT_OPTIONS
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    *guard = options;
}

/// Current process-wide default options.
pub fn default_options() -> Options {
    *DEFAULT_OPTIONS
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}
