//! # plyframes
//!
//! A grammar of data manipulation for columnar dataframes.
//!
//! plyframes provides:
//! - Verbs (`select`, `mutate`, `group_by`, `summarize`, `arrange`, ...) that
//!   describe one transformation each
//! - Grouped datasets with split-apply-combine evaluation in sorted key order
//! - A small vectorized expression language with aggregate functions
//! - CSV I/O with automatic type inference, and optional Arrow interop
//!
//! ## Quick Start
//!
//! ```rust
//! use plyframes::prelude::*;
//!
//! let df = DataFrame::new(vec![
//!     ("team".to_string(), Series::from(vec!["red", "blue", "red", "blue"])),
//!     ("score".to_string(), Series::from(vec![3.0, 5.0, 4.0, 1.0])),
//! ])?;
//!
//! let dispatcher = Dispatcher::default();
//! let mut data = Dataset::from(df);
//! let out = dispatcher.pipe(
//!     &mut data,
//!     &[
//!         mutate([("double", "score * 2")]),
//!         group_by(["team"], vec![]),
//!         summarize([("best", "max(double)"), ("games", "{n}")]),
//!     ],
//! )?;
//!
//! let summary = out.into_dataset()?;
//! assert_eq!(summary.frame().column("team")?, &Series::from(vec!["blue", "red"]));
//! assert_eq!(summary.frame().column("best")?, &Series::from(vec![10.0, 8.0]));
//! # Ok::<(), plyframes::PlyError>(())
//! ```
//!
//! Verbs never modify their input unless
//! [`Options::modify_input_data`](options::Options) is set.

pub mod apply;
pub mod dataframe;
pub mod error;
pub mod expr;
pub mod options;
pub mod verbs;

// Re-export main types for convenience
pub use dataframe::{DataFrame, Dataset, GroupedDataFrame, Series, Value};
pub use error::{PlyError, Result};
pub use expr::{Environment, Expression};
pub use options::{default_options, set_default_options, Options};
pub use verbs::{Dispatcher, Verb, VerbKind, VerbOutput};

/// Everything needed to build and run verbs.
pub mod prelude {
    pub use crate::dataframe::{
        DataFrame, Dataset, GroupedDataFrame, Keep, SampleSize, SampleSpec, Series, Value, Weights,
    };
    pub use crate::error::{PlyError, Result};
    pub use crate::expr::{Environment, Evaluated, Expression};
    pub use crate::options::Options;
    pub use crate::verbs::{
        arrange, distinct, do_columns, do_single, group_by, group_indices, head, mutate, named,
        query, rename, sample, sample_frac, sample_n, select, summarize, tail, transmute, ungroup,
        ColumnFn, Dispatcher, Distinct, Select, Verb, VerbKind, VerbOutput,
    };
}
