//! Expression evaluation behind the verbs.
//!
//! Text expressions are tokenized, parsed and evaluated column-at-a-time
//! against a frame. [`Environment`] supplies the names that are not columns.

pub mod adapter;
pub mod aggregates;
pub mod ast;
pub mod environment;
pub mod eval;
pub mod parser;
pub mod tokenizer;

pub use adapter::{evaluate, evaluate_column, evaluate_unsized, Expression};
pub use aggregates::aggregate_functions;
pub use environment::{Environment, Function, Namespace, ROW_COUNT_PLACEHOLDER};
pub use eval::Evaluated;
pub use parser::parse;
