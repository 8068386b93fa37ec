//! Lowdefy Operators
//!
//! Evaluates operator expressions embedded in configuration. An operator is
//! an object with a single `_`-prefixed key, e.g. `{ _state: "user.name" }`.
//! The [`Parser`] walks a value, evaluates every operator against an
//! [`EvaluationContext`] snapshot, and returns the output together with the
//! errors it collected along the way.
//!
//! Operators are looked up in an [`OperatorRegistry`]; [`OperatorRegistry::client`]
//! and [`OperatorRegistry::server`] hold the built-in sets.

mod context;
mod error;
mod operator;
mod operators;
mod parser;
mod path;

pub use context::EvaluationContext;
pub use error::{EvalError, EvalResult, OperatorError};
pub use operator::{Operator, OperatorCall, OperatorRegistry};
pub use parser::{ParseInput, ParseOutput, Parser};
pub use path::{apply_array_indices, get_path, is_truthy, number_value, set_path};
