use thiserror::Error;

/// Why an operator could not produce a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvalError {
  pub message: String,
}

impl EvalError {
  pub fn new(message: impl Into<String>) -> Self {
    Self {
      message: message.into(),
    }
  }
}

pub type EvalResult = Result<serde_json::Value, EvalError>;

/// An operator error collected during a parse.
///
/// Operator errors never abort a parse: the failing node evaluates to `null`
/// and the error is returned alongside the output.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OperatorError {
  /// No operator with this name is registered.
  #[error("Operator Error: Unknown operator {operator} at {location}.")]
  Unknown { operator: String, location: String },

  /// The operator rejected its params.
  #[error("Operator Error: {message} Received: {received} at {location}.")]
  Failed {
    operator: String,
    message: String,
    /// The params as JSON.
    received: String,
    location: String,
  },
}

impl OperatorError {
  pub fn location(&self) -> &str {
    match self {
      OperatorError::Unknown { location, .. } | OperatorError::Failed { location, .. } => location,
    }
  }
}
