//! Action error types.

use serde_json::{Value, json};

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that end an action chain.
#[derive(Debug, thiserror::Error)]
pub enum ActionError {
  /// No action with this type is registered.
  #[error("Invalid action type \"{action_type}\" at \"{block_id}\".")]
  UnknownType { action_type: String, block_id: String },

  /// Evaluating the action params produced operator errors.
  #[error("{message}")]
  Params { message: String },

  /// The action rejected its params.
  #[error("{message}")]
  Invalid { message: String },

  /// Raised by the `Throw` action.
  #[error("{message}")]
  Thrown { message: String, meta_data: Value },

  /// A request called by the `Request` action failed.
  #[error("{message}")]
  Request { request_id: String, message: String },

  /// An injected service failed.
  #[error("{message}")]
  Service {
    message: String,
    #[source]
    source: BoxError,
  },
}

impl ActionError {
  pub(crate) fn invalid(message: impl Into<String>) -> Self {
    ActionError::Invalid {
      message: message.into(),
    }
  }

  pub(crate) fn service(source: BoxError) -> Self {
    ActionError::Service {
      message: source.to_string(),
      source,
    }
  }

  /// Error class name, as recorded in action responses.
  pub fn name(&self) -> &'static str {
    match self {
      ActionError::Thrown { .. } => "ThrowActionError",
      ActionError::Request { .. } => "RequestError",
      _ => "ActionError",
    }
  }

  /// The error as recorded in responses and history.
  pub fn to_value(&self) -> Value {
    let mut value = json!({
      "name": self.name(),
      "message": self.to_string(),
    });
    if let ActionError::Thrown { meta_data, .. } = self
      && !meta_data.is_null()
    {
      value["metaData"] = meta_data.clone();
    }
    if let ActionError::Request { request_id, .. } = self {
      value["requestId"] = Value::String(request_id.clone());
    }
    value
  }
}
