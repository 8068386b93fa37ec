//! Request error types.

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A request resolver failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct RequestError {
  pub message: String,
  pub request_id: String,
  /// The request type, e.g. `AxiosHttp`.
  pub request_type: String,
}

/// Errors returned while handling a request call.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
  #[error("Page \"{page_id}\" does not exist.")]
  PageNotFound { page_id: String },

  #[error("Request \"{request_id}\" does not exist on page \"{page_id}\".")]
  RequestNotFound { request_id: String, page_id: String },

  #[error("Connection \"{connection_id}\" referenced by request \"{request_id}\" does not exist.")]
  ConnectionNotFound {
    connection_id: String,
    request_id: String,
  },

  #[error("Request type \"{request_type}\" can not be used with connection type \"{connection_type}\".")]
  UnsupportedRequestType {
    request_type: String,
    connection_type: String,
  },

  /// Evaluating connection or request properties produced operator errors.
  #[error("{message}")]
  Operator { request_id: String, message: String },

  #[error("Invalid configuration for request \"{request_id}\".")]
  InvalidConfig {
    request_id: String,
    #[source]
    source: serde_json::Error,
  },

  #[error(transparent)]
  Request(#[from] RequestError),
}
