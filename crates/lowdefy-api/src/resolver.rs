use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use lowdefy_config::RequestDef;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::error::{BoxError, RequestError};

/// Evaluated request and connection properties handed to a resolver.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolverInput {
  pub request: Value,
  pub connection: Value,
}

/// Executes one request type against its connection.
#[async_trait]
pub trait RequestResolver: Send + Sync {
  async fn resolve(&self, input: ResolverInput) -> Result<Value, BoxError>;
}

/// One resolver invocation.
pub struct RequestCall<'a> {
  pub connection_properties: Value,
  pub request_config: &'a RequestDef,
  pub request_properties: Value,
  pub request_resolver: &'a dyn RequestResolver,
}

/// Run a request resolver. A failure is logged with the request id and type
/// and returned as a [`RequestError`].
#[instrument(skip_all, fields(request_id = %call.request_config.id))]
pub async fn call_request_resolver(call: RequestCall<'_>) -> Result<Value, RequestError> {
  let input = ResolverInput {
    request: call.request_properties,
    connection: call.connection_properties,
  };
  match call.request_resolver.resolve(input).await {
    Ok(response) => Ok(response),
    Err(err) => {
      let err = RequestError {
        message: err.to_string(),
        request_id: call.request_config.id.clone(),
        request_type: call.request_config.request_type.clone(),
      };
      debug!(
        request_id = %err.request_id,
        r#type = %err.request_type,
        error = %err,
        "request_failed"
      );
      Err(err)
    }
  }
}

/// Request resolvers by connection type, then request type.
#[derive(Clone, Default)]
pub struct ConnectionRegistry {
  connections: HashMap<String, HashMap<String, Arc<dyn RequestResolver>>>,
}

impl ConnectionRegistry {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn register(
    &mut self,
    connection_type: impl Into<String>,
    request_type: impl Into<String>,
    resolver: impl RequestResolver + 'static,
  ) {
    self
      .connections
      .entry(connection_type.into())
      .or_default()
      .insert(request_type.into(), Arc::new(resolver));
  }

  pub fn resolver(
    &self,
    connection_type: &str,
    request_type: &str,
  ) -> Option<Arc<dyn RequestResolver>> {
    self.connections.get(connection_type)?.get(request_type).cloned()
  }

  /// Request types registered for a connection type, sorted.
  pub fn request_types(&self, connection_type: &str) -> Vec<&str> {
    let mut types: Vec<&str> = self
      .connections
      .get(connection_type)
      .map(|requests| requests.keys().map(String::as_str).collect())
      .unwrap_or_default();
    types.sort_unstable();
    types
  }
}

impl std::fmt::Debug for ConnectionRegistry {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let mut types: Vec<&String> = self.connections.keys().collect();
    types.sort();
    f.debug_struct("ConnectionRegistry")
      .field("connections", &types)
      .finish()
  }
}
