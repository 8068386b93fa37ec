use lowdefy_config::{BuildArtifact, ConnectionDef, RequestDef};
use lowdefy_operators::{EvaluationContext, OperatorRegistry, ParseInput, Parser};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, instrument, warn};

use crate::error::ApiError;
use crate::resolver::{ConnectionRegistry, RequestCall, call_request_resolver};

/// Who is calling, and with what.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestContext {
  pub page_id: String,
  /// Values evaluated on the client, read with `_payload`.
  pub payload: Value,
  pub user: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestResponse {
  pub id: String,
  pub success: bool,
  pub response: Value,
}

/// Runs page requests against the connections of a build artifact.
#[derive(Debug)]
pub struct RequestRunner {
  artifact: BuildArtifact,
  connections: ConnectionRegistry,
  operators: OperatorRegistry,
}

impl RequestRunner {
  pub fn new(artifact: BuildArtifact, connections: ConnectionRegistry) -> Self {
    Self {
      artifact,
      connections,
      operators: OperatorRegistry::server(),
    }
  }

  pub fn with_operators(mut self, operators: OperatorRegistry) -> Self {
    self.operators = operators;
    self
  }

  /// Look up request `request_id` on the calling page, evaluate its
  /// connection and request properties with the server operators, and call
  /// the resolver registered for its types.
  #[instrument(skip(self, ctx), fields(page_id = %ctx.page_id))]
  pub async fn run(&self, ctx: &RequestContext, request_id: &str) -> Result<RequestResponse, ApiError> {
    let request = self.request(&ctx.page_id, request_id)?;
    let connection = self.connection(&request)?;

    let resolver = self
      .connections
      .resolver(&connection.connection_type, &request.request_type)
      .ok_or_else(|| ApiError::UnsupportedRequestType {
        request_type: request.request_type.clone(),
        connection_type: connection.connection_type.clone(),
      })?;

    let context = EvaluationContext::new()
      .with_payload(ctx.payload.clone())
      .with_user(ctx.user.clone());
    let parser = Parser::new(&self.operators, &context);
    let connection_properties =
      evaluate(&parser, connection.properties.clone(), &connection.id, request_id)?;
    let request_properties = evaluate(&parser, request.properties.clone(), request_id, request_id)?;

    info!(
      request_id,
      request_type = %request.request_type,
      connection_id = %connection.id,
      "request_started"
    );
    let response = call_request_resolver(RequestCall {
      connection_properties,
      request_config: &request,
      request_properties,
      request_resolver: resolver.as_ref(),
    })
    .await
    .inspect_err(|err| warn!(request_id, error = %err, "request_failed"))?;
    info!(request_id, "request_completed");

    Ok(RequestResponse {
      id: request_id.to_string(),
      success: true,
      response,
    })
  }

  fn request(&self, page_id: &str, request_id: &str) -> Result<RequestDef, ApiError> {
    let page = self
      .artifact
      .page(page_id)
      .ok_or_else(|| ApiError::PageNotFound {
        page_id: page_id.to_string(),
      })?;
    let request = page
      .get("requests")
      .and_then(Value::as_array)
      .and_then(|requests| {
        requests
          .iter()
          .find(|request| request.get("id").and_then(Value::as_str) == Some(request_id))
      })
      .ok_or_else(|| ApiError::RequestNotFound {
        request_id: request_id.to_string(),
        page_id: page_id.to_string(),
      })?;
    serde_json::from_value(request.clone()).map_err(|source| ApiError::InvalidConfig {
      request_id: request_id.to_string(),
      source,
    })
  }

  fn connection(&self, request: &RequestDef) -> Result<ConnectionDef, ApiError> {
    let connection = self
      .artifact
      .connections
      .iter()
      .find(|connection| {
        connection.get("id").and_then(Value::as_str) == Some(request.connection_id.as_str())
      })
      .ok_or_else(|| ApiError::ConnectionNotFound {
        connection_id: request.connection_id.clone(),
        request_id: request.id.clone(),
      })?;
    serde_json::from_value(connection.clone()).map_err(|source| ApiError::InvalidConfig {
      request_id: request.id.clone(),
      source,
    })
  }
}

fn evaluate(
  parser: &Parser<'_>,
  input: Value,
  location: &str,
  request_id: &str,
) -> Result<Value, ApiError> {
  let output = parser.parse(ParseInput::new(input, location));
  match output.errors.first() {
    Some(err) => Err(ApiError::Operator {
      request_id: request_id.to_string(),
      message: err.to_string(),
    }),
    None => Ok(output.output),
  }
}
