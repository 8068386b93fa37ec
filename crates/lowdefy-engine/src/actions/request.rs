use async_trait::async_trait;
use futures::future::try_join_all;
use lowdefy_operators::{ParseInput, Parser};
use serde_json::{Map, Value};
use tracing::debug;

use crate::action::{Action, ActionContext, ActionOutcome};
use crate::error::ActionError;

/// Calls page requests by id and stores their responses on the page.
///
/// Params: a request id, a list of ids, `{ ids }` or `{ all: true }`. The
/// requests run concurrently; the response is an object keyed by request id.
pub(crate) struct Request;

fn request_ids(params: &Value, ctx: &ActionContext) -> Result<Vec<String>, ActionError> {
  let invalid = || {
    ActionError::invalid("Request action params should be a request id or a list of request ids.")
  };
  let ids = match params {
    Value::String(id) => return Ok(vec![id.clone()]),
    Value::Object(map) if map.get("all") == Some(&Value::Bool(true)) => {
      return Ok(ctx.page.request_ids());
    }
    Value::Object(map) => map.get("ids").ok_or_else(invalid)?,
    ids => ids,
  };
  let Value::Array(ids) = ids else {
    return Err(invalid());
  };
  ids
    .iter()
    .map(|id| id.as_str().map(str::to_string).ok_or_else(invalid))
    .collect()
}

#[async_trait]
impl Action for Request {
  async fn run(&self, params: Value, ctx: &ActionContext) -> Result<ActionOutcome, ActionError> {
    let ids = request_ids(&params, ctx)?;

    let context = ctx.evaluation_context();
    let parser = Parser::new(&ctx.operators, &context);
    let mut calls = Vec::with_capacity(ids.len());
    for id in ids {
      let Some(request) = ctx.page.request(&id) else {
        return Err(ActionError::Request {
          message: format!("Configuration Error: Request \"{id}\" not defined on page."),
          request_id: id,
        });
      };
      let payload = parser.parse(ParseInput::new(
        request.payload.clone().unwrap_or(Value::Null),
        &id,
      ));
      if let Some(err) = payload.errors.first() {
        return Err(ActionError::Params {
          message: err.to_string(),
        });
      }
      calls.push((id, payload.output));
    }

    let responses = try_join_all(calls.into_iter().map(|(id, payload)| async move {
      debug!(request_id = %id, "request_called");
      let response = ctx
        .services
        .requests
        .call(&id, payload)
        .await
        .map_err(|err| ActionError::Request {
          request_id: id.clone(),
          message: err.to_string(),
        })?;
      ctx.page.set_response(ctx.generation, &id, response.clone());
      Ok::<_, ActionError>((id, response))
    }))
    .await?;

    Ok(ActionOutcome::Response(Value::Object(
      responses.into_iter().collect::<Map<String, Value>>(),
    )))
  }
}
