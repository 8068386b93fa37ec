use async_trait::async_trait;
use serde_json::Value;

use crate::action::{Action, ActionContext, ActionOutcome};
use crate::error::ActionError;

/// Fails the chain with `message` when `throw` is `true`.
pub(crate) struct Throw;

#[async_trait]
impl Action for Throw {
  async fn run(&self, params: Value, _ctx: &ActionContext) -> Result<ActionOutcome, ActionError> {
    let Value::Object(params) = params else {
      // Omitted params deserialize to null.
      let received = match &params {
        Value::Null => "undefined".to_string(),
        other => serde_json::to_string(other).unwrap_or_default(),
      };
      return Err(ActionError::invalid(format!(
        "Throw action params should be an object. Received \"{received}\"."
      )));
    };

    if params.get("throw") != Some(&Value::Bool(true)) {
      return Ok(ActionOutcome::Response(Value::Null));
    }
    Err(ActionError::Thrown {
      message: params
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string(),
      meta_data: params.get("metaData").cloned().unwrap_or(Value::Null),
    })
  }
}
