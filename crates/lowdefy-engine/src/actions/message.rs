use async_trait::async_trait;
use serde_json::Value;

use crate::action::{Action, ActionContext, ActionOutcome};
use crate::error::ActionError;
use crate::services::{Message, MessageStatus};

/// Shows `{ content, status, duration }` to the user.
pub(crate) struct DisplayMessageAction;

#[async_trait]
impl Action for DisplayMessageAction {
  async fn run(&self, params: Value, ctx: &ActionContext) -> Result<ActionOutcome, ActionError> {
    let status = match params.get("status").and_then(Value::as_str) {
      None => MessageStatus::Success,
      Some(status) => MessageStatus::parse(status).ok_or_else(|| {
        ActionError::invalid(format!(
          "DisplayMessage action status \"{status}\" is not one of loading, success, error, info or warning."
        ))
      })?,
    };
    let content = match params.get("content") {
      Some(Value::String(content)) => content.clone(),
      None | Some(Value::Null) => "Success".to_string(),
      Some(other) => other.to_string(),
    };

    ctx.services.display.display(Message {
      content,
      status,
      duration: params.get("duration").and_then(Value::as_f64),
    });
    Ok(ActionOutcome::Response(Value::Null))
  }
}
