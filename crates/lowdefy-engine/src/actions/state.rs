use async_trait::async_trait;
use serde_json::Value;

use crate::action::{Action, ActionContext, ActionOutcome};
use crate::error::ActionError;

/// Writes each `path: value` pair of params into page state.
pub(crate) struct SetState;

#[async_trait]
impl Action for SetState {
  async fn run(&self, params: Value, ctx: &ActionContext) -> Result<ActionOutcome, ActionError> {
    let Value::Object(updates) = params else {
      return Err(ActionError::invalid(
        "SetState action params should be an object.",
      ));
    };
    if ctx.page.set_state(ctx.generation, &updates) {
      Ok(ActionOutcome::Response(Value::Null))
    } else {
      Ok(ActionOutcome::Bounce)
    }
  }
}

/// Restores the page's initial state.
pub(crate) struct Reset;

#[async_trait]
impl Action for Reset {
  async fn run(&self, _params: Value, ctx: &ActionContext) -> Result<ActionOutcome, ActionError> {
    if ctx.page.reset_state(ctx.generation) {
      Ok(ActionOutcome::Response(Value::Null))
    } else {
      Ok(ActionOutcome::Bounce)
    }
  }
}
