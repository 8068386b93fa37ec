use async_trait::async_trait;
use serde_json::{Value, json};

use crate::action::{Action, ActionContext, ActionOutcome};
use crate::error::ActionError;

/// Navigates to a page id or to `{ pageId | url | home | back, input, urlQuery }`,
/// then bounces: the rest of the chain belongs to the page being left.
pub(crate) struct Link;

#[async_trait]
impl Action for Link {
  async fn run(&self, params: Value, ctx: &ActionContext) -> Result<ActionOutcome, ActionError> {
    let link = match params {
      Value::String(page_id) => json!({ "pageId": page_id }),
      Value::Object(map) => Value::Object(map),
      _ => {
        return Err(ActionError::invalid(
          "Link action params should be a page id or an object.",
        ));
      }
    };

    ctx
      .services
      .navigator
      .navigate(&link)
      .await
      .map_err(ActionError::service)?;
    Ok(ActionOutcome::Bounce)
  }
}
