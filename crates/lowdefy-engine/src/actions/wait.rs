use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::action::{Action, ActionContext, ActionOutcome};
use crate::error::ActionError;

/// Sleeps for `ms` milliseconds. A page reset interrupts the wait and
/// bounces the chain.
pub(crate) struct Wait;

/// `10` and `10.0` are both integers once parsed from YAML.
fn whole_millis(ms: &Value) -> Option<u64> {
  ms.as_u64().or_else(|| {
    ms.as_f64()
      .filter(|f| *f >= 0.0 && f.fract() == 0.0 && *f <= u64::MAX as f64)
      .map(|f| f as u64)
  })
}

#[async_trait]
impl Action for Wait {
  async fn run(&self, params: Value, ctx: &ActionContext) -> Result<ActionOutcome, ActionError> {
    let Some(ms) = params.get("ms").and_then(whole_millis) else {
      return Err(ActionError::invalid(
        "Wait action \"ms\" param should be an integer.",
      ));
    };

    tokio::select! {
      _ = tokio::time::sleep(Duration::from_millis(ms)) => Ok(ActionOutcome::Response(Value::Null)),
      _ = ctx.cancel.cancelled() => Ok(ActionOutcome::Bounce),
    }
  }
}
