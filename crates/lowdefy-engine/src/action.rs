use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use lowdefy_operators::{EvaluationContext, OperatorRegistry};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::actions;
use crate::error::ActionError;
use crate::page::PageContext;
use crate::services::Services;

/// What an action produced.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
  /// The action completed; the value is recorded as its response.
  Response(Value),
  /// Stop the chain without an error (e.g. after navigating away).
  Bounce,
}

/// An action that can be bound to a block event.
#[async_trait]
pub trait Action: Send + Sync {
  /// Run with evaluated params.
  async fn run(&self, params: Value, ctx: &ActionContext) -> Result<ActionOutcome, ActionError>;
}

/// Everything an action can reach while it runs.
#[derive(Debug, Clone)]
pub struct ActionContext {
  pub page: Arc<PageContext>,
  /// Page generation the chain started in.
  pub generation: u64,
  pub block_id: String,
  pub action_id: String,
  /// The event that triggered the chain.
  pub event: Value,
  /// Responses of earlier actions in the chain, by action id.
  pub responses: Value,
  pub services: Services,
  pub operators: Arc<OperatorRegistry>,
  /// Cancelled when the page is reset.
  pub cancel: CancellationToken,
}

impl ActionContext {
  /// Operator context for the chain at this point.
  pub fn evaluation_context(&self) -> EvaluationContext {
    self
      .page
      .evaluation_context()
      .with_event(self.event.clone())
      .with_actions(self.responses.clone())
  }

  /// Whether the page was reset since the chain started.
  pub fn is_stale(&self) -> bool {
    !self.page.is_current(self.generation) || self.cancel.is_cancelled()
  }
}

/// Actions by type name.
#[derive(Clone, Default)]
pub struct ActionRegistry {
  actions: HashMap<String, Arc<dyn Action>>,
}

impl ActionRegistry {
  pub fn new() -> Self {
    Self::default()
  }

  /// The built-in actions: `DisplayMessage`, `Link`, `Request`, `Reset`,
  /// `SetState`, `Throw` and `Wait`.
  pub fn builtin() -> Self {
    let mut registry = Self::new();
    registry.register("DisplayMessage", actions::DisplayMessageAction);
    registry.register("Link", actions::Link);
    registry.register("Request", actions::Request);
    registry.register("Reset", actions::Reset);
    registry.register("SetState", actions::SetState);
    registry.register("Throw", actions::Throw);
    registry.register("Wait", actions::Wait);
    registry
  }

  pub fn register(&mut self, action_type: impl Into<String>, action: impl Action + 'static) {
    self.actions.insert(action_type.into(), Arc::new(action));
  }

  pub fn get(&self, action_type: &str) -> Option<Arc<dyn Action>> {
    self.actions.get(action_type).cloned()
  }
}

impl std::fmt::Debug for ActionRegistry {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let mut types: Vec<&String> = self.actions.keys().collect();
    types.sort();
    f.debug_struct("ActionRegistry")
      .field("actions", &types)
      .finish()
  }
}
