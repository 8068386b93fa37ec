//! Event action chains.
//!
//! A block event holds a `try` list of actions and an optional `catch` list.
//! Triggering the event runs the `try` actions in order:
//!
//! - each action's `skip` and `params` are evaluated with the event and the
//!   responses of earlier actions in scope
//! - an action that bounces ends the chain without an error
//! - an action that fails ends the chain, displays an error message and runs
//!   the `catch` actions
//!
//! Every trigger adds an [`ActionHistoryEntry`] to the event's history.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use lowdefy_config::{ActionDef, EventDef};
use lowdefy_operators::{OperatorRegistry, ParseInput, Parser, is_truthy};
use serde::Serialize;
use serde_json::{Map, Value, json};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::action::{ActionContext, ActionOutcome, ActionRegistry};
use crate::error::ActionError;
use crate::page::PageContext;
use crate::services::{Message, MessageStatus, Services};

/// Seconds an action error message stays visible.
const ERROR_MESSAGE_DURATION: f64 = 6.0;

/// Registries and services shared by every block on every page.
#[derive(Debug)]
pub struct ActionDispatcher {
  actions: ActionRegistry,
  operators: Arc<OperatorRegistry>,
  services: Services,
}

impl ActionDispatcher {
  pub fn new(actions: ActionRegistry, operators: OperatorRegistry, services: Services) -> Self {
    Self {
      actions,
      operators: Arc::new(operators),
      services,
    }
  }

  pub fn services(&self) -> &Services {
    &self.services
  }
}

impl Default for ActionDispatcher {
  fn default() -> Self {
    Self::new(
      ActionRegistry::builtin(),
      OperatorRegistry::client(),
      Services::default(),
    )
  }
}

/// A record of one trigger.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionHistoryEntry {
  pub block_id: String,
  pub event_name: String,
  pub event: Value,
  /// Action records by action id.
  pub responses: Map<String, Value>,
  /// `{ action, error }` of the action that failed.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub error: Option<Value>,
  pub start_timestamp: DateTime<Utc>,
  pub end_timestamp: DateTime<Utc>,
  pub bounced: bool,
  pub success: Option<bool>,
}

/// Result of [`Events::trigger_event`].
#[derive(Debug, Clone, PartialEq)]
pub struct TriggerResult {
  /// `None` when the chain bounced.
  pub success: Option<bool>,
  pub bounced: bool,
  pub history_entry: ActionHistoryEntry,
}

/// How a list of actions ended.
#[derive(Debug)]
enum ChainState {
  Success,
  Error(Value),
  Bounced,
}

/// One trigger in progress.
struct Chain<'a> {
  events: &'a Events,
  event_name: &'a str,
  event: Value,
  generation: u64,
  cancel: CancellationToken,
  responses: Map<String, Value>,
}

/// The events of one block.
#[derive(Debug)]
pub struct Events {
  dispatcher: Arc<ActionDispatcher>,
  page: Arc<PageContext>,
  block_id: String,
  events: BTreeMap<String, EventDef>,
  /// Newest first.
  history: Mutex<HashMap<String, Vec<ActionHistoryEntry>>>,
}

impl Events {
  pub fn new(
    dispatcher: Arc<ActionDispatcher>,
    page: Arc<PageContext>,
    block_id: impl Into<String>,
    events: BTreeMap<String, EventDef>,
  ) -> Self {
    Self {
      dispatcher,
      page,
      block_id: block_id.into(),
      events,
      history: Mutex::new(HashMap::new()),
    }
  }

  /// Events of a built block (`{ blockId, events: { name: { try, catch } } }`).
  pub fn from_block(
    dispatcher: Arc<ActionDispatcher>,
    page: Arc<PageContext>,
    block: &Value,
  ) -> Result<Self, serde_json::Error> {
    let block_id = block
      .get("blockId")
      .or_else(|| block.get("id"))
      .and_then(Value::as_str)
      .unwrap_or_default()
      .to_string();
    let events = match block.get("events") {
      Some(events) if !events.is_null() => serde_json::from_value(events.clone())?,
      _ => BTreeMap::new(),
    };
    Ok(Self::new(dispatcher, page, block_id, events))
  }

  pub fn block_id(&self) -> &str {
    &self.block_id
  }

  /// Triggers of `event_name`, newest first.
  pub fn history(&self, event_name: &str) -> Vec<ActionHistoryEntry> {
    self
      .history
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .get(event_name)
      .cloned()
      .unwrap_or_default()
  }

  #[instrument(skip(self, event), fields(page_id = %self.page.page_id(), block_id = %self.block_id))]
  pub async fn trigger_event(&self, name: &str, event: Value) -> TriggerResult {
    let start_timestamp = Utc::now();
    let mut chain = Chain {
      events: self,
      event_name: name,
      event,
      generation: self.page.generation(),
      cancel: self.page.cancellation_token(),
      responses: Map::new(),
    };

    let state = match self.events.get(name) {
      None => {
        debug!(event = name, "event_not_defined");
        ChainState::Success
      }
      Some(definition) => {
        info!(event = name, actions = definition.try_actions.len(), "event_triggered");
        let state = chain.run(&definition.try_actions).await;
        if let ChainState::Error(error) = &state {
          warn!(event = name, error = %error["error"]["error"]["message"], "action_failed");
          if !definition.catch_actions.is_empty()
            && let ChainState::Error(catch_error) = chain.run(&definition.catch_actions).await
          {
            warn!(event = name, error = %catch_error["error"]["error"]["message"], "catch_action_failed");
          }
        }
        state
      }
    };

    let (success, bounced, error) = match state {
      ChainState::Success => (Some(true), false, None),
      ChainState::Bounced => (None, true, None),
      ChainState::Error(error) => (Some(false), false, Some(error)),
    };
    let history_entry = ActionHistoryEntry {
      block_id: self.block_id.clone(),
      event_name: name.to_string(),
      event: chain.event,
      responses: chain.responses,
      error,
      start_timestamp,
      end_timestamp: Utc::now(),
      bounced,
      success,
    };

    self
      .history
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .entry(name.to_string())
      .or_default()
      .insert(0, history_entry.clone());

    info!(event = name, ?success, bounced, "event_completed");
    TriggerResult {
      success,
      bounced,
      history_entry,
    }
  }
}

impl Chain<'_> {
  fn context(&self, action: &ActionDef) -> ActionContext {
    let dispatcher = &self.events.dispatcher;
    ActionContext {
      page: self.events.page.clone(),
      generation: self.generation,
      block_id: self.events.block_id.clone(),
      action_id: action.id.clone(),
      event: self.event.clone(),
      responses: Value::Object(self.responses.clone()),
      services: dispatcher.services.clone(),
      operators: dispatcher.operators.clone(),
      cancel: self.cancel.clone(),
    }
  }

  fn is_stale(&self) -> bool {
    !self.events.page.is_current(self.generation) || self.cancel.is_cancelled()
  }

  async fn run(&mut self, actions: &[ActionDef]) -> ChainState {
    for (index, action) in actions.iter().enumerate() {
      if self.is_stale() {
        debug!(event = self.event_name, action_id = %action.id, "stale_chain_bounced");
        return ChainState::Bounced;
      }

      let ctx = self.context(action);
      let evaluation_context = ctx.evaluation_context();
      let parser = Parser::new(&ctx.operators, &evaluation_context);
      let location = self.events.block_id.clone();

      let evaluate = |value: &Value| -> Result<Value, ActionError> {
        let output = parser.parse(ParseInput::new(value.clone(), &location));
        match output.errors.first() {
          Some(err) => Err(ActionError::Params {
            message: err.to_string(),
          }),
          None => Ok(output.output),
        }
      };

      let skip = match action.skip.as_ref().map(&evaluate).transpose() {
        Ok(skip) => skip.is_some_and(|skip| is_truthy(&skip)),
        Err(err) => return self.fail(action, index, &Value::Null, err),
      };
      if skip {
        self.responses.insert(
          action.id.clone(),
          json!({ "type": action.action_type, "skipped": true, "index": index }),
        );
        continue;
      }

      let messages = action
        .messages
        .as_ref()
        .map(|messages| evaluate(messages).unwrap_or(Value::Null))
        .unwrap_or(Value::Null);
      let params = match evaluate(&action.params) {
        Ok(params) => params,
        Err(err) => return self.fail(action, index, &messages, err),
      };

      let Some(handler) = self.events.dispatcher.actions.get(&action.action_type) else {
        let err = ActionError::UnknownType {
          action_type: action.action_type.clone(),
          block_id: self.events.block_id.clone(),
        };
        return self.fail(action, index, &messages, err);
      };

      if let Some(Value::String(loading)) = messages.get("loading") {
        self.display(loading.clone(), MessageStatus::Loading, None);
      }

      if action.run_async {
        let action_id = action.id.clone();
        tokio::spawn(async move {
          if let Err(err) = handler.run(params, &ctx).await {
            warn!(action_id = %action_id, error = %err, "async_action_failed");
          }
        });
        self.responses.insert(
          action.id.clone(),
          json!({ "type": action.action_type, "async": true, "index": index }),
        );
        continue;
      }

      debug!(action_id = %action.id, action_type = %action.action_type, "action_started");
      match handler.run(params, &ctx).await {
        Ok(ActionOutcome::Response(response)) => {
          self.responses.insert(
            action.id.clone(),
            json!({ "type": action.action_type, "response": response, "index": index }),
          );
          if let Some(Value::String(success)) = messages.get("success") {
            self.display(success.clone(), MessageStatus::Success, None);
          }
        }
        Ok(ActionOutcome::Bounce) => {
          self.responses.insert(
            action.id.clone(),
            json!({ "type": action.action_type, "bounced": true, "index": index }),
          );
          return ChainState::Bounced;
        }
        Err(err) => return self.fail(action, index, &messages, err),
      }
    }
    ChainState::Success
  }

  fn fail(&mut self, action: &ActionDef, index: usize, messages: &Value, err: ActionError) -> ChainState {
    let entry = json!({ "type": action.action_type, "error": err.to_value(), "index": index });
    self.responses.insert(action.id.clone(), entry.clone());

    match messages.get("error") {
      Some(Value::Bool(false)) => {}
      Some(Value::String(content)) if content.is_empty() => {}
      Some(Value::String(content)) => {
        self.display(content.clone(), MessageStatus::Error, Some(ERROR_MESSAGE_DURATION));
      }
      _ => self.display(err.to_string(), MessageStatus::Error, Some(ERROR_MESSAGE_DURATION)),
    }

    let action = serde_json::to_value(action).unwrap_or(Value::Null);
    ChainState::Error(json!({ "action": action, "error": entry }))
  }

  fn display(&self, content: String, status: MessageStatus, duration: Option<f64>) {
    self.events.dispatcher.services.display.display(Message {
      content,
      status,
      duration,
    });
  }
}
