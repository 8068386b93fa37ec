//! Shared page state.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError, RwLock};

use lowdefy_config::RequestDef;
use lowdefy_operators::{EvaluationContext, set_path};
use serde_json::{Map, Value};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// State shared by every event chain running on a page.
///
/// Writes are last-write-wins. [`PageContext::reset`] starts a new
/// generation: chains started in an earlier generation bounce before their
/// next action and their state writes are dropped.
#[derive(Debug)]
pub struct PageContext {
  page_id: String,
  initial_state: Value,
  state: RwLock<Value>,
  /// Request responses by request id.
  responses: RwLock<Map<String, Value>>,
  requests: BTreeMap<String, RequestDef>,
  generation: AtomicU64,
  cancel: Mutex<CancellationToken>,
  /// Values shared with operators: user, url query, global, input, menus.
  environment: EvaluationContext,
}

impl PageContext {
  pub fn new(page_id: impl Into<String>, initial_state: Value) -> Self {
    Self {
      page_id: page_id.into(),
      state: RwLock::new(initial_state.clone()),
      initial_state,
      responses: RwLock::new(Map::new()),
      requests: BTreeMap::new(),
      generation: AtomicU64::new(0),
      cancel: Mutex::new(CancellationToken::new()),
      environment: EvaluationContext::new(),
    }
  }

  /// Register the page's request definitions.
  pub fn with_requests(mut self, requests: impl IntoIterator<Item = RequestDef>) -> Self {
    self.requests = requests
      .into_iter()
      .map(|request| (request.id.clone(), request))
      .collect();
    self
  }

  /// Set the values operators read besides page state and responses.
  pub fn with_environment(mut self, environment: EvaluationContext) -> Self {
    self.environment = environment;
    self
  }

  pub fn page_id(&self) -> &str {
    &self.page_id
  }

  pub fn state(&self) -> Value {
    self
      .state
      .read()
      .unwrap_or_else(PoisonError::into_inner)
      .clone()
  }

  /// Write each `path: value` pair of `updates` into state.
  ///
  /// Returns `false`, writing nothing, when `generation` is stale.
  pub fn set_state(&self, generation: u64, updates: &Map<String, Value>) -> bool {
    let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
    if !self.is_current(generation) {
      debug!(page_id = %self.page_id, generation, "stale_state_write_dropped");
      return false;
    }
    for (path, value) in updates {
      set_path(&mut state, path, value.clone());
    }
    true
  }

  /// Restore the initial state without starting a new generation.
  pub fn reset_state(&self, generation: u64) -> bool {
    let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
    if !self.is_current(generation) {
      return false;
    }
    *state = self.initial_state.clone();
    true
  }

  pub fn request(&self, request_id: &str) -> Option<&RequestDef> {
    self.requests.get(request_id)
  }

  pub fn request_ids(&self) -> Vec<String> {
    self.requests.keys().cloned().collect()
  }

  pub fn responses(&self) -> Value {
    Value::Object(
      self
        .responses
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone(),
    )
  }

  pub fn set_response(&self, generation: u64, request_id: &str, response: Value) -> bool {
    let mut responses = self.responses.write().unwrap_or_else(PoisonError::into_inner);
    if !self.is_current(generation) {
      return false;
    }
    responses.insert(request_id.to_string(), response);
    true
  }

  pub fn generation(&self) -> u64 {
    self.generation.load(Ordering::SeqCst)
  }

  pub fn is_current(&self, generation: u64) -> bool {
    self.generation() == generation
  }

  /// Token cancelled by the next [`PageContext::reset`].
  pub fn cancellation_token(&self) -> CancellationToken {
    self
      .cancel
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .clone()
  }

  /// Restore the initial state and start a new generation.
  pub fn reset(&self) -> u64 {
    let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
    let mut cancel = self.cancel.lock().unwrap_or_else(PoisonError::into_inner);

    let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
    cancel.cancel();
    *cancel = CancellationToken::new();
    *state = self.initial_state.clone();
    self
      .responses
      .write()
      .unwrap_or_else(PoisonError::into_inner)
      .clear();

    info!(page_id = %self.page_id, generation, "page_reset");
    generation
  }

  /// Operator context for the current state.
  pub fn evaluation_context(&self) -> EvaluationContext {
    let mut context = self.environment.clone();
    context.page_id = Some(self.page_id.clone());
    context.state = self.state();
    context.requests = self.responses();
    context
  }
}
