use serde_json::Value;

/// Everything operators can read during one parse.
///
/// A snapshot: it is built before a parse and never mutated by it. Fields
/// that do not apply (no event outside an event chain, no payload on the
/// client) stay `null`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvaluationContext {
  pub page_id: Option<String>,
  pub state: Value,
  /// Request responses by request id.
  pub requests: Value,
  pub user: Value,
  pub url_query: Value,
  /// App-wide `global` values.
  pub global: Value,
  /// Page input passed on navigation.
  pub input: Value,
  /// Built menus, each with a `menuId`.
  pub menus: Value,
  pub event_log: Value,
  /// The event that triggered the current action chain.
  pub event: Value,
  /// Responses of actions already run in the current chain, by action id.
  pub actions: Value,
  /// Request payload, on the server.
  pub payload: Value,
}

impl EvaluationContext {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_state(mut self, state: Value) -> Self {
    self.state = state;
    self
  }

  pub fn with_event(mut self, event: Value) -> Self {
    self.event = event;
    self
  }

  pub fn with_actions(mut self, actions: Value) -> Self {
    self.actions = actions;
    self
  }

  pub fn with_payload(mut self, payload: Value) -> Self {
    self.payload = payload;
    self
  }

  pub fn with_user(mut self, user: Value) -> Self {
    self.user = user;
    self
  }

  pub fn with_menus(mut self, menus: Value) -> Self {
    self.menus = menus;
    self
  }
}
