use serde::{Deserialize, Serialize};

/// An action definition within an event chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionDef {
  pub id: String,

  #[serde(rename = "type")]
  pub action_type: String,

  /// Action params. May contain operators, evaluated right before the action runs.
  #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
  pub params: serde_json::Value,

  /// Evaluated before the action runs; a truthy result skips it.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub skip: Option<serde_json::Value>,

  /// `{ loading, success, error }` user messages.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub messages: Option<serde_json::Value>,

  /// Run without waiting for completion; the chain continues immediately.
  #[serde(rename = "async", default, skip_serializing_if = "std::ops::Not::not")]
  pub run_async: bool,
}

/// The actions bound to one block event.
///
/// In configuration an event is either a list of actions (shorthand for
/// `try`) or an object with `try` and `catch` lists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawEventDef")]
pub struct EventDef {
  #[serde(rename = "try")]
  pub try_actions: Vec<ActionDef>,

  #[serde(rename = "catch")]
  pub catch_actions: Vec<ActionDef>,

  #[serde(skip_serializing_if = "Option::is_none")]
  pub debounce: Option<serde_json::Value>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawEventDef {
  Actions(Vec<ActionDef>),
  Full {
    #[serde(rename = "try", default)]
    try_actions: Vec<ActionDef>,
    #[serde(rename = "catch", default)]
    catch_actions: Vec<ActionDef>,
    #[serde(default)]
    debounce: Option<serde_json::Value>,
  },
}

impl From<RawEventDef> for EventDef {
  fn from(raw: RawEventDef) -> Self {
    match raw {
      RawEventDef::Actions(try_actions) => Self {
        try_actions,
        ..Default::default()
      },
      RawEventDef::Full {
        try_actions,
        catch_actions,
        debounce,
      } => Self {
        try_actions,
        catch_actions,
        debounce,
      },
    }
  }
}
