use serde::{Deserialize, Serialize};

/// A page request: a named operation against a connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestDef {
  pub id: String,

  #[serde(rename = "type")]
  pub request_type: String,

  pub connection_id: String,

  /// Request properties. Evaluated with server operators before the resolver runs.
  #[serde(default)]
  pub properties: serde_json::Value,

  /// Values evaluated on the client and sent along with the request.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub payload: Option<serde_json::Value>,
}

/// A configured data source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionDef {
  pub id: String,

  #[serde(rename = "type")]
  pub connection_type: String,

  #[serde(default)]
  pub properties: serde_json::Value,
}

/// A navigation menu.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuDef {
  pub menu_id: String,

  #[serde(default)]
  pub links: Vec<serde_json::Value>,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub properties: Option<serde_json::Value>,
}
