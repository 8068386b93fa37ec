use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types_map::TypeEntry;

/// The plugin types an app actually uses, by category.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginTypes {
  pub actions: BTreeMap<String, TypeEntry>,
  pub blocks: BTreeMap<String, TypeEntry>,
  pub connections: BTreeMap<String, TypeEntry>,
  pub icons: BTreeMap<String, TypeEntry>,
  pub operators_client: BTreeMap<String, TypeEntry>,
  pub operators_server: BTreeMap<String, TypeEntry>,
}

/// The compiled output of a build, consumed read-only by the server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildArtifact {
  /// The validated `config` section.
  pub config: serde_json::Value,
  /// Page trees, one per page, with events normalised.
  pub pages: Vec<serde_json::Value>,
  pub menus: Vec<serde_json::Value>,
  pub connections: Vec<serde_json::Value>,
  /// `config.auth`, written separately for the auth handlers.
  pub auth: serde_json::Value,
  pub plugins: PluginTypes,
}

impl BuildArtifact {
  /// Look up a page tree by id.
  pub fn page(&self, page_id: &str) -> Option<&serde_json::Value> {
    self
      .pages
      .iter()
      .find(|page| page.get("id").and_then(|id| id.as_str()) == Some(page_id))
  }
}
