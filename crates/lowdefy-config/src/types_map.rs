//! Plugin types map.
//!
//! Every block, action, connection, request and operator type used in an app
//! must be provided by a plugin package. The build looks types up here to
//! validate them and to generate the plugin import files.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Where a plugin type comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeEntry {
  /// npm package providing the type, e.g. `@lowdefy/blocks-antd`.
  pub package: String,

  /// The export name inside the package. Usually the type name itself.
  pub original_type_name: String,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub version: Option<String>,

  /// Style sheets (relative to the package) a block needs.
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub styles: Vec<String>,
}

impl TypeEntry {
  pub fn new(package: impl Into<String>, type_name: impl Into<String>) -> Self {
    Self {
      package: package.into(),
      original_type_name: type_name.into(),
      version: None,
      styles: Vec::new(),
    }
  }

  pub fn with_styles(mut self, styles: &[&str]) -> Self {
    self.styles = styles.iter().map(|s| s.to_string()).collect();
    self
  }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperatorTypes {
  #[serde(default)]
  pub client: BTreeMap<String, TypeEntry>,
  #[serde(default)]
  pub server: BTreeMap<String, TypeEntry>,
}

/// All plugin types known to a build.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TypesMap {
  #[serde(default)]
  pub actions: BTreeMap<String, TypeEntry>,
  #[serde(default)]
  pub blocks: BTreeMap<String, TypeEntry>,
  #[serde(default)]
  pub connections: BTreeMap<String, TypeEntry>,
  #[serde(default)]
  pub icons: BTreeMap<String, TypeEntry>,
  #[serde(default)]
  pub operators: OperatorTypes,
  #[serde(default)]
  pub requests: BTreeMap<String, TypeEntry>,
}

const OPERATORS_JS: &str = "@lowdefy/operators-js";
const OPERATORS_CHANGE_CASE: &str = "@lowdefy/operators-change-case";

const SHARED_OPERATORS: &[&str] = &[
  "_and",
  "_base64",
  "_change_case",
  "_divide",
  "_eq",
  "_gt",
  "_gte",
  "_if",
  "_intl",
  "_json",
  "_lt",
  "_lte",
  "_ne",
  "_not",
  "_or",
  "_product",
  "_subtract",
  "_sum",
];

const CLIENT_OPERATORS: &[&str] = &[
  "_actions",
  "_event",
  "_event_log",
  "_global",
  "_index",
  "_input",
  "_menu",
  "_request",
  "_state",
  "_url_query",
  "_user",
];

const SERVER_OPERATORS: &[&str] = &["_payload", "_user"];

impl TypesMap {
  /// The types shipped with the default plugin packages.
  pub fn builtin() -> Self {
    let mut map = Self::default();

    for name in ["Box", "Html", "Img", "List", "Span"] {
      map.blocks.insert(
        name.to_string(),
        TypeEntry::new("@lowdefy/blocks-basic", name),
      );
    }
    for name in [
      "Button",
      "Card",
      "NumberInput",
      "PageHeaderMenu",
      "Paragraph",
      "Switch",
      "TextInput",
      "Title",
    ] {
      map.blocks.insert(
        name.to_string(),
        TypeEntry::new("@lowdefy/blocks-antd", name)
          .with_styles(&[&format!("dist/blocks/{}/style.less", name)]),
      );
    }

    for name in [
      "DisplayMessage",
      "Link",
      "Request",
      "Reset",
      "SetState",
      "Throw",
      "Wait",
    ] {
      map.actions.insert(
        name.to_string(),
        TypeEntry::new("@lowdefy/actions-core", name),
      );
    }

    map.connections.insert(
      "AxiosHttp".to_string(),
      TypeEntry::new("@lowdefy/connection-axios-http", "AxiosHttp"),
    );
    map.requests.insert(
      "AxiosHttp".to_string(),
      TypeEntry::new("@lowdefy/connection-axios-http", "AxiosHttp"),
    );
    map.connections.insert(
      "MongoDBCollection".to_string(),
      TypeEntry::new("@lowdefy/connection-mongodb", "MongoDBCollection"),
    );
    for name in [
      "MongoDBDeleteOne",
      "MongoDBFind",
      "MongoDBFindOne",
      "MongoDBInsertOne",
      "MongoDBUpdateOne",
    ] {
      map.requests.insert(
        name.to_string(),
        TypeEntry::new("@lowdefy/connection-mongodb", name),
      );
    }

    for name in SHARED_OPERATORS.iter().chain(CLIENT_OPERATORS) {
      map.operators.client.insert(name.to_string(), operator_entry(name));
    }
    for name in SHARED_OPERATORS.iter().chain(SERVER_OPERATORS) {
      map.operators.server.insert(name.to_string(), operator_entry(name));
    }

    map
  }

  /// Merge `other` into this map. Entries in `other` win.
  pub fn merge(&mut self, other: TypesMap) {
    self.actions.extend(other.actions);
    self.blocks.extend(other.blocks);
    self.connections.extend(other.connections);
    self.icons.extend(other.icons);
    self.operators.client.extend(other.operators.client);
    self.operators.server.extend(other.operators.server);
    self.requests.extend(other.requests);
  }
}

fn operator_entry(name: &str) -> TypeEntry {
  let package = if name == "_change_case" {
    OPERATORS_CHANGE_CASE
  } else {
    OPERATORS_JS
  };
  TypeEntry::new(package, name)
}
