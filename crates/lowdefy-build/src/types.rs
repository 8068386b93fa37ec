use std::collections::{BTreeMap, BTreeSet};

use lowdefy_config::{PluginTypes, TypeEntry, TypesMap};
use serde_json::Value;
use tracing::warn;

use crate::error::BuildError;

/// Plugin type names seen while building, by category.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UsedTypes {
  pub actions: BTreeSet<String>,
  pub blocks: BTreeSet<String>,
  pub connections: BTreeSet<String>,
  pub icons: BTreeSet<String>,
  pub requests: BTreeSet<String>,
  pub operators_client: BTreeSet<String>,
  pub operators_server: BTreeSet<String>,
}

impl UsedTypes {
  pub fn new() -> Self {
    Self::default()
  }

  /// Record every operator node in `value`.
  ///
  /// An operator node is an object with exactly one key starting with `_`;
  /// `_name.method` counts as `_name`.
  pub fn collect_operators(&mut self, value: &Value, server: bool) {
    match value {
      Value::Object(map) => {
        if map.len() == 1
          && let Some(key) = map.keys().next()
          && key.starts_with('_')
        {
          let name = key.split('.').next().unwrap_or(key).to_string();
          if server {
            self.operators_server.insert(name);
          } else {
            self.operators_client.insert(name);
          }
        }
        for child in map.values() {
          self.collect_operators(child, server);
        }
      }
      Value::Array(items) => {
        for item in items {
          self.collect_operators(item, server);
        }
      }
      _ => {}
    }
  }

  /// Record every icon named in `value`.
  ///
  /// Icons are set with an `icon` key (or a key ending in `Icon`, like
  /// `prefixIcon`) holding either the icon name or `{ name }`.
  pub fn collect_icons(&mut self, value: &Value) {
    match value {
      Value::Object(map) => {
        for (key, child) in map {
          if key == "icon" || key.ends_with("Icon") {
            let name = match child {
              Value::String(name) => Some(name.as_str()),
              Value::Object(icon) => icon.get("name").and_then(Value::as_str),
              _ => None,
            };
            if let Some(name) = name {
              self.icons.insert(name.to_string());
            }
          }
          self.collect_icons(child);
        }
      }
      Value::Array(items) => {
        for item in items {
          self.collect_icons(item);
        }
      }
      _ => {}
    }
  }

  /// Look up every used type in `types_map`.
  ///
  /// Unknown block, action, connection and request types fail the build.
  /// Unknown operators are only logged; they fail at evaluation time.
  pub fn resolve(&self, types_map: &TypesMap) -> Result<PluginTypes, BuildError> {
    check_defined("Request", &self.requests, &types_map.requests)?;
    Ok(PluginTypes {
      actions: lookup("Action", &self.actions, &types_map.actions)?,
      blocks: lookup("Block", &self.blocks, &types_map.blocks)?,
      connections: lookup("Connection", &self.connections, &types_map.connections)?,
      icons: lookup_icons(&self.icons, &types_map.icons),
      operators_client: lookup_operators(&self.operators_client, &types_map.operators.client),
      operators_server: lookup_operators(&self.operators_server, &types_map.operators.server),
    })
  }
}

fn check_defined(
  kind: &str,
  used: &BTreeSet<String>,
  defined: &BTreeMap<String, TypeEntry>,
) -> Result<(), BuildError> {
  match used.iter().find(|name| !defined.contains_key(*name)) {
    Some(name) => Err(BuildError::configuration(format!(
      "{} type \"{}\" was used but is not defined.",
      kind, name
    ))),
    None => Ok(()),
  }
}

fn lookup(
  kind: &str,
  used: &BTreeSet<String>,
  defined: &BTreeMap<String, TypeEntry>,
) -> Result<BTreeMap<String, TypeEntry>, BuildError> {
  check_defined(kind, used, defined)?;
  Ok(lookup_known(used, defined))
}

fn lookup_known(
  used: &BTreeSet<String>,
  defined: &BTreeMap<String, TypeEntry>,
) -> BTreeMap<String, TypeEntry> {
  used
    .iter()
    .filter_map(|name| defined.get(name).map(|entry| (name.clone(), entry.clone())))
    .collect()
}

/// Icons missing from the types map come from the `react-icons` set named
/// by their prefix: `AiOutlineUser` is in `react-icons/ai`.
fn lookup_icons(
  used: &BTreeSet<String>,
  defined: &BTreeMap<String, TypeEntry>,
) -> BTreeMap<String, TypeEntry> {
  let mut icons = BTreeMap::new();
  for name in used {
    match defined.get(name).cloned().or_else(|| icon_entry(name)) {
      Some(entry) => {
        icons.insert(name.clone(), entry);
      }
      None => warn!(icon = %name, "unknown_icon"),
    }
  }
  icons
}

fn icon_entry(name: &str) -> Option<TypeEntry> {
  let mut chars = name.char_indices();
  let (_, first) = chars.next()?;
  if !first.is_ascii_uppercase() {
    return None;
  }
  let end = chars
    .find(|(_, c)| !(c.is_ascii_lowercase() || c.is_ascii_digit()))
    .map(|(i, _)| i)?;
  if end < 2 {
    return None;
  }
  Some(TypeEntry::new(
    format!("react-icons/{}", name[..end].to_ascii_lowercase()),
    name,
  ))
}

fn lookup_operators(
  used: &BTreeSet<String>,
  defined: &BTreeMap<String, TypeEntry>,
) -> BTreeMap<String, TypeEntry> {
  for name in used.iter().filter(|name| !defined.contains_key(*name)) {
    warn!(operator = %name, "unknown_operator");
  }
  lookup_known(used, defined)
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn test_collect_operators() {
    let mut used = UsedTypes::new();
    used.collect_operators(
      &json!({
        "properties": {
          "title": { "_if": { "test": { "_state": "a" }, "then": 1, "else": 2 } },
          "label": { "_change_case.camelCase": "a b" },
          "not_operator": { "_a": 1, "_b": 2 }
        }
      }),
      false,
    );
    assert_eq!(
      used.operators_client,
      BTreeSet::from(["_change_case".to_string(), "_if".to_string(), "_state".to_string()])
    );
    assert!(used.operators_server.is_empty());
  }

  #[test]
  fn test_resolve_known_types() {
    let mut used = UsedTypes::new();
    used.blocks.insert("Button".to_string());
    used.actions.insert("SetState".to_string());
    used.operators_client.insert("_state".to_string());
    used.operators_client.insert("_nope".to_string());

    let plugins = used.resolve(&TypesMap::builtin()).unwrap();
    assert_eq!(plugins.blocks["Button"].package, "@lowdefy/blocks-antd");
    assert_eq!(plugins.actions["SetState"].package, "@lowdefy/actions-core");
    assert!(plugins.operators_client.contains_key("_state"));
    assert!(!plugins.operators_client.contains_key("_nope"));
  }

  #[test]
  fn test_collect_icons() {
    let mut used = UsedTypes::new();
    used.collect_icons(&json!({
      "properties": {
        "icon": "AiOutlineUser",
        "title": "Users",
        "prefixIcon": { "name": "Io5Home", "color": "red" },
        "items": [{ "icon": { "name": "FaBeer" } }, { "icon": 3 }]
      }
    }));
    assert_eq!(
      used.icons,
      BTreeSet::from([
        "AiOutlineUser".to_string(),
        "FaBeer".to_string(),
        "Io5Home".to_string()
      ])
    );

    used.icons.insert("lowercase".to_string());
    let plugins = used.resolve(&TypesMap::builtin()).unwrap();
    assert_eq!(plugins.icons["AiOutlineUser"].package, "react-icons/ai");
    assert_eq!(plugins.icons["Io5Home"].package, "react-icons/io5");
    assert_eq!(plugins.icons["FaBeer"].original_type_name, "FaBeer");
    assert!(!plugins.icons.contains_key("lowercase"));
  }

  #[test]
  fn test_unknown_block_type() {
    let mut used = UsedTypes::new();
    used.blocks.insert("Carousel3D".to_string());
    let err = used.resolve(&TypesMap::builtin()).unwrap_err();
    assert_eq!(
      err.to_string(),
      "Block type \"Carousel3D\" was used but is not defined."
    );
  }
}
