//! `_var` substitution.
//!
//! A referenced file can read values passed through the `vars` of the ref
//! that included it:
//!
//! ```yaml
//! title:
//!   _var: page_title
//! color:
//!   _var:
//!     name: theme.color
//!     default: blue
//! ```

use serde_json::{Map, Value};

/// Replace every `_var` node in `value` with the matching entry from `vars`.
///
/// Missing vars become the node's `default`, or `null`.
pub fn apply_vars(value: Value, vars: &Value) -> Value {
  match value {
    Value::Object(map) => {
      if map.len() == 1
        && let Some(var) = map.get("_var")
      {
        return resolve_var(var, vars);
      }
      Value::Object(
        map
          .into_iter()
          .map(|(k, v)| (k, apply_vars(v, vars)))
          .collect::<Map<String, Value>>(),
      )
    }
    Value::Array(items) => Value::Array(items.into_iter().map(|v| apply_vars(v, vars)).collect()),
    other => other,
  }
}

fn resolve_var(var: &Value, vars: &Value) -> Value {
  match var {
    Value::String(name) => get_value(vars, name).cloned().unwrap_or(Value::Null),
    Value::Object(def) => {
      let found = def
        .get("name")
        .and_then(Value::as_str)
        .and_then(|name| get_value(vars, name));
      match found {
        Some(value) => value.clone(),
        None => def.get("default").cloned().unwrap_or(Value::Null),
      }
    }
    _ => Value::Null,
  }
}

/// Look up a dotted path (`a.b.0.c`) in a JSON value.
pub fn get_value<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
  if path.is_empty() {
    return Some(value);
  }
  path.split('.').try_fold(value, |current, segment| match current {
    Value::Object(map) => map.get(segment),
    Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
    _ => None,
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn test_apply_string_var() {
    let out = apply_vars(
      json!({ "title": { "_var": "title" }, "list": [{ "_var": "n" }] }),
      &json!({ "title": "Home", "n": 3 }),
    );
    assert_eq!(out, json!({ "title": "Home", "list": [3] }));
  }

  #[test]
  fn test_apply_var_default_and_missing() {
    let out = apply_vars(
      json!({
        "a": { "_var": { "name": "theme.color", "default": "blue" } },
        "b": { "_var": { "name": "size", "default": 10 } },
        "c": { "_var": "nothing" }
      }),
      &json!({ "theme": { "color": "red" } }),
    );
    assert_eq!(out, json!({ "a": "red", "b": 10, "c": null }));
  }

  #[test]
  fn test_var_with_sibling_keys_is_not_a_var() {
    let node = json!({ "_var": "a", "other": 1 });
    assert_eq!(apply_vars(node.clone(), &json!({ "a": 5 })), node);
  }

  #[test]
  fn test_var_inside_nested_ref_vars() {
    let out = apply_vars(
      json!({ "_ref": { "path": "b.yaml", "vars": { "x": { "_var": "outer" } } } }),
      &json!({ "outer": "from parent" }),
    );
    assert_eq!(
      out,
      json!({ "_ref": { "path": "b.yaml", "vars": { "x": "from parent" } } })
    );
  }

  #[test]
  fn test_get_value() {
    let value = json!({ "a": { "b": [{ "c": 1 }] } });
    assert_eq!(get_value(&value, "a.b.0.c"), Some(&json!(1)));
    assert_eq!(get_value(&value, "a.x"), None);
    assert_eq!(get_value(&value, ""), Some(&value));
  }
}
