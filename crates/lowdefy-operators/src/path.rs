//! Dotted-path access into JSON values.
//!
//! Paths use `.` between segments and accept `[n]` for array indices, so
//! `list.0.name` and `list[0].name` are the same path.

use serde_json::{Map, Value};

fn segments(path: &str) -> Vec<String> {
  path
    .replace('[', ".")
    .replace(']', "")
    .split('.')
    .filter(|s| !s.is_empty())
    .map(str::to_string)
    .collect()
}

/// Look up `path` in `value`.
pub fn get_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
  segments(path)
    .iter()
    .try_fold(value, |current, segment| match current {
      Value::Object(map) => map.get(segment),
      Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
      _ => None,
    })
}

/// Set `path` in `value`, creating objects (or arrays, for numeric segments)
/// along the way.
pub fn set_path(value: &mut Value, path: &str, new_value: Value) {
  let segments = segments(path);
  let Some((last, parents)) = segments.split_last() else {
    *value = new_value;
    return;
  };

  let mut current = value;
  for (i, segment) in parents.iter().enumerate() {
    let next_is_index = segments[i + 1].parse::<usize>().is_ok();
    current = child_mut(current, segment, next_is_index);
  }
  match current {
    Value::Array(items) if last.parse::<usize>().is_ok() => {
      let index = last.parse::<usize>().unwrap_or_default();
      if items.len() <= index {
        items.resize(index + 1, Value::Null);
      }
      items[index] = new_value;
    }
    other => {
      if !other.is_object() {
        *other = Value::Object(Map::new());
      }
      if let Value::Object(map) = other {
        map.insert(last.clone(), new_value);
      }
    }
  }
}

fn child_mut<'a>(current: &'a mut Value, segment: &str, next_is_index: bool) -> &'a mut Value {
  let index = segment.parse::<usize>().ok().filter(|_| current.is_array());
  if index.is_none() && !current.is_object() {
    *current = Value::Object(Map::new());
  }

  let slot = match (current, index) {
    (Value::Array(items), Some(index)) => {
      if items.len() <= index {
        items.resize(index + 1, Value::Null);
      }
      &mut items[index]
    }
    (Value::Object(map), _) => map.entry(segment.to_string()).or_insert(Value::Null),
    (other, _) => other,
  };
  if !slot.is_object() && !slot.is_array() {
    *slot = if next_is_index {
      Value::Array(Vec::new())
    } else {
      Value::Object(Map::new())
    };
  }
  slot
}

/// Replace each `$` in `key` with the next array index.
///
/// `list.$.items.$` with indices `[2, 5]` becomes `list.2.items.5`.
pub fn apply_array_indices(key: &str, array_indices: &[usize]) -> String {
  let mut result = key.to_string();
  for index in array_indices {
    match result.find('$') {
      Some(pos) => result.replace_range(pos..pos + 1, &index.to_string()),
      None => break,
    }
  }
  result
}

/// JavaScript-style truthiness.
pub fn is_truthy(value: &Value) -> bool {
  match value {
    Value::Null => false,
    Value::Bool(b) => *b,
    Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
    Value::String(s) => !s.is_empty(),
    Value::Array(_) | Value::Object(_) => true,
  }
}

/// A JSON number, as an integer when it has no fractional part.
pub fn number_value(n: f64) -> Value {
  if n.fract() == 0.0 && n.abs() < 9.0e15 {
    Value::from(n as i64)
  } else {
    serde_json::Number::from_f64(n)
      .map(Value::Number)
      .unwrap_or(Value::Null)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn test_get_path() {
    let value = json!({ "list": [{ "name": "a" }, { "name": "b" }], "x": null });
    assert_eq!(get_path(&value, "list.1.name"), Some(&json!("b")));
    assert_eq!(get_path(&value, "list[0].name"), Some(&json!("a")));
    assert_eq!(get_path(&value, "x"), Some(&Value::Null));
    assert_eq!(get_path(&value, "y.z"), None);
  }

  #[test]
  fn test_set_path_creates_parents() {
    let mut value = json!({});
    set_path(&mut value, "a.b", json!(1));
    set_path(&mut value, "list.1.name", json!("x"));
    assert_eq!(
      value,
      json!({ "a": { "b": 1 }, "list": [null, { "name": "x" }] })
    );
  }

  #[test]
  fn test_set_path_into_existing_array() {
    let mut value = json!({ "rows": [{ "a": 1 }, 2] });
    set_path(&mut value, "rows.0.b", json!(2));
    set_path(&mut value, "rows[1].c", json!(3));
    set_path(&mut value, "rows.name", json!("x"));
    assert_eq!(value, json!({ "rows": { "name": "x" } }));

    let mut value = json!({ "rows": [{ "a": 1 }, 2] });
    set_path(&mut value, "rows.0.b", json!(2));
    set_path(&mut value, "rows[1].c", json!(3));
    assert_eq!(value, json!({ "rows": [{ "a": 1, "b": 2 }, { "c": 3 }] }));
  }

  #[test]
  fn test_set_path_overwrites_scalar() {
    let mut value = json!({ "a": 1 });
    set_path(&mut value, "a.b", json!(2));
    assert_eq!(value, json!({ "a": { "b": 2 } }));
  }

  #[test]
  fn test_apply_array_indices() {
    assert_eq!(apply_array_indices("list.$.items.$", &[2, 5]), "list.2.items.5");
    assert_eq!(apply_array_indices("list.$", &[]), "list.$");
    assert_eq!(apply_array_indices("a", &[1]), "a");
  }

  #[test]
  fn test_truthiness_and_numbers() {
    assert!(!is_truthy(&json!(0)));
    assert!(!is_truthy(&json!("")));
    assert!(is_truthy(&json!([])));
    assert_eq!(number_value(3.0), json!(3));
    assert_eq!(number_value(1.5), json!(1.5));
  }
}
