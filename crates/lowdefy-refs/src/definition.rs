use serde_json::Value;

use crate::error::RefError;

/// A parsed `_ref` node.
///
/// Created once per `_ref` encountered during a resolution pass and not
/// modified afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct RefDefinition {
  /// Unique id for diagnostics.
  pub id: String,
  /// The raw `_ref` value as written in the config.
  pub original: Value,
  /// Target path, normalised and relative to the config root.
  pub path: Option<String>,
  pub key: Option<String>,
  pub resolver: Option<String>,
  pub transformer: Option<String>,
  /// Values substituted for `_var` nodes in the referenced content.
  pub vars: Value,
}

/// Build a [`RefDefinition`] from the value of a `_ref` key.
///
/// `referenced_from` is the path of the document containing the ref; relative
/// target paths are resolved against its directory.
pub fn make_ref_definition(raw: &Value, referenced_from: &str) -> Result<RefDefinition, RefError> {
  let invalid = || RefError::InvalidDefinition {
    definition: raw.to_string(),
    referenced_from: referenced_from.to_string(),
  };

  let (path, key, resolver, transformer, vars) = match raw {
    Value::String(path) => (Some(path.as_str()), None, None, None, None),
    Value::Object(map) => (
      optional_str(map.get("path")).map_err(|_| invalid())?,
      optional_str(map.get("key")).map_err(|_| invalid())?,
      optional_str(map.get("resolver")).map_err(|_| invalid())?,
      optional_str(map.get("transformer")).map_err(|_| invalid())?,
      map.get("vars").cloned(),
    ),
    _ => return Err(invalid()),
  };

  if path.is_none() && resolver.is_none() {
    return Err(invalid());
  }

  let vars = match vars {
    None | Some(Value::Null) => Value::Object(serde_json::Map::new()),
    Some(vars @ Value::Object(_)) => vars,
    Some(_) => return Err(invalid()),
  };

  Ok(RefDefinition {
    id: uuid::Uuid::new_v4().to_string(),
    original: raw.clone(),
    path: path.map(|p| resolve_ref_path(referenced_from, p)),
    key: key.map(str::to_string),
    resolver: resolver.map(str::to_string),
    transformer: transformer.map(str::to_string),
    vars,
  })
}

fn optional_str(value: Option<&Value>) -> Result<Option<&str>, ()> {
  match value {
    None | Some(Value::Null) => Ok(None),
    Some(Value::String(s)) => Ok(Some(s.as_str())),
    Some(_) => Err(()),
  }
}

/// Resolve `target` against the directory of `referenced_from`.
///
/// Paths use `/` separators and are relative to the config root. A leading
/// `/` makes `target` root-relative. `.` and `..` segments are collapsed;
/// `..` segments that climb above the root are kept.
pub fn resolve_ref_path(referenced_from: &str, target: &str) -> String {
  let mut segments: Vec<&str> = Vec::new();

  let target = if let Some(stripped) = target.strip_prefix('/') {
    stripped
  } else {
    if let Some((dir, _)) = referenced_from.rsplit_once('/') {
      segments.extend(dir.split('/').filter(|s| !s.is_empty() && *s != "."));
    }
    target
  };

  for segment in target.split('/') {
    match segment {
      "" | "." => {}
      ".." => {
        if matches!(segments.last(), Some(last) if *last != "..") {
          segments.pop();
        } else {
          segments.push("..");
        }
      }
      other => segments.push(other),
    }
  }

  segments.join("/")
}
