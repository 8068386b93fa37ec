//! Parse referenced file content by extension.
//!
//! - `.yaml` / `.yml`: YAML
//! - `.json`: JSON
//! - `.njk`: rendered as a Jinja template with the ref's vars, then parsed by
//!   the inner extension (`page.yaml.njk` is rendered, then parsed as YAML)
//! - anything else: kept as a string (markdown, html, text)

use minijinja::Environment;
use serde_json::Value;

use crate::error::RefError;

/// Parse the text of `path` into a JSON value.
pub fn parse_content(path: &str, text: &str, vars: &Value) -> Result<Value, RefError> {
  let (stem, ext) = split_extension(path);
  match ext {
    Some("njk") => {
      let rendered = render_template(path, text, vars)?;
      match split_extension(stem).1 {
        Some("njk") | None => Ok(Value::String(rendered)),
        Some(_) => parse_content(stem, &rendered, vars),
      }
    }
    Some("yaml") | Some("yml") => parse_yaml(path, text),
    Some("json") => parse_json(path, text),
    _ => Ok(Value::String(text.to_string())),
  }
}

fn split_extension(path: &str) -> (&str, Option<&str>) {
  let file_name = path.rsplit('/').next().unwrap_or(path);
  match file_name.rfind('.') {
    Some(0) | None => (path, None),
    Some(idx) => {
      let split_at = path.len() - file_name.len() + idx;
      (&path[..split_at], Some(&path[split_at + 1..]))
    }
  }
}

fn render_template(path: &str, text: &str, vars: &Value) -> Result<String, RefError> {
  let env = Environment::new();
  env.render_str(text, vars).map_err(|e| RefError::Parse {
    path: path.to_string(),
    message: format!("template error: {}", e),
  })
}

fn parse_yaml(path: &str, text: &str) -> Result<Value, RefError> {
  if text.trim().is_empty() {
    return Ok(Value::Null);
  }
  serde_yaml_ng::from_str(text).map_err(|e| RefError::Parse {
    path: path.to_string(),
    message: e.to_string(),
  })
}

fn parse_json(path: &str, text: &str) -> Result<Value, RefError> {
  serde_json::from_str(text).map_err(|e| RefError::Parse {
    path: path.to_string(),
    message: e.to_string(),
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn test_parse_yaml() {
    let value = parse_content("page.yaml", "id: home\nblocks: [1, 2]", &json!({})).unwrap();
    assert_eq!(value, json!({ "id": "home", "blocks": [1, 2] }));
  }

  #[test]
  fn test_parse_yml_and_empty() {
    assert_eq!(parse_content("a.yml", "a: 1", &json!({})).unwrap(), json!({ "a": 1 }));
    assert_eq!(parse_content("a.yaml", "  \n", &json!({})).unwrap(), Value::Null);
  }

  #[test]
  fn test_parse_json() {
    let value = parse_content("data.json", r#"{"a": [true]}"#, &json!({})).unwrap();
    assert_eq!(value, json!({ "a": [true] }));
  }

  #[test]
  fn test_parse_other_as_string() {
    let value = parse_content("docs/intro.md", "# Hello", &json!({})).unwrap();
    assert_eq!(value, json!("# Hello"));
    let value = parse_content("LICENSE", "MIT", &json!({})).unwrap();
    assert_eq!(value, json!("MIT"));
  }

  #[test]
  fn test_parse_njk_then_yaml() {
    let value = parse_content(
      "pages/page.yaml.njk",
      "id: {{ id }}\ntitle: {{ title | upper }}",
      &json!({ "id": "about", "title": "about us" }),
    )
    .unwrap();
    assert_eq!(value, json!({ "id": "about", "title": "ABOUT US" }));
  }

  #[test]
  fn test_parse_njk_plain() {
    let value = parse_content("hello.njk", "Hello {{ name }}", &json!({ "name": "Ann" })).unwrap();
    assert_eq!(value, json!("Hello Ann"));
  }

  #[test]
  fn test_parse_invalid() {
    assert!(matches!(
      parse_content("bad.json", "{", &json!({})),
      Err(RefError::Parse { .. })
    ));
    assert!(matches!(
      parse_content("bad.yaml", "a: [1, 2", &json!({})),
      Err(RefError::Parse { .. })
    ));
  }

  #[test]
  fn test_dot_directory_has_no_extension() {
    assert_eq!(split_extension("config.d/file"), ("config.d/file", None));
    assert_eq!(split_extension(".hidden"), (".hidden", None));
  }
}
