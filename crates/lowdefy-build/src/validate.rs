use lowdefy_config::AppConfig;
use serde_json::{Map, Value};

use crate::error::BuildError;

const MUTUALLY_EXCLUSIVE: &str = "Protected and public pages are mutually exclusive. When protected pages are listed, all unlisted pages are public by default and visa versa.";

/// Validate the `config` section of the app and fill in its defaults.
///
/// Returns `components` with `config` replaced by the validated config.
/// Nothing other than `config` is touched.
pub fn validate_config(components: Value) -> Result<Value, BuildError> {
  let mut components = match components {
    Value::Object(map) => map,
    Value::Null => Map::new(),
    _ => {
      return Err(BuildError::configuration(
        "Lowdefy configuration should be an object.",
      ));
    }
  };

  let mut config = match components.remove("config") {
    None | Some(Value::Null) => Map::new(),
    Some(Value::Object(config)) => config,
    Some(_) => return Err(BuildError::configuration("lowdefy.config is not an object.")),
  };
  remove_nulls(&mut config);
  let config = Value::Object(config);

  check_config_shape(&config)?;

  let app: AppConfig = serde_json::from_value(config)
    .map_err(|e| BuildError::configuration(format!("Invalid app config: {}.", e)))?;

  check_page_access(&app)?;

  if let Some(base_path) = &app.base_path
    && !base_path.starts_with('/')
  {
    return Err(BuildError::configuration("Base path must start with \"/\"."));
  }

  let config = serde_json::to_value(&app).map_err(|e| BuildError::Serialize {
    path: "config".to_string(),
    source: e,
  })?;
  components.insert("config".to_string(), config);
  Ok(Value::Object(components))
}

/// Treat empty sections (`theme:` in YAML) as absent so they get defaults.
fn remove_nulls(config: &mut Map<String, Value>) {
  config.retain(|key, value| {
    !(value.is_null() && matches!(key.as_str(), "auth" | "basePath" | "theme"))
  });
  let Some(Value::Object(auth)) = config.get_mut("auth") else {
    return;
  };
  if auth.get("pages").is_some_and(Value::is_null) {
    auth.remove("pages");
  }
  if let Some(Value::Object(pages)) = auth.get_mut("pages") {
    pages.retain(|_, value| !value.is_null());
  }
}

/// Structural checks on the raw config, reported with the paths users see.
fn check_config_shape(config: &Value) -> Result<(), BuildError> {
  let pages = config.pointer("/auth/pages");
  if let Some(auth) = config.get("auth")
    && !auth.is_object()
  {
    return Err(BuildError::configuration(
      "App \"config.auth\" should be an object.",
    ));
  }
  if let Some(pages) = pages
    && !pages.is_object()
  {
    return Err(BuildError::configuration(
      "App \"config.auth.pages\" should be an object.",
    ));
  }

  for field in ["protected", "public"] {
    match pages.and_then(|p| p.get(field)) {
      None | Some(Value::Bool(_)) => {}
      Some(Value::Array(items)) if items.iter().all(Value::is_string) => {}
      Some(_) => {
        return Err(BuildError::configuration(format!(
          "App \"config.auth.pages.{}.$\" should be an array of strings.",
          field
        )));
      }
    }
  }

  if let Some(roles) = pages.and_then(|p| p.get("roles")) {
    let Value::Object(roles) = roles else {
      return Err(BuildError::configuration(
        "App \"config.auth.pages.roles\" should be an object.",
      ));
    };
    for (role, page_ids) in roles {
      let valid = page_ids
        .as_array()
        .is_some_and(|ids| ids.iter().all(Value::is_string));
      if !valid {
        return Err(BuildError::configuration(format!(
          "App \"config.auth.pages.roles.{}\" should be an array of strings.",
          role
        )));
      }
    }
  }

  match config.get("basePath") {
    None | Some(Value::Null) | Some(Value::String(_)) => {}
    Some(_) => {
      return Err(BuildError::configuration(
        "App \"config.basePath\" should be a string.",
      ));
    }
  }

  match config.get("theme") {
    None | Some(Value::Object(_)) => Ok(()),
    Some(_) => Err(BuildError::configuration(
      "App \"config.theme\" should be an object.",
    )),
  }
}

fn check_page_access(app: &AppConfig) -> Result<(), BuildError> {
  use lowdefy_config::PageList;

  let pages = &app.auth.pages;
  if matches!(pages.protected, Some(PageList::All(false))) {
    return Err(BuildError::configuration(
      "Protected pages can not be set to false.",
    ));
  }
  if matches!(pages.public, Some(PageList::All(false))) {
    return Err(BuildError::configuration(
      "Public pages can not be set to false.",
    ));
  }
  if pages.protected.is_some() && pages.public.is_some() {
    return Err(BuildError::configuration(MUTUALLY_EXCLUSIVE));
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn message(result: Result<Value, BuildError>) -> String {
    result.unwrap_err().to_string()
  }

  #[test]
  fn test_no_config_defined() {
    let result = validate_config(json!({})).unwrap();
    assert_eq!(
      result,
      json!({ "config": { "auth": { "pages": { "roles": {} } }, "theme": {} } })
    );
  }

  #[test]
  fn test_null_sections_get_defaults() {
    let defaults = json!({ "config": { "auth": { "pages": { "roles": {} } }, "theme": {} } });
    for config in [
      json!({ "theme": null }),
      json!({ "auth": null }),
      json!({ "auth": { "pages": null } }),
      json!({ "auth": { "pages": { "roles": null, "protected": null } } }),
    ] {
      assert_eq!(validate_config(json!({ "config": config })).unwrap(), defaults);
    }
    assert_eq!(
      validate_config(json!({ "config": { "basePath": null, "homePageId": "home" } })).unwrap(),
      json!({
        "config": { "auth": { "pages": { "roles": {} } }, "theme": {}, "homePageId": "home" }
      })
    );
  }

  #[test]
  fn test_theme_is_kept() {
    let result = validate_config(json!({
      "config": { "theme": { "lessVariables": { "primary-color": "#FF00FF" } } }
    }))
    .unwrap();
    assert_eq!(
      result,
      json!({
        "config": {
          "auth": { "pages": { "roles": {} } },
          "theme": { "lessVariables": { "primary-color": "#FF00FF" } }
        }
      })
    );
  }

  #[test]
  fn test_other_components_untouched() {
    let result = validate_config(json!({
      "lowdefy": "4.0.0",
      "pages": [{ "id": "a" }],
      "config": { "homePageId": "a" }
    }))
    .unwrap();
    assert_eq!(result["lowdefy"], json!("4.0.0"));
    assert_eq!(result["pages"], json!([{ "id": "a" }]));
    assert_eq!(result["config"]["homePageId"], json!("a"));
  }

  #[test]
  fn test_config_not_an_object() {
    assert_eq!(
      message(validate_config(json!({ "config": "config" }))),
      "lowdefy.config is not an object."
    );
  }

  #[test]
  fn test_invalid_auth_config() {
    assert_eq!(
      message(validate_config(json!({
        "config": { "auth": { "pages": { "protected": {} } } }
      }))),
      "App \"config.auth.pages.protected.$\" should be an array of strings."
    );
    assert_eq!(
      message(validate_config(json!({
        "config": { "auth": { "pages": { "public": [1] } } }
      }))),
      "App \"config.auth.pages.public.$\" should be an array of strings."
    );
    assert_eq!(
      message(validate_config(json!({
        "config": { "auth": { "pages": { "roles": ["a"] } } }
      }))),
      "App \"config.auth.pages.roles\" should be an object."
    );
  }

  #[test]
  fn test_protected_and_public_arrays() {
    assert_eq!(
      message(validate_config(json!({
        "config": { "auth": { "pages": { "protected": [], "public": [] } } }
      }))),
      MUTUALLY_EXCLUSIVE
    );
  }

  #[test]
  fn test_protected_and_public_true() {
    assert_eq!(
      message(validate_config(json!({
        "config": { "auth": { "pages": { "protected": true, "public": true } } }
      }))),
      MUTUALLY_EXCLUSIVE
    );
  }

  #[test]
  fn test_protected_or_public_false() {
    assert_eq!(
      message(validate_config(json!({
        "config": { "auth": { "pages": { "protected": false } } }
      }))),
      "Protected pages can not be set to false."
    );
    assert_eq!(
      message(validate_config(json!({
        "config": { "auth": { "pages": { "public": false } } }
      }))),
      "Public pages can not be set to false."
    );
  }

  #[test]
  fn test_base_path() {
    let result = validate_config(json!({ "config": { "basePath": "/base" } })).unwrap();
    assert_eq!(
      result,
      json!({
        "config": {
          "auth": { "pages": { "roles": {} } },
          "basePath": "/base",
          "theme": {}
        }
      })
    );
    assert_eq!(
      message(validate_config(json!({ "config": { "basePath": "base" } }))),
      "Base path must start with \"/\"."
    );
  }

  #[test]
  fn test_roles_kept() {
    let result = validate_config(json!({
      "config": { "auth": { "pages": { "roles": { "admin": ["users"] } } } }
    }))
    .unwrap();
    assert_eq!(
      result["config"]["auth"]["pages"]["roles"],
      json!({ "admin": ["users"] })
    );
  }
}
