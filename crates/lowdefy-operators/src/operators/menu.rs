use serde_json::{Map, Value};

use crate::error::{EvalError, EvalResult};
use crate::operator::OperatorCall;

const INVALID_PARAMS: &str = "_menu must be of type string, number or object.";

enum MenuParams<'a> {
  All,
  Value(&'a str),
  Index(&'a Value),
}

impl<'a> MenuParams<'a> {
  fn from_params(params: &'a Value) -> Result<Self, EvalError> {
    match params {
      Value::Bool(true) => Ok(MenuParams::All),
      Value::String(id) => Ok(MenuParams::Value(id)),
      Value::Number(_) => Ok(MenuParams::Index(params)),
      Value::Object(map) => Self::from_object(map),
      _ => Err(EvalError::new(INVALID_PARAMS)),
    }
  }

  fn from_object(map: &'a Map<String, Value>) -> Result<Self, EvalError> {
    if map.get("all") == Some(&Value::Bool(true)) {
      return Ok(MenuParams::All);
    }
    match (map.get("value"), map.get("index")) {
      (Some(Value::String(id)), _) => Ok(MenuParams::Value(id)),
      (_, Some(index @ Value::Number(_))) => Ok(MenuParams::Index(index)),
      (Some(_), _) => Err(EvalError::new("_menu.value must be of type string.")),
      (_, Some(_)) => Err(EvalError::new("_menu.index must be of type number.")),
      (None, None) => Err(EvalError::new(INVALID_PARAMS)),
    }
  }
}

/// A menu of the app, by id or position.
pub(super) fn menu(params: &Value, call: &mut OperatorCall<'_>) -> EvalResult {
  let menus = &call.context.menus;
  let found = match MenuParams::from_params(params)? {
    MenuParams::All => Some(menus.clone()),
    MenuParams::Value(id) => menus.as_array().and_then(|menus| {
      menus
        .iter()
        .find(|menu| menu.get("menuId").and_then(Value::as_str) == Some(id))
        .cloned()
    }),
    MenuParams::Index(index) => index
      .as_u64()
      .and_then(|i| menus.get(i as usize))
      .cloned(),
  };
  Ok(found.unwrap_or(Value::Null))
}

#[cfg(test)]
mod tests {
  use crate::{EvaluationContext, OperatorRegistry, ParseInput, Parser};
  use serde_json::{Value, json};

  fn parse(input: Value) -> (Value, Vec<String>) {
    let registry = OperatorRegistry::client();
    let context = EvaluationContext::new().with_menus(json!([
      { "menuId": "default" },
      { "menuId": "m_1" },
      { "menuId": "m_2" },
    ]));
    let output = Parser::new(&registry, &context)
      .parse(ParseInput::new(input, "locationId").with_array_indices(&[1]));
    let errors = output.errors.iter().map(ToString::to_string).collect();
    (output.output, errors)
  }

  fn all_menus() -> Value {
    json!([{ "menuId": "default" }, { "menuId": "m_1" }, { "menuId": "m_2" }])
  }

  #[test]
  fn test_menu_by_id() {
    let (output, errors) = parse(json!({ "a": { "_menu": "default" } }));
    assert_eq!(output, json!({ "a": { "menuId": "default" } }));
    assert!(errors.is_empty());
  }

  #[test]
  fn test_menu_by_index() {
    assert_eq!(parse(json!({ "_menu": 1 })).0, json!({ "menuId": "m_1" }));
    assert_eq!(parse(json!({ "_menu": { "index": 2 } })).0, json!({ "menuId": "m_2" }));
  }

  #[test]
  fn test_menu_by_value() {
    assert_eq!(
      parse(json!({ "_menu": { "value": "m_2" } })).0,
      json!({ "menuId": "m_2" })
    );
    assert_eq!(parse(json!({ "_menu": "missing" })).0, Value::Null);
  }

  #[test]
  fn test_menu_all() {
    assert_eq!(parse(json!({ "_menu": true })).0, all_menus());
    assert_eq!(parse(json!({ "_menu": { "all": true } })).0, all_menus());
    assert_eq!(
      parse(json!({ "_menu": { "all": true, "value": "default" } })).0,
      all_menus()
    );
  }

  #[test]
  fn test_menu_null() {
    let (output, errors) = parse(json!({ "_menu": null }));
    assert_eq!(output, Value::Null);
    assert_eq!(
      errors,
      vec![
        "Operator Error: _menu must be of type string, number or object. Received: null at locationId."
      ]
    );
  }

  #[test]
  fn test_menu_invalid_object_params() {
    let (output, errors) = parse(json!({ "_menu": { "value": 1 } }));
    assert_eq!(output, Value::Null);
    assert_eq!(
      errors,
      vec![
        "Operator Error: _menu.value must be of type string. Received: {\"value\":1} at locationId."
      ]
    );

    let (_, errors) = parse(json!({ "_menu": { "index": "a" } }));
    assert_eq!(
      errors,
      vec![
        "Operator Error: _menu.index must be of type number. Received: {\"index\":\"a\"} at locationId."
      ]
    );

    let (_, errors) = parse(json!({ "_menu": { "other": true } }));
    assert_eq!(
      errors,
      vec![
        "Operator Error: _menu must be of type string, number or object. Received: {\"other\":true} at locationId."
      ]
    );
  }
}
