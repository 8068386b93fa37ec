use ::base64::{Engine as _, engine::general_purpose::STANDARD};
use serde_json::Value;

use super::{method, on_param};
use crate::error::{EvalError, EvalResult};
use crate::operator::OperatorCall;

/// `_base64.encode` and `_base64.decode` over UTF-8 strings.
pub(super) fn base64(params: &Value, call: &mut OperatorCall<'_>) -> EvalResult {
  let method = method(call, &["decode", "encode"])?;
  let Value::String(on) = on_param(params) else {
    return Err(EvalError::new(format!(
      "_base64.{method} takes a string as input."
    )));
  };
  if method == "encode" {
    return Ok(Value::String(STANDARD.encode(on)));
  }
  let bytes = STANDARD
    .decode(on)
    .map_err(|err| EvalError::new(format!("_base64.decode - {err}.")))?;
  Ok(Value::String(String::from_utf8_lossy(&bytes).into_owned()))
}

#[cfg(test)]
mod tests {
  use crate::{EvaluationContext, OperatorRegistry, ParseInput, Parser};
  use serde_json::{Value, json};

  fn parse(input: Value) -> (Value, Vec<String>) {
    let registry = OperatorRegistry::client();
    let context = EvaluationContext::new();
    let output = Parser::new(&registry, &context).parse(ParseInput::new(input, "locationId"));
    let errors = output.errors.iter().map(ToString::to_string).collect();
    (output.output, errors)
  }

  #[test]
  fn test_encode_decode() {
    assert_eq!(parse(json!({ "_base64.encode": "A string value" })).0, json!("QSBzdHJpbmcgdmFsdWU="));
    assert_eq!(
      parse(json!({ "_base64.decode": { "on": "QSBzdHJpbmcgdmFsdWU=" } })).0,
      json!("A string value")
    );
  }

  #[test]
  fn test_requires_string() {
    let (output, errors) = parse(json!({ "_base64.encode": 1 }));
    assert_eq!(output, Value::Null);
    assert_eq!(
      errors,
      vec!["Operator Error: _base64.encode takes a string as input. Received: 1 at locationId."]
    );
  }
}
