//! Parsing block-shaped configuration with the built-in client operators.

use lowdefy_operators::{
  EvalError, EvalResult, EvaluationContext, OperatorCall, OperatorError, OperatorRegistry,
  ParseInput, Parser,
};
use serde_json::{Value, json};

fn context() -> EvaluationContext {
  let mut context = EvaluationContext::new()
    .with_state(json!({
      "name": "Ada",
      "items": [{ "price": 2, "qty": 3 }, { "price": 5, "qty": 1 }],
      "show": true,
    }))
    .with_user(json!({ "email": "ada@example.com" }));
  context.url_query = json!({ "tab": "billing" });
  context.page_id = Some("checkout".to_string());
  context
}

#[test]
fn test_block_properties() {
  let registry = OperatorRegistry::client();
  let context = context();
  let input = json!({
    "title": { "_change_case.capitalCase": { "_state": "name" } },
    "visible": { "_and": [{ "_state": "show" }, { "_eq": [{ "_url_query": "tab" }, "billing"] }] },
    "line": {
      "_sum": [
        { "_state": "items.$.price" },
        { "_state": "items.$.qty" },
      ]
    },
    "email": { "_user": "email" },
    "static": ["a", 1, null],
  });

  let output = Parser::new(&registry, &context)
    .parse(ParseInput::new(input, "block_title").with_array_indices(&[1]));

  assert!(output.is_ok());
  assert_eq!(
    output.output,
    json!({
      "title": "Ada",
      "visible": true,
      "line": 6,
      "email": "ada@example.com",
      "static": ["a", 1, null],
    })
  );
}

#[test]
fn test_errors_do_not_abort_siblings() {
  let registry = OperatorRegistry::client();
  let context = context();
  let input = json!([
    { "_state": "name" },
    { "_sum": [1, 2] },
    { "_not": false },
    { "_eq": [1, 1] },
    { "_base64.encode": "x" },
    { "_json.stringify": { "on": 1 } },
    { "_menu": true },
    { "_user": "email" },
    { "_divide": [1, 0] },
    { "_index": 0 },
  ]);

  let output = Parser::new(&registry, &context)
    .parse(ParseInput::new(input, "list").with_array_indices(&[4]));

  let values = output.output.as_array().unwrap();
  assert_eq!(values.len(), 10);
  assert_eq!(values[8], Value::Null);
  assert_eq!(values[9], json!(4));
  assert_eq!(output.errors.len(), 1);
  assert!(matches!(
    &output.errors[0],
    OperatorError::Failed { operator, location, .. } if operator == "_divide" && location == "list"
  ));
}

fn shout(params: &Value, call: &mut OperatorCall<'_>) -> EvalResult {
  let Value::String(text) = params else {
    return Err(EvalError::new("_shout takes a string."));
  };
  let page = call.context.page_id.clone().unwrap_or_default();
  Ok(json!(format!("{}! ({page})", text.to_uppercase())))
}

#[test]
fn test_custom_operator() {
  let mut registry = OperatorRegistry::client();
  registry.register("_shout", shout);
  let context = context();

  let output = Parser::new(&registry, &context)
    .parse(ParseInput::new(json!({ "_shout": { "_state": "name" } }), "title"));
  assert_eq!(output.output, json!("ADA! (checkout)"));

  let output =
    Parser::new(&registry, &context).parse(ParseInput::new(json!({ "_shout": 1 }), "title"));
  assert_eq!(
    output.errors[0].to_string(),
    "Operator Error: _shout takes a string. Received: 1 at title."
  );
}
