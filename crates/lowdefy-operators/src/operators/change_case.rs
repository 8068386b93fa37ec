//! `_change_case.<method>`: convert strings between word cases.
//!
//! Words are found by inserting a separator wherever a split pattern matches
//! (by default between a lower-case letter or digit and an upper-case letter)
//! and replacing every run of characters matched by the strip pattern (by
//! default anything that is not a letter or digit). The words are then
//! transformed and joined with the method's delimiter.

use std::borrow::Cow;

use regex::{Regex, RegexBuilder};
use serde_json::{Map, Value};

use super::{method, on_param};
use crate::error::{EvalError, EvalResult};
use crate::operator::OperatorCall;

const METHODS: &[&str] = &[
  "camelCase",
  "capitalCase",
  "constantCase",
  "dotCase",
  "headerCase",
  "noCase",
  "paramCase",
  "pascalCase",
  "pathCase",
  "sentenceCase",
  "snakeCase",
];

const SEPARATOR: char = '\0';

type WordTransform = fn(&str, usize) -> String;

struct Pattern {
  regex: Regex,
  global: bool,
}

impl Pattern {
  fn new(pattern: &str, flags: &str) -> Result<Self, EvalError> {
    let regex = RegexBuilder::new(pattern)
      .case_insensitive(flags.contains('i'))
      .multi_line(flags.contains('m'))
      .dot_matches_new_line(flags.contains('s'))
      .build()
      .map_err(|_| EvalError::new(format!("Invalid regular expression: /{pattern}/.")))?;
    Ok(Self {
      regex,
      global: flags.contains('g'),
    })
  }

  /// A pattern from options: a string (matched globally) or
  /// `{ pattern, flags }`.
  fn from_option(value: &Value) -> Result<Self, EvalError> {
    match value {
      Value::String(pattern) => Self::new(pattern, "g"),
      Value::Object(map) => {
        let Some(Value::String(pattern)) = map.get("pattern") else {
          return Err(EvalError::new("regex.pattern must be a string."));
        };
        let flags = map.get("flags").and_then(Value::as_str).unwrap_or("");
        Self::new(pattern, flags)
      }
      _ => Err(EvalError::new("regex must be string or an object.")),
    }
  }

  fn replace<'t>(&self, input: &'t str, replacement: &str) -> Cow<'t, str> {
    if self.global {
      self.regex.replace_all(input, replacement)
    } else {
      self.regex.replace(input, replacement)
    }
  }
}

struct CaseOptions {
  delimiter: Option<String>,
  split: Vec<Pattern>,
  strip: Pattern,
  convert_keys: bool,
  convert_values: bool,
}

impl CaseOptions {
  fn from_value(options: Option<&Value>) -> Result<Self, EvalError> {
    let empty = Map::new();
    let options = match options {
      None | Some(Value::Null) => &empty,
      Some(Value::Object(map)) => map,
      Some(_) => return Err(EvalError::new("options must be an object.")),
    };

    let split = match options.get("splitRegexp") {
      Some(value) => vec![Pattern::from_option(value)?],
      None => vec![
        Pattern::new("([a-z0-9])([A-Z])", "g")?,
        Pattern::new("([A-Z])([A-Z][a-z])", "g")?,
      ],
    };
    let strip = match options.get("stripRegexp") {
      Some(value) => Pattern::from_option(value)?,
      None => Pattern::new("[^A-Z0-9]+", "gi")?,
    };

    Ok(Self {
      delimiter: options
        .get("delimiter")
        .and_then(Value::as_str)
        .map(str::to_string),
      split,
      strip,
      convert_keys: options.get("convertKeys").and_then(Value::as_bool).unwrap_or(false),
      convert_values: options
        .get("convertValues")
        .and_then(Value::as_bool)
        .unwrap_or(true),
    })
  }

  fn convert(&self, input: &str, transform: WordTransform, delimiter: &str) -> String {
    let mut result = input.to_string();
    for pattern in &self.split {
      result = pattern.replace(&result, "${1}\0${2}").into_owned();
    }
    let result = self.strip.replace(&result, "\0");
    let delimiter = self.delimiter.as_deref().unwrap_or(delimiter);
    result
      .trim_matches(SEPARATOR)
      .split(SEPARATOR)
      .enumerate()
      .map(|(index, word)| transform(word, index))
      .collect::<Vec<_>>()
      .join(delimiter)
  }
}

fn upper_first(word: &str) -> String {
  let mut chars = word.chars();
  match chars.next() {
    Some(first) => first.to_uppercase().chain(chars).collect(),
    None => String::new(),
  }
}

fn lower(word: &str, _: usize) -> String {
  word.to_lowercase()
}

fn upper(word: &str, _: usize) -> String {
  word.to_uppercase()
}

fn capital(word: &str, _: usize) -> String {
  upper_first(&word.to_lowercase())
}

fn pascal(word: &str, index: usize) -> String {
  let mut chars = word.chars();
  let Some(first) = chars.next() else {
    return String::new();
  };
  let rest = chars.as_str().to_lowercase();
  if index > 0 && first.is_ascii_digit() {
    format!("_{first}{rest}")
  } else {
    format!("{}{rest}", first.to_uppercase())
  }
}

fn camel(word: &str, index: usize) -> String {
  if index == 0 {
    word.to_lowercase()
  } else {
    pascal(word, index)
  }
}

fn sentence(word: &str, index: usize) -> String {
  if index == 0 {
    upper_first(&word.to_lowercase())
  } else {
    word.to_lowercase()
  }
}

/// Word transform and default delimiter of a method.
fn style(method: &str) -> (WordTransform, &'static str) {
  match method {
    "camelCase" => (camel, ""),
    "capitalCase" => (capital, " "),
    "constantCase" => (upper, "_"),
    "dotCase" => (lower, "."),
    "headerCase" => (capital, "-"),
    "paramCase" => (lower, "-"),
    "pascalCase" => (pascal, ""),
    "pathCase" => (lower, "/"),
    "sentenceCase" => (sentence, " "),
    "snakeCase" => (lower, "_"),
    _ => (lower, " "),
  }
}

pub(super) fn change_case(params: &Value, call: &mut OperatorCall<'_>) -> EvalResult {
  let (transform, delimiter) = style(method(call, METHODS)?);
  let options = match params {
    Value::Object(map) => map.get("options"),
    Value::Array(items) => items.get(1),
    _ => None,
  };
  let options = CaseOptions::from_value(options)?;
  let convert = |s: &str| Value::String(options.convert(s, transform, delimiter));

  Ok(match on_param(params) {
    Value::String(s) => convert(s),
    Value::Array(items) => Value::Array(
      items
        .iter()
        .map(|item| match item {
          Value::String(s) => convert(s),
          other => other.clone(),
        })
        .collect(),
    ),
    Value::Object(map) => Value::Object(
      map
        .iter()
        .map(|(key, value)| {
          let key = if options.convert_keys {
            options.convert(key, transform, delimiter)
          } else {
            key.clone()
          };
          let value = match value {
            Value::String(s) if options.convert_values => convert(s),
            other => other.clone(),
          };
          (key, value)
        })
        .collect(),
    ),
    other => other.clone(),
  })
}

#[cfg(test)]
mod tests {
  use crate::{EvaluationContext, OperatorRegistry, ParseInput, Parser};
  use serde_json::{Value, json};

  fn change_case(method: &str, params: Value) -> Result<Value, String> {
    let registry = OperatorRegistry::client();
    let context = EvaluationContext::new();
    let mut input = serde_json::Map::new();
    input.insert(format!("_change_case.{method}"), params);
    let output =
      Parser::new(&registry, &context).parse(ParseInput::new(Value::Object(input), "locationId"));
    match output.errors.first() {
      Some(err) => Err(err.to_string()),
      None => Ok(output.output),
    }
  }

  fn test_object() -> Value {
    json!({ "field_1": "test string 1", "field_2": "test string 2" })
  }

  #[test]
  fn test_all_methods_on_string() {
    let cases = [
      ("camelCase", "testString"),
      ("capitalCase", "Test String"),
      ("constantCase", "TEST_STRING"),
      ("dotCase", "test.string"),
      ("headerCase", "Test-String"),
      ("noCase", "test string"),
      ("paramCase", "test-string"),
      ("pascalCase", "TestString"),
      ("pathCase", "test/string"),
      ("sentenceCase", "Test string"),
      ("snakeCase", "test_string"),
    ];
    for (method, expected) in cases {
      assert_eq!(
        change_case(method, json!({ "on": "test string" })),
        Ok(json!(expected)),
        "{method}"
      );
    }
  }

  #[test]
  fn test_methods_on_object_values() {
    assert_eq!(
      change_case("camelCase", json!({ "on": test_object() })),
      Ok(json!({ "field_1": "testString_1", "field_2": "testString_2" }))
    );
    assert_eq!(
      change_case("constantCase", json!({ "on": test_object() })),
      Ok(json!({ "field_1": "TEST_STRING_1", "field_2": "TEST_STRING_2" }))
    );
    assert_eq!(
      change_case("pascalCase", json!({ "on": "version 2 release" })),
      Ok(json!("Version_2Release"))
    );
  }

  #[test]
  fn test_delimiter_option() {
    assert_eq!(
      change_case("capitalCase", json!({ "on": "test string", "options": { "delimiter": "-" } })),
      Ok(json!("Test-String"))
    );
    assert_eq!(
      change_case("capitalCase", json!(["test string", { "delimiter": "-" }])),
      Ok(json!("Test-String"))
    );
  }

  #[test]
  fn test_options_must_be_object() {
    let err = change_case("capitalCase", json!({ "on": "test string", "options": [] })).unwrap_err();
    assert!(err.starts_with("Operator Error: options must be an object."));
  }

  #[test]
  fn test_split_regexp() {
    assert_eq!(
      change_case("sentenceCase", json!({ "on": "word2019" })),
      Ok(json!("Word2019"))
    );
    assert_eq!(
      change_case(
        "sentenceCase",
        json!({ "on": "word2019", "options": { "splitRegexp": "([a-z])([A-Z0-9])" } })
      ),
      Ok(json!("Word 2019"))
    );
    assert_eq!(
      change_case(
        "sentenceCase",
        json!({
          "on": "word2019",
          "options": { "splitRegexp": { "pattern": "([a-z])([A-Z0-9])", "flags": "gi" } }
        })
      ),
      Ok(json!("W or d2019"))
    );
  }

  #[test]
  fn test_strip_regexp() {
    assert_eq!(
      change_case("sentenceCase", json!({ "on": "word2019", "options": { "stripRegexp": "[^A-Z]" } })),
      Ok(json!(""))
    );
    assert_eq!(
      change_case(
        "sentenceCase",
        json!({
          "on": "word2019",
          "options": { "stripRegexp": { "pattern": "[^A-Z]", "flags": "gi" } }
        })
      ),
      Ok(json!("Word"))
    );
  }

  #[test]
  fn test_invalid_regexp() {
    let err = change_case(
      "capitalCase",
      json!({ "on": "test string", "options": { "splitRegexp": "(a" } }),
    )
    .unwrap_err();
    assert!(err.starts_with("Operator Error: Invalid regular expression"));

    let err = change_case(
      "capitalCase",
      json!({ "on": "test string", "options": { "splitRegexp": [] } }),
    )
    .unwrap_err();
    assert!(err.starts_with("Operator Error: regex must be string or an object."));
  }

  #[test]
  fn test_arrays_convert_string_items() {
    assert_eq!(
      change_case(
        "capitalCase",
        json!({ "on": ["test string 1", "test string 2"], "options": { "delimiter": "-" } })
      ),
      Ok(json!(["Test-String-1", "Test-String-2"]))
    );
    assert_eq!(
      change_case(
        "capitalCase",
        json!({ "on": ["test string", 1, "test string 2", { "field": "value" }] })
      ),
      Ok(json!(["Test String", 1, "Test String 2", { "field": "value" }]))
    );
  }

  #[test]
  fn test_object_key_and_value_options() {
    assert_eq!(
      change_case("capitalCase", json!({ "on": test_object(), "options": { "convertKeys": true } })),
      Ok(json!({ "Field 1": "Test String 1", "Field 2": "Test String 2" }))
    );
    assert_eq!(
      change_case(
        "capitalCase",
        json!({ "on": test_object(), "options": { "convertKeys": true, "convertValues": false } })
      ),
      Ok(json!({ "Field 1": "test string 1", "Field 2": "test string 2" }))
    );
    assert_eq!(
      change_case(
        "capitalCase",
        json!({ "on": test_object(), "options": { "convertKeys": true, "delimiter": "-" } })
      ),
      Ok(json!({ "Field-1": "Test-String-1", "Field-2": "Test-String-2" }))
    );
  }

  #[test]
  fn test_nested_objects_are_left_alone() {
    assert_eq!(
      change_case(
        "capitalCase",
        json!({ "on": { "field_1": "test string 1", "field_3": { "nested_1": "nested value 1" } } })
      ),
      Ok(json!({ "field_1": "Test String 1", "field_3": { "nested_1": "nested value 1" } }))
    );
  }

  #[test]
  fn test_non_string_on_is_returned() {
    assert_eq!(change_case("capitalCase", json!({ "on": 3.14 })), Ok(json!(3.14)));
  }
}
