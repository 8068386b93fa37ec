use serde_json::{Map, Value};
use tracing::debug;

use crate::context::EvaluationContext;
use crate::error::OperatorError;
use crate::operator::{OperatorCall, OperatorRegistry};

/// Input of one [`Parser::parse`].
#[derive(Debug, Clone, PartialEq)]
pub struct ParseInput<'a> {
  pub input: Value,
  /// Where the input came from (a block id, request id, ...). Included in
  /// every error.
  pub location: &'a str,
  /// Indices of the enclosing list items, substituted for `$` in paths.
  pub array_indices: &'a [usize],
}

impl<'a> ParseInput<'a> {
  pub fn new(input: Value, location: &'a str) -> Self {
    Self {
      input,
      location,
      array_indices: &[],
    }
  }

  pub fn with_array_indices(mut self, array_indices: &'a [usize]) -> Self {
    self.array_indices = array_indices;
    self
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParseOutput {
  pub output: Value,
  pub errors: Vec<OperatorError>,
}

impl ParseOutput {
  pub fn is_ok(&self) -> bool {
    self.errors.is_empty()
  }
}

/// Evaluates operator expressions embedded in configuration.
///
/// An operator node is an object with exactly one key, starting with `_`.
/// Nodes are evaluated depth-first, children before parents, so an
/// operator's params are already evaluated when it runs. A failing node
/// evaluates to `null` and its error is collected; the rest of the input is
/// still evaluated.
#[derive(Debug, Clone, Copy)]
pub struct Parser<'a> {
  registry: &'a OperatorRegistry,
  context: &'a EvaluationContext,
}

impl<'a> Parser<'a> {
  pub fn new(registry: &'a OperatorRegistry, context: &'a EvaluationContext) -> Self {
    Self { registry, context }
  }

  pub fn context(&self) -> &EvaluationContext {
    self.context
  }

  pub fn parse(&self, input: ParseInput<'_>) -> ParseOutput {
    let mut errors = Vec::new();
    let output = self.walk(
      input.input,
      input.location,
      input.array_indices,
      &mut errors,
    );
    ParseOutput { output, errors }
  }

  pub(crate) fn walk(
    &self,
    value: Value,
    location: &str,
    array_indices: &[usize],
    errors: &mut Vec<OperatorError>,
  ) -> Value {
    match value {
      Value::Object(map) if is_operator_node(&map) => match map.into_iter().next() {
        Some((key, params)) => self.evaluate(&key, params, location, array_indices, errors),
        None => Value::Null,
      },
      Value::Object(map) => {
        let mut output = Map::with_capacity(map.len());
        for (key, child) in map {
          let child = self.walk(child, location, array_indices, errors);
          output.insert(key, child);
        }
        Value::Object(output)
      }
      Value::Array(items) => {
        let mut output = Vec::with_capacity(items.len());
        for item in items {
          output.push(self.walk(item, location, array_indices, errors));
        }
        Value::Array(output)
      }
      other => other,
    }
  }

  fn evaluate(
    &self,
    key: &str,
    params: Value,
    location: &str,
    array_indices: &[usize],
    errors: &mut Vec<OperatorError>,
  ) -> Value {
    let (name, method_name) = match key.split_once('.') {
      Some((name, method)) => (name, Some(method)),
      None => (key, None),
    };

    let Some(operator) = self.registry.get(name) else {
      debug!(operator = name, location, "unknown_operator");
      errors.push(OperatorError::Unknown {
        operator: name.to_string(),
        location: location.to_string(),
      });
      return Value::Null;
    };

    let params = if operator.raw_params() {
      params
    } else {
      self.walk(params, location, array_indices, errors)
    };

    let result = {
      let mut call = OperatorCall {
        operator: name,
        method_name,
        location,
        array_indices,
        context: self.context,
        parser: self,
        errors: &mut *errors,
      };
      operator.evaluate(&params, &mut call)
    };

    match result {
      Ok(value) => value,
      Err(err) => {
        debug!(operator = key, location, error = %err.message, "operator_failed");
        errors.push(OperatorError::Failed {
          operator: key.to_string(),
          message: err.message,
          received: serde_json::to_string(&params).unwrap_or_default(),
          location: location.to_string(),
        });
        Value::Null
      }
    }
  }
}

fn is_operator_node(map: &Map<String, Value>) -> bool {
  map.len() == 1
    && map
      .keys()
      .next()
      .is_some_and(|key| key.len() > 1 && key.starts_with('_'))
}
