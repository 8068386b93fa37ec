use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::context::EvaluationContext;
use crate::error::{EvalResult, OperatorError};
use crate::operators;
use crate::parser::Parser;

/// An operator: a function embedded in configuration as `{ _name: params }`.
pub trait Operator: Send + Sync {
  /// Whether this operator receives its params unevaluated.
  ///
  /// Lazy operators (`_if`, `_and`, `_or`) return `true` and evaluate the
  /// parts they need through [`OperatorCall::parse`].
  fn raw_params(&self) -> bool {
    false
  }

  fn evaluate(&self, params: &Value, call: &mut OperatorCall<'_>) -> EvalResult;
}

impl<F> Operator for F
where
  F: Fn(&Value, &mut OperatorCall<'_>) -> EvalResult + Send + Sync,
{
  fn evaluate(&self, params: &Value, call: &mut OperatorCall<'_>) -> EvalResult {
    self(params, call)
  }
}

/// One operator invocation within a parse.
pub struct OperatorCall<'a> {
  /// The operator name, e.g. `_change_case`.
  pub operator: &'a str,
  /// The part after the first `.`, e.g. `camelCase`.
  pub method_name: Option<&'a str>,
  pub location: &'a str,
  pub array_indices: &'a [usize],
  pub context: &'a EvaluationContext,
  pub(crate) parser: &'a Parser<'a>,
  pub(crate) errors: &'a mut Vec<OperatorError>,
}

impl OperatorCall<'_> {
  /// Evaluate a value with the enclosing parser. Errors are collected into
  /// the enclosing parse.
  pub fn parse(&mut self, value: Value) -> Value {
    self
      .parser
      .walk(value, self.location, self.array_indices, self.errors)
  }

  /// The full operator key, e.g. `_change_case.camelCase`.
  pub fn key(&self) -> String {
    match self.method_name {
      Some(method) => format!("{}.{method}", self.operator),
      None => self.operator.to_string(),
    }
  }
}

/// Operators by name.
#[derive(Clone, Default)]
pub struct OperatorRegistry {
  operators: HashMap<String, Arc<dyn Operator>>,
}

impl OperatorRegistry {
  pub fn new() -> Self {
    Self::default()
  }

  /// Operators available while rendering a page.
  pub fn client() -> Self {
    let mut registry = Self::new();
    operators::register_shared(&mut registry);
    operators::register_client(&mut registry);
    registry
  }

  /// Operators available while resolving a request on the server.
  pub fn server() -> Self {
    let mut registry = Self::new();
    operators::register_shared(&mut registry);
    operators::register_server(&mut registry);
    registry
  }

  pub fn register(&mut self, name: impl Into<String>, operator: impl Operator + 'static) {
    self.operators.insert(name.into(), Arc::new(operator));
  }

  pub fn get(&self, name: &str) -> Option<Arc<dyn Operator>> {
    self.operators.get(name).cloned()
  }

  pub fn contains(&self, name: &str) -> bool {
    self.operators.contains_key(name)
  }

  /// Registered names, sorted.
  pub fn names(&self) -> Vec<&str> {
    let mut names: Vec<&str> = self.operators.keys().map(String::as_str).collect();
    names.sort_unstable();
    names
  }
}

impl std::fmt::Debug for OperatorRegistry {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("OperatorRegistry")
      .field("operators", &self.names())
      .finish()
  }
}
