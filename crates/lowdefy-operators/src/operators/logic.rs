use std::cmp::Ordering;

use serde_json::Value;

use crate::error::{EvalError, EvalResult};
use crate::operator::{Operator, OperatorCall};
use crate::path::is_truthy;

/// `{ test, then, else }`, evaluating only the branch selected by `test`.
pub(super) struct If;

impl Operator for If {
  fn raw_params(&self) -> bool {
    true
  }

  fn evaluate(&self, params: &Value, call: &mut OperatorCall<'_>) -> EvalResult {
    let Value::Object(map) = params else {
      return Err(EvalError::new("_if takes an object as input."));
    };
    let test = call.parse(map.get("test").cloned().unwrap_or(Value::Null));
    let branch = match test {
      Value::Bool(true) => "then",
      Value::Bool(false) => "else",
      _ => {
        return Err(EvalError::new(
          "_if takes a boolean type for parameter test.",
        ));
      }
    };
    Ok(call.parse(map.get(branch).cloned().unwrap_or(Value::Null)))
  }
}

/// `true` when every item is truthy. Stops at the first falsy item.
pub(super) struct And;

impl Operator for And {
  fn raw_params(&self) -> bool {
    true
  }

  fn evaluate(&self, params: &Value, call: &mut OperatorCall<'_>) -> EvalResult {
    let Value::Array(items) = params else {
      return Err(EvalError::new("_and takes an array type."));
    };
    for item in items {
      if !is_truthy(&call.parse(item.clone())) {
        return Ok(Value::Bool(false));
      }
    }
    Ok(Value::Bool(true))
  }
}

/// `true` when any item is truthy. Stops at the first truthy item.
pub(super) struct Or;

impl Operator for Or {
  fn raw_params(&self) -> bool {
    true
  }

  fn evaluate(&self, params: &Value, call: &mut OperatorCall<'_>) -> EvalResult {
    let Value::Array(items) = params else {
      return Err(EvalError::new("_or takes an array type."));
    };
    for item in items {
      if is_truthy(&call.parse(item.clone())) {
        return Ok(Value::Bool(true));
      }
    }
    Ok(Value::Bool(false))
  }
}

pub(super) fn not(params: &Value, _: &mut OperatorCall<'_>) -> EvalResult {
  Ok(Value::Bool(!is_truthy(params)))
}

fn pair<'a>(params: &'a Value, call: &OperatorCall<'_>) -> Result<(&'a Value, &'a Value), EvalError> {
  match params.as_array().map(Vec::as_slice) {
    Some([left, right]) => Ok((left, right)),
    _ => Err(EvalError::new(format!(
      "{} takes an array of length 2 as input.",
      call.operator
    ))),
  }
}

/// Equality where `1` and `1.0` are the same number.
fn loose_eq(left: &Value, right: &Value) -> bool {
  match (left, right) {
    (Value::Number(l), Value::Number(r)) => l.as_f64() == r.as_f64(),
    _ => left == right,
  }
}

/// Numbers compare numerically and strings lexicographically; anything else
/// is unordered.
fn compare(left: &Value, right: &Value) -> Option<Ordering> {
  match (left, right) {
    (Value::Number(l), Value::Number(r)) => l.as_f64()?.partial_cmp(&r.as_f64()?),
    (Value::String(l), Value::String(r)) => Some(l.cmp(r)),
    _ => None,
  }
}

pub(super) fn eq(params: &Value, call: &mut OperatorCall<'_>) -> EvalResult {
  let (left, right) = pair(params, call)?;
  Ok(Value::Bool(loose_eq(left, right)))
}

pub(super) fn ne(params: &Value, call: &mut OperatorCall<'_>) -> EvalResult {
  let (left, right) = pair(params, call)?;
  Ok(Value::Bool(!loose_eq(left, right)))
}

fn ordered(params: &Value, call: &OperatorCall<'_>, accept: fn(Ordering) -> bool) -> EvalResult {
  let (left, right) = pair(params, call)?;
  Ok(Value::Bool(compare(left, right).is_some_and(accept)))
}

pub(super) fn gt(params: &Value, call: &mut OperatorCall<'_>) -> EvalResult {
  ordered(params, call, Ordering::is_gt)
}

pub(super) fn gte(params: &Value, call: &mut OperatorCall<'_>) -> EvalResult {
  ordered(params, call, Ordering::is_ge)
}

pub(super) fn lt(params: &Value, call: &mut OperatorCall<'_>) -> EvalResult {
  ordered(params, call, Ordering::is_lt)
}

pub(super) fn lte(params: &Value, call: &mut OperatorCall<'_>) -> EvalResult {
  ordered(params, call, Ordering::is_le)
}
