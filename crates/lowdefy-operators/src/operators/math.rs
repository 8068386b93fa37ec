use serde_json::Value;

use crate::error::{EvalError, EvalResult};
use crate::operator::OperatorCall;
use crate::path::number_value;

fn numbers<'a>(params: &'a Value, call: &OperatorCall<'_>) -> Result<&'a [Value], EvalError> {
  params
    .as_array()
    .map(Vec::as_slice)
    .ok_or_else(|| EvalError::new(format!("{} takes an array type as input.", call.operator)))
}

/// Sum of the numbers in the array. Other items are ignored.
pub(super) fn sum(params: &Value, call: &mut OperatorCall<'_>) -> EvalResult {
  let total = numbers(params, call)?
    .iter()
    .filter_map(Value::as_f64)
    .sum::<f64>();
  Ok(number_value(total))
}

/// Product of the numbers in the array. Other items are ignored.
pub(super) fn product(params: &Value, call: &mut OperatorCall<'_>) -> EvalResult {
  let total = numbers(params, call)?
    .iter()
    .filter_map(Value::as_f64)
    .product::<f64>();
  Ok(number_value(total))
}

fn two_numbers(params: &Value, call: &OperatorCall<'_>) -> Result<(f64, f64), EvalError> {
  match numbers(params, call)? {
    [Value::Number(a), Value::Number(b)] => match (a.as_f64(), b.as_f64()) {
      (Some(a), Some(b)) => Ok((a, b)),
      _ => Err(EvalError::new(format!(
        "{} takes an array of two numbers.",
        call.operator
      ))),
    },
    _ => Err(EvalError::new(format!(
      "{} takes an array of two numbers.",
      call.operator
    ))),
  }
}

pub(super) fn subtract(params: &Value, call: &mut OperatorCall<'_>) -> EvalResult {
  let (a, b) = two_numbers(params, call)?;
  Ok(number_value(a - b))
}

pub(super) fn divide(params: &Value, call: &mut OperatorCall<'_>) -> EvalResult {
  let (a, b) = two_numbers(params, call)?;
  if b == 0.0 {
    return Err(EvalError::new("_divide by zero not allowed."));
  }
  Ok(number_value(a / b))
}
