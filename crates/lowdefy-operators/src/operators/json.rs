use serde_json::Value;

use super::{method, on_param};
use crate::error::{EvalError, EvalResult};
use crate::operator::OperatorCall;

/// `_json.stringify` and `_json.parse`.
pub(super) fn json(params: &Value, call: &mut OperatorCall<'_>) -> EvalResult {
  let on = on_param(params);
  match method(call, &["parse", "stringify"])? {
    "stringify" => serde_json::to_string(on)
      .map(Value::String)
      .map_err(|err| EvalError::new(format!("_json.stringify - {err}"))),
    _ => {
      let Value::String(text) = on else {
        return Err(EvalError::new("_json.parse accepts a string."));
      };
      serde_json::from_str(text).map_err(|err| EvalError::new(format!("_json.parse - {err}")))
    }
  }
}
