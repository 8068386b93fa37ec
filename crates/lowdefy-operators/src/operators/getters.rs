use serde_json::Value;

use crate::error::{EvalError, EvalResult};
use crate::operator::OperatorCall;
use crate::path::{apply_array_indices, get_path};

/// Read from `object` as directed by getter params.
///
/// - `true` or `{ all: true }`: the whole object
/// - a string or integer: the value at that path, `$` replaced by the array
///   indices of the call
/// - `{ key, default }`: the value at `key`, or `default` when missing
fn get_from_object(params: &Value, object: &Value, call: &OperatorCall<'_>) -> EvalResult {
  let key = match params {
    Value::Bool(true) => return Ok(object.clone()),
    Value::String(_) | Value::Number(_) if is_key(params) => params,
    Value::Object(map) => {
      let default = map.get("default").cloned().unwrap_or(Value::Null);
      match map.get("key") {
        Some(Value::Null) => return Ok(default),
        _ if map.get("all") == Some(&Value::Bool(true)) => return Ok(object.clone()),
        Some(key) if is_key(key) => {
          return Ok(lookup(object, key, call.array_indices).unwrap_or(default));
        }
        _ => {
          return Err(EvalError::new(format!(
            "{}.key must be of type string or integer.",
            call.operator
          )));
        }
      }
    }
    _ => {
      return Err(EvalError::new(format!(
        "{} params must be of type string, integer, boolean or object.",
        call.operator
      )));
    }
  };
  Ok(lookup(object, key, call.array_indices).unwrap_or(Value::Null))
}

fn is_key(value: &Value) -> bool {
  value.is_string() || value.is_u64()
}

fn lookup(object: &Value, key: &Value, array_indices: &[usize]) -> Option<Value> {
  let path = match key {
    Value::String(s) => apply_array_indices(s, array_indices),
    other => other.to_string(),
  };
  get_path(object, &path).cloned()
}

pub(super) fn state(params: &Value, call: &mut OperatorCall<'_>) -> EvalResult {
  get_from_object(params, &call.context.state, call)
}

pub(super) fn input(params: &Value, call: &mut OperatorCall<'_>) -> EvalResult {
  get_from_object(params, &call.context.input, call)
}

pub(super) fn global(params: &Value, call: &mut OperatorCall<'_>) -> EvalResult {
  get_from_object(params, &call.context.global, call)
}

pub(super) fn url_query(params: &Value, call: &mut OperatorCall<'_>) -> EvalResult {
  get_from_object(params, &call.context.url_query, call)
}

pub(super) fn user(params: &Value, call: &mut OperatorCall<'_>) -> EvalResult {
  get_from_object(params, &call.context.user, call)
}

pub(super) fn event(params: &Value, call: &mut OperatorCall<'_>) -> EvalResult {
  get_from_object(params, &call.context.event, call)
}

pub(super) fn actions(params: &Value, call: &mut OperatorCall<'_>) -> EvalResult {
  get_from_object(params, &call.context.actions, call)
}

pub(super) fn event_log(params: &Value, call: &mut OperatorCall<'_>) -> EvalResult {
  get_from_object(params, &call.context.event_log, call)
}

/// A request response, by request id.
pub(super) fn request(params: &Value, call: &mut OperatorCall<'_>) -> EvalResult {
  get_from_object(params, &call.context.requests, call)
}

pub(super) fn payload(params: &Value, call: &mut OperatorCall<'_>) -> EvalResult {
  get_from_object(params, &call.context.payload, call)
}

/// An entry of the call's array indices.
pub(super) fn index(params: &Value, call: &mut OperatorCall<'_>) -> EvalResult {
  let indices = Value::from(call.array_indices.to_vec());
  get_from_object(params, &indices, call)
}
