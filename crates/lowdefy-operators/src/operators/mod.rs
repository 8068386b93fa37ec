//! Built-in operators.

mod base64;
mod change_case;
mod getters;
mod intl;
mod json;
mod logic;
mod math;
mod menu;

use serde_json::Value;

use crate::error::EvalError;
use crate::operator::{OperatorCall, OperatorRegistry};

/// Operators available on both the client and the server.
pub(crate) fn register_shared(registry: &mut OperatorRegistry) {
  registry.register("_if", logic::If);
  registry.register("_and", logic::And);
  registry.register("_or", logic::Or);
  registry.register("_not", logic::not);
  registry.register("_eq", logic::eq);
  registry.register("_ne", logic::ne);
  registry.register("_gt", logic::gt);
  registry.register("_gte", logic::gte);
  registry.register("_lt", logic::lt);
  registry.register("_lte", logic::lte);

  registry.register("_sum", math::sum);
  registry.register("_product", math::product);
  registry.register("_subtract", math::subtract);
  registry.register("_divide", math::divide);

  registry.register("_json", json::json);
  registry.register("_base64", base64::base64);
  registry.register("_change_case", change_case::change_case);
  registry.register("_intl", intl::intl);

  registry.register("_user", getters::user);
}

pub(crate) fn register_client(registry: &mut OperatorRegistry) {
  registry.register("_state", getters::state);
  registry.register("_input", getters::input);
  registry.register("_global", getters::global);
  registry.register("_url_query", getters::url_query);
  registry.register("_event", getters::event);
  registry.register("_actions", getters::actions);
  registry.register("_event_log", getters::event_log);
  registry.register("_request", getters::request);
  registry.register("_index", getters::index);
  registry.register("_menu", menu::menu);
}

pub(crate) fn register_server(registry: &mut OperatorRegistry) {
  registry.register("_payload", getters::payload);
}

/// The method of a `_name.method` operator, or an error naming the methods
/// the operator supports.
fn method<'a>(call: &OperatorCall<'a>, methods: &[&str]) -> Result<&'a str, EvalError> {
  match call.method_name {
    Some(method) if methods.contains(&method) => Ok(method),
    Some(method) => Err(EvalError::new(format!(
      "{}.{method} is not supported, use one of the following: {}.",
      call.operator,
      methods.join(", ")
    ))),
    None => Err(EvalError::new(format!(
      "{} requires a method, use one of the following: {}.",
      call.operator,
      methods.join(", ")
    ))),
  }
}

/// The `on` argument of a method operator: `{ on }`, `[on, ...]` or the
/// params themselves.
fn on_param(params: &Value) -> &Value {
  match params {
    Value::Object(map) => map.get("on").unwrap_or(&Value::Null),
    Value::Array(items) => items.first().unwrap_or(&Value::Null),
    other => other,
  }
}
