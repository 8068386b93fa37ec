use std::collections::BTreeSet;

use lowdefy_config::ConnectionDef;
use serde_json::Value;

use crate::error::BuildError;
use crate::types::UsedTypes;

/// Validate the `connections` section.
///
/// Connection properties are evaluated on the server, so their operators are
/// recorded as server operators.
pub fn build_connections(
  components: &Value,
  used: &mut UsedTypes,
) -> Result<Vec<ConnectionDef>, BuildError> {
  let connections = match components.get("connections") {
    None | Some(Value::Null) => return Ok(Vec::new()),
    Some(Value::Array(items)) => items,
    Some(_) => {
      return Err(BuildError::configuration(
        "lowdefy.connections is not an array.",
      ));
    }
  };

  let mut ids = BTreeSet::new();
  let mut built = Vec::with_capacity(connections.len());
  for connection in connections {
    let id = match connection.get("id") {
      Some(Value::String(id)) => id,
      None | Some(Value::Null) => return Err(BuildError::configuration("Connection id missing.")),
      Some(other) => {
        return Err(BuildError::configuration(format!(
          "Connection id is not a string. Received {}.",
          other
        )));
      }
    };
    if !ids.insert(id.clone()) {
      return Err(BuildError::configuration(format!(
        "Duplicate connectionId \"{}\".",
        id
      )));
    }
    if !connection.get("type").is_some_and(Value::is_string) {
      return Err(BuildError::configuration(format!(
        "Connection type is not a string at connection \"{}\".",
        id
      )));
    }

    let def: ConnectionDef = serde_json::from_value(connection.clone()).map_err(|e| {
      BuildError::configuration(format!("Invalid connection \"{}\": {}.", id, e))
    })?;
    used.connections.insert(def.connection_type.clone());
    used.collect_operators(&def.properties, true);
    built.push(def);
  }
  Ok(built)
}
