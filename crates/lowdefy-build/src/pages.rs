use std::collections::BTreeSet;

use lowdefy_config::{EventDef, RequestDef};
use serde_json::{Map, Value};

use crate::error::BuildError;
use crate::types::UsedTypes;

/// Validate and normalise every page.
///
/// Each page is the root block of a block tree. Blocks are checked for `id`
/// and `type`, events are normalised to `{try, catch}`, and requests defined
/// anywhere in the tree are collected into the page's `requests` list.
pub fn build_pages(
  components: &Value,
  connection_ids: &BTreeSet<String>,
  used: &mut UsedTypes,
) -> Result<Vec<Value>, BuildError> {
  let pages = match components.get("pages") {
    None | Some(Value::Null) => return Ok(Vec::new()),
    Some(Value::Array(items)) => items,
    Some(_) => return Err(BuildError::configuration("lowdefy.pages is not an array.")),
  };

  let mut page_ids = BTreeSet::new();
  let mut built = Vec::with_capacity(pages.len());
  for page in pages {
    let page_id = match page.get("id") {
      Some(Value::String(id)) => id.clone(),
      None | Some(Value::Null) => return Err(BuildError::configuration("Page id missing.")),
      Some(other) => {
        return Err(BuildError::configuration(format!(
          "Page id is not a string. Received {}.",
          other
        )));
      }
    };
    if !page_ids.insert(page_id.clone()) {
      return Err(BuildError::configuration(format!(
        "Duplicate pageId \"{}\".",
        page_id
      )));
    }
    if !page.get("type").is_some_and(Value::is_string) {
      return Err(BuildError::configuration(format!(
        "Page type is not a string at page \"{}\".",
        page_id
      )));
    }

    let mut builder = PageBuilder {
      page_id: page_id.clone(),
      connection_ids,
      used: &mut *used,
      block_ids: BTreeSet::new(),
      request_ids: BTreeSet::new(),
      requests: Vec::new(),
    };
    let mut page = builder.build_block(page.clone())?;
    let requests = builder.requests;

    if let Value::Object(map) = &mut page {
      map.insert("pageId".to_string(), Value::String(page_id));
      map.insert(
        "requests".to_string(),
        serde_json::to_value(requests).map_err(|e| BuildError::Serialize {
          path: "requests".to_string(),
          source: e,
        })?,
      );
    }
    built.push(page);
  }
  Ok(built)
}

struct PageBuilder<'a> {
  page_id: String,
  connection_ids: &'a BTreeSet<String>,
  used: &'a mut UsedTypes,
  block_ids: BTreeSet<String>,
  request_ids: BTreeSet<String>,
  requests: Vec<RequestDef>,
}

impl PageBuilder<'_> {
  fn error(&self, message: String) -> BuildError {
    BuildError::configuration(message)
  }

  fn build_block(&mut self, block: Value) -> Result<Value, BuildError> {
    let mut block = match block {
      Value::Object(block) => block,
      other => {
        return Err(self.error(format!(
          "Block is not an object on page \"{}\". Received {}.",
          self.page_id, other
        )));
      }
    };

    let block_id = match block.get("id") {
      Some(Value::String(id)) => id.clone(),
      None | Some(Value::Null) => {
        return Err(self.error(format!("Block id missing at page \"{}\".", self.page_id)));
      }
      Some(other) => {
        return Err(self.error(format!(
          "Block id is not a string at page \"{}\". Received {}.",
          self.page_id, other
        )));
      }
    };
    if !self.block_ids.insert(block_id.clone()) {
      return Err(self.error(format!(
        "Duplicate blockId \"{}\" on page \"{}\".",
        block_id, self.page_id
      )));
    }
    match block.get("type") {
      Some(Value::String(block_type)) => {
        self.used.blocks.insert(block_type.clone());
      }
      _ => {
        return Err(self.error(format!(
          "Block type is not a string at block \"{}\" on page \"{}\".",
          block_id, self.page_id
        )));
      }
    }

    if let Some(requests) = block.remove("requests") {
      let Value::Array(requests) = requests else {
        return Err(self.error(format!(
          "Requests at block \"{}\" on page \"{}\" is not an array.",
          block_id, self.page_id
        )));
      };
      for request in requests {
        self.build_request(&block_id, request)?;
      }
    }

    if let Some(events) = block.remove("events") {
      let Value::Object(events) = events else {
        return Err(self.error(format!(
          "Events at block \"{}\" on page \"{}\" is not an object.",
          block_id, self.page_id
        )));
      };
      let mut built = Map::with_capacity(events.len());
      for (name, event) in events {
        let event = self.build_event(&block_id, &name, event)?;
        built.insert(name, event);
      }
      block.insert("events".to_string(), Value::Object(built));
    }

    let children = block.remove("blocks");
    let areas = block.remove("areas");

    for value in block.values() {
      self.used.collect_operators(value, false);
    }
    if let Some(properties) = block.get("properties") {
      self.used.collect_icons(properties);
    }

    if let Some(children) = children {
      block.insert("blocks".to_string(), self.build_children(&block_id, children)?);
    }

    if let Some(areas) = areas {
      let Value::Object(areas) = areas else {
        return Err(self.error(format!(
          "Areas at block \"{}\" on page \"{}\" is not an object.",
          block_id, self.page_id
        )));
      };
      let mut built = Map::with_capacity(areas.len());
      for (area_name, area) in areas {
        let area = match area {
          Value::Object(mut area) => {
            if let Some(children) = area.remove("blocks") {
              area.insert("blocks".to_string(), self.build_children(&block_id, children)?);
            }
            Value::Object(area)
          }
          other => other,
        };
        built.insert(area_name, area);
      }
      block.insert("areas".to_string(), Value::Object(built));
    }

    Ok(Value::Object(block))
  }

  fn build_children(&mut self, block_id: &str, children: Value) -> Result<Value, BuildError> {
    let Value::Array(children) = children else {
      return Err(self.error(format!(
        "Blocks at block \"{}\" on page \"{}\" is not an array.",
        block_id, self.page_id
      )));
    };
    let mut built = Vec::with_capacity(children.len());
    for child in children {
      built.push(self.build_block(child)?);
    }
    Ok(Value::Array(built))
  }

  fn build_event(&mut self, block_id: &str, name: &str, event: Value) -> Result<Value, BuildError> {
    let location = format!(
      "on event \"{}\" at block \"{}\" on page \"{}\"",
      name, block_id, self.page_id
    );

    let lists: Vec<&Value> = match &event {
      Value::Array(_) => vec![&event],
      Value::Object(map) => ["try", "catch"]
        .iter()
        .filter_map(|key| map.get(*key))
        .collect(),
      _ => {
        return Err(self.error(format!(
          "Actions must be an array or an object with \"try\" and \"catch\" {}.",
          location
        )));
      }
    };

    for list in lists {
      let Value::Array(actions) = list else {
        return Err(self.error(format!("Actions must be an array {}.", location)));
      };
      for action in actions {
        let action_id = match action.get("id") {
          Some(Value::String(id)) => id,
          _ => return Err(self.error(format!("Action id missing {}.", location))),
        };
        match action.get("type") {
          Some(Value::String(action_type)) => {
            self.used.actions.insert(action_type.clone());
          }
          _ => {
            return Err(self.error(format!(
              "Action type is not a string at action \"{}\" {}.",
              action_id, location
            )));
          }
        }
      }
    }

    let event: EventDef = serde_json::from_value(event)
      .map_err(|e| self.error(format!("Invalid event {}: {}.", location, e)))?;
    serde_json::to_value(&event).map_err(|e| BuildError::Serialize {
      path: format!("pages/{}", self.page_id),
      source: e,
    })
  }

  fn build_request(&mut self, block_id: &str, request: Value) -> Result<(), BuildError> {
    let request_id = match request.get("id") {
      Some(Value::String(id)) => id.clone(),
      _ => {
        return Err(self.error(format!(
          "Request id missing at block \"{}\" on page \"{}\".",
          block_id, self.page_id
        )));
      }
    };
    if !self.request_ids.insert(request_id.clone()) {
      return Err(self.error(format!(
        "Duplicate requestId \"{}\" on page \"{}\".",
        request_id, self.page_id
      )));
    }
    if !request.get("type").is_some_and(Value::is_string) {
      return Err(self.error(format!(
        "Request type is not a string at request \"{}\" on page \"{}\".",
        request_id, self.page_id
      )));
    }
    let Some(connection_id) = request.get("connectionId").and_then(Value::as_str) else {
      return Err(self.error(format!(
        "Request \"{}\" at page \"{}\" should specify a connectionId.",
        request_id, self.page_id
      )));
    };
    if !self.connection_ids.contains(connection_id) {
      return Err(self.error(format!(
        "Request \"{}\" at page \"{}\" references connection \"{}\", which does not exist.",
        request_id, self.page_id, connection_id
      )));
    }

    let request: RequestDef = serde_json::from_value(request).map_err(|e| {
      self.error(format!(
        "Invalid request \"{}\" on page \"{}\": {}.",
        request_id, self.page_id, e
      ))
    })?;
    self.used.requests.insert(request.request_type.clone());
    self.used.collect_operators(&request.properties, true);
    if let Some(payload) = &request.payload {
      self.used.collect_operators(payload, false);
    }
    self.requests.push(request);
    Ok(())
  }
}
