use std::collections::BTreeSet;

use lowdefy_config::MenuDef;
use serde_json::{Value, json};

use crate::error::BuildError;

/// Build the app menus.
///
/// When no menus are configured a `default` menu linking every page is
/// created. Links may nest through their own `links` (menu groups); every
/// `pageId` a link points at must be a page.
pub fn build_menus(components: &Value, page_ids: &[String]) -> Result<Vec<MenuDef>, BuildError> {
  let menus: &[Value] = match components.get("menus") {
    None | Some(Value::Null) => &[],
    Some(Value::Array(items)) => items,
    Some(_) => return Err(BuildError::configuration("lowdefy.menus is not an array.")),
  };

  if menus.is_empty() {
    return Ok(vec![default_menu(page_ids)]);
  }

  let pages: BTreeSet<&str> = page_ids.iter().map(String::as_str).collect();
  let mut menu_ids = BTreeSet::new();
  let mut built = Vec::with_capacity(menus.len());
  for menu in menus {
    let menu_id = match menu.get("id") {
      Some(Value::String(id)) => id.clone(),
      None | Some(Value::Null) => return Err(BuildError::configuration("Menu id missing.")),
      Some(other) => {
        return Err(BuildError::configuration(format!(
          "Menu id is not a string. Received {}.",
          other
        )));
      }
    };
    if !menu_ids.insert(menu_id.clone()) {
      return Err(BuildError::configuration(format!(
        "Duplicate menuId \"{}\".",
        menu_id
      )));
    }

    let links = match menu.get("links") {
      None | Some(Value::Null) => Vec::new(),
      Some(Value::Array(links)) => links.clone(),
      Some(_) => {
        return Err(BuildError::configuration(format!(
          "Links at menu \"{}\" is not an array.",
          menu_id
        )));
      }
    };
    check_links(&menu_id, &links, &pages)?;

    built.push(MenuDef {
      menu_id,
      links,
      properties: menu.get("properties").cloned(),
    });
  }
  Ok(built)
}

fn default_menu(page_ids: &[String]) -> MenuDef {
  MenuDef {
    menu_id: "default".to_string(),
    links: page_ids
      .iter()
      .map(|id| json!({ "id": id, "type": "MenuLink", "pageId": id }))
      .collect(),
    properties: None,
  }
}

fn check_links(menu_id: &str, links: &[Value], pages: &BTreeSet<&str>) -> Result<(), BuildError> {
  for link in links {
    let link_id = match link.get("id") {
      Some(Value::String(id)) => id,
      _ => {
        return Err(BuildError::configuration(format!(
          "Menu link id missing at menu \"{}\".",
          menu_id
        )));
      }
    };
    if !link.get("type").is_some_and(Value::is_string) {
      return Err(BuildError::configuration(format!(
        "Menu link type is not a string at link \"{}\" in menu \"{}\".",
        link_id, menu_id
      )));
    }
    if let Some(page_id) = link.get("pageId") {
      let exists = page_id.as_str().is_some_and(|id| pages.contains(id));
      if !exists {
        return Err(BuildError::configuration(format!(
          "Page {} referenced in menu link \"{}\" not found.",
          page_id, link_id
        )));
      }
    }
    match link.get("links") {
      None | Some(Value::Null) => {}
      Some(Value::Array(children)) => check_links(menu_id, children, pages)?,
      Some(_) => {
        return Err(BuildError::configuration(format!(
          "Links at menu link \"{}\" in menu \"{}\" is not an array.",
          link_id, menu_id
        )));
      }
    }
  }
  Ok(())
}
