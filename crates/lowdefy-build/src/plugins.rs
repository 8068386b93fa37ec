//! Plugin import files.
//!
//! The server bundles only the plugin types an app uses. For each category
//! the build writes a module importing those types:
//!
//! ```js
//! import { Button as Button } from '@lowdefy/blocks-antd/blocks';
//! export default {
//!   Button,
//! };
//! ```

use std::collections::BTreeMap;

use lowdefy_config::{PluginTypes, TypeEntry};
use minijinja::{Environment, context};
use serde::Serialize;
use serde_json::Value;

use crate::error::BuildError;

const IMPORT_TEMPLATE: &str = "{% for item in types %}import { {{ item.original }} as {{ item.name }} } from '{{ item.package }}{% if import_path %}/{{ import_path }}{% endif %}';
{% endfor %}export default {
{% for item in types %}  {{ item.name }},
{% endfor %}};
";

const STYLES_TEMPLATE: &str = "{% for style in styles %}@import '{{ style }}';
{% endfor %}{% for name, value in variables %}@{{ name }}: {{ value }};
{% endfor %}";

#[derive(Serialize)]
struct ImportItem<'a> {
  name: &'a str,
  original: &'a str,
  package: &'a str,
}

/// A generated plugin file: its artifact path and content.
#[derive(Debug, Clone, PartialEq)]
pub struct PluginFile {
  pub path: String,
  pub content: String,
}

/// Generate every plugin import file plus `plugins/styles.less`.
pub fn generate_plugin_files(
  plugins: &PluginTypes,
  theme: &Value,
) -> Result<Vec<PluginFile>, BuildError> {
  let imports = [
    ("plugins/actions.js", &plugins.actions, "actions"),
    ("plugins/blocks.js", &plugins.blocks, "blocks"),
    ("plugins/connections.js", &plugins.connections, "connections"),
    ("plugins/icons.js", &plugins.icons, ""),
    (
      "plugins/operatorsClient.js",
      &plugins.operators_client,
      "operators/client",
    ),
    (
      "plugins/operatorsServer.js",
      &plugins.operators_server,
      "operators/server",
    ),
  ];

  let mut files = Vec::with_capacity(imports.len() + 1);
  for (path, types, import_path) in imports {
    files.push(PluginFile {
      path: path.to_string(),
      content: generate_import_file(types, import_path).map_err(|source| {
        BuildError::Template {
          path: path.to_string(),
          source,
        }
      })?,
    });
  }

  let path = "plugins/styles.less";
  files.push(PluginFile {
    path: path.to_string(),
    content: generate_styles_file(&plugins.blocks, theme).map_err(|source| {
      BuildError::Template {
        path: path.to_string(),
        source,
      }
    })?,
  });
  Ok(files)
}

/// Render the import module for one category of types.
pub fn generate_import_file(
  types: &BTreeMap<String, TypeEntry>,
  import_path: &str,
) -> Result<String, minijinja::Error> {
  let items: Vec<ImportItem> = types
    .iter()
    .map(|(name, entry)| ImportItem {
      name,
      original: &entry.original_type_name,
      package: &entry.package,
    })
    .collect();

  environment().render_str(
    IMPORT_TEMPLATE,
    context! { types => items, import_path => import_path },
  )
}

/// Render `styles.less`: the style sheets of the used blocks, then the
/// `theme.lessVariables` overrides.
pub fn generate_styles_file(
  blocks: &BTreeMap<String, TypeEntry>,
  theme: &Value,
) -> Result<String, minijinja::Error> {
  let styles: Vec<String> = blocks
    .values()
    .flat_map(|entry| {
      entry
        .styles
        .iter()
        .map(move |style| format!("{}/{}", entry.package, style))
    })
    .collect();

  let variables: Vec<(String, String)> = theme
    .get("lessVariables")
    .and_then(Value::as_object)
    .map(|vars| {
      vars
        .iter()
        .map(|(name, value)| {
          let value = match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
          };
          (name.clone(), value)
        })
        .collect()
    })
    .unwrap_or_default();

  environment().render_str(
    STYLES_TEMPLATE,
    context! { styles => styles, variables => variables },
  )
}

fn environment() -> Environment<'static> {
  let mut env = Environment::new();
  env.set_keep_trailing_newline(true);
  env
}
