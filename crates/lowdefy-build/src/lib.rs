//! Lowdefy Build
//!
//! Compiles an app's configuration directory into the build artifact read by
//! the server:
//!
//! 1. Resolve `_ref`s starting from `lowdefy.yaml` (or `lowdefy.yml`)
//! 2. Validate the `config` section ([`validate_config`])
//! 3. Validate and normalise connections, pages and menus
//! 4. Look up every used plugin type in the [`TypesMap`](lowdefy_config::TypesMap)
//! 5. Write the artifact and the plugin import files through an [`ArtifactWriter`]
//!
//! Any failure halts the build with a [`BuildError`] naming the offending id
//! or path.

mod connections;
mod error;
mod menus;
mod pages;
mod pipeline;
mod plugins;
mod types;
mod validate;
mod writer;

pub use connections::build_connections;
pub use error::BuildError;
pub use menus::build_menus;
pub use pages::build_pages;
pub use pipeline::{BuildConfig, BuildPipeline, Compiled};
pub use plugins::{PluginFile, generate_import_file, generate_plugin_files, generate_styles_file};
pub use types::UsedTypes;
pub use validate::validate_config;
pub use writer::{ArtifactWriter, FsWriter, MemoryWriter};
