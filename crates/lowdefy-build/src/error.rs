use lowdefy_refs::RefError;
use thiserror::Error;

/// Errors that halt a build.
#[derive(Debug, Error)]
pub enum BuildError {
  /// The configuration is structurally invalid.
  #[error("{message}")]
  Configuration { message: String },

  /// A `_ref` could not be resolved.
  #[error(transparent)]
  Ref(#[from] RefError),

  /// Neither `lowdefy.yaml` nor `lowdefy.yml` exists.
  #[error("Could not find \"lowdefy.yaml\" or \"lowdefy.yml\" in the config directory.")]
  MissingEntry,

  /// A types map file could not be read or parsed.
  #[error("Invalid types map \"{path}\": {message}")]
  TypesMap { path: String, message: String },

  /// A plugin import template failed to render.
  #[error("Failed to generate \"{path}\": {source}")]
  Template {
    path: String,
    #[source]
    source: minijinja::Error,
  },

  /// An artifact could not be serialized.
  #[error("Failed to serialize \"{path}\": {source}")]
  Serialize {
    path: String,
    #[source]
    source: serde_json::Error,
  },

  /// An artifact could not be written.
  #[error("Failed to write build artifact \"{path}\": {source}")]
  Write {
    path: String,
    #[source]
    source: std::io::Error,
  },
}

impl BuildError {
  pub(crate) fn configuration(message: impl Into<String>) -> Self {
    BuildError::Configuration {
      message: message.into(),
    }
  }
}
