use thiserror::Error;

/// Boxed error returned by transformers and custom ref resolvers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur while resolving references.
#[derive(Debug, Error)]
pub enum RefError {
  /// The referenced file could not be found.
  #[error("Tried to reference file \"{path}\" from \"{referenced_from}\", but file does not exist.")]
  Reference {
    path: String,
    referenced_from: String,
  },

  /// The loader failed while reading a file that exists.
  #[error("Failed to load \"{path}\": {source}")]
  Load {
    path: String,
    #[source]
    source: LoadError,
  },

  /// A `_ref` node is not a string or a valid ref object.
  #[error("Invalid _ref definition {definition} in \"{referenced_from}\".")]
  InvalidDefinition {
    definition: String,
    referenced_from: String,
  },

  /// A file references itself, directly or through other files.
  #[error("Circular reference detected: {}.", cycle.join(" -> "))]
  Circular { cycle: Vec<String> },

  /// The `key` of a ref does not exist in the referenced content.
  #[error("Key \"{key}\" not found in \"{path}\" (ref {ref_id}).")]
  KeyNotFound {
    key: String,
    path: String,
    ref_id: String,
  },

  /// A transformer is not registered or failed.
  #[error("Transformer \"{transformer}\" failed for ref {ref_id} in \"{path}\": {message}")]
  Transformer {
    transformer: String,
    ref_id: String,
    path: String,
    message: String,
  },

  /// A custom ref resolver is not registered or failed.
  #[error("Resolver \"{resolver}\" failed for ref {ref_id}: {message}")]
  Resolver {
    resolver: String,
    ref_id: String,
    message: String,
  },

  /// The file content could not be parsed.
  #[error("Failed to parse \"{path}\": {message}")]
  Parse { path: String, message: String },

  /// References nested deeper than the resolver allows.
  #[error("Maximum reference depth of {depth} exceeded at \"{path}\".")]
  MaxDepth { depth: usize, path: String },
}

/// Errors raised by a [`DocumentLoader`](crate::DocumentLoader).
#[derive(Debug, Error)]
pub enum LoadError {
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  #[error("{0}")]
  Other(String),
}
