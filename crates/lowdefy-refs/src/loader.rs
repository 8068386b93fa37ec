use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use crate::error::LoadError;

/// Source of configuration documents.
///
/// Paths are `/`-separated and relative to the config root.
#[async_trait]
pub trait DocumentLoader: Send + Sync {
  /// Read a document. Returns `Ok(None)` if it does not exist.
  async fn load(&self, path: &str) -> Result<Option<String>, LoadError>;
}

/// Loads documents from a config directory on disk.
pub struct FsLoader {
  root: PathBuf,
}

impl FsLoader {
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into() }
  }

  pub fn root(&self) -> &Path {
    &self.root
  }
}

#[async_trait]
impl DocumentLoader for FsLoader {
  async fn load(&self, path: &str) -> Result<Option<String>, LoadError> {
    let full_path = self.root.join(path);
    match fs::read_to_string(&full_path).await {
      Ok(content) => Ok(Some(content)),
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
      Err(e) => Err(LoadError::Io(e)),
    }
  }
}

/// Loads documents from memory. Used by tests and embedders.
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
  files: HashMap<String, String>,
}

impl MemoryLoader {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_file(mut self, path: impl Into<String>, content: impl Into<String>) -> Self {
    self.insert(path, content);
    self
  }

  pub fn insert(&mut self, path: impl Into<String>, content: impl Into<String>) {
    self.files.insert(path.into(), content.into());
  }
}

#[async_trait]
impl DocumentLoader for MemoryLoader {
  async fn load(&self, path: &str) -> Result<Option<String>, LoadError> {
    Ok(self.files.get(path).cloned())
  }
}
