use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::fs;

use crate::error::BuildError;

/// Destination of build artifacts.
///
/// Paths are `/`-separated and relative to the build directory.
#[async_trait]
pub trait ArtifactWriter: Send + Sync {
  /// Write one artifact, replacing any previous content.
  async fn write(&self, path: &str, content: &str) -> Result<(), BuildError>;

  /// Remove the output of a previous build.
  async fn clean(&self) -> Result<(), BuildError> {
    Ok(())
  }
}

/// Writes artifacts into a build directory on disk.
pub struct FsWriter {
  directory: PathBuf,
}

impl FsWriter {
  pub fn new(directory: impl Into<PathBuf>) -> Self {
    Self {
      directory: directory.into(),
    }
  }

  pub fn directory(&self) -> &Path {
    &self.directory
  }
}

#[async_trait]
impl ArtifactWriter for FsWriter {
  async fn write(&self, path: &str, content: &str) -> Result<(), BuildError> {
    let full_path = self.directory.join(path);
    let write_error = |source| BuildError::Write {
      path: full_path.display().to_string(),
      source,
    };
    if let Some(parent) = full_path.parent() {
      fs::create_dir_all(parent).await.map_err(write_error)?;
    }
    fs::write(&full_path, content).await.map_err(write_error)
  }

  async fn clean(&self) -> Result<(), BuildError> {
    match fs::remove_dir_all(&self.directory).await {
      Ok(()) => Ok(()),
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
      Err(source) => Err(BuildError::Write {
        path: self.directory.display().to_string(),
        source,
      }),
    }
  }
}

/// Keeps artifacts in memory. Used by tests and `lowdefy check`.
#[derive(Debug, Default)]
pub struct MemoryWriter {
  files: Mutex<BTreeMap<String, String>>,
}

impl MemoryWriter {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn get(&self, path: &str) -> Option<String> {
    self.snapshot().get(path).cloned()
  }

  /// All written artifacts, by path.
  pub fn snapshot(&self) -> BTreeMap<String, String> {
    match self.files.lock() {
      Ok(files) => files.clone(),
      Err(poisoned) => poisoned.into_inner().clone(),
    }
  }
}

#[async_trait]
impl ArtifactWriter for MemoryWriter {
  async fn write(&self, path: &str, content: &str) -> Result<(), BuildError> {
    let mut files = self.files.lock().map_err(|_| BuildError::Write {
      path: path.to_string(),
      source: std::io::Error::other("memory writer lock poisoned"),
    })?;
    files.insert(path.to_string(), content.to_string());
    Ok(())
  }

  async fn clean(&self) -> Result<(), BuildError> {
    if let Ok(mut files) = self.files.lock() {
      files.clear();
    }
    Ok(())
  }
}
