use std::collections::{BTreeMap, BTreeSet};

/// Which documents reference which.
///
/// Built while refs are resolved. Paths are config-root relative.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DependencyGraph {
  /// path -> paths it references.
  edges: BTreeMap<String, BTreeSet<String>>,
}

impl DependencyGraph {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn add_node(&mut self, path: &str) {
    self.edges.entry(path.to_string()).or_default();
  }

  pub fn add_edge(&mut self, from: &str, to: &str) {
    self
      .edges
      .entry(from.to_string())
      .or_default()
      .insert(to.to_string());
    self.add_node(to);
  }

  /// All known paths, sorted.
  pub fn paths(&self) -> impl Iterator<Item = &str> {
    self.edges.keys().map(String::as_str)
  }

  /// Paths referenced by `path`.
  pub fn dependencies(&self, path: &str) -> Vec<&str> {
    self
      .edges
      .get(path)
      .map(|deps| deps.iter().map(String::as_str).collect())
      .unwrap_or_default()
  }

  /// Paths that reference `path`.
  pub fn dependents(&self, path: &str) -> Vec<&str> {
    self
      .edges
      .iter()
      .filter(|(_, deps)| deps.contains(path))
      .map(|(from, _)| from.as_str())
      .collect()
  }

  pub fn len(&self) -> usize {
    self.edges.len()
  }

  pub fn is_empty(&self) -> bool {
    self.edges.is_empty()
  }
}
