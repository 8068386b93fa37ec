use std::future::Future;
use std::pin::Pin;

use serde_json::{Map, Value};
use tracing::{debug, info, instrument};

use crate::content::parse_content;
use crate::definition::{RefDefinition, make_ref_definition, resolve_ref_path};
use crate::error::RefError;
use crate::graph::DependencyGraph;
use crate::loader::DocumentLoader;
use crate::transformer::{ContentResolverRegistry, TransformerRegistry};
use crate::vars::{apply_vars, get_value};

/// Refs nested deeper than this fail with [`RefError::MaxDepth`].
pub const MAX_REF_DEPTH: usize = 1000;

/// Result of resolving a root document.
#[derive(Debug, Clone)]
pub struct ResolvedDocument {
  /// The configuration tree with every `_ref` substituted.
  pub value: Value,
  /// Which documents referenced which.
  pub graph: DependencyGraph,
}

/// Resolves `_ref` nodes in a tree of configuration documents.
pub struct RefResolver<L: DocumentLoader> {
  loader: L,
  transformers: TransformerRegistry,
  resolvers: ContentResolverRegistry,
  max_depth: usize,
}

impl<L: DocumentLoader> RefResolver<L> {
  pub fn new(loader: L) -> Self {
    Self {
      loader,
      transformers: TransformerRegistry::new(),
      resolvers: ContentResolverRegistry::new(),
      max_depth: MAX_REF_DEPTH,
    }
  }

  pub fn with_transformers(mut self, transformers: TransformerRegistry) -> Self {
    self.transformers = transformers;
    self
  }

  pub fn with_resolvers(mut self, resolvers: ContentResolverRegistry) -> Self {
    self.resolvers = resolvers;
    self
  }

  pub fn with_max_depth(mut self, max_depth: usize) -> Self {
    self.max_depth = max_depth;
    self
  }

  pub fn loader(&self) -> &L {
    &self.loader
  }

  /// Load `root_path` and resolve every ref reachable from it.
  ///
  /// Sibling refs are resolved in document order.
  #[instrument(skip(self))]
  pub async fn resolve(&self, root_path: &str) -> Result<ResolvedDocument, RefError> {
    let root_path = resolve_ref_path("", root_path);
    info!(root = %root_path, "ref_resolution_started");

    let text = self
      .loader
      .load(&root_path)
      .await
      .map_err(|source| RefError::Load {
        path: root_path.clone(),
        source,
      })?
      .ok_or_else(|| RefError::Reference {
        path: root_path.clone(),
        referenced_from: root_path.clone(),
      })?;

    let no_vars = Value::Object(Map::new());
    let content = apply_vars(parse_content(&root_path, &text, &no_vars)?, &no_vars);

    let mut graph = DependencyGraph::new();
    graph.add_node(&root_path);
    let stack = vec![root_path.clone()];
    let value = self
      .resolve_node(content, &root_path, &stack, &mut graph, 0)
      .await?;

    info!(
      root = %root_path,
      documents = graph.len(),
      "ref_resolution_completed"
    );
    Ok(ResolvedDocument { value, graph })
  }

  /// Walk a node, replacing `_ref` objects with their resolved content.
  fn resolve_node<'a>(
    &'a self,
    node: Value,
    current: &'a str,
    stack: &'a [String],
    graph: &'a mut DependencyGraph,
    depth: usize,
  ) -> Pin<Box<dyn Future<Output = Result<Value, RefError>> + Send + 'a>> {
    Box::pin(async move {
      match node {
        Value::Object(map) => {
          if let Some(raw) = map.get("_ref") {
            let def = make_ref_definition(raw, current)?;
            return self.resolve_ref(def, current, stack, graph, depth).await;
          }
          let mut out = Map::with_capacity(map.len());
          for (key, value) in map {
            let resolved = self
              .resolve_node(value, current, stack, graph, depth)
              .await?;
            out.insert(key, resolved);
          }
          Ok(Value::Object(out))
        }
        Value::Array(items) => {
          let mut out = Vec::with_capacity(items.len());
          for item in items {
            out.push(self.resolve_node(item, current, stack, graph, depth).await?);
          }
          Ok(Value::Array(out))
        }
        other => Ok(other),
      }
    })
  }

  async fn resolve_ref(
    &self,
    def: RefDefinition,
    current: &str,
    stack: &[String],
    graph: &mut DependencyGraph,
    depth: usize,
  ) -> Result<Value, RefError> {
    let target = def.path.clone().unwrap_or_else(|| current.to_string());

    if depth >= self.max_depth {
      return Err(RefError::MaxDepth {
        depth: self.max_depth,
        path: target,
      });
    }

    let mut child_stack = stack.to_vec();
    if let Some(path) = &def.path {
      if let Some(idx) = stack.iter().position(|p| p == path) {
        let mut cycle = stack[idx..].to_vec();
        cycle.push(path.clone());
        return Err(RefError::Circular { cycle });
      }
      graph.add_edge(current, path);
      child_stack.push(path.clone());
    }

    let content = self.load_ref_content(&def, current).await?;
    let content = apply_vars(content, &def.vars);
    let resolved = self
      .resolve_node(content, &target, &child_stack, graph, depth + 1)
      .await?;

    let projected = match &def.key {
      Some(key) => get_value(&resolved, key)
        .cloned()
        .ok_or_else(|| RefError::KeyNotFound {
          key: key.clone(),
          path: target.clone(),
          ref_id: def.id.clone(),
        })?,
      None => resolved,
    };

    let result = match &def.transformer {
      Some(name) => {
        let transformer = self
          .transformers
          .get(name)
          .ok_or_else(|| RefError::Transformer {
            transformer: name.clone(),
            ref_id: def.id.clone(),
            path: target.clone(),
            message: "transformer is not registered".to_string(),
          })?;
        transformer
          .transform(projected, &def.vars)
          .map_err(|e| RefError::Transformer {
            transformer: name.clone(),
            ref_id: def.id.clone(),
            path: target.clone(),
            message: e.to_string(),
          })?
      }
      None => projected,
    };

    debug!(ref_id = %def.id, path = %target, from = %current, "ref_resolved");
    Ok(result)
  }

  async fn load_ref_content(&self, def: &RefDefinition, current: &str) -> Result<Value, RefError> {
    if let Some(name) = &def.resolver {
      let resolver = self
        .resolvers
        .get(name)
        .ok_or_else(|| RefError::Resolver {
          resolver: name.clone(),
          ref_id: def.id.clone(),
          message: "resolver is not registered".to_string(),
        })?;
      return resolver
        .resolve(def.path.as_deref(), &def.vars)
        .await
        .map_err(|e| RefError::Resolver {
          resolver: name.clone(),
          ref_id: def.id.clone(),
          message: e.to_string(),
        });
    }

    let Some(path) = def.path.as_deref() else {
      return Err(RefError::InvalidDefinition {
        definition: def.original.to_string(),
        referenced_from: current.to_string(),
      });
    };

    let text = self
      .loader
      .load(path)
      .await
      .map_err(|source| RefError::Load {
        path: path.to_string(),
        source,
      })?
      .ok_or_else(|| RefError::Reference {
        path: path.to_string(),
        referenced_from: current.to_string(),
      })?;

    parse_content(path, &text, &def.vars)
  }
}
