//! Named hooks a ref can point at.
//!
//! - A [`Transformer`] rewrites the resolved content of a ref
//!   (`_ref: { path, transformer: name }`).
//! - A [`ContentResolver`] produces the content of a ref instead of the
//!   document loader (`_ref: { path, resolver: name }`).

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::BoxError;

/// Rewrites the resolved content of a ref.
pub trait Transformer: Send + Sync {
  fn transform(&self, node: Value, vars: &Value) -> Result<Value, BoxError>;
}

impl<F> Transformer for F
where
  F: Fn(Value, &Value) -> Result<Value, BoxError> + Send + Sync,
{
  fn transform(&self, node: Value, vars: &Value) -> Result<Value, BoxError> {
    self(node, vars)
  }
}

/// Produces ref content in place of the document loader.
#[async_trait]
pub trait ContentResolver: Send + Sync {
  /// `path` is the normalised ref path, if the ref has one.
  async fn resolve(&self, path: Option<&str>, vars: &Value) -> Result<Value, BoxError>;
}

/// Transformers by name.
#[derive(Clone, Default)]
pub struct TransformerRegistry {
  transformers: HashMap<String, Arc<dyn Transformer>>,
}

impl TransformerRegistry {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn register(&mut self, name: impl Into<String>, transformer: impl Transformer + 'static) {
    self.transformers.insert(name.into(), Arc::new(transformer));
  }

  pub fn get(&self, name: &str) -> Option<Arc<dyn Transformer>> {
    self.transformers.get(name).cloned()
  }
}

/// Content resolvers by name.
#[derive(Clone, Default)]
pub struct ContentResolverRegistry {
  resolvers: HashMap<String, Arc<dyn ContentResolver>>,
}

impl ContentResolverRegistry {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn register(&mut self, name: impl Into<String>, resolver: impl ContentResolver + 'static) {
    self.resolvers.insert(name.into(), Arc::new(resolver));
  }

  pub fn get(&self, name: &str) -> Option<Arc<dyn ContentResolver>> {
    self.resolvers.get(name).cloned()
  }
}
