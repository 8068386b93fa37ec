//! Reference resolution for Lowdefy configuration.
//!
//! Configuration is split across files that include each other with `_ref`:
//!
//! ```yaml
//! pages:
//!   - _ref: pages/home.yaml
//!   - _ref:
//!       path: pages/item.yaml.njk
//!       vars:
//!         title: Items
//! ```
//!
//! [`RefResolver`] loads the root document through a [`DocumentLoader`],
//! replaces every `_ref` with the referenced content, and records which
//! documents referenced which in a [`DependencyGraph`]. Circular references
//! fail with [`RefError::Circular`].

mod content;
mod definition;
mod error;
mod graph;
mod loader;
mod resolver;
mod transformer;
mod vars;

pub use content::parse_content;
pub use definition::{RefDefinition, make_ref_definition, resolve_ref_path};
pub use error::{BoxError, LoadError, RefError};
pub use graph::DependencyGraph;
pub use loader::{DocumentLoader, FsLoader, MemoryLoader};
pub use resolver::{MAX_REF_DEPTH, RefResolver, ResolvedDocument};
pub use transformer::{ContentResolver, ContentResolverRegistry, Transformer, TransformerRegistry};
pub use vars::{apply_vars, get_value};
