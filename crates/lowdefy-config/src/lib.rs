//! Lowdefy Config
//!
//! This crate contains the serializable types shared by the build pipeline and
//! the runtime. Raw app configuration is mostly free-form JSON, so only the
//! parts with a fixed structure are typed here:
//!
//! - the `config` section of `lowdefy.yaml` ([`AppConfig`])
//! - event and action definitions consumed by the engine ([`EventDef`], [`ActionDef`])
//! - requests, connections and menus ([`RequestDef`], [`ConnectionDef`], [`MenuDef`])
//! - the plugin types map used to wire block/action/operator imports ([`TypesMap`])
//! - the build artifact written by the build and read by the server ([`BuildArtifact`])

mod app;
mod artifact;
mod event;
mod request;
mod types_map;

pub use app::{AppConfig, AuthConfig, PageList, PagesAuth};
pub use artifact::{BuildArtifact, PluginTypes};
pub use event::{ActionDef, EventDef};
pub use request::{ConnectionDef, MenuDef, RequestDef};
pub use types_map::{OperatorTypes, TypeEntry, TypesMap};
