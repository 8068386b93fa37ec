//! Server-side request handling.
//!
//! A [`RequestRunner`] looks up a page request in the build artifact,
//! evaluates its connection and request properties with the server operators,
//! and hands them to the [`RequestResolver`] registered for the connection and
//! request types.

mod cookie;
mod error;
mod resolver;
mod runner;

pub use cookie::set_id_token_cookie;
pub use error::{ApiError, BoxError, RequestError};
pub use resolver::{
  ConnectionRegistry, RequestCall, RequestResolver, ResolverInput, call_request_resolver,
};
pub use runner::{RequestContext, RequestResponse, RequestRunner};
