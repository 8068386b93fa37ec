//! Built-in actions.

mod link;
mod message;
mod request;
mod state;
mod throw;
mod wait;

pub(crate) use link::Link;
pub(crate) use message::DisplayMessageAction;
pub(crate) use request::Request;
pub(crate) use state::{Reset, SetState};
pub(crate) use throw::Throw;
pub(crate) use wait::Wait;
