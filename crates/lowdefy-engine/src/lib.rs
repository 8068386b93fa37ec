//! Lowdefy Engine
//!
//! Runs the actions bound to block events. A page's [`PageContext`] holds
//! its state and request responses; each block's [`Events`] runs action
//! chains against it through a shared [`ActionDispatcher`], which owns the
//! action and operator registries and the injected [`Services`].
//!
//! Concurrent triggers are independent: state writes are last-write-wins and
//! [`PageContext::reset`] bounces every chain started before it.

mod action;
mod actions;
mod error;
mod events;
mod page;
mod services;

pub use action::{Action, ActionContext, ActionOutcome, ActionRegistry};
pub use error::{ActionError, BoxError};
pub use events::{ActionDispatcher, ActionHistoryEntry, Events, TriggerResult};
pub use page::PageContext;
pub use services::{
  DisplayMessage, Message, MessageLog, MessageStatus, NavigationLog, Navigator, NoRequests,
  RequestCaller, Services,
};
