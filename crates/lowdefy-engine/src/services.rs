//! Collaborators injected into the dispatcher: message display, navigation
//! and request calls.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::BoxError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageStatus {
  Loading,
  Success,
  Error,
  Info,
  Warning,
}

impl MessageStatus {
  pub fn parse(status: &str) -> Option<Self> {
    match status {
      "loading" => Some(MessageStatus::Loading),
      "success" => Some(MessageStatus::Success),
      "error" => Some(MessageStatus::Error),
      "info" => Some(MessageStatus::Info),
      "warning" => Some(MessageStatus::Warning),
      _ => None,
    }
  }
}

/// A user-facing message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
  pub content: String,
  pub status: MessageStatus,
  /// Seconds the message stays visible.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub duration: Option<f64>,
}

/// Shows messages to the user.
pub trait DisplayMessage: Send + Sync {
  fn display(&self, message: Message);
}

/// Moves the user to another page or URL.
#[async_trait]
pub trait Navigator: Send + Sync {
  async fn navigate(&self, link: &Value) -> Result<(), BoxError>;
}

/// Calls a page request on the server.
#[async_trait]
pub trait RequestCaller: Send + Sync {
  async fn call(&self, request_id: &str, payload: Value) -> Result<Value, BoxError>;
}

/// Records displayed messages.
#[derive(Debug, Default)]
pub struct MessageLog {
  messages: Mutex<Vec<Message>>,
}

impl MessageLog {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn messages(&self) -> Vec<Message> {
    self
      .messages
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .clone()
  }
}

impl DisplayMessage for MessageLog {
  fn display(&self, message: Message) {
    self
      .messages
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .push(message);
  }
}

/// Records navigations.
#[derive(Debug, Default)]
pub struct NavigationLog {
  links: Mutex<Vec<Value>>,
}

impl NavigationLog {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn links(&self) -> Vec<Value> {
    self
      .links
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .clone()
  }
}

#[async_trait]
impl Navigator for NavigationLog {
  async fn navigate(&self, link: &Value) -> Result<(), BoxError> {
    self
      .links
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .push(link.clone());
    Ok(())
  }
}

/// Fails every request; used when no server is attached.
#[derive(Debug, Default)]
pub struct NoRequests;

#[async_trait]
impl RequestCaller for NoRequests {
  async fn call(&self, request_id: &str, _payload: Value) -> Result<Value, BoxError> {
    Err(format!("No request caller configured for request \"{request_id}\".").into())
  }
}

/// The collaborators available to actions.
#[derive(Clone)]
pub struct Services {
  pub display: Arc<dyn DisplayMessage>,
  pub navigator: Arc<dyn Navigator>,
  pub requests: Arc<dyn RequestCaller>,
}

impl Services {
  pub fn new(
    display: Arc<dyn DisplayMessage>,
    navigator: Arc<dyn Navigator>,
    requests: Arc<dyn RequestCaller>,
  ) -> Self {
    Self {
      display,
      navigator,
      requests,
    }
  }
}

impl Default for Services {
  fn default() -> Self {
    Self::new(
      Arc::new(MessageLog::new()),
      Arc::new(NavigationLog::new()),
      Arc::new(NoRequests),
    )
  }
}

impl std::fmt::Debug for Services {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Services").finish_non_exhaustive()
  }
}
