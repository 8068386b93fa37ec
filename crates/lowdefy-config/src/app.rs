use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The `config` section of `lowdefy.yaml` after validation.
///
/// Defaults are always filled in so consumers never branch on absence:
/// `auth.pages.roles` is `{}` and `theme` is `{}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
  #[serde(default)]
  pub auth: AuthConfig,

  #[serde(skip_serializing_if = "Option::is_none")]
  pub base_path: Option<String>,

  #[serde(default)]
  pub theme: serde_json::Map<String, serde_json::Value>,

  /// Keys this crate does not interpret (homePageId, etc.), kept as-is.
  #[serde(flatten)]
  pub other: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthConfig {
  #[serde(default)]
  pub pages: PagesAuth,

  /// Providers, callbacks and the rest of the auth config are passed through.
  #[serde(flatten)]
  pub other: serde_json::Map<String, serde_json::Value>,
}

/// Page access configuration.
///
/// At most one of `protected` and `public` may be set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PagesAuth {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub protected: Option<PageList>,

  #[serde(skip_serializing_if = "Option::is_none")]
  pub public: Option<PageList>,

  /// Role name -> page ids that require the role.
  #[serde(default)]
  pub roles: BTreeMap<String, Vec<String>>,
}

/// Either every page (`true`) or an explicit list of page ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PageList {
  All(bool),
  Listed(Vec<String>),
}

impl PageList {
  /// Whether `page_id` is covered by this list.
  pub fn contains(&self, page_id: &str) -> bool {
    match self {
      Self::All(all) => *all,
      Self::Listed(ids) => ids.iter().any(|id| id == page_id),
    }
  }
}

impl PagesAuth {
  /// Whether a page requires an authenticated user.
  ///
  /// When `protected` is listed every other page is public, and when `public`
  /// is listed every other page is protected. With neither set all pages are
  /// public.
  pub fn is_protected(&self, page_id: &str) -> bool {
    if let Some(protected) = &self.protected {
      return protected.contains(page_id);
    }
    if let Some(public) = &self.public {
      return !public.contains(page_id);
    }
    false
  }
}
