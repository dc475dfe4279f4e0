//! Collaborator traits the export flows depend on.
//!
//! Content loading, settings loading, and shortcode expansion are owned by
//! the host system; the flows only ever see these seams, which keeps the
//! pipeline testable without a running host.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::button::ButtonSettings;
use crate::domain::content::{ContentItem, ContentTypeFilter, ExportPreferences};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("store error: {0}")]
    Store(String),
    #[error("resource not found")]
    NotFound,
    #[error("invalid record: {message}")]
    InvalidRecord { message: String },
}

impl RepoError {
    pub fn store(error: impl std::fmt::Display) -> Self {
        Self::Store(error.to_string())
    }

    pub fn invalid_record(message: impl Into<String>) -> Self {
        Self::InvalidRecord {
            message: message.into(),
        }
    }
}

/// Read access to the host's content store. Implementations only surface
/// published items; drafts and archived items are invisible to the flows.
#[async_trait]
pub trait ContentRepo: Send + Sync {
    async fn find_published(&self, id: i64) -> Result<Option<ContentItem>, RepoError>;

    async fn list_published(
        &self,
        filter: ContentTypeFilter,
    ) -> Result<Vec<ContentItem>, RepoError>;
}

/// Read access to the persisted presentation and export preferences.
#[async_trait]
pub trait SettingsRepo: Send + Sync {
    async fn load_button_settings(&self) -> Result<ButtonSettings, RepoError>;

    async fn load_export_preferences(&self) -> Result<ExportPreferences, RepoError>;
}

/// The host's shortcode/content-filter chain. Runs first in the transform
/// pipeline so later stages operate on literal HTML.
pub trait ContentFilters: Send + Sync {
    fn apply(&self, raw: &str) -> String;
}

/// Host-neutral default: content arrives already expanded.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassthroughFilters;

impl ContentFilters for PassthroughFilters {
    fn apply(&self, raw: &str) -> String {
        raw.to_string()
    }
}
