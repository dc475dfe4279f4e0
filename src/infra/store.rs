//! File-backed content and settings stores.
//!
//! A deployment points the service at a TOML content library (one document
//! with `[[items]]` tables, usually exported from the host CMS) and a TOML
//! settings record. Both are parsed and validated once at startup; the
//! flows only ever see the repository traits.

use std::fs;
use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::info;

use crate::application::repos::{ContentRepo, RepoError, SettingsRepo};
use crate::domain::button::ButtonSettings;
use crate::domain::content::{ContentItem, ContentTypeFilter, ExportPreferences};
use crate::infra::error::InfraError;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct LibraryFile {
    items: Vec<ContentItem>,
}

pub struct FileContentRepo {
    items: Vec<ContentItem>,
}

impl FileContentRepo {
    pub fn load(path: &Path) -> Result<Self, InfraError> {
        let text = fs::read_to_string(path)?;
        let library: LibraryFile = toml::from_str(&text).map_err(|err| {
            InfraError::configuration(format!(
                "invalid content library `{}`: {err}",
                path.display()
            ))
        })?;

        let mut seen = std::collections::HashSet::new();
        for item in &library.items {
            if !seen.insert(item.id) {
                return Err(InfraError::configuration(format!(
                    "content library `{}` repeats item id {}",
                    path.display(),
                    item.id
                )));
            }
        }

        info!(
            target = "infra::store",
            path = %path.display(),
            items = library.items.len(),
            "content library loaded"
        );
        Ok(Self {
            items: library.items,
        })
    }
}

#[async_trait]
impl ContentRepo for FileContentRepo {
    async fn find_published(&self, id: i64) -> Result<Option<ContentItem>, RepoError> {
        Ok(self
            .items
            .iter()
            .find(|item| item.id == id && item.is_published())
            .cloned())
    }

    async fn list_published(
        &self,
        filter: ContentTypeFilter,
    ) -> Result<Vec<ContentItem>, RepoError> {
        let mut items: Vec<ContentItem> = self
            .items
            .iter()
            .filter(|item| item.is_published() && filter.matches(item.kind))
            .cloned()
            .collect();
        items.sort_by_key(|item| item.id);
        Ok(items)
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct SettingsFile {
    button: ButtonSettings,
    export: ExportPreferences,
}

pub struct FileSettingsRepo {
    button: ButtonSettings,
    export: ExportPreferences,
}

impl FileSettingsRepo {
    pub fn load(path: &Path) -> Result<Self, InfraError> {
        let record = if path.exists() {
            let text = fs::read_to_string(path)?;
            toml::from_str::<SettingsFile>(&text).map_err(|err| {
                InfraError::configuration(format!(
                    "invalid settings record `{}`: {err}",
                    path.display()
                ))
            })?
        } else {
            // A fresh install runs on the defaults until the settings
            // surface writes a record.
            SettingsFile::default()
        };

        record.button.validate().map_err(|err| {
            InfraError::configuration(format!(
                "invalid settings record `{}`: {err}",
                path.display()
            ))
        })?;

        Ok(Self {
            button: record.button,
            export: record.export,
        })
    }
}

#[async_trait]
impl SettingsRepo for FileSettingsRepo {
    async fn load_button_settings(&self) -> Result<ButtonSettings, RepoError> {
        Ok(self.button.clone())
    }

    async fn load_export_preferences(&self) -> Result<ExportPreferences, RepoError> {
        Ok(self.export)
    }
}
