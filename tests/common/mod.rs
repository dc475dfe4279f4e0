#![allow(dead_code)]

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use url::Url;

use stampa::application::SiteContext;
use stampa::application::archive::{ArchiveBuilder, ArchiveError, ArchiveWriter};
use stampa::application::export::{ExportCollaborators, ExportService};
use stampa::application::render::engine::{EngineError, PdfEngine, RenderOptions};
use stampa::application::repos::{ContentRepo, PassthroughFilters, RepoError, SettingsRepo};
use stampa::domain::button::ButtonSettings;
use stampa::domain::content::{
    ContentItem, ContentKind, ContentStatus, ContentTypeFilter, ExportPreferences,
};
use stampa::infra::archive::ZipArchiveWriter;
use stampa::infra::http::AppState;
use stampa::infra::nonce::WindowedTokens;

pub fn published_post(id: i64, title: &str, body_html: &str) -> ContentItem {
    ContentItem {
        id,
        title: title.to_string(),
        kind: ContentKind::Post,
        status: ContentStatus::Published,
        body_html: body_html.to_string(),
        featured_image_url: None,
    }
}

pub fn published_page(id: i64, title: &str, body_html: &str) -> ContentItem {
    ContentItem {
        kind: ContentKind::Page,
        ..published_post(id, title, body_html)
    }
}

pub fn draft_post(id: i64, title: &str) -> ContentItem {
    ContentItem {
        status: ContentStatus::Draft,
        ..published_post(id, title, "<p>draft</p>")
    }
}

pub struct InMemoryContent {
    items: Vec<ContentItem>,
}

impl InMemoryContent {
    pub fn new(items: Vec<ContentItem>) -> Self {
        Self { items }
    }
}

#[async_trait]
impl ContentRepo for InMemoryContent {
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

pub struct FixedSettings {
    pub button: ButtonSettings,
    pub prefs: ExportPreferences,
}

impl Default for FixedSettings {
    fn default() -> Self {
        Self {
            button: ButtonSettings::default(),
            prefs: ExportPreferences::default(),
        }
    }
}

#[async_trait]
impl SettingsRepo for FixedSettings {
    async fn load_button_settings(&self) -> Result<ButtonSettings, RepoError> {
        Ok(self.button.clone())
    }

    async fn load_export_preferences(&self) -> Result<ExportPreferences, RepoError> {
        Ok(self.prefs)
    }
}

/// Engine double: records every assembled document and fails on demand
/// when the document contains the configured marker.
pub struct RecordingEngine {
    pub documents: Mutex<Vec<String>>,
    fail_marker: Option<String>,
}

impl RecordingEngine {
    pub fn new() -> Self {
        Self {
            documents: Mutex::new(Vec::new()),
            fail_marker: None,
        }
    }

    pub fn failing_on(marker: &str) -> Self {
        Self {
            documents: Mutex::new(Vec::new()),
            fail_marker: Some(marker.to_string()),
        }
    }

    pub fn rendered(&self) -> Vec<String> {
        self.documents.lock().expect("documents lock").clone()
    }
}

impl PdfEngine for RecordingEngine {
    fn render(&self, html: &str, _options: &RenderOptions) -> Result<Vec<u8>, EngineError> {
        if let Some(marker) = self.fail_marker.as_deref()
            && html.contains(marker)
        {
            return Err(EngineError::Failed {
                exit_code: Some(1),
                stderr: "marker render failure".to_string(),
            });
        }
        self.documents
            .lock()
            .expect("documents lock")
            .push(html.to_string());
        Ok(format!("%PDF-1.7 fake ({} bytes in)", html.len()).into_bytes())
    }
}

/// Zip-backed archive writer whose availability can be switched off.
pub struct ToggleArchive {
    available: bool,
    inner: ZipArchiveWriter,
}

impl ToggleArchive {
    pub fn new(available: bool) -> Self {
        Self {
            available,
            inner: ZipArchiveWriter,
        }
    }
}

impl ArchiveWriter for ToggleArchive {
    fn available(&self) -> bool {
        self.available
    }

    fn create(&self, path: &Path) -> Result<Box<dyn ArchiveBuilder>, ArchiveError> {
        self.inner.create(path)
    }
}

pub fn site() -> SiteContext {
    SiteContext {
        base_url: Url::parse("https://blog.example.com").expect("base url"),
        name: "Example Blog".to_string(),
    }
}

pub struct Harness {
    pub service: Arc<ExportService>,
    pub tokens: Arc<WindowedTokens>,
    pub engine: Arc<RecordingEngine>,
    pub content: Arc<InMemoryContent>,
    pub settings: Arc<FixedSettings>,
}

pub fn harness(items: Vec<ContentItem>) -> Harness {
    harness_with(
        items,
        RecordingEngine::new(),
        ToggleArchive::new(true),
        FixedSettings::default(),
    )
}

pub fn harness_with(
    items: Vec<ContentItem>,
    engine: RecordingEngine,
    archive: ToggleArchive,
    settings: FixedSettings,
) -> Harness {
    let tokens = Arc::new(WindowedTokens::new("integration-secret"));
    let engine = Arc::new(engine);
    let content = Arc::new(InMemoryContent::new(items));
    let settings = Arc::new(settings);

    let service = Arc::new(ExportService::new(
        ExportCollaborators {
            content: content.clone(),
            settings: settings.clone(),
            filters: Arc::new(PassthroughFilters),
            tokens: tokens.clone(),
            engine: engine.clone(),
            archive: Arc::new(archive),
        },
        site(),
        RenderOptions::for_site(std::env::temp_dir()),
    ));

    Harness {
        service,
        tokens,
        engine,
        content,
        settings,
    }
}

pub fn app_state(harness: &Harness) -> AppState {
    AppState {
        export: harness.service.clone(),
        content: harness.content.clone(),
        settings: harness.settings.clone(),
        tokens: harness.tokens.clone(),
    }
}
