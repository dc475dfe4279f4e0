//! The single-item and bulk export flows.
//!
//! Both flows run transform → assemble → render and encode the result for
//! transport. Bulk export iterates the single pipeline over a filtered set
//! with per-item failure isolation: one bad item is logged, recorded in the
//! result, and skipped, never aborting the whole archive. Only archive
//! finalization and read-back are fatal.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use metrics::counter;
use serde::Serialize;
use tracing::{info, warn};

use crate::application::SiteContext;
use crate::application::archive::ArchiveWriter;
use crate::application::error::{ExportError, FailureKind};
use crate::application::render::document::{assemble, assemble_bulk};
use crate::application::render::engine::{PdfEngine, RenderOptions};
use crate::application::render::pipeline::transform;
use crate::application::repos::{ContentFilters, ContentRepo, SettingsRepo};
use crate::application::tokens::{TokenScope, TokenService};
use crate::domain::content::{ContentItem, ContentTypeFilter};
use crate::domain::filename::{FALLBACK_STEM, archive_filename, pdf_filename, sanitize_title};

#[derive(Debug, Clone)]
pub struct ExportRequest {
    pub item_id: i64,
    pub token: String,
}

#[derive(Debug, Clone)]
pub struct BulkExportRequest {
    /// Explicit filter; falls back to the persisted preference when absent.
    pub content_type: Option<ContentTypeFilter>,
    pub token: String,
}

#[derive(Debug, Clone)]
pub struct ExportResult {
    pub pdf_base64: String,
    pub filename: String,
}

#[derive(Debug, Clone)]
pub struct BulkExportResult {
    pub archive_base64: String,
    pub filename: String,
    pub skipped: Vec<SkippedItem>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SkippedItem {
    pub id: i64,
    pub title: String,
    pub reason: FailureKind,
}

impl SkippedItem {
    fn new(item: &ContentItem, reason: FailureKind) -> Self {
        Self {
            id: item.id,
            title: item.title.clone(),
            reason,
        }
    }
}

/// Everything the flows depend on, injected so the pipeline runs without a
/// live host.
pub struct ExportCollaborators {
    pub content: Arc<dyn ContentRepo>,
    pub settings: Arc<dyn SettingsRepo>,
    pub filters: Arc<dyn ContentFilters>,
    pub tokens: Arc<dyn TokenService>,
    pub engine: Arc<dyn PdfEngine>,
    pub archive: Arc<dyn ArchiveWriter>,
}

pub struct ExportService {
    content: Arc<dyn ContentRepo>,
    settings: Arc<dyn SettingsRepo>,
    filters: Arc<dyn ContentFilters>,
    tokens: Arc<dyn TokenService>,
    engine: Arc<dyn PdfEngine>,
    archive: Arc<dyn ArchiveWriter>,
    site: SiteContext,
    render_options: RenderOptions,
}

impl ExportService {
    pub fn new(
        collaborators: ExportCollaborators,
        site: SiteContext,
        render_options: RenderOptions,
    ) -> Self {
        let ExportCollaborators {
            content,
            settings,
            filters,
            tokens,
            engine,
            archive,
        } = collaborators;
        Self {
            content,
            settings,
            filters,
            tokens,
            engine,
            archive,
            site,
            render_options,
        }
    }

    pub async fn export_single(&self, request: ExportRequest) -> Result<ExportResult, ExportError> {
        let started_at = Instant::now();
        let result = self.run_single(&request).await;
        match &result {
            Ok(export) => {
                counter!("stampa_export_total", "mode" => "single").increment(1);
                info!(
                    target = "application::export",
                    item_id = request.item_id,
                    filename = %export.filename,
                    elapsed_ms = started_at.elapsed().as_millis() as u64,
                    "content item exported"
                );
            }
            Err(error) => {
                counter!("stampa_export_failure_total", "mode" => "single", "kind" => error.kind().code())
                    .increment(1);
                warn!(
                    target = "application::export",
                    item_id = request.item_id,
                    kind = %error.kind(),
                    detail = %error,
                    "single export failed"
                );
            }
        }
        result
    }

    pub async fn export_bulk(
        &self,
        request: BulkExportRequest,
    ) -> Result<BulkExportResult, ExportError> {
        let started_at = Instant::now();
        let result = self.run_bulk(&request).await;
        match &result {
            Ok(export) => {
                counter!("stampa_export_total", "mode" => "bulk").increment(1);
                info!(
                    target = "application::export",
                    filename = %export.filename,
                    skipped = export.skipped.len(),
                    elapsed_ms = started_at.elapsed().as_millis() as u64,
                    "bulk export finished"
                );
            }
            Err(error) => {
                counter!("stampa_export_failure_total", "mode" => "bulk", "kind" => error.kind().code())
                    .increment(1);
                warn!(
                    target = "application::export",
                    kind = %error.kind(),
                    detail = %error,
                    "bulk export failed"
                );
            }
        }
        result
    }

    async fn run_single(&self, request: &ExportRequest) -> Result<ExportResult, ExportError> {
        // The token is checked before any content is touched; a bad token
        // never reveals whether the item exists.
        if !self
            .tokens
            .verify(&request.token, TokenScope::Item(request.item_id))
        {
            return Err(ExportError::security());
        }

        let item = self
            .content
            .find_published(request.item_id)
            .await?
            .ok_or_else(ExportError::not_found)?;

        let body = transform(&item.body_html, self.filters.as_ref(), &self.site)?;
        let document = assemble(
            &item.title,
            &body,
            item.featured_image_url.as_deref(),
            &self.site.name,
        );
        let pdf = self.render_document(document).await?;

        Ok(ExportResult {
            pdf_base64: BASE64.encode(&pdf),
            filename: pdf_filename(&item.title),
        })
    }

    async fn run_bulk(&self, request: &BulkExportRequest) -> Result<BulkExportResult, ExportError> {
        if !self.tokens.verify(&request.token, TokenScope::BulkExport) {
            return Err(ExportError::security());
        }
        if !self.archive.available() {
            return Err(ExportError::missing_capability());
        }

        let filter = match request.content_type {
            Some(filter) => filter,
            None => self.settings.load_export_preferences().await?.content_type,
        };
        let items = self.content.list_published(filter).await?;
        if items.is_empty() {
            return Err(ExportError::no_content());
        }

        // The directory name is randomized per invocation and removed on
        // drop, so concurrent bulk exports never share state and cleanup
        // survives every early return below.
        let temp_dir = tempfile::Builder::new()
            .prefix("stampa-export-")
            .tempdir()
            .map_err(|err| {
                ExportError::classified(format!("failed to create temporary directory: {err}"))
            })?;
        let filename = archive_filename(filter);
        let archive_path = temp_dir.path().join(&filename);
        let mut builder = self.archive.create(&archive_path)?;

        let mut used_names = HashSet::new();
        let mut skipped = Vec::new();
        for item in &items {
            match self.render_item(item).await {
                Ok(pdf) => {
                    let entry = entry_name(item, &mut used_names);
                    if let Err(error) = builder.add_entry(&entry, &pdf) {
                        warn!(
                            target = "application::export",
                            item_id = item.id,
                            error = %error,
                            "failed to add rendered item to archive; skipping"
                        );
                        counter!("stampa_bulk_item_skipped_total").increment(1);
                        skipped.push(SkippedItem::new(item, ExportError::from(error).kind()));
                    }
                }
                Err(error) => {
                    warn!(
                        target = "application::export",
                        item_id = item.id,
                        kind = %error.kind(),
                        detail = %error,
                        "skipping item after render failure"
                    );
                    counter!("stampa_bulk_item_skipped_total").increment(1);
                    skipped.push(SkippedItem::new(item, error.kind()));
                }
            }
        }

        builder.finish()?;
        let bytes = tokio::fs::read(&archive_path).await.map_err(|err| {
            ExportError::classified(format!("failed to read finalized archive: {err}"))
        })?;

        Ok(BulkExportResult {
            archive_base64: BASE64.encode(&bytes),
            filename,
            skipped,
        })
    }

    async fn render_item(&self, item: &ContentItem) -> Result<Vec<u8>, ExportError> {
        let body = transform(&item.body_html, self.filters.as_ref(), &self.site)?;
        let document = assemble_bulk(&item.title, &body);
        self.render_document(document).await
    }

    async fn render_document(&self, document: String) -> Result<Vec<u8>, ExportError> {
        let engine = Arc::clone(&self.engine);
        let options = self.render_options.clone();
        tokio::task::spawn_blocking(move || engine.render(&document, &options))
            .await
            .map_err(|err| ExportError::classified(format!("render task failed: {err}")))?
            .map_err(ExportError::from)
    }
}

fn entry_name(item: &ContentItem, used: &mut HashSet<String>) -> String {
    let slug = sanitize_title(&item.title);
    let stem = if slug.is_empty() { FALLBACK_STEM } else { slug.as_str() };
    let candidate = format!("{stem}.pdf");
    if used.insert(candidate.clone()) {
        return candidate;
    }
    let disambiguated = format!("{stem}-{}.pdf", item.id);
    used.insert(disambiguated.clone());
    disambiguated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::content::{ContentKind, ContentStatus};

    fn item(id: i64, title: &str) -> ContentItem {
        ContentItem {
            id,
            title: title.to_string(),
            kind: ContentKind::Post,
            status: ContentStatus::Published,
            body_html: String::new(),
            featured_image_url: None,
        }
    }

    #[test]
    fn entry_names_disambiguate_collisions_by_id() {
        let mut used = HashSet::new();
        assert_eq!(entry_name(&item(1, "Hello"), &mut used), "hello.pdf");
        assert_eq!(entry_name(&item(2, "Hello"), &mut used), "hello-2.pdf");
        assert_eq!(entry_name(&item(3, "!!!"), &mut used), "document.pdf");
        assert_eq!(entry_name(&item(4, "???"), &mut used), "document-4.pdf");
    }
}
