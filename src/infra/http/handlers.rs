//! Export trigger handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::response::{Html, IntoResponse, Response};
use serde::{Deserialize, Serialize};

use crate::application::button::{inject_button, render_button};
use crate::application::error::ExportError;
use crate::application::export::{BulkExportRequest, ExportRequest, SkippedItem};
use crate::application::tokens::TokenScope;
use crate::domain::content::ContentTypeFilter;

use super::error::ApiError;
use super::state::AppState;

/// Dispatch on the `action` field of the posted body, mirroring the
/// wire contract the frontend script speaks.
#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ExportCommand {
    GeneratePostPdf {
        post_id: i64,
        nonce: String,
    },
    MassExportPdf {
        #[serde(default)]
        content_type: Option<ContentTypeFilter>,
        nonce: String,
    },
}

#[derive(Debug, Serialize)]
pub struct SinglePdfResponse {
    pub pdf_content: String,
    pub filename: String,
}

#[derive(Debug, Serialize)]
pub struct BulkArchiveResponse {
    pub content: String,
    pub filename: String,
    pub skipped: Vec<SkippedItem>,
}

pub async fn export(
    State(state): State<AppState>,
    Json(command): Json<ExportCommand>,
) -> Result<Response, ApiError> {
    match command {
        ExportCommand::GeneratePostPdf { post_id, nonce } => {
            let result = state
                .export
                .export_single(ExportRequest {
                    item_id: post_id,
                    token: nonce,
                })
                .await
                .map_err(ApiError::from)?;
            Ok(Json(SinglePdfResponse {
                pdf_content: result.pdf_base64,
                filename: result.filename,
            })
            .into_response())
        }
        ExportCommand::MassExportPdf {
            content_type,
            nonce,
        } => {
            let result = state
                .export
                .export_bulk(BulkExportRequest {
                    content_type,
                    token: nonce,
                })
                .await
                .map_err(ApiError::from)?;
            Ok(Json(BulkArchiveResponse {
                content: result.archive_base64,
                filename: result.filename,
                skipped: result.skipped,
            })
            .into_response())
        }
    }
}

/// The embedding surface: a published item's body with the download button
/// injected per the configured placement (or the inline marker).
pub async fn item_body(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Html<String>, ApiError> {
    let item = state
        .content
        .find_published(id)
        .await
        .map_err(|err| ApiError::from(ExportError::from(err)))?
        .ok_or_else(|| ApiError::from(ExportError::not_found()))?;

    let settings = state
        .settings
        .load_button_settings()
        .await
        .map_err(|err| ApiError::from(ExportError::from(err)))?;

    let token = state.tokens.issue(TokenScope::Item(item.id));
    let button = render_button(&settings, item.id, &token);
    Ok(Html(inject_button(
        &item.body_html,
        &button,
        settings.placement,
    )))
}
