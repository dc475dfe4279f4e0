//! Failure classification at the export-flow boundary.
//!
//! Internal errors carry their full detail for logging; only the classified
//! kind and its fixed user-facing sentence ever cross the HTTP surface.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::application::archive::ArchiveError;
use crate::application::render::engine::EngineError;
use crate::application::render::pipeline::TransformError;
use crate::application::repos::RepoError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Security,
    NotFound,
    NoContent,
    MissingCapability,
    Memory,
    Timeout,
    Permission,
    RemoteFetchFailure,
    Generic,
}

impl FailureKind {
    pub fn code(self) -> &'static str {
        match self {
            FailureKind::Security => "security",
            FailureKind::NotFound => "not_found",
            FailureKind::NoContent => "no_content",
            FailureKind::MissingCapability => "missing_capability",
            FailureKind::Memory => "memory",
            FailureKind::Timeout => "timeout",
            FailureKind::Permission => "permission",
            FailureKind::RemoteFetchFailure => "remote_fetch_failure",
            FailureKind::Generic => "generic",
        }
    }

    pub fn user_message(self) -> &'static str {
        match self {
            FailureKind::Security => {
                "Security check failed. Please refresh the page and try again."
            }
            FailureKind::NotFound => "Content not found or not published.",
            FailureKind::NoContent => "No content found to export.",
            FailureKind::MissingCapability => {
                "Archive support is not available on this server."
            }
            FailureKind::Memory => {
                "Not enough memory to generate the PDF. Please contact your site administrator."
            }
            FailureKind::Timeout => "The operation timed out. Please try again.",
            FailureKind::Permission => "Permission denied. Please check file permissions.",
            FailureKind::RemoteFetchFailure => {
                "Failed to load remote content. Please check your internet connection."
            }
            FailureKind::Generic => {
                "An error occurred while generating the PDF. Please try again later."
            }
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Map low-level failure text onto the user-facing taxonomy. Keyword
/// matching mirrors the failure modes the render engine and filesystem
/// actually produce; anything unrecognized is `Generic`.
pub fn classify(detail: &str) -> FailureKind {
    let lower = detail.to_lowercase();
    if lower.contains("memory") || lower.contains("allocation") {
        FailureKind::Memory
    } else if lower.contains("timed out") || lower.contains("timeout") {
        FailureKind::Timeout
    } else if lower.contains("permission") || lower.contains("access denied") {
        FailureKind::Permission
    } else if lower.contains("http request")
        || lower.contains("could not resolve")
        || lower.contains("connection")
        || lower.contains("remote")
    {
        FailureKind::RemoteFetchFailure
    } else {
        FailureKind::Generic
    }
}

#[derive(Debug, Error)]
#[error("{detail}")]
pub struct ExportError {
    kind: FailureKind,
    detail: String,
}

impl ExportError {
    pub fn new(kind: FailureKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }

    pub fn security() -> Self {
        Self::new(FailureKind::Security, "token verification failed")
    }

    pub fn not_found() -> Self {
        Self::new(FailureKind::NotFound, "content item missing or not published")
    }

    pub fn no_content() -> Self {
        Self::new(FailureKind::NoContent, "no published content matched the filter")
    }

    pub fn missing_capability() -> Self {
        Self::new(FailureKind::MissingCapability, "archive writer unavailable")
    }

    /// Wrap internal failure text, deriving the kind from its content.
    pub fn classified(detail: impl Into<String>) -> Self {
        let detail = detail.into();
        Self {
            kind: classify(&detail),
            detail,
        }
    }

    pub fn kind(&self) -> FailureKind {
        self.kind
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }

    pub fn user_message(&self) -> &'static str {
        self.kind.user_message()
    }
}

impl From<RepoError> for ExportError {
    fn from(error: RepoError) -> Self {
        match error {
            RepoError::NotFound => Self::not_found(),
            other => Self::classified(other.to_string()),
        }
    }
}

impl From<TransformError> for ExportError {
    fn from(error: TransformError) -> Self {
        Self::classified(error.to_string())
    }
}

impl From<EngineError> for ExportError {
    fn from(error: EngineError) -> Self {
        Self::classified(error.to_string())
    }
}

impl From<ArchiveError> for ExportError {
    fn from(error: ArchiveError) -> Self {
        match error {
            ArchiveError::Unavailable => Self::missing_capability(),
            other => Self::classified(other.to_string()),
        }
    }
}
