//! Content records as served by the host store. Read-only to this service.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Post,
    Page,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentStatus {
    Draft,
    Published,
    Archived,
}

/// Which kinds of content a bulk export covers. Also the shape of the
/// administrator's persisted export preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentTypeFilter {
    Posts,
    Pages,
    Both,
}

impl ContentTypeFilter {
    pub fn as_str(self) -> &'static str {
        match self {
            ContentTypeFilter::Posts => "posts",
            ContentTypeFilter::Pages => "pages",
            ContentTypeFilter::Both => "both",
        }
    }

    pub fn matches(self, kind: ContentKind) -> bool {
        match self {
            ContentTypeFilter::Posts => kind == ContentKind::Post,
            ContentTypeFilter::Pages => kind == ContentKind::Page,
            ContentTypeFilter::Both => true,
        }
    }
}

/// A single exportable unit of content. Only published items ever reach the
/// export flows; the repository traits do not hand out anything else.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: i64,
    pub title: String,
    pub kind: ContentKind,
    pub status: ContentStatus,
    pub body_html: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub featured_image_url: Option<String>,
}

impl ContentItem {
    pub fn is_published(&self) -> bool {
        self.status == ContentStatus::Published
    }
}

/// Bulk-export preference record, mutated only by the settings surface.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportPreferences {
    pub content_type: ContentTypeFilter,
}

impl Default for ExportPreferences {
    fn default() -> Self {
        Self {
            content_type: ContentTypeFilter::Posts,
        }
    }
}
