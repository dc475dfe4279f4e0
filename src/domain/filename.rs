//! Filesystem- and URL-safe filenames derived from content titles.

use crate::domain::content::ContentTypeFilter;

/// Stem used when a title sanitizes down to nothing.
pub const FALLBACK_STEM: &str = "document";

/// Reduce an arbitrary title to a lowercase hyphenated slug.
///
/// Every character outside `[A-Za-z0-9 -]` is stripped, spaces become
/// hyphens, hyphen runs collapse to one, and leading/trailing hyphens are
/// trimmed. Total over all inputs and idempotent; an all-punctuation title
/// yields the empty string, which callers replace with [`FALLBACK_STEM`].
pub fn sanitize_title(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    for ch in title.chars() {
        let mapped = match ch {
            'a'..='z' | '0'..='9' => ch,
            'A'..='Z' => ch.to_ascii_lowercase(),
            ' ' | '-' => '-',
            _ => continue,
        };
        if mapped == '-' && slug.ends_with('-') {
            continue;
        }
        slug.push(mapped);
    }
    slug.trim_matches('-').to_string()
}

/// Filename for a single exported document.
pub fn pdf_filename(title: &str) -> String {
    let slug = sanitize_title(title);
    if slug.is_empty() {
        format!("{FALLBACK_STEM}.pdf")
    } else {
        format!("{slug}.pdf")
    }
}

/// Filename for a bulk export archive.
pub fn archive_filename(filter: ContentTypeFilter) -> String {
    format!("{}_export.zip", filter.as_str())
}
