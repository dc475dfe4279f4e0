//! Assembly of transformed content into a self-contained document.
//!
//! Everything here is fixed: page geometry, typography, table and code
//! styling. Button presentation settings never reach the document.

/// Credit line printed in every document footer.
pub const GENERATOR_CREDIT: &str = "Generated by Stampa";

const DOCUMENT_STYLES: &str = "
@page {
    margin: 2cm;
    size: A4;
}
body {
    font-family: DejaVu Sans, Arial, sans-serif;
    line-height: 1.6;
    color: #333;
    font-size: 11pt;
}
.featured-image {
    margin-bottom: 30px;
}
.featured-image img {
    max-width: 100%;
    height: auto;
}
.post-content {
    margin-bottom: 30px;
}
img {
    max-width: 100%;
    height: auto;
    margin: 15px 0;
    print-color-adjust: exact;
}
pre, code {
    font-family: DejaVu Sans Mono, monospace;
    font-size: 9pt;
}
.pdf-footer {
    margin-top: 30px;
    padding-top: 20px;
    border-top: 1px solid #ddd;
    font-size: 9pt;
    color: #666;
    text-align: center;
}
a {
    color: #2271b1;
    text-decoration: underline;
}
table {
    width: 100%;
    border-collapse: collapse;
    margin: 15px 0;
}
th, td {
    border: 1px solid #ddd;
    padding: 8px;
}
th {
    background: #f5f5f5;
}
";

// Bulk exports use this smaller sheet: no featured image, no footer chrome,
// just a centered title block over the content.
const BULK_STYLES: &str = "
body {
    font-family: DejaVu Sans, Arial, sans-serif;
}
.title {
    font-size: 24px;
    font-weight: bold;
    text-align: center;
    margin-bottom: 20px;
}
.content {
    font-size: 12px;
    line-height: 1.6;
}
";

/// Wrap transformed content into the full single-item document: preamble
/// with embedded styles, optional featured-image block, content container,
/// fixed footer. The only content-dependent region is the featured image.
pub fn assemble(
    title: &str,
    body_html: &str,
    featured_image_url: Option<&str>,
    site_name: &str,
) -> String {
    let mut html = String::with_capacity(body_html.len() + DOCUMENT_STYLES.len() + 512);
    html.push_str("<!DOCTYPE html><html><head><meta charset=\"UTF-8\"><title>");
    html.push_str(&escape_html(title));
    html.push_str("</title><style>");
    html.push_str(DOCUMENT_STYLES);
    html.push_str("</style></head><body>");

    if let Some(src) = featured_image_url.filter(|src| !src.is_empty()) {
        html.push_str("<div class=\"featured-image\"><img src=\"");
        html.push_str(&escape_attribute(src));
        html.push_str("\" alt=\"");
        html.push_str(&escape_attribute(title));
        html.push_str("\"></div>");
    }

    html.push_str("<div class=\"post-content\">");
    html.push_str(body_html);
    html.push_str("</div><div class=\"pdf-footer\"><p>");
    html.push_str(&escape_html(site_name));
    html.push_str("</p><p>");
    html.push_str(GENERATOR_CREDIT);
    html.push_str("</p></div></body></html>");
    html
}

/// The simplified bulk-export document.
pub fn assemble_bulk(title: &str, body_html: &str) -> String {
    let mut html = String::with_capacity(body_html.len() + BULK_STYLES.len() + 256);
    html.push_str("<!DOCTYPE html><html><head><meta charset=\"UTF-8\"><style>");
    html.push_str(BULK_STYLES);
    html.push_str("</style></head><body><div class=\"title\">");
    html.push_str(&escape_html(title));
    html.push_str("</div><div class=\"content\">");
    html.push_str(body_html);
    html.push_str("</div></body></html>");
    html
}

pub(crate) fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

pub(crate) fn escape_attribute(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '\n' | '\r' | '\t' => escaped.push(' '),
            _ => escaped.push(ch),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regions_appear_in_fixed_order() {
        let html = assemble("Title", "<p>body</p>", None, "Example Blog");
        let style_at = html.find("<style>").expect("styles");
        let content_at = html.find("post-content").expect("content");
        let footer_at = html.find("pdf-footer").expect("footer");
        assert!(style_at < content_at && content_at < footer_at);
        assert!(html.contains("<p>body</p>"));
        assert!(html.contains("Example Blog"));
        assert!(html.contains(GENERATOR_CREDIT));
        assert!(html.contains("size: A4"));
    }

    #[test]
    fn featured_image_block_is_conditional() {
        let without = assemble("Title", "<p>x</p>", None, "Site");
        assert!(!without.contains("featured-image"));

        let empty = assemble("Title", "<p>x</p>", Some(""), "Site");
        assert!(!empty.contains("featured-image"));

        let with = assemble("Title", "<p>x</p>", Some("https://cdn.example.com/a.png"), "Site");
        assert!(with.contains("featured-image"));
        assert!(with.contains(r#"src="https://cdn.example.com/a.png""#));
        assert!(with.contains(r#"alt="Title""#));
    }

    #[test]
    fn title_markup_is_escaped() {
        let html = assemble("<script>alert(1)</script>", "<p>x</p>", None, "Site");
        assert!(!html.contains("<script>alert"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn bulk_document_uses_simplified_styles() {
        let html = assemble_bulk("A & B", "<p>x</p>");
        assert!(html.contains("class=\"title\""));
        assert!(html.contains("A &amp; B"));
        assert!(html.contains("class=\"content\""));
        assert!(!html.contains("pdf-footer"));
        assert!(!html.contains("featured-image"));
        assert!(!html.contains("@page"));
    }
}
