//! End-to-end coverage of the single and bulk export flows against
//! in-memory collaborators and a recording engine double.

mod common;

use std::io::Cursor;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;

use common::{
    FixedSettings, RecordingEngine, ToggleArchive, draft_post, harness, harness_with,
    published_page, published_post,
};
use stampa::application::error::FailureKind;
use stampa::application::export::{BulkExportRequest, ExportRequest};
use stampa::application::tokens::{TokenScope, TokenService};
use stampa::domain::content::{ContentTypeFilter, ExportPreferences};

fn archive_names(archive_base64: &str) -> Vec<String> {
    let bytes = BASE64.decode(archive_base64).expect("base64 archive");
    assert!(bytes.starts_with(b"PK\x03\x04"), "payload is not a zip");
    let archive = zip::ZipArchive::new(Cursor::new(bytes)).expect("open zip");
    archive.file_names().map(String::from).collect()
}

#[tokio::test]
async fn single_export_produces_named_pdf() {
    let h = harness(vec![published_post(
        7,
        "My Awesome Post! 2024",
        r#"<p>Hello</p><img src="/uploads/pic.png">"#,
    )]);
    let token = h.tokens.issue(TokenScope::Item(7));

    let result = h
        .service
        .export_single(ExportRequest {
            item_id: 7,
            token,
        })
        .await
        .expect("export succeeds");

    assert_eq!(result.filename, "my-awesome-post-2024.pdf");
    let pdf = BASE64.decode(&result.pdf_base64).expect("base64 pdf");
    assert!(pdf.starts_with(b"%PDF-1.7"));

    // The engine saw the fully transformed, assembled document.
    let documents = h.engine.rendered();
    assert_eq!(documents.len(), 1);
    assert!(documents[0].contains("post-content"));
    assert!(documents[0].contains("https://blog.example.com/uploads/pic.png"));
    assert!(documents[0].contains(r#"loading="lazy""#));
    assert!(documents[0].contains("Example Blog"));
}

#[tokio::test]
async fn single_export_rejects_bad_tokens_before_loading_content() {
    let h = harness(vec![published_post(1, "Post", "<p>x</p>")]);

    let error = h
        .service
        .export_single(ExportRequest {
            item_id: 1,
            token: "forged".to_string(),
        })
        .await
        .expect_err("must fail");
    assert_eq!(error.kind(), FailureKind::Security);

    // A token for a different item does not transfer.
    let other = h.tokens.issue(TokenScope::Item(2));
    let error = h
        .service
        .export_single(ExportRequest {
            item_id: 1,
            token: other,
        })
        .await
        .expect_err("must fail");
    assert_eq!(error.kind(), FailureKind::Security);
    assert!(h.engine.rendered().is_empty());
}

#[tokio::test]
async fn valid_token_for_draft_is_not_found_not_security() {
    let h = harness(vec![draft_post(5, "Unfinished")]);
    let token = h.tokens.issue(TokenScope::Item(5));

    let error = h
        .service
        .export_single(ExportRequest {
            item_id: 5,
            token,
        })
        .await
        .expect_err("must fail");
    assert_eq!(error.kind(), FailureKind::NotFound);
}

#[tokio::test]
async fn empty_title_falls_back_to_document_pdf() {
    let h = harness(vec![published_post(3, "!!!", "<p>x</p>")]);
    let token = h.tokens.issue(TokenScope::Item(3));

    let result = h
        .service
        .export_single(ExportRequest {
            item_id: 3,
            token,
        })
        .await
        .expect("export succeeds");
    assert_eq!(result.filename, "document.pdf");
}

#[tokio::test]
async fn featured_image_reaches_the_document() {
    let mut item = published_post(9, "Pictured", "<p>x</p>");
    item.featured_image_url = Some("https://cdn.example.com/cover.png".to_string());
    let h = harness(vec![item]);
    let token = h.tokens.issue(TokenScope::Item(9));

    h.service
        .export_single(ExportRequest {
            item_id: 9,
            token,
        })
        .await
        .expect("export succeeds");

    let documents = h.engine.rendered();
    assert!(documents[0].contains("featured-image"));
    assert!(documents[0].contains("cover.png"));
}

#[tokio::test]
async fn bulk_export_isolates_per_item_failures() {
    let h = harness_with(
        vec![
            published_post(1, "First Post", "<p>one</p>"),
            published_post(2, "Broken Post", "<p>two</p>"),
            published_post(3, "Third Post", "<p>three</p>"),
        ],
        RecordingEngine::failing_on("Broken Post"),
        ToggleArchive::new(true),
        FixedSettings::default(),
    );
    let token = h.tokens.issue(TokenScope::BulkExport);

    let result = h
        .service
        .export_bulk(BulkExportRequest {
            content_type: Some(ContentTypeFilter::Posts),
            token,
        })
        .await
        .expect("bulk export succeeds despite one bad item");

    assert_eq!(result.filename, "posts_export.zip");
    let names = archive_names(&result.archive_base64);
    assert_eq!(names, vec!["first-post.pdf", "third-post.pdf"]);

    assert_eq!(result.skipped.len(), 1);
    assert_eq!(result.skipped[0].id, 2);
    assert_eq!(result.skipped[0].title, "Broken Post");
    assert_eq!(result.skipped[0].reason, FailureKind::Generic);
}

#[tokio::test]
async fn bulk_export_requires_the_bulk_scope() {
    let h = harness(vec![published_post(1, "Post", "<p>x</p>")]);

    // An item token never authorizes a bulk export.
    let item_token = h.tokens.issue(TokenScope::Item(1));
    let error = h
        .service
        .export_bulk(BulkExportRequest {
            content_type: Some(ContentTypeFilter::Posts),
            token: item_token,
        })
        .await
        .expect_err("must fail");
    assert_eq!(error.kind(), FailureKind::Security);
}

#[tokio::test]
async fn bulk_export_without_archive_support_fails_up_front() {
    let h = harness_with(
        vec![published_post(1, "Post", "<p>x</p>")],
        RecordingEngine::new(),
        ToggleArchive::new(false),
        FixedSettings::default(),
    );
    let token = h.tokens.issue(TokenScope::BulkExport);

    let error = h
        .service
        .export_bulk(BulkExportRequest {
            content_type: Some(ContentTypeFilter::Posts),
            token,
        })
        .await
        .expect_err("must fail");
    assert_eq!(error.kind(), FailureKind::MissingCapability);
    // Nothing was rendered: the capability is probed before any work.
    assert!(h.engine.rendered().is_empty());
}

#[tokio::test]
async fn bulk_export_of_nothing_is_no_content() {
    let h = harness(vec![draft_post(1, "Only Draft")]);
    let token = h.tokens.issue(TokenScope::BulkExport);

    let error = h
        .service
        .export_bulk(BulkExportRequest {
            content_type: Some(ContentTypeFilter::Posts),
            token,
        })
        .await
        .expect_err("must fail");
    assert_eq!(error.kind(), FailureKind::NoContent);
}

#[tokio::test]
async fn bulk_export_falls_back_to_persisted_preference() {
    let h = harness_with(
        vec![
            published_post(1, "A Post", "<p>post</p>"),
            published_page(2, "A Page", "<p>page</p>"),
        ],
        RecordingEngine::new(),
        ToggleArchive::new(true),
        FixedSettings {
            prefs: ExportPreferences {
                content_type: ContentTypeFilter::Pages,
            },
            ..FixedSettings::default()
        },
    );
    let token = h.tokens.issue(TokenScope::BulkExport);

    let result = h
        .service
        .export_bulk(BulkExportRequest {
            content_type: None,
            token,
        })
        .await
        .expect("bulk export succeeds");

    assert_eq!(result.filename, "pages_export.zip");
    assert_eq!(archive_names(&result.archive_base64), vec!["a-page.pdf"]);
}

#[tokio::test]
async fn bulk_documents_use_the_simplified_sheet() {
    let h = harness(vec![published_post(1, "Solo", "<p>x</p>")]);
    let token = h.tokens.issue(TokenScope::BulkExport);

    h.service
        .export_bulk(BulkExportRequest {
            content_type: Some(ContentTypeFilter::Posts),
            token,
        })
        .await
        .expect("bulk export succeeds");

    let documents = h.engine.rendered();
    assert_eq!(documents.len(), 1);
    assert!(documents[0].contains("class=\"title\""));
    assert!(!documents[0].contains("pdf-footer"));
}
