//! The content transform pipeline.
//!
//! Ordered, independent string-rewrite stages that prepare raw post HTML
//! for flattened, paginated output. The render engine cannot run scripts or
//! play media, so embeds degrade to explanatory placeholders, images are
//! clamped to the page width, and code blocks are normalized to exactly one
//! level of HTML escaping regardless of how the editor encoded them.
//!
//! Stages are best-effort over malformed markup: the streaming rewriter
//! leaves anything that does not match the expected shape untouched.

use std::cell::Cell;
use std::rc::Rc;

use lol_html::html_content::ContentType;
use lol_html::{RewriteStrSettings, element, rewrite_str, text};
use thiserror::Error;
use url::Url;

use crate::application::SiteContext;
use crate::application::render::document::escape_html;
use crate::application::repos::ContentFilters;

pub const VIDEO_PLACEHOLDER: &str =
    r#"<div class="video-placeholder">Video content is not available in PDF format</div>"#;
pub const AUDIO_PLACEHOLDER: &str =
    r#"<div class="audio-placeholder">Audio content is not available in PDF format</div>"#;

const VIDEO_HOST_MARKERS: &[&str] = &[
    "youtube.com",
    "youtube-nocookie.com",
    "youtu.be",
    "vimeo.com",
];

const IMG_BASE_STYLE: &str = "max-width: 100%; height: auto;";
const PRE_STYLE: &str = "background: #f5f5f5; padding: 15px; border-radius: 4px; \
     overflow-x: auto; font-family: monospace; font-size: 13px; line-height: 1.4;";
const INLINE_CODE_STYLE: &str = "background: #f5f5f5; padding: 2px 5px; border-radius: 3px; \
     font-family: monospace; font-size: 0.9em;";

#[derive(Debug, Error)]
pub enum TransformError {
    #[error("html rewrite failed: {message}")]
    Rewrite { message: String },
}

impl TransformError {
    fn rewrite(error: impl std::fmt::Display) -> Self {
        Self::Rewrite {
            message: error.to_string(),
        }
    }
}

/// Run every stage in its required order.
pub fn transform(
    raw: &str,
    filters: &dyn ContentFilters,
    site: &SiteContext,
) -> Result<String, TransformError> {
    let expanded = filters.apply(raw);
    let content = escape_cdata(&expanded);
    let content = absolutize_media_paths(&content, &site.base_url)?;
    let content = augment_images(&content)?;
    let content = replace_media_embeds(&content)?;
    restyle_code_blocks(&content)
}

/// Keep the output embeddable in XML-ish contexts.
pub fn escape_cdata(content: &str) -> String {
    content.replace("]]>", "]]&gt;")
}

/// Rewrite root-relative `src` values (exactly one leading slash) to
/// absolute URLs against the site base. Protocol-relative and already
/// absolute sources pass through untouched.
pub fn absolutize_media_paths(content: &str, base: &Url) -> Result<String, TransformError> {
    rewrite_str(
        content,
        RewriteStrSettings {
            element_content_handlers: vec![element!("img[src], source[src]", move |el| {
                if let Some(src) = el.get_attribute("src")
                    && let Some(absolute) = absolutize(&src, base)
                {
                    el.set_attribute("src", &absolute)?;
                }
                Ok(())
            })],
            ..RewriteStrSettings::default()
        },
    )
    .map_err(TransformError::rewrite)
}

fn absolutize(src: &str, base: &Url) -> Option<String> {
    if !src.starts_with('/') || src.starts_with("//") {
        return None;
    }
    base.join(src).ok().map(String::from)
}

/// Clamp images to the page width and mark them lazy. Check-then-inject:
/// attributes already present are never duplicated, so running the stage
/// twice equals running it once.
pub fn augment_images(content: &str) -> Result<String, TransformError> {
    rewrite_str(
        content,
        RewriteStrSettings {
            element_content_handlers: vec![element!("img", |el| {
                match el.get_attribute("style") {
                    Some(style) if style.contains("max-width") => {}
                    Some(style) => {
                        el.set_attribute("style", &format!("{IMG_BASE_STYLE} {style}"))?;
                    }
                    None => {
                        el.set_attribute("style", IMG_BASE_STYLE)?;
                    }
                }
                if el.get_attribute("loading").is_none() {
                    el.set_attribute("loading", "lazy")?;
                }
                Ok(())
            })],
            ..RewriteStrSettings::default()
        },
    )
    .map_err(TransformError::rewrite)
}

/// Replace video iframes and audio players with fixed placeholder blocks.
pub fn replace_media_embeds(content: &str) -> Result<String, TransformError> {
    rewrite_str(
        content,
        RewriteStrSettings {
            element_content_handlers: vec![
                element!("iframe", |el| {
                    if let Some(src) = el.get_attribute("src")
                        && VIDEO_HOST_MARKERS.iter().any(|marker| src.contains(marker))
                    {
                        el.replace(VIDEO_PLACEHOLDER, ContentType::Html);
                    }
                    Ok(())
                }),
                element!("audio", |el| {
                    el.replace(AUDIO_PLACEHOLDER, ContentType::Html);
                    Ok(())
                }),
            ],
            ..RewriteStrSettings::default()
        },
    )
    .map_err(TransformError::rewrite)
}

/// Normalize `pre` regions to exactly one level of HTML escaping and apply
/// the fixed code styling. Inline `code` outside `pre` gets the lighter
/// style with its content untouched.
pub fn restyle_code_blocks(content: &str) -> Result<String, TransformError> {
    // `pre code` registers before the bare `code` handler; for the same
    // element the handlers fire in registration order, so the flag marks
    // code spans that live inside a pre and must keep the block styling.
    let code_in_pre = Rc::new(Cell::new(false));
    let marker = Rc::clone(&code_in_pre);

    rewrite_str(
        content,
        RewriteStrSettings {
            element_content_handlers: vec![
                element!("pre", |el| {
                    el.set_attribute("style", PRE_STYLE)?;
                    Ok(())
                }),
                text!("pre", |chunk| {
                    let normalized = escape_html(&decode_entities(chunk.as_str()));
                    chunk.replace(&normalized, ContentType::Html);
                    Ok(())
                }),
                element!("pre code", move |_el| {
                    marker.set(true);
                    Ok(())
                }),
                element!("code", move |el| {
                    if code_in_pre.replace(false) {
                        return Ok(());
                    }
                    el.set_attribute("style", INLINE_CODE_STYLE)?;
                    Ok(())
                }),
            ],
            ..RewriteStrSettings::default()
        },
    )
    .map_err(TransformError::rewrite)
}

/// Single-pass decode of the entities editors commonly bake into code
/// samples. One pass only: already double-escaped input comes out exactly
/// one level lighter, which the following re-escape restores to one level.
fn decode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];
        let semicolon = rest[1..].find(';').map(|idx| idx + 1);
        match semicolon {
            Some(end) if end > 1 && end <= 10 => match decode_entity(&rest[1..end]) {
                Some(decoded) => {
                    out.push(decoded);
                    rest = &rest[end + 1..];
                }
                None => {
                    out.push('&');
                    rest = &rest[1..];
                }
            },
            _ => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let digits = name.strip_prefix('#')?;
            let value = if let Some(hex) = digits.strip_prefix(['x', 'X']) {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                digits.parse::<u32>().ok()?
            };
            char::from_u32(value)
        }
    }
}
