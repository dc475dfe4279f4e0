//! Download-button markup and its injection into content bodies.
//!
//! Supplemental frontend surface: the styled trigger the reader clicks,
//! carrying the item id and its single-use token as data attributes.

use crate::application::render::document::{escape_attribute, escape_html};
use crate::domain::button::{ButtonSettings, Placement};

/// Inline marker authors can place in a body to position the button by
/// hand. When present it wins over the configured auto-placement.
pub const PLACEMENT_MARKER: &str = "[stampa-button]";

/// Build the button markup for one content item.
pub fn render_button(settings: &ButtonSettings, item_id: i64, token: &str) -> String {
    let mut html = String::with_capacity(512);
    html.push_str("<div class=\"pdf-button-wrapper");
    if settings.placement != Placement::None {
        html.push(' ');
        html.push_str(settings.placement.as_str());
    }
    html.push_str("\"><button type=\"button\" class=\"pdf-download-button size-");
    html.push_str(settings.size.as_str());
    if settings.hover_effect {
        html.push_str(" hover-effect");
    }
    html.push_str("\" style=\"");
    html.push_str(&escape_attribute(&style_string(settings)));
    html.push_str("\" data-post-id=\"");
    html.push_str(&item_id.to_string());
    html.push_str("\" data-nonce=\"");
    html.push_str(&escape_attribute(token));
    html.push_str("\">");

    if let Some(icon) = settings.icon.as_deref().filter(|icon| *icon != "none") {
        html.push_str("<i class=\"fa-solid ");
        html.push_str(&escape_attribute(icon));
        html.push_str("\" aria-hidden=\"true\"></i>");
    }

    html.push_str("<span class=\"button-text\">");
    html.push_str(&escape_html(&settings.text));
    html.push_str("</span></button></div>");
    html
}

/// Place the button into a content body. The inline marker takes priority;
/// otherwise top placements prepend, bottom placements append, and `none`
/// leaves the body untouched.
pub fn inject_button(body: &str, button: &str, placement: Placement) -> String {
    if body.contains(PLACEMENT_MARKER) {
        return body.replace(PLACEMENT_MARKER, button);
    }
    if placement.is_top() {
        format!("{button}{body}")
    } else if placement.is_bottom() {
        format!("{body}{button}")
    } else {
        body.to_string()
    }
}

fn style_string(settings: &ButtonSettings) -> String {
    let properties = [
        ("font-family", settings.font_family.clone()),
        ("font-weight", settings.font_weight.clone()),
        ("--button-font-size", format!("{}px", settings.font_size_px)),
        ("--button-bg-color", settings.bg_color.clone()),
        ("--button-bg-color-hover", settings.bg_color_hover.clone()),
        ("--button-font-color", settings.text_color.clone()),
        (
            "--button-font-color-hover",
            settings.text_color_hover.clone(),
        ),
    ];
    let mut style = String::with_capacity(160);
    for (property, value) in properties {
        style.push_str(property);
        style.push_str(": ");
        style.push_str(&value);
        style.push_str("; ");
    }
    style.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn button_carries_id_token_and_settings() {
        let settings = ButtonSettings::default();
        let html = render_button(&settings, 42, "tok-abc");
        assert!(html.contains("data-post-id=\"42\""));
        assert!(html.contains("data-nonce=\"tok-abc\""));
        assert!(html.contains("size-medium"));
        assert!(html.contains("hover-effect"));
        assert!(html.contains("fa-file-pdf"));
        assert!(html.contains("Download PDF"));
        assert!(html.contains("--button-bg-color: #1C1A1C"));
        assert!(html.contains("bottom-left"));
    }

    #[test]
    fn icon_none_renders_no_icon_element() {
        let mut settings = ButtonSettings::default();
        settings.icon = None;
        assert!(!render_button(&settings, 1, "t").contains("<i "));
        settings.icon = Some("none".to_string());
        assert!(!render_button(&settings, 1, "t").contains("<i "));
    }

    #[test]
    fn marker_overrides_auto_placement() {
        let body = format!("<p>intro</p>{PLACEMENT_MARKER}<p>rest</p>");
        let out = inject_button(&body, "<b>BTN</b>", Placement::BottomLeft);
        assert_eq!(out, "<p>intro</p><b>BTN</b><p>rest</p>");
    }

    #[test]
    fn placement_sides_prepend_or_append() {
        let top = inject_button("<p>x</p>", "B", Placement::TopCenter);
        assert!(top.starts_with('B'));
        let bottom = inject_button("<p>x</p>", "B", Placement::BottomRight);
        assert!(bottom.ends_with('B'));
        let none = inject_button("<p>x</p>", "B", Placement::None);
        assert_eq!(none, "<p>x</p>");
    }
}
