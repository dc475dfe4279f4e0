//! Download-button presentation settings.
//!
//! These drive only how the button looks and where it is injected; document
//! styling is fixed at assembly time and not configurable.

use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonSize {
    Small,
    Medium,
    Large,
}

impl ButtonSize {
    pub fn as_str(self) -> &'static str {
        match self {
            ButtonSize::Small => "small",
            ButtonSize::Medium => "medium",
            ButtonSize::Large => "large",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Placement {
    TopLeft,
    TopCenter,
    TopRight,
    BottomLeft,
    BottomCenter,
    BottomRight,
    None,
}

impl Placement {
    pub fn as_str(self) -> &'static str {
        match self {
            Placement::TopLeft => "top-left",
            Placement::TopCenter => "top-center",
            Placement::TopRight => "top-right",
            Placement::BottomLeft => "bottom-left",
            Placement::BottomCenter => "bottom-center",
            Placement::BottomRight => "bottom-right",
            Placement::None => "none",
        }
    }

    pub fn is_top(self) -> bool {
        matches!(
            self,
            Placement::TopLeft | Placement::TopCenter | Placement::TopRight
        )
    }

    pub fn is_bottom(self) -> bool {
        matches!(
            self,
            Placement::BottomLeft | Placement::BottomCenter | Placement::BottomRight
        )
    }
}

/// The persisted button settings record. Field values are validated here,
/// at the record boundary, never inside the render flows.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ButtonSettings {
    pub text: String,
    pub font_family: String,
    pub font_weight: String,
    pub font_size_px: u16,
    pub size: ButtonSize,
    pub icon: Option<String>,
    pub bg_color: String,
    pub bg_color_hover: String,
    pub text_color: String,
    pub text_color_hover: String,
    pub hover_effect: bool,
    pub placement: Placement,
}

impl Default for ButtonSettings {
    fn default() -> Self {
        Self {
            text: "Download PDF".to_string(),
            font_family: "Arial, sans-serif".to_string(),
            font_weight: "500".to_string(),
            font_size_px: 16,
            size: ButtonSize::Medium,
            icon: Some("fa-file-pdf".to_string()),
            bg_color: "#1C1A1C".to_string(),
            bg_color_hover: "#683FEA".to_string(),
            text_color: "#AAAAAA".to_string(),
            text_color_hover: "#FFFFFF".to_string(),
            hover_effect: true,
            placement: Placement::BottomLeft,
        }
    }
}

impl ButtonSettings {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.text.trim().is_empty() {
            return Err(DomainError::validation("button text must not be empty"));
        }
        if self.font_size_px == 0 || self.font_size_px > 72 {
            return Err(DomainError::validation(format!(
                "button font size {}px is outside 1..=72",
                self.font_size_px
            )));
        }
        for (field, value) in [
            ("bg_color", &self.bg_color),
            ("bg_color_hover", &self.bg_color_hover),
            ("text_color", &self.text_color),
            ("text_color_hover", &self.text_color_hover),
        ] {
            if !is_hex_color(value) {
                return Err(DomainError::validation(format!(
                    "`{field}` is not a hex color: {value}"
                )));
            }
        }
        Ok(())
    }
}

fn is_hex_color(value: &str) -> bool {
    let Some(digits) = value.strip_prefix('#') else {
        return false;
    };
    digits.len() == 6 && digits.chars().all(|c| c.is_ascii_hexdigit())
}
