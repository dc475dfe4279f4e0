//! Seam to the external HTML-to-PDF render engine.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaperSize {
    A4,
    Letter,
}

impl PaperSize {
    pub fn as_str(self) -> &'static str {
        match self {
            PaperSize::A4 => "A4",
            PaperSize::Letter => "Letter",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Portrait,
    Landscape,
}

impl Orientation {
    pub fn as_str(self) -> &'static str {
        match self {
            Orientation::Portrait => "Portrait",
            Orientation::Landscape => "Landscape",
        }
    }
}

/// Constraints handed to the engine for every render. Script execution is
/// not an option here: the adapter always disables it, content is never
/// trusted as executable. Filesystem access is restricted to
/// `resource_root`; remote resources stay reachable for external images.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub paper: PaperSize,
    pub orientation: Orientation,
    pub resource_root: PathBuf,
}

impl RenderOptions {
    pub fn for_site(resource_root: PathBuf) -> Self {
        Self {
            paper: PaperSize::A4,
            orientation: Orientation::Portrait,
            resource_root,
        }
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("render engine unavailable: {0}")]
    Unavailable(String),
    #[error("render engine failed (exit {exit_code:?}): {stderr}")]
    Failed {
        exit_code: Option<i32>,
        stderr: String,
    },
    #[error("render engine io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Converts one assembled document into PDF bytes.
pub trait PdfEngine: Send + Sync {
    fn render(&self, html: &str, options: &RenderOptions) -> Result<Vec<u8>, EngineError>;
}
