pub mod archive;
pub mod button;
pub mod error;
pub mod export;
pub mod render;
pub mod repos;
pub mod tokens;

use url::Url;

/// Read-only site facts shared by the transform pipeline and the assembler.
#[derive(Debug, Clone)]
pub struct SiteContext {
    pub base_url: Url,
    pub name: String,
}
