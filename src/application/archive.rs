//! Archive-writing capability used by bulk export.

use std::path::Path;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("archive support is unavailable")]
    Unavailable,
    #[error("archive io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("archive write failed: {message}")]
    Write { message: String },
}

impl ArchiveError {
    pub fn write(message: impl Into<String>) -> Self {
        Self::Write {
            message: message.into(),
        }
    }
}

/// One archive in progress. Entries are appended in call order; `finish`
/// flushes the central directory and must be called before the file is read
/// back.
pub trait ArchiveBuilder: Send {
    fn add_entry(&mut self, name: &str, bytes: &[u8]) -> Result<(), ArchiveError>;

    fn finish(self: Box<Self>) -> Result<(), ArchiveError>;
}

/// Factory for archives. `available` is probed before any bulk work starts;
/// an unavailable writer fails the whole flow up front.
pub trait ArchiveWriter: Send + Sync {
    fn available(&self) -> bool;

    fn create(&self, path: &Path) -> Result<Box<dyn ArchiveBuilder>, ArchiveError>;
}
