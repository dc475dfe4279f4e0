//! Zip-backed archive writing for bulk export.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::application::archive::{ArchiveBuilder, ArchiveError, ArchiveWriter};

pub struct ZipArchiveWriter;

impl ArchiveWriter for ZipArchiveWriter {
    fn available(&self) -> bool {
        true
    }

    fn create(&self, path: &Path) -> Result<Box<dyn ArchiveBuilder>, ArchiveError> {
        let file = File::create(path)?;
        Ok(Box::new(ZipBuilder {
            writer: ZipWriter::new(file),
        }))
    }
}

struct ZipBuilder {
    writer: ZipWriter<File>,
}

impl ArchiveBuilder for ZipBuilder {
    fn add_entry(&mut self, name: &str, bytes: &[u8]) -> Result<(), ArchiveError> {
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        self.writer
            .start_file(name, options)
            .map_err(|err| ArchiveError::write(err.to_string()))?;
        self.writer.write_all(bytes)?;
        Ok(())
    }

    fn finish(mut self: Box<Self>) -> Result<(), ArchiveError> {
        self.writer
            .finish()
            .map_err(|err| ArchiveError::write(err.to_string()))?;
        Ok(())
    }
}
