//! Render engine adapter: shells out to an HTML-to-PDF CLI.
//!
//! The engine binary is configurable; the flag set follows the wkhtmltopdf
//! convention. JavaScript is always disabled (document content is never
//! trusted as executable) and local file access is restricted to the
//! configured resource root. Remote resources stay reachable so external
//! images render.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::Instant;

use tracing::{info, warn};

use crate::application::render::engine::{EngineError, PdfEngine, RenderOptions};

#[derive(Debug, Clone)]
pub struct CommandPdfEngine {
    cli_path: PathBuf,
}

impl CommandPdfEngine {
    pub fn new(cli_path: PathBuf) -> Self {
        Self { cli_path }
    }
}

impl PdfEngine for CommandPdfEngine {
    fn render(&self, html: &str, options: &RenderOptions) -> Result<Vec<u8>, EngineError> {
        let started_at = Instant::now();

        let mut input_file = tempfile::Builder::new()
            .prefix("stampa-")
            .suffix(".html")
            .tempfile()?;
        input_file.write_all(html.as_bytes())?;
        input_file.flush()?;

        let output_file = tempfile::Builder::new()
            .prefix("stampa-")
            .suffix(".pdf")
            .tempfile()?;
        let output_path = output_file.path().to_path_buf();

        let run = Command::new(&self.cli_path)
            .arg("--quiet")
            .args(["--encoding", "utf-8"])
            .args(["--page-size", options.paper.as_str()])
            .args(["--orientation", options.orientation.as_str()])
            .arg("--disable-javascript")
            .arg("--disable-local-file-access")
            .arg("--allow")
            .arg(&options.resource_root)
            .arg(input_file.path())
            .arg(&output_path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .map_err(|err| {
                warn!(
                    target = "infra::pdf",
                    cli = %self.cli_path.display(),
                    error = %err,
                    "failed to spawn render engine"
                );
                if err.kind() == ErrorKind::NotFound {
                    EngineError::Unavailable(self.cli_path.display().to_string())
                } else {
                    EngineError::Io(err)
                }
            })?;

        if !run.status.success() {
            let exit_code = run.status.code();
            let stderr = String::from_utf8_lossy(&run.stderr).into_owned();
            warn!(
                target = "infra::pdf",
                exit_code = exit_code.map(i64::from).unwrap_or(-1),
                stderr = %stderr,
                "render engine invocation failed"
            );
            return Err(EngineError::Failed { exit_code, stderr });
        }

        let bytes = fs::read(&output_path)?;
        if bytes.is_empty() {
            return Err(EngineError::Failed {
                exit_code: run.status.code(),
                stderr: "engine produced an empty document".to_string(),
            });
        }

        info!(
            target = "infra::pdf",
            elapsed_ms = started_at.elapsed().as_millis() as u64,
            pdf_bytes = bytes.len(),
            "document rendered"
        );
        Ok(bytes)
    }
}
