//! Typst rendering engine.
//!
//! Handles the low-level details of writing Typst source and assets to a
//! temporary directory, invoking the compiler, and reading the output PDF.

use std::io::ErrorKind;
use tempfile::tempdir;
use tokio::process::Command;

use super::DocumentError;

const SOURCE_FILE: &str = "meldeschein.typ";
const OUTPUT_FILE: &str = "meldeschein.pdf";

/// Runs the Typst CLI. Holds no state between renders.
#[derive(Debug, Clone)]
pub struct TypstRenderEngine {
    typst_bin: String,
}

impl TypstRenderEngine {
    pub fn new(typst_bin: impl Into<String>) -> Self {
        Self {
            typst_bin: typst_bin.into(),
        }
    }

    pub fn typst_bin(&self) -> &str {
        &self.typst_bin
    }

    /// Compile `source` to PDF bytes.
    ///
    /// `assets` are written next to the source so it can reference them by
    /// name. The child process is killed if this future is dropped.
    pub async fn compile(
        &self,
        source: &str,
        assets: &[(String, Vec<u8>)],
    ) -> Result<Vec<u8>, DocumentError> {
        let temp_dir = tempdir().map_err(DocumentError::TempDir)?;
        let typ_path = temp_dir.path().join(SOURCE_FILE);
        let output_path = temp_dir.path().join(OUTPUT_FILE);

        tokio::fs::write(&typ_path, source)
            .await
            .map_err(DocumentError::WriteInput)?;
        for (name, bytes) in assets {
            tokio::fs::write(temp_dir.path().join(name), bytes)
                .await
                .map_err(DocumentError::WriteInput)?;
        }

        let output = Command::new(&self.typst_bin)
            .arg("compile")
            .arg(&typ_path)
            .arg(&output_path)
            .current_dir(temp_dir.path())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => DocumentError::TypstMissing(self.typst_bin.clone()),
                _ => DocumentError::TypstIo(e),
            })?;

        if !output.status.success() {
            let code = output.status.code().unwrap_or(-1);
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(DocumentError::TypstExit { code, stderr });
        }

        let pdf = tokio::fs::read(&output_path)
            .await
            .map_err(DocumentError::ReadPdf)?;
        if !pdf.starts_with(b"%PDF") {
            return Err(DocumentError::NotPdf);
        }

        log::debug!("Typst produced {} bytes", pdf.len());
        Ok(pdf)
    }
}
