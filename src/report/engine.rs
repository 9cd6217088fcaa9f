//! Typst rendering engine.
//!
//! Handles the low-level details of writing Typst source to temporary files,
//! invoking the compiler, and reading back the output PDF.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::tempdir;
use tempfile::TempDir;

use super::ReportError;

const SOURCE_FILE: &str = "report.typ";
const OUTPUT_FILE: &str = "report.pdf";

/// Name of the Typst executable looked up on `PATH`.
pub const TYPST_BIN: &str = "typst";

/// Stateless engine for compiling Typst source to PDF.
#[derive(Debug, Clone, Default)]
pub struct TypstRenderEngine {
    font_dirs: Vec<PathBuf>,
}

impl TypstRenderEngine {
    pub fn new(font_dirs: &[PathBuf]) -> Self {
        Self {
            font_dirs: font_dirs.to_vec(),
        }
    }

    /// Compile a complete Typst document and return the PDF bytes.
    pub fn render(&self, typst_source: &str) -> Result<Vec<u8>, ReportError> {
        let temp_dir = tempdir().map_err(ReportError::TempDir)?;
        let typ_path = temp_dir.path().join(SOURCE_FILE);

        fs::write(&typ_path, typst_source).map_err(ReportError::WriteTypst)?;

        compile_typst_to_pdf(&temp_dir, &self.font_dirs)
    }

    /// Whether the Typst CLI can be started at all.
    pub fn is_available() -> bool {
        Command::new(TYPST_BIN)
            .arg("--version")
            .output()
            .map(|out| out.status.success())
            .unwrap_or(false)
    }
}

/// Compile the source file inside `temp_dir` to PDF.
fn compile_typst_to_pdf(temp_dir: &TempDir, font_dirs: &[PathBuf]) -> Result<Vec<u8>, ReportError> {
    let typ_path = temp_dir.path().join(SOURCE_FILE);
    let output_path = temp_dir.path().join(OUTPUT_FILE);

    let mut command = Command::new(TYPST_BIN);
    command.arg("compile");
    for dir in font_dirs {
        command.arg("--font-path").arg(absolute(dir));
    }
    command
        .arg(&typ_path)
        .arg(&output_path)
        .current_dir(temp_dir.path());

    log::debug!("Running {:?}", command);
    let output = command.output().map_err(ReportError::TypstIo)?;

    if !output.status.success() {
        return Err(ReportError::TypstExit {
            code: output.status.code().unwrap_or(-1),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    fs::read(&output_path).map_err(ReportError::ReadPdf)
}

/// Font paths are resolved before `current_dir` moves into the temp dir.
fn absolute(dir: &Path) -> PathBuf {
    if dir.is_absolute() {
        return dir.to_path_buf();
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(dir))
        .unwrap_or_else(|_| dir.to_path_buf())
}
