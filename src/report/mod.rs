//! Report module - turns outage CSV exports into paginated PDF tables.
//!
//! This module contains the rendering pipeline:
//! - `table` - CSV loading and column relabeling
//! - `dates` - timestamp normalization
//! - `wrap` - word wrapping for long camera names
//! - `layout` - column width estimation
//! - `template` - Typst source composition
//! - `engine` - Typst compilation

pub mod common;
pub mod dates;
pub mod engine;
pub mod layout;
pub mod table;
pub mod template;
pub mod wrap;

pub use dates::normalize_datetime;
pub use engine::TypstRenderEngine;
pub use layout::{estimate_column_widths, ColumnLayout, ColumnWidthRules};
pub use table::{ColumnRename, ColumnRoles, TabularRecord};
pub use template::{PageSize, RenderOptions};
pub use wrap::{wrap_text, DEFAULT_WRAP_WIDTH};

use chrono::{Local, NaiveDateTime};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while rendering a report.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to read CSV {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("failed to create temporary directory: {0}")]
    TempDir(#[source] std::io::Error),
    #[error("failed to write Typst source: {0}")]
    WriteTypst(#[source] std::io::Error),
    #[error("Typst CLI execution failed: {0}")]
    TypstIo(#[source] std::io::Error),
    #[error("Typst CLI exited with status {code}: {stderr}")]
    TypstExit { code: i32, stderr: String },
    #[error("failed to read generated PDF: {0}")]
    ReadPdf(#[source] std::io::Error),
    #[error("failed to write PDF to {path}: {source}")]
    WriteOutput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result of a successful render.
#[derive(Debug, Clone)]
pub struct RenderedReport {
    pub path: PathBuf,
    pub body_rows: usize,
    pub size_bytes: usize,
    pub generated_at: NaiveDateTime,
}

/// Anything that can turn a CSV file into a PDF at a given path.
///
/// The batch orchestrator depends on this seam rather than on Typst directly.
/// Implementations may block; the orchestrator calls them on the blocking pool.
pub trait ReportRenderer: Send + Sync {
    fn render(&self, csv_path: &Path, pdf_path: &Path) -> Result<RenderedReport, ReportError>;
}

/// Renders outage tables through Typst.
#[derive(Debug, Clone, Default)]
pub struct TableReport {
    options: RenderOptions,
}

impl TableReport {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    /// Relabel, normalize and wrap a raw record, then compose its Typst source.
    pub fn compose(&self, record: TabularRecord, generated_at: NaiveDateTime) -> String {
        let prepared = record.prepare(&self.options.columns);
        let layout = estimate_column_widths(&prepared.all_rows(), &ColumnWidthRules::default());
        template::compose_document(&prepared, &layout, &self.options, generated_at)
    }

    /// Render an in-memory record to `pdf_path`.
    pub fn render_record(
        &self,
        record: TabularRecord,
        pdf_path: &Path,
    ) -> Result<RenderedReport, ReportError> {
        let generated_at = Local::now().naive_local();
        let body_rows = record.body_len();
        let source = self.compose(record, generated_at);

        let pdf = TypstRenderEngine::new(&self.options.font_dirs).render(&source)?;
        fs::write(pdf_path, &pdf).map_err(|source| ReportError::WriteOutput {
            path: pdf_path.to_path_buf(),
            source,
        })?;

        log::info!(
            "Rendered {} rows into {} ({} bytes)",
            body_rows,
            pdf_path.display(),
            pdf.len()
        );

        Ok(RenderedReport {
            path: pdf_path.to_path_buf(),
            body_rows,
            size_bytes: pdf.len(),
            generated_at,
        })
    }
}

impl ReportRenderer for TableReport {
    fn render(&self, csv_path: &Path, pdf_path: &Path) -> Result<RenderedReport, ReportError> {
        let record = TabularRecord::from_csv_path(csv_path)?;
        self.render_record(record, pdf_path)
    }
}
