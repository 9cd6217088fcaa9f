//! Typst source composition for the outage table.

use chrono::NaiveDateTime;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::path::PathBuf;

use super::common::{escape_typst_string, format_title_timestamp, typst_cell};
use super::layout::ColumnLayout;
use super::table::{ColumnRoles, TabularRecord};

pub const DEFAULT_FONT: &str = "DejaVu Sans";
pub const DEFAULT_TITLE_PREFIX: &str = "Отчет от";

/// Embedded in every Typst build; covers Cyrillic when the main font is missing.
const FALLBACK_FONT: &str = "Libertinus Serif";

const HEADER_FILL: &str = "rgb(\"#808080\")";
const HEADER_TEXT: &str = "rgb(\"#f5f5f5\")";
const BODY_FILL: &str = "rgb(\"#f5f5dc\")";
const BODY_FILL_ALT: &str = "rgb(\"#fbfbef\")";

/// Supported paper formats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PageSize {
    A3,
    #[default]
    A4,
    A5,
    Letter,
    Legal,
}

impl PageSize {
    /// Paper name understood by Typst's `page(paper: ..)`.
    pub fn typst_name(self) -> &'static str {
        match self {
            Self::A3 => "a3",
            Self::A4 => "a4",
            Self::A5 => "a5",
            Self::Letter => "us-letter",
            Self::Legal => "us-legal",
        }
    }
}

fn default_font() -> String {
    DEFAULT_FONT.to_string()
}

fn default_title_prefix() -> String {
    DEFAULT_TITLE_PREFIX.to_string()
}

/// Everything that shapes the rendered document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderOptions {
    #[serde(default)]
    pub paper: PageSize,
    #[serde(default = "default_font")]
    pub font: String,
    /// Extra directories searched for fonts.
    #[serde(default)]
    pub font_dirs: Vec<PathBuf>,
    #[serde(default = "default_title_prefix")]
    pub title_prefix: String,
    #[serde(default)]
    pub columns: ColumnRoles,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            paper: PageSize::default(),
            font: default_font(),
            font_dirs: Vec::new(),
            title_prefix: default_title_prefix(),
            columns: ColumnRoles::default(),
        }
    }
}

/// Compose the complete Typst document for a prepared record.
pub fn compose_document(
    record: &TabularRecord,
    layout: &ColumnLayout,
    options: &RenderOptions,
    generated_at: NaiveDateTime,
) -> String {
    let mut out = String::new();

    let _ = writeln!(
        out,
        "#set page(paper: \"{}\", margin: 2cm)",
        options.paper.typst_name()
    );
    let _ = writeln!(
        out,
        "#set text(font: (\"{}\", \"{}\"), size: 10pt)",
        escape_typst_string(&options.font),
        FALLBACK_FONT
    );
    out.push('\n');

    let title = format!(
        "{} {}",
        options.title_prefix,
        format_title_timestamp(generated_at)
    );
    let _ = writeln!(
        out,
        "#block(below: 1.2em, text(size: 14pt, weight: \"bold\", \"{}\"))",
        escape_typst_string(&title)
    );

    let columns = record.column_count();
    if columns == 0 {
        return out;
    }

    let widths = if layout.len() == columns {
        layout.to_typst()
    } else {
        columns.to_string()
    };

    let _ = writeln!(out, "#table(");
    let _ = writeln!(out, "  columns: {widths},");
    let _ = writeln!(out, "  align: center + horizon,");
    let _ = writeln!(out, "  stroke: 1pt + black,");
    let _ = writeln!(
        out,
        "  fill: (_, y) => if y == 0 {{ {HEADER_FILL} }} else if calc.odd(y) {{ {BODY_FILL} }} else {{ {BODY_FILL_ALT} }},"
    );
    let _ = writeln!(
        out,
        "  inset: (x, y) => if y == 0 {{ (x: 5pt, top: 5pt, bottom: 12pt) }} else {{ 5pt }},"
    );

    let header_cells: Vec<String> = (0..columns)
        .map(|i| {
            let label = record.header.get(i).map(String::as_str).unwrap_or("");
            format!(
                "text(size: 12pt, weight: \"bold\", fill: {HEADER_TEXT}){}",
                typst_cell(label)
            )
        })
        .collect();
    let _ = writeln!(
        out,
        "  table.header(repeat: true, {}),",
        header_cells.join(", ")
    );

    for row in &record.rows {
        let cells: Vec<String> = (0..columns)
            .map(|i| typst_cell(row.get(i).map(String::as_str).unwrap_or("")))
            .collect();
        let _ = writeln!(out, "  {},", cells.join(", "));
    }

    out.push_str(")\n");
    out
}
