//! Tabular input: CSV loading, column relabeling and cell preparation.

use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;

use super::dates::normalize_datetime;
use super::wrap::{wrap_text, DEFAULT_WRAP_WIDTH};
use super::ReportError;

/// Field delimiter of the outage exports.
pub const CSV_DELIMITER: u8 = b';';

/// A source column name and the label shown in the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRename {
    pub source: String,
    pub label: String,
}

impl ColumnRename {
    pub fn new(source: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            label: label.into(),
        }
    }
}

/// Which source columns play the identifier, name and date roles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRoles {
    pub id: ColumnRename,
    pub name: ColumnRename,
    pub date: ColumnRename,
}

impl Default for ColumnRoles {
    fn default() -> Self {
        Self {
            id: ColumnRename::new("CameraID", "ID камеры"),
            name: ColumnRename::new("CameraName", "Камера"),
            date: ColumnRename::new("NotAvailable", "Дата"),
        }
    }
}

/// Header plus body rows, all as display strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TabularRecord {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TabularRecord {
    pub fn new(header: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { header, rows }
    }

    /// Read a semicolon-delimited UTF-8 CSV with a header row.
    pub fn from_csv_path(path: &Path) -> Result<Self, ReportError> {
        let to_err = |source| ReportError::Csv {
            path: path.to_path_buf(),
            source,
        };
        let reader = ReaderBuilder::new()
            .delimiter(CSV_DELIMITER)
            .has_headers(true)
            .flexible(true)
            .from_path(path)
            .map_err(to_err)?;
        Self::from_csv_reader(reader).map_err(to_err)
    }

    /// Read the same format from any reader.
    pub fn from_csv_bytes<R: Read>(input: R) -> Result<Self, csv::Error> {
        let reader = ReaderBuilder::new()
            .delimiter(CSV_DELIMITER)
            .has_headers(true)
            .flexible(true)
            .from_reader(input);
        Self::from_csv_reader(reader)
    }

    fn from_csv_reader<R: Read>(mut reader: csv::Reader<R>) -> Result<Self, csv::Error> {
        let header = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        Ok(Self { header, rows })
    }

    pub fn body_len(&self) -> usize {
        self.rows.len()
    }

    /// Widest row, header included.
    pub fn column_count(&self) -> usize {
        self.rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(self.header.len()))
            .max()
            .unwrap_or(0)
    }

    /// Header followed by body rows.
    pub fn all_rows(&self) -> Vec<Vec<String>> {
        std::iter::once(self.header.clone())
            .chain(self.rows.iter().cloned())
            .collect()
    }

    /// Relabel the header, pad ragged rows, normalize dates and wrap names.
    pub fn prepare(self, roles: &ColumnRoles) -> Self {
        let columns = self.column_count();
        let name_idx = self.position(&roles.name.source);
        let date_idx = self.position(&roles.date.source);

        let header = pad(self.header, columns)
            .into_iter()
            .map(|h| relabel(h, roles))
            .collect();

        let rows = self
            .rows
            .into_iter()
            .map(|row| {
                let mut row = pad(row, columns);
                if let Some(cell) = date_idx.and_then(|i| row.get_mut(i)) {
                    *cell = normalize_datetime(cell);
                }
                if let Some(cell) = name_idx.and_then(|i| row.get_mut(i)) {
                    *cell = wrap_text(cell.as_str(), DEFAULT_WRAP_WIDTH);
                }
                row
            })
            .collect();

        Self { header, rows }
    }

    fn position(&self, source: &str) -> Option<usize> {
        self.header.iter().position(|h| h == source)
    }
}

fn pad(mut row: Vec<String>, columns: usize) -> Vec<String> {
    if row.len() < columns {
        row.resize(columns, String::new());
    }
    row
}

fn relabel(header: String, roles: &ColumnRoles) -> String {
    [&roles.id, &roles.name, &roles.date]
        .into_iter()
        .find(|rename| rename.source == header)
        .map(|rename| rename.label.clone())
        .unwrap_or(header)
}
