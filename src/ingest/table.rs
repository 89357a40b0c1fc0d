//! CSV loading into a row-oriented table with normalized column names.

use std::collections::HashMap;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};

use crate::error::IngestError;

/// Cell texts read as "no value", matching the NaN markers common tabular
/// loaders recognize by default.
const MISSING_MARKERS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Normalize a header name: trim, spaces to underscores, lowercase.
///
/// `"  Attack Type "` becomes `"attack_type"`. Applying it twice is a no-op.
pub fn normalize_column(name: &str) -> String {
    name.trim().replace(' ', "_").to_lowercase()
}

/// Whether a raw cell should be treated as absent.
pub fn is_missing(cell: &str) -> bool {
    let cell = cell.trim();
    cell.is_empty() || MISSING_MARKERS.contains(&cell)
}

/// A parsed CSV file: normalized headers plus records in file order.
#[derive(Debug)]
pub struct EventTable {
    columns: Vec<String>,
    index: HashMap<String, usize>,
    records: Vec<StringRecord>,
}

impl EventTable {
    /// Read and parse a CSV file with a header row.
    pub fn from_path(path: &Path) -> Result<Self, IngestError> {
        let reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(path)?;
        Self::from_reader(reader)
    }

    /// Parse CSV text already in memory.
    pub fn from_csv_str(data: &str) -> Result<Self, IngestError> {
        let reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(data.as_bytes());
        Self::from_reader(reader)
    }

    fn from_reader<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<Self, IngestError> {
        let columns: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| normalize_column(h.trim_start_matches('\u{feff}')))
            .collect();

        let mut index = HashMap::with_capacity(columns.len());
        for (i, name) in columns.iter().enumerate() {
            // first occurrence wins
            index.entry(name.clone()).or_insert(i);
        }

        let mut records = Vec::new();
        for record in reader.records() {
            let record = record?;
            if record.len() > columns.len() {
                let line = record.position().map(|p| p.line()).unwrap_or(0);
                return Err(IngestError::Row {
                    line,
                    message: format!(
                        "expected at most {} fields, found {}",
                        columns.len(),
                        record.len()
                    ),
                });
            }
            records.push(record);
        }

        tracing::debug!(columns = columns.len(), rows = records.len(), "CSV parsed");
        Ok(Self {
            columns,
            index,
            records,
        })
    }

    /// Normalized column names in file order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn rows(&self) -> impl Iterator<Item = EventRow<'_>> {
        self.records.iter().map(move |record| EventRow {
            table: self,
            record,
        })
    }
}

/// Borrowed view of one CSV record.
#[derive(Debug, Clone, Copy)]
pub struct EventRow<'a> {
    table: &'a EventTable,
    record: &'a StringRecord,
}

impl<'a> EventRow<'a> {
    /// Value of a normalized column, or `None` when the column does not exist,
    /// the record is short, or the cell is missing.
    pub fn value(&self, column: &str) -> Option<&'a str> {
        let idx = *self.table.index.get(column)?;
        self.record.get(idx).filter(|cell| !is_missing(cell))
    }
}
