//! Plain tabular containers passed between the adapters and the core.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// One export file as read by the source adapter: a header plus text cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawBatch {
    /// Where the batch came from; used in log lines and error messages.
    pub source: PathBuf,
    pub columns: Vec<String>,
    /// Each row holds exactly `columns.len()` cells.
    pub rows: Vec<Vec<String>>,
}

impl RawBatch {
    pub fn new(source: impl Into<PathBuf>, columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            source: source.into(),
            columns,
            rows,
        }
    }

    /// Index of the first column named `name`.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }
}

/// The deduplicated union of all batches, still untyped.
///
/// Columns are the union of the batch headers in order of first appearance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergedTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl MergedTable {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell at (`row`, `column`), or `""` when the row is short.
    pub fn cell(&self, row: usize, column: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .map(String::as_str)
            .unwrap_or("")
    }
}

/// Display-ready table: every cell already rendered as text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RenderedTable {
    /// Number of columns (header width).
    pub fn width(&self) -> usize {
        self.headers.len()
    }

    /// Number of data rows, excluding the header.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
