//! First-batch-wins merge of export batches into one canonical table.

use std::collections::HashSet;

use availability_core::error::{AvailabilityError, Result};
use availability_core::models::TIME_COLUMN;
use availability_core::time_utils::parse_time;
use chrono::NaiveDate;
use tracing::debug;

use crate::table::{MergedTable, RawBatch};

/// Merge `batches` in order into one table with unique `Time` days across
/// batches.
///
/// The dedup key is the calendar day of the `Time` cell, so `2024-06-01` and
/// `01/06/2024` count as the same timestamp. A batch contributes only the rows
/// whose day was not already present before that batch started; a later file
/// carrying a correction for a seen day is ignored. Rows of one batch that
/// share a new day are all kept. The result's columns are the union of all
/// headers in order of first appearance; cells for columns a batch lacks are
/// empty.
///
/// A `Time` cell that is not a recognised date fails with
/// [`AvailabilityError::InvalidValue`]; its row number is the 1-based data row
/// within that batch.
pub fn merge(batches: &[RawBatch]) -> Result<MergedTable> {
    if batches.is_empty() {
        return Err(AvailabilityError::EmptyInput);
    }

    let mut columns: Vec<String> = Vec::new();
    for batch in batches {
        for column in &batch.columns {
            if !columns.contains(column) {
                columns.push(column.clone());
            }
        }
    }

    let mut seen: HashSet<NaiveDate> = HashSet::new();
    let mut rows: Vec<Vec<String>> = Vec::new();

    for batch in batches {
        let time_idx = batch
            .column_index(TIME_COLUMN)
            .ok_or_else(|| AvailabilityError::missing_column(TIME_COLUMN))?;

        // Position of every merged column inside this batch.
        let mapping: Vec<Option<usize>> =
            columns.iter().map(|c| batch.column_index(c)).collect();

        let mut new_days: Vec<NaiveDate> = Vec::new();
        let mut kept = 0usize;
        let mut dropped = 0usize;

        for (n, row) in batch.rows.iter().enumerate() {
            let raw = row.get(time_idx).map(String::as_str).unwrap_or("");
            let day = parse_time(raw).ok_or_else(|| {
                debug!("Unreadable Time in {}", batch.source.display());
                AvailabilityError::InvalidValue {
                    row: n + 1,
                    column: TIME_COLUMN.to_string(),
                    value: raw.to_string(),
                }
            })?;
            if seen.contains(&day) {
                dropped += 1;
                continue;
            }
            new_days.push(day);
            kept += 1;
            rows.push(
                mapping
                    .iter()
                    .map(|idx| {
                        idx.and_then(|i| row.get(i))
                            .cloned()
                            .unwrap_or_default()
                    })
                    .collect(),
            );
        }

        debug!(
            "Batch {}: {} rows kept, {} rows already covered",
            batch.source.display(),
            kept,
            dropped
        );
        seen.extend(new_days);
    }

    Ok(MergedTable { columns, rows })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
