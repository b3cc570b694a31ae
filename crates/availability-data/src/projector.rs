//! Restricts the merged table to the reporting columns and types each row.

use availability_core::error::{AvailabilityError, Result};
use availability_core::models::{
    Record, Region, CLUSTER_ID_COLUMN, REGION_COLUMN, SITE_ID_COLUMN, SITE_NAME_COLUMN,
    TIME_COLUMN,
};
use availability_core::time_utils::parse_time;
use tracing::warn;

use crate::table::MergedTable;

/// Project `table` onto `{Time, Site Location Name, Site Location ID, Region,
/// Cluster ID, <availability_column>}` and convert every row into a
/// [`Record`], preserving row order.
///
/// Rows whose availability cell is blank carry no measurement and are
/// skipped (counted in a warning). Any other unparseable `Time` or
/// availability cell is an [`AvailabilityError::InvalidValue`]; row numbers
/// in that error are 1-based positions in the merged table.
pub fn project(table: &MergedTable, availability_column: &str) -> Result<Vec<Record>> {
    let index = |name: &str| {
        table
            .column_index(name)
            .ok_or_else(|| AvailabilityError::missing_column(name))
    };

    let time_idx = index(TIME_COLUMN)?;
    let site_name_idx = index(SITE_NAME_COLUMN)?;
    let site_id_idx = index(SITE_ID_COLUMN)?;
    let region_idx = index(REGION_COLUMN)?;
    let cluster_idx = index(CLUSTER_ID_COLUMN)?;
    let availability_idx = index(availability_column)?;

    let mut records = Vec::with_capacity(table.len());
    let mut skipped = 0usize;

    for row in 0..table.len() {
        let invalid = |column: &str, value: &str| AvailabilityError::InvalidValue {
            row: row + 1,
            column: column.to_string(),
            value: value.to_string(),
        };

        let raw_availability = table.cell(row, availability_idx).trim();
        if raw_availability.is_empty() {
            skipped += 1;
            continue;
        }
        let availability = parse_availability(raw_availability)
            .ok_or_else(|| invalid(availability_column, raw_availability))?;

        let raw_time = table.cell(row, time_idx);
        let time = parse_time(raw_time).ok_or_else(|| invalid(TIME_COLUMN, raw_time))?;

        records.push(Record {
            time,
            site_name: table.cell(row, site_name_idx).trim().to_string(),
            site_id: table.cell(row, site_id_idx).trim().to_string(),
            region: Region::from_label(table.cell(row, region_idx)),
            cluster_id: table.cell(row, cluster_idx).trim().to_string(),
            availability,
        });
    }

    if skipped > 0 {
        warn!("Skipped {} rows without an availability value", skipped);
    }

    Ok(records)
}

/// Parse a percentage cell; a trailing `%` is tolerated.
fn parse_availability(raw: &str) -> Option<f64> {
    let value: f64 = raw.trim_end_matches('%').trim().parse().ok()?;
    value.is_finite().then_some(value)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
