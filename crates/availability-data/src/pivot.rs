//! Wide-format pivot: one row per entity, one column per day.
//!
//! The numeric core ([`PivotTable`]) keeps `Option<f64>` cells; turning them
//! into display strings is a separate pass ([`PivotTable::render`]).

use std::collections::HashMap;

use availability_core::error::{AvailabilityError, Result};
use availability_core::formatting::{format_cell, format_date};
use availability_core::models::{Field, KeyValue};
use chrono::NaiveDate;

use crate::aggregator::GroupedAggregate;
use crate::table::RenderedTable;

/// One entity row of a pivot.
#[derive(Debug, Clone, PartialEq)]
pub struct PivotRow {
    /// Values of the identity fields, in [`PivotTable::identity_fields`] order.
    pub identity: Vec<KeyValue>,
    /// One cell per entry of [`PivotTable::columns`].
    pub cells: Vec<Option<f64>>,
}

impl PivotRow {
    fn is_blank(&self) -> bool {
        self.cells.iter().all(Option::is_none)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PivotTable {
    identity_fields: Vec<Field>,
    columns: Vec<NaiveDate>,
    rows: Vec<PivotRow>,
}

impl PivotTable {
    pub fn identity_fields(&self) -> &[Field] {
        &self.identity_fields
    }

    /// Day columns, ascending.
    pub fn columns(&self) -> &[NaiveDate] {
        &self.columns
    }

    pub fn rows(&self) -> &[PivotRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell value for `identity` on `time`; `None` when the row, the column
    /// or the value is absent.
    pub fn get(&self, identity: &[KeyValue], time: NaiveDate) -> Option<f64> {
        let col = self.columns.binary_search(&time).ok()?;
        self.rows
            .iter()
            .find(|r| r.identity.as_slice() == identity)
            .and_then(|r| r.cells[col])
    }

    /// Render headers and cells as text: identity column names followed by
    /// `YYYY-MM-DD` day headers; values with two decimals, gaps as `-`.
    pub fn render(&self) -> RenderedTable {
        let headers = self
            .identity_fields
            .iter()
            .map(|f| f.column_name().to_string())
            .chain(self.columns.iter().map(|d| format_date(*d)))
            .collect();

        let rows = self
            .rows
            .iter()
            .map(|row| {
                row.identity
                    .iter()
                    .map(ToString::to_string)
                    .chain(row.cells.iter().map(|c| format_cell(*c)))
                    .collect()
            })
            .collect();

        RenderedTable { headers, rows }
    }
}

/// Reshape `agg` into a pivot keyed by `identity`, one column per day of the
/// aggregate's time axis.
///
/// Fails with [`AvailabilityError::FieldNotGrouped`] when `Time` or an
/// identity field is not a grouping field, and with
/// [`AvailabilityError::DuplicateCell`] when two groups share a cell.
pub fn pivot(agg: &GroupedAggregate, identity: &[Field]) -> Result<PivotTable> {
    let time_pos = agg
        .position(Field::Time)
        .ok_or(AvailabilityError::FieldNotGrouped(Field::Time))?;
    let identity_pos = identity
        .iter()
        .map(|f| agg.position(*f).ok_or(AvailabilityError::FieldNotGrouped(*f)))
        .collect::<Result<Vec<usize>>>()?;

    let columns = agg.time_axis().to_vec();
    let mut rows: Vec<PivotRow> = Vec::new();
    let mut row_index: HashMap<Vec<KeyValue>, usize> = HashMap::new();

    for group in agg.groups() {
        let time = group.key[time_pos]
            .as_date()
            .ok_or(AvailabilityError::FieldNotGrouped(Field::Time))?;
        // Every grouped day is on the axis; skip defensively if not.
        let Ok(col) = columns.binary_search(&time) else {
            continue;
        };

        let key: Vec<KeyValue> = identity_pos.iter().map(|&p| group.key[p].clone()).collect();
        let slot = match row_index.get(&key) {
            Some(&slot) => slot,
            None => {
                rows.push(PivotRow {
                    identity: key.clone(),
                    cells: vec![None; columns.len()],
                });
                row_index.insert(key, rows.len() - 1);
                rows.len() - 1
            }
        };

        let cell = &mut rows[slot].cells[col];
        if cell.is_some() {
            return Err(AvailabilityError::DuplicateCell {
                identity: describe(&rows[slot].identity),
                time,
            });
        }
        *cell = Some(group.mean);
    }

    rows.retain(|r| !r.is_blank());

    Ok(PivotTable {
        identity_fields: identity.to_vec(),
        columns,
        rows,
    })
}

fn describe(identity: &[KeyValue]) -> String {
    identity
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::{AggregateOptions, AvailabilityAggregator};
    use availability_core::models::{Record, Region};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    fn record(d: u32, site: &str, cluster: &str, value: f64) -> Record {
        Record {
            time: day(d),
            site_name: format!("Site {}", site),
            site_id: site.to_string(),
            region: Region::Southern,
            cluster_id: cluster.to_string(),
            availability: value,
        }
    }

    fn text(s: &str) -> KeyValue {
        KeyValue::Text(s.to_string())
    }

    /// Canonical rows of the two-batch merge example.
    fn merged_example() -> Vec<Record> {
        vec![
            record(1, "id1", "c1", 99.0),
            record(2, "id1", "c1", 99.8),
            record(3, "id1", "c1", 99.5),
        ]
    }

    #[test]
    fn test_pivot_round_trip() {
        let records = vec![
            record(1, "id1", "c1", 99.1),
            record(1, "id2", "c1", 98.2),
            record(2, "id2", "c2", 97.3),
            record(3, "id1", "c2", 99.9),
        ];
        let agg = AvailabilityAggregator::aggregate(
            &records,
            &[Field::Time, Field::SiteId],
            &AggregateOptions::default(),
        );
        let table = pivot(&agg, &[Field::SiteId]).unwrap();

        assert_eq!(table.columns(), &[day(1), day(2), day(3)]);
        assert_eq!(table.len(), 2);
        for group in agg.groups() {
            let time = group.key[0].as_date().unwrap();
            assert_eq!(table.get(&group.key[1..], time), Some(group.mean));
        }
        assert_eq!(table.get(&[text("id1")], day(2)), None);
    }

    #[test]
    fn test_rows_in_first_seen_order() {
        let records = vec![
            record(2, "id9", "c1", 99.0),
            record(1, "id3", "c1", 99.0),
        ];
        let agg = AvailabilityAggregator::aggregate(
            &records,
            &[Field::Time, Field::SiteId],
            &AggregateOptions::default(),
        );
        let table = pivot(&agg, &[Field::SiteId]).unwrap();

        // The aggregate is time-sorted, so id3 (day 1) is seen first.
        let ids: Vec<String> = table.rows().iter().map(|r| r.identity[0].to_string()).collect();
        assert_eq!(ids, vec!["id3", "id9"]);
    }

    #[test]
    fn test_filtered_scenario_keeps_axis() {
        let agg = AvailabilityAggregator::aggregate(
            &merged_example(),
            &[Field::Time, Field::SiteId],
            &AggregateOptions::default().at_most(99.6).rounded(2),
        );
        let rendered = pivot(&agg, &[Field::SiteId]).unwrap().render();

        assert_eq!(
            rendered.headers,
            vec!["Site Location ID", "2024-06-01", "2024-06-02", "2024-06-03"]
        );
        assert_eq!(rendered.rows, vec![vec!["id1", "99.00", "-", "99.50"]]);
    }

    #[test]
    fn test_single_surviving_day_row_is_kept() {
        let agg = AvailabilityAggregator::aggregate(
            &merged_example(),
            &[Field::Time, Field::SiteId],
            &AggregateOptions::default().at_most(99.4).rounded(2),
        );
        assert_eq!(agg.len(), 1);

        let rendered = pivot(&agg, &[Field::SiteId]).unwrap().render();
        assert_eq!(rendered.rows, vec![vec!["id1", "99.00", "-", "-"]]);
    }

    #[test]
    fn test_no_blank_rows() {
        let records = vec![
            record(1, "id1", "c1", 99.9),
            record(1, "id2", "c1", 90.0),
            record(2, "id3", "c1", 99.9),
        ];
        let agg = AvailabilityAggregator::aggregate(
            &records,
            &[Field::Time, Field::SiteId],
            &AggregateOptions::default().at_most(99.6),
        );
        let table = pivot(&agg, &[Field::SiteId]).unwrap();

        assert_eq!(table.len(), 1);
        assert!(table.rows().iter().all(|r| r.cells.iter().any(Option::is_some)));
        assert!(table
            .render()
            .rows
            .iter()
            .all(|r| r[1..].iter().any(|c| c != "-")));
    }

    #[test]
    fn test_empty_aggregate_pivots_to_empty_table() {
        let agg = AvailabilityAggregator::aggregate(
            &[],
            &[Field::Time, Field::SiteId],
            &AggregateOptions::default(),
        );
        let table = pivot(&agg, &[Field::SiteId]).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.render().headers, vec!["Site Location ID"]);
    }

    #[test]
    fn test_duplicate_cell() {
        // Grouping by cluster as well makes two groups per (site, day).
        let records = vec![
            record(1, "id1", "c1", 99.0),
            record(1, "id1", "c2", 98.0),
        ];
        let agg = AvailabilityAggregator::aggregate(
            &records,
            &[Field::Time, Field::SiteId, Field::ClusterId],
            &AggregateOptions::default(),
        );
        let err = pivot(&agg, &[Field::SiteId]).unwrap_err();
        match err {
            AvailabilityError::DuplicateCell { identity, time } => {
                assert_eq!(identity, "id1");
                assert_eq!(time, day(1));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_field_not_grouped() {
        let agg = AvailabilityAggregator::aggregate(
            &merged_example(),
            &[Field::Time, Field::SiteId],
            &AggregateOptions::default(),
        );
        assert!(matches!(
            pivot(&agg, &[Field::ClusterId]),
            Err(AvailabilityError::FieldNotGrouped(Field::ClusterId))
        ));

        let no_time = AvailabilityAggregator::aggregate(
            &merged_example(),
            &[Field::SiteId],
            &AggregateOptions::default(),
        );
        assert!(matches!(
            pivot(&no_time, &[Field::SiteId]),
            Err(AvailabilityError::FieldNotGrouped(Field::Time))
        ));
    }

    #[test]
    fn test_render_multi_field_identity() {
        let agg = AvailabilityAggregator::aggregate(
            &[record(1, "id1", "c1", 99.456)],
            &[Field::Time, Field::SiteName, Field::SiteId, Field::Region],
            &AggregateOptions::default().rounded(2),
        );
        let rendered = pivot(&agg, &[Field::SiteName, Field::SiteId, Field::Region])
            .unwrap()
            .render();

        assert_eq!(
            rendered.headers,
            vec![
                "Site Location Name",
                "Site Location ID",
                "Region",
                "2024-06-01"
            ]
        );
        assert_eq!(
            rendered.rows,
            vec![vec!["Site id1", "id1", "SOUTHERN", "99.46"]]
        );
    }
}
