//! Mean-availability aggregation over typed grouping keys.

use std::collections::{BTreeSet, HashMap};

use availability_core::formatting::round_to;
use availability_core::models::{Field, KeyValue, Record, Region};
use chrono::NaiveDate;

// ── AggregateOptions ──────────────────────────────────────────────────────────

/// Optional pre-filter, post-filter and rounding applied by
/// [`AvailabilityAggregator::aggregate`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateOptions {
    /// Only records from this region enter the grouping.
    pub region: Option<Region>,
    /// Keep only groups whose (unrounded) mean is `<=` this value.
    pub max_value: Option<f64>,
    /// Round each kept mean to this many decimals, half away from zero.
    pub round_decimals: Option<u32>,
}

impl AggregateOptions {
    pub fn for_region(mut self, region: Region) -> Self {
        self.region = Some(region);
        self
    }

    pub fn at_most(mut self, max_value: f64) -> Self {
        self.max_value = Some(max_value);
        self
    }

    pub fn rounded(mut self, decimals: u32) -> Self {
        self.round_decimals = Some(decimals);
        self
    }
}

// ── Group / GroupedAggregate ──────────────────────────────────────────────────

/// One group: its key tuple (one value per grouping field) and mean.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub key: Vec<KeyValue>,
    pub mean: f64,
    /// Number of records averaged into `mean`.
    pub count: usize,
}

/// Result of one aggregation; immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupedAggregate {
    fields: Vec<Field>,
    groups: Vec<Group>,
    time_axis: Vec<NaiveDate>,
}

impl GroupedAggregate {
    /// The grouping fields, in key order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    /// Sorted distinct days seen by the grouping, before the value filter.
    ///
    /// A filtered aggregate keeps the full axis so that a pivot built from it
    /// still spans every day of its input.
    pub fn time_axis(&self) -> &[NaiveDate] {
        &self.time_axis
    }

    /// Position of `field` inside each group key.
    pub fn position(&self, field: Field) -> Option<usize> {
        self.fields.iter().position(|f| *f == field)
    }

    /// Mean for the group with exactly this key.
    pub fn get(&self, key: &[KeyValue]) -> Option<f64> {
        self.groups
            .iter()
            .find(|g| g.key.as_slice() == key)
            .map(|g| g.mean)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

// ── AvailabilityAggregator ────────────────────────────────────────────────────

/// Running sum for one group; values are added in record order so the mean
/// is reproducible bit for bit.
#[derive(Debug, Clone)]
struct Accumulator {
    key: Vec<KeyValue>,
    sum: f64,
    count: usize,
}

/// Stateless helper that groups records and averages their availability.
pub struct AvailabilityAggregator;

impl AvailabilityAggregator {
    /// Group `records` by exact equality over `group_by` and average the
    /// availability of each group.
    ///
    /// The value filter compares against the unrounded mean; rounding runs
    /// after it. Groups are returned ascending by `Time` when `Time` is one of
    /// the grouping fields, ties (and groupings without `Time`) in first-seen
    /// order.
    pub fn aggregate(
        records: &[Record],
        group_by: &[Field],
        options: &AggregateOptions,
    ) -> GroupedAggregate {
        let mut index: HashMap<Vec<KeyValue>, usize> = HashMap::new();
        let mut accumulators: Vec<Accumulator> = Vec::new();
        let mut days: BTreeSet<NaiveDate> = BTreeSet::new();

        let selected = records.iter().filter(|r| match &options.region {
            Some(region) => &r.region == region,
            None => true,
        });

        for record in selected {
            days.insert(record.time);
            let key: Vec<KeyValue> = group_by.iter().map(|f| f.extract(record)).collect();
            let slot = match index.get(&key) {
                Some(&slot) => slot,
                None => {
                    accumulators.push(Accumulator {
                        key: key.clone(),
                        sum: 0.0,
                        count: 0,
                    });
                    index.insert(key, accumulators.len() - 1);
                    accumulators.len() - 1
                }
            };
            let acc = &mut accumulators[slot];
            acc.sum += record.availability;
            acc.count += 1;
        }

        let mut groups: Vec<Group> = accumulators
            .into_iter()
            .map(|acc| Group {
                mean: acc.sum / acc.count as f64,
                key: acc.key,
                count: acc.count,
            })
            .filter(|g| options.max_value.map_or(true, |max| g.mean <= max))
            .map(|mut g| {
                if let Some(decimals) = options.round_decimals {
                    g.mean = round_to(g.mean, decimals);
                }
                g
            })
            .collect();

        if let Some(time_pos) = group_by.iter().position(|f| *f == Field::Time) {
            // Stable sort: same-day groups keep first-seen order.
            groups.sort_by(|a, b| a.key[time_pos].cmp(&b.key[time_pos]));
        }

        GroupedAggregate {
            fields: group_by.to_vec(),
            groups,
            time_axis: days.into_iter().collect(),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
