//! The four report views derived from the canonical dataset.
//!
//! Each builder is a pure function of the projected records, so the runtime
//! may run them in any order or concurrently; [`assemble_views`] runs them one
//! after another.

use availability_core::baselines::{
    baseline_for, DEFAULT_LOW_AVAILABILITY_THRESHOLD, REPORT_DECIMALS, TRACKED_REGIONS,
};
use availability_core::error::Result;
use availability_core::formatting::{format_date, format_value};
use availability_core::models::{Field, Record, Region};
use chrono::NaiveDate;
use tracing::debug;

use crate::aggregator::{AggregateOptions, AvailabilityAggregator};
use crate::pivot::{pivot, PivotTable};
use crate::table::RenderedTable;

/// Sheet order of the low-availability views.
pub const LOW_AVAILABILITY_REGIONS: [Region; 2] = [Region::Southern, Region::Eastern];

const REGION_GROUPING: [Field; 2] = [Field::Time, Field::Region];
const LOW_AVAILABILITY_GROUPING: [Field; 3] = [Field::Time, Field::SiteName, Field::SiteId];
const LOW_AVAILABILITY_IDENTITY: [Field; 2] = [Field::SiteId, Field::SiteName];
const SITE_GROUPING: [Field; 4] = [Field::Time, Field::SiteName, Field::SiteId, Field::Region];
const SITE_IDENTITY: [Field; 3] = [Field::SiteName, Field::SiteId, Field::Region];
const CLUSTER_GROUPING: [Field; 2] = [Field::Time, Field::ClusterId];
const CLUSTER_IDENTITY: [Field; 1] = [Field::ClusterId];

// ── Public types ──────────────────────────────────────────────────────────────

/// Tunables for view assembly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewConfig {
    /// Upper bound (inclusive) for the low-availability views.
    pub low_availability_threshold: f64,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            low_availability_threshold: DEFAULT_LOW_AVAILABILITY_THRESHOLD,
        }
    }
}

/// One day of a region's comparison series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionPoint {
    pub time: NaiveDate,
    /// Mean availability of the region on `time`, rounded to report decimals.
    pub availability: f64,
}

/// Long-form daily series of one tracked region against its baseline.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionSeries {
    pub region: Region,
    pub baseline: f64,
    /// Ascending by time.
    pub points: Vec<RegionPoint>,
}

impl RegionSeries {
    /// Header of the baseline column, e.g. `"Eastern Baseline"`.
    pub fn baseline_header(&self) -> String {
        format!("{} Baseline", self.region.display_name())
    }

    /// Highest point; the earliest one wins a tie.
    pub fn max_point(&self) -> Option<RegionPoint> {
        self.points.iter().copied().reduce(|best, p| {
            if p.availability > best.availability {
                p
            } else {
                best
            }
        })
    }

    /// Lowest point; the earliest one wins a tie.
    pub fn min_point(&self) -> Option<RegionPoint> {
        self.points.iter().copied().reduce(|best, p| {
            if p.availability < best.availability {
                p
            } else {
                best
            }
        })
    }

    /// `Time | Region | <Region> Baseline | Availability (%)`.
    pub fn render(&self) -> RenderedTable {
        let headers = vec![
            Field::Time.column_name().to_string(),
            Field::Region.column_name().to_string(),
            self.baseline_header(),
            "Availability (%)".to_string(),
        ];
        let rows = self
            .points
            .iter()
            .map(|p| {
                vec![
                    format_date(p.time),
                    self.region.to_string(),
                    format_value(self.baseline),
                    format_value(p.availability),
                ]
            })
            .collect();
        RenderedTable { headers, rows }
    }
}

/// Sites of one region whose daily mean is at or below the threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct LowAvailabilityView {
    pub region: Region,
    pub threshold: f64,
    pub table: PivotTable,
}

/// Everything the report needs, computed from one dataset snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportViews {
    /// One series per tracked region, Eastern then Southern.
    pub regions: Vec<RegionSeries>,
    /// One view per region of [`LOW_AVAILABILITY_REGIONS`], in that order.
    pub low_availability: Vec<LowAvailabilityView>,
    pub sites: PivotTable,
    pub clusters: PivotTable,
}

// ── View builders ─────────────────────────────────────────────────────────────

fn rounded() -> AggregateOptions {
    AggregateOptions::default().rounded(REPORT_DECIMALS)
}

/// Daily mean per tracked region, split into one series per region.
///
/// A tracked region without records yields an empty series.
pub fn region_view(records: &[Record]) -> Vec<RegionSeries> {
    let agg = AvailabilityAggregator::aggregate(records, &REGION_GROUPING, &rounded());

    let series: Vec<RegionSeries> = TRACKED_REGIONS
        .iter()
        .filter_map(|region| {
            let baseline = baseline_for(region)?;
            let label = region.to_string();
            let points = agg
                .groups()
                .iter()
                .filter(|g| g.key[1].to_string() == label)
                .filter_map(|g| {
                    Some(RegionPoint {
                        time: g.key[0].as_date()?,
                        availability: g.mean,
                    })
                })
                .collect();
            Some(RegionSeries {
                region: region.clone(),
                baseline,
                points,
            })
        })
        .collect();

    debug!(
        "Region view: {}",
        series
            .iter()
            .map(|s| format!("{}={} days", s.region.display_name(), s.points.len()))
            .collect::<Vec<_>>()
            .join(", ")
    );
    series
}

/// Sites of `region` whose daily mean is `<= threshold`, pivoted by
/// (Site ID, Site Name).
pub fn low_availability_view(
    records: &[Record],
    region: &Region,
    threshold: f64,
) -> Result<LowAvailabilityView> {
    let options = rounded().for_region(region.clone()).at_most(threshold);
    let agg = AvailabilityAggregator::aggregate(records, &LOW_AVAILABILITY_GROUPING, &options);
    let table = pivot(&agg, &LOW_AVAILABILITY_IDENTITY)?;
    debug!(
        "Low-availability view for {} (<= {}): {} sites over {} days",
        region.display_name(),
        threshold,
        table.len(),
        table.columns().len()
    );
    Ok(LowAvailabilityView {
        region: region.clone(),
        threshold,
        table,
    })
}

/// One low-availability view per region of [`LOW_AVAILABILITY_REGIONS`].
pub fn low_availability_views(
    records: &[Record],
    config: &ViewConfig,
) -> Result<Vec<LowAvailabilityView>> {
    LOW_AVAILABILITY_REGIONS
        .iter()
        .map(|region| low_availability_view(records, region, config.low_availability_threshold))
        .collect()
}

/// Daily mean per site, pivoted by (Site Name, Site ID, Region).
pub fn site_view(records: &[Record]) -> Result<PivotTable> {
    let agg = AvailabilityAggregator::aggregate(records, &SITE_GROUPING, &rounded());
    let table = pivot(&agg, &SITE_IDENTITY)?;
    debug!("Site view: {} sites", table.len());
    Ok(table)
}

/// Daily mean per cluster, pivoted by Cluster ID.
pub fn cluster_view(records: &[Record]) -> Result<PivotTable> {
    let agg = AvailabilityAggregator::aggregate(records, &CLUSTER_GROUPING, &rounded());
    let table = pivot(&agg, &CLUSTER_IDENTITY)?;
    debug!("Cluster view: {} clusters", table.len());
    Ok(table)
}

/// Build all four views one after another.
pub fn assemble_views(records: &[Record], config: &ViewConfig) -> Result<ReportViews> {
    Ok(ReportViews {
        regions: region_view(records),
        low_availability: low_availability_views(records, config)?,
        sites: site_view(records)?,
        clusters: cluster_view(records)?,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
