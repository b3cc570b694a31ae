use crate::models::Region;

// ── Shared constants ──────────────────────────────────────────────────────────

/// Target availability for the Eastern region, drawn as the chart reference line.
pub const EASTERN_BASELINE: f64 = 99.3;

/// Target availability for the Southern region, drawn as the chart reference line.
pub const SOUTHERN_BASELINE: f64 = 99.6;

/// Inclusive upper bound for a site-day to be listed on a low-availability sheet.
pub const DEFAULT_LOW_AVAILABILITY_THRESHOLD: f64 = 99.6;

/// Decimal places used for every availability figure in the report.
pub const REPORT_DECIMALS: u32 = 2;

/// Regions with their own comparison series and low-availability sheet,
/// in the order the comparison tables are laid out.
pub const TRACKED_REGIONS: [Region; 2] = [Region::Eastern, Region::Southern];

/// Fixed baseline for `region`, or `None` for regions the report does not track.
pub fn baseline_for(region: &Region) -> Option<f64> {
    match region {
        Region::Eastern => Some(EASTERN_BASELINE),
        Region::Southern => Some(SOUTHERN_BASELINE),
        Region::Other(_) => None,
    }
}
