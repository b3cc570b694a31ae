//! Rounding and display helpers for availability figures.
//!
//! Rounding is half away from zero. Values are nudged by a relative epsilon
//! before rounding so that decimal midpoints stored just below the midpoint in
//! binary (`1.005` is really `1.00499999…`) still round up.

use chrono::NaiveDate;

use crate::baselines::REPORT_DECIMALS;

/// Placeholder rendered for a pivot cell that has no data.
pub const NO_DATA: &str = "-";

/// Round `value` to `decimals` places, half away from zero.
///
/// # Examples
///
/// ```
/// use availability_core::formatting::round_to;
///
/// assert_eq!(round_to(99.456, 2), 99.46);
/// assert_eq!(round_to(1.005, 2), 1.01);
/// assert_eq!(round_to(-2.5, 0), -3.0);
/// ```
pub fn round_to(value: f64, decimals: u32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let factor = 10_f64.powi(decimals as i32);
    let abs_value = value.abs();
    let epsilon = f64::EPSILON * abs_value * factor;
    let rounded = ((abs_value * factor) + epsilon).round() / factor;
    if value < 0.0 {
        -rounded
    } else {
        rounded
    }
}

/// Render an availability figure with exactly two decimals.
///
/// # Examples
///
/// ```
/// use availability_core::formatting::format_value;
///
/// assert_eq!(format_value(99.0), "99.00");
/// assert_eq!(format_value(99.996), "100.00");
/// ```
pub fn format_value(value: f64) -> String {
    let decimals = REPORT_DECIMALS as usize;
    format!(
        "{:.prec$}",
        round_to(value, REPORT_DECIMALS),
        prec = decimals
    )
}

/// Render an optional pivot cell: the value, or [`NO_DATA`].
pub fn format_cell(value: Option<f64>) -> String {
    match value {
        Some(v) => format_value(v),
        None => NO_DATA.to_string(),
    }
}

/// ISO calendar date used for pivot column headers and the Time column.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

// ── Tests ──────────────────────────────────────────────────────────────────────
