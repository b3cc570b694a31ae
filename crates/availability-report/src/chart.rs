//! Line-chart descriptors for the region comparison sheet.
//!
//! A [`ChartSpec`] says what to draw and where; turning it into pixels is
//! left to whatever consumes the report.

use availability_core::formatting::{format_date, format_value};
use availability_data::views::RegionSeries;
use serde::{Deserialize, Serialize};

use crate::layout::CellAnchor;

pub const X_AXIS_LABEL: &str = "Date";
pub const Y_AXIS_LABEL: &str = "Availability (%)";
pub const BASELINE_SERIES_LABEL: &str = "Sites baseline";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationKind {
    Max,
    Min,
    Baseline,
}

impl AnnotationKind {
    /// Text colour of the annotation.
    pub fn color(self) -> &'static str {
        match self {
            AnnotationKind::Max => "green",
            AnnotationKind::Min => "red",
            AnnotationKind::Baseline => "blue",
        }
    }
}

/// A value label pinned to one category of the chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub kind: AnnotationKind,
    /// Index into [`ChartSpec::categories`].
    pub category: usize,
    pub value: f64,
    pub text: String,
    pub color: String,
}

impl Annotation {
    fn new(kind: AnnotationKind, category: usize, value: f64) -> Self {
        Self {
            kind,
            category,
            value,
            text: format_value(value),
            color: kind.color().to_string(),
        }
    }
}

/// One observed series drawn against a constant baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub series_label: String,
    /// X-axis categories (`YYYY-MM-DD`).
    pub categories: Vec<String>,
    pub values: Vec<f64>,
    pub baseline: f64,
    pub baseline_label: String,
    pub annotations: Vec<Annotation>,
    /// Top-left cell the chart is anchored to.
    pub anchor: CellAnchor,
}

impl ChartSpec {
    /// Describe the line chart of `series`, annotated with its maximum,
    /// minimum and the baseline value at the last category.
    pub fn for_region(series: &RegionSeries, anchor: CellAnchor) -> Self {
        let name = series.region.display_name();
        let categories: Vec<String> = series.points.iter().map(|p| format_date(p.time)).collect();
        let values: Vec<f64> = series.points.iter().map(|p| p.availability).collect();

        let mut annotations = Vec::new();
        if let Some(max) = series.max_point() {
            annotations.push(Annotation::new(
                AnnotationKind::Max,
                category_of(series, max.time),
                max.availability,
            ));
        }
        if let Some(min) = series.min_point() {
            annotations.push(Annotation::new(
                AnnotationKind::Min,
                category_of(series, min.time),
                min.availability,
            ));
        }
        if !categories.is_empty() {
            annotations.push(Annotation::new(
                AnnotationKind::Baseline,
                categories.len() - 1,
                series.baseline,
            ));
        }

        Self {
            title: format!("{} Availability", name),
            x_label: X_AXIS_LABEL.to_string(),
            y_label: Y_AXIS_LABEL.to_string(),
            series_label: format!("MOCN ({})", name),
            categories,
            values,
            baseline: series.baseline,
            baseline_label: BASELINE_SERIES_LABEL.to_string(),
            annotations,
            anchor,
        }
    }
}

fn category_of(series: &RegionSeries, time: chrono::NaiveDate) -> usize {
    series
        .points
        .iter()
        .position(|p| p.time == time)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use availability_core::models::Region;
    use availability_data::views::RegionPoint;
    use chrono::NaiveDate;

    fn series(values: &[f64]) -> RegionSeries {
        RegionSeries {
            region: Region::Southern,
            baseline: 99.6,
            points: values
                .iter()
                .enumerate()
                .map(|(i, v)| RegionPoint {
                    time: NaiveDate::from_ymd_opt(2024, 6, i as u32 + 1).unwrap(),
                    availability: *v,
                })
                .collect(),
        }
    }

    #[test]
    fn test_chart_labels_and_data() {
        let chart = ChartSpec::for_region(&series(&[99.5, 99.9, 99.1]), CellAnchor::new(0, 12));

        assert_eq!(chart.title, "Southern Availability");
        assert_eq!(chart.series_label, "MOCN (Southern)");
        assert_eq!(chart.baseline_label, "Sites baseline");
        assert_eq!(chart.x_label, "Date");
        assert_eq!(chart.y_label, "Availability (%)");
        assert_eq!(
            chart.categories,
            vec!["2024-06-01", "2024-06-02", "2024-06-03"]
        );
        assert_eq!(chart.values, vec![99.5, 99.9, 99.1]);
        assert_eq!(chart.anchor, CellAnchor::new(0, 12));
    }

    #[test]
    fn test_chart_annotations() {
        let chart = ChartSpec::for_region(&series(&[99.5, 99.9, 99.1]), CellAnchor::new(0, 0));

        let kinds: Vec<AnnotationKind> = chart.annotations.iter().map(|a| a.kind).collect();
        assert_eq!(
            kinds,
            vec![AnnotationKind::Max, AnnotationKind::Min, AnnotationKind::Baseline]
        );
        assert_eq!(chart.annotations[0].category, 1);
        assert_eq!(chart.annotations[0].text, "99.90");
        assert_eq!(chart.annotations[0].color, "green");
        assert_eq!(chart.annotations[1].category, 2);
        assert_eq!(chart.annotations[1].color, "red");
        assert_eq!(chart.annotations[2].category, 2);
        assert_eq!(chart.annotations[2].text, "99.60");
    }

    #[test]
    fn test_empty_series_has_no_annotations() {
        let chart = ChartSpec::for_region(&series(&[]), CellAnchor::new(28, 12));
        assert!(chart.categories.is_empty());
        assert!(chart.annotations.is_empty());
    }
}
