//! In-memory report: named sheets of placed tables and chart descriptors.
//!
//! The whole report is built before any writer runs, so a failure never
//! leaves a partial artifact behind.

use availability_core::models::Region;
use availability_core::time_utils::report_file_stem;
use availability_data::table::RenderedTable;
use availability_data::views::ReportViews;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::chart::ChartSpec;

pub const REGION_SHEET: &str = "region";
pub const SITE_SHEET: &str = "site";
pub const CLUSTER_SHEET: &str = "cluster";

/// Empty columns left between side-by-side blocks on the region sheet.
const BLOCK_GAP: usize = 2;
/// Row offset of the second chart below the first.
const CHART_ROW_STEP: usize = 28;

// ── Placement ─────────────────────────────────────────────────────────────────

/// Zero-based (row, column) of a block's top-left cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CellAnchor {
    pub row: usize,
    pub col: usize,
}

impl CellAnchor {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedTable {
    pub anchor: CellAnchor,
    pub table: RenderedTable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sheet {
    pub name: String,
    pub tables: Vec<PlacedTable>,
    pub charts: Vec<ChartSpec>,
}

impl Sheet {
    fn with_table(name: impl Into<String>, table: RenderedTable) -> Self {
        Self {
            name: name.into(),
            tables: vec![PlacedTable {
                anchor: CellAnchor::default(),
                table,
            }],
            charts: Vec::new(),
        }
    }

    /// Data rows across all tables, headers excluded.
    pub fn data_rows(&self) -> usize {
        self.tables.iter().map(|t| t.table.len()).sum()
    }

    /// Flatten the placed tables into one cell grid; unused cells are empty.
    pub fn to_grid(&self) -> Vec<Vec<String>> {
        let height = self
            .tables
            .iter()
            .map(|t| t.anchor.row + 1 + t.table.len())
            .max()
            .unwrap_or(0);
        let width = self
            .tables
            .iter()
            .map(|t| t.anchor.col + t.table.width())
            .max()
            .unwrap_or(0);

        let mut grid = vec![vec![String::new(); width]; height];
        for placed in &self.tables {
            let CellAnchor { row, col } = placed.anchor;
            let lines = std::iter::once(&placed.table.headers).chain(placed.table.rows.iter());
            for (dy, line) in lines.enumerate() {
                for (dx, cell) in line.iter().enumerate() {
                    grid[row + dy][col + dx] = cell.clone();
                }
            }
        }
        grid
    }
}

// ── Report ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub generated_on: NaiveDate,
    pub sheets: Vec<Sheet>,
}

impl Report {
    /// `Site_Availability_<YYYYMMDD>`.
    pub fn file_stem(&self) -> String {
        report_file_stem(self.generated_on)
    }

    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    /// One line per sheet with its table, row and chart counts.
    pub fn summary_lines(&self) -> Vec<String> {
        self.sheets
            .iter()
            .map(|s| {
                let mut line = format!(
                    "{:<18} {:>2} table(s) {:>6} row(s)",
                    s.name,
                    s.tables.len(),
                    s.data_rows()
                );
                if !s.charts.is_empty() {
                    line.push_str(&format!(" {:>2} chart(s)", s.charts.len()));
                }
                line
            })
            .collect()
    }
}

/// Sheet name of a low-availability view, e.g. `"southern <= 99.6"`.
pub fn low_availability_sheet_name(region: &Region, threshold: f64) -> String {
    format!("{} <= {}", region.display_name().to_lowercase(), threshold)
}

/// Lay the views out as sheets: `region`, `site`, `cluster`, then one sheet
/// per low-availability view.
///
/// On the region sheet the series tables sit side by side with a two-column
/// gap, and the charts stack in the first free column to their right.
pub fn build_report(views: &ReportViews, generated_on: NaiveDate) -> Report {
    let mut region = Sheet {
        name: REGION_SHEET.to_string(),
        tables: Vec::new(),
        charts: Vec::new(),
    };
    let mut next_col = 0;
    for series in &views.regions {
        let table = series.render();
        let width = table.width();
        region.tables.push(PlacedTable {
            anchor: CellAnchor::new(0, next_col),
            table,
        });
        next_col += width + BLOCK_GAP;
    }
    for (i, series) in views.regions.iter().enumerate() {
        let anchor = CellAnchor::new(i * CHART_ROW_STEP, next_col);
        region.charts.push(ChartSpec::for_region(series, anchor));
    }

    let mut sheets = vec![
        region,
        Sheet::with_table(SITE_SHEET, views.sites.render()),
        Sheet::with_table(CLUSTER_SHEET, views.clusters.render()),
    ];
    sheets.extend(views.low_availability.iter().map(|view| {
        Sheet::with_table(
            low_availability_sheet_name(&view.region, view.threshold),
            view.table.render(),
        )
    }));

    Report {
        generated_on,
        sheets,
    }
}
