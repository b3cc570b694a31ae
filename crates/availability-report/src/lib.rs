//! Report layout and emission for the site availability tool.
//!
//! Turns the assembled views into named sheets with chart descriptors and
//! writes them out as JSON or per-sheet CSV files.

pub mod chart;
pub mod layout;
pub mod writer;

pub use layout::{build_report, Report};
pub use writer::{emit_report, Artifact, CsvReportWriter, JsonReportWriter, ReportWriter};
