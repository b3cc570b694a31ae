//! Data layer for the site availability report.
//!
//! Reads export batches from disk, merges them into the canonical dataset,
//! projects typed records and derives the aggregated report views.

pub mod aggregator;
pub mod merge;
pub mod pivot;
pub mod projector;
pub mod reader;
pub mod table;
pub mod views;

pub use availability_core as core;
