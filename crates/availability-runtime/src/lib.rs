//! Runtime orchestration for the site availability report.
//!
//! Runs the pipeline stages in order and fans the view builders out across
//! tokio's blocking pool.

pub mod fanout;
pub mod pipeline;

pub use pipeline::{PipelineConfig, PipelineOutcome, ReportPipeline};

pub use availability_core as core;
pub use availability_data as data;
