//! One-shot report pipeline: load, merge, project, build views, emit.
//!
//! Every stage failure is tagged with the stage name via [`anyhow::Context`];
//! nothing is written unless all earlier stages succeed.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use availability_core::models::{Record, AVAILABILITY_COLUMN};
use availability_core::settings::{DEFAULT_FILE_PATTERN, DEFAULT_SHEET};
use availability_core::time_utils::today;
use availability_data::merge::merge;
use availability_data::projector::project;
use availability_data::reader::load_batches;
use availability_data::views::ViewConfig;
use availability_report::layout::{build_report, Report};
use availability_report::writer::{emit_report, CsvReportWriter, JsonReportWriter, ReportWriter};
use chrono::NaiveDate;
use tokio::task::spawn_blocking;
use tracing::info;

use crate::fanout::assemble_views_concurrently;

// ── Public types ──────────────────────────────────────────────────────────────

/// Everything one pipeline run needs.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Directory searched (recursively) for export files.
    pub input_dir: PathBuf,
    /// Directory the report files are written to.
    pub output_dir: PathBuf,
    /// Regex matched against export file names.
    pub file_pattern: String,
    /// Worksheet read from spreadsheet exports.
    pub sheet: String,
    /// Header of the availability column in the exports.
    pub availability_column: String,
    pub views: ViewConfig,
    /// Also write one CSV per sheet.
    pub write_csv: bool,
    /// Date stamped into the output file names.
    pub report_date: NaiveDate,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("input"),
            output_dir: PathBuf::from("."),
            file_pattern: DEFAULT_FILE_PATTERN.to_string(),
            sheet: DEFAULT_SHEET.to_string(),
            availability_column: AVAILABILITY_COLUMN.to_string(),
            views: ViewConfig::default(),
            write_csv: false,
            report_date: today(),
        }
    }
}

/// What a successful run produced.
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub batches: usize,
    pub records: usize,
    pub report: Report,
    pub written: Vec<PathBuf>,
}

// ── ReportPipeline ────────────────────────────────────────────────────────────

pub struct ReportPipeline {
    config: PipelineConfig,
}

impl ReportPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run every stage once and write the report.
    pub async fn run(&self) -> anyhow::Result<PipelineOutcome> {
        let cfg = &self.config;

        // ── load ──────────────────────────────────────────────────────────────
        info!("Loading exports from {}", cfg.input_dir.display());
        let batches = {
            let dir = cfg.input_dir.clone();
            let pattern = cfg.file_pattern.clone();
            let sheet = cfg.sheet.clone();
            spawn_blocking(move || load_batches(&dir, &pattern, &sheet))
                .await
                .context("load stage failed")?
                .context("load stage failed")?
        };

        // ── merge / projection ────────────────────────────────────────────────
        let merged = merge(&batches).context("merge stage failed")?;
        info!(
            "Merged {} batch(es) into {} row(s)",
            batches.len(),
            merged.len()
        );
        let records: Arc<[Record]> = project(&merged, &cfg.availability_column)
            .context("projection stage failed")?
            .into();
        info!("Projected {} record(s)", records.len());

        // ── views ─────────────────────────────────────────────────────────────
        info!("Creating views");
        let views = assemble_views_concurrently(Arc::clone(&records), cfg.views)
            .await
            .context("pivot stage failed")?;
        info!("View creation completed.");

        // ── emit ──────────────────────────────────────────────────────────────
        let report = build_report(&views, cfg.report_date);
        let written = {
            let report = report.clone();
            let out_dir = cfg.output_dir.clone();
            let write_csv = cfg.write_csv;
            spawn_blocking(move || {
                let mut writers: Vec<&dyn ReportWriter> = vec![&JsonReportWriter];
                if write_csv {
                    writers.push(&CsvReportWriter);
                }
                emit_report(&report, &writers, &out_dir)
            })
            .await
            .context("emit stage failed")?
            .context("emit stage failed")?
        };

        for line in report.summary_lines() {
            info!("{}", line);
        }
        info!("Data write completed.");

        Ok(PipelineOutcome {
            batches: batches.len(),
            records: records.len(),
            report,
            written,
        })
    }
}
