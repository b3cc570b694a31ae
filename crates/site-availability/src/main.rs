mod bootstrap;

use std::process::ExitCode;

use availability_core::settings::Settings;
use availability_core::time_utils::today;
use availability_data::views::ViewConfig;
use availability_runtime::{PipelineConfig, ReportPipeline};

fn pipeline_config(settings: &Settings) -> PipelineConfig {
    PipelineConfig {
        input_dir: settings.input_dir.clone(),
        output_dir: settings.output_dir.clone(),
        file_pattern: settings.file_pattern.clone(),
        sheet: settings.sheet.clone(),
        availability_column: settings.availability_column.clone(),
        views: ViewConfig {
            low_availability_threshold: settings.threshold,
        },
        write_csv: settings.csv,
        report_date: today(),
    }
}

async fn run(settings: &Settings) -> anyhow::Result<()> {
    bootstrap::ensure_output_dir(&settings.output_dir)?;

    let outcome = ReportPipeline::new(pipeline_config(settings)).run().await?;
    tracing::info!(
        "Report built from {} file(s), {} record(s): {}",
        outcome.batches,
        outcome.records,
        outcome
            .written
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", ")
    );
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let settings = Settings::load_with_last_used();

    if let Err(e) = bootstrap::setup_logging(&settings.log_level, settings.log_file.as_ref()) {
        eprintln!("{:#}", e);
        return ExitCode::FAILURE;
    }

    tracing::info!("Site Availability v{} starting", env!("CARGO_PKG_VERSION"));
    for warning in &settings.startup_warnings {
        tracing::warn!("{}", warning);
    }
    tracing::debug!(?settings, "effective settings");

    match run(&settings).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
