use clap::{CommandFactory, Parser};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::baselines::DEFAULT_LOW_AVAILABILITY_THRESHOLD;
use crate::models::AVAILABILITY_COLUMN;

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Merge network availability exports into a multi-sheet site availability report
#[derive(Parser, Debug, Clone)]
#[command(
    name = "site-availability",
    about = "Merge network availability exports into a multi-sheet site availability report",
    version
)]
pub struct Settings {
    /// Directory scanned (recursively) for availability exports
    #[arg(long, default_value = "input")]
    pub input_dir: PathBuf,

    /// Directory the report is written to
    #[arg(long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Regular expression matched against export file names
    #[arg(long, default_value = DEFAULT_FILE_PATTERN)]
    pub file_pattern: String,

    /// Worksheet holding the raw rows inside spreadsheet exports
    #[arg(long, default_value = DEFAULT_SHEET)]
    pub sheet: String,

    /// Header of the availability column in the exports
    #[arg(long, default_value = AVAILABILITY_COLUMN)]
    pub availability_column: String,

    /// Inclusive upper bound for the low-availability sheets (0-100)
    #[arg(long, default_value_t = DEFAULT_LOW_AVAILABILITY_THRESHOLD, value_parser = parse_threshold)]
    pub threshold: f64,

    /// Also export every sheet as a CSV file
    #[arg(long)]
    pub csv: bool,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Clear saved configuration
    #[arg(long)]
    pub clear: bool,

    /// Problems met while loading settings, reported once logging is up.
    #[arg(skip)]
    pub startup_warnings: Vec<String>,
}

/// Spreadsheet and CSV exports.
pub const DEFAULT_FILE_PATTERN: &str = r"(?i)\.(xlsx|xlsm|csv)$";

/// Sheet name used by the network export workbooks.
pub const DEFAULT_SHEET: &str = "RAW DATA";

/// Accept a percentage between 0 and 100 inclusive.
fn parse_threshold(raw: &str) -> Result<f64, String> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| format!("`{}` is not a number", raw))?;
    if (0.0..=100.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("threshold must be between 0 and 100, got {}", value))
    }
}

// ── LastUsedParams ─────────────────────────────────────────────────────────────

/// Persisted last-used directories saved to `~/.site-availability/last_used.json`.
///
/// Only the directories carry over between runs; report-shaping options such
/// as the threshold always come from the command line or their defaults.
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct LastUsedParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
}

impl LastUsedParams {
    /// Return the default path to the persisted config file.
    pub fn config_path() -> PathBuf {
        Self::config_path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    /// Return the config path rooted at `base_dir` (used for testing).
    pub fn config_path_in(base_dir: &std::path::Path) -> PathBuf {
        base_dir.join(".site-availability").join("last_used.json")
    }

    /// Load persisted params from an explicit path.
    /// Returns `Default` when the file is absent or cannot be parsed.
    pub fn load_from(path: &std::path::Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        serde_json::from_str(&content).unwrap_or_default()
    }

    /// Atomically write params to an explicit path, creating parent
    /// directories if needed.
    pub fn save_to(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;

        // Write to a temp file then rename for atomicity.
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        std::fs::rename(&tmp, path)?;

        Ok(())
    }

    /// Delete the config file at an explicit path if it exists.
    pub fn clear_at(path: &std::path::Path) -> Result<(), std::io::Error> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse CLI arguments, fill unset directories from the last run, and
    /// persist the result.
    pub fn load_with_last_used() -> Self {
        Self::load_with_last_used_impl(
            std::env::args_os().collect(),
            &LastUsedParams::config_path(),
        )
    }

    /// Full implementation – accepts args and an explicit config path so that
    /// tests can redirect to a temporary directory.
    pub fn load_with_last_used_impl(
        args: Vec<std::ffi::OsString>,
        config_path: &std::path::Path,
    ) -> Self {
        // Raw ArgMatches tell us which values came from the command line.
        let matches = Settings::command().get_matches_from(args.clone());
        let mut settings = Settings::parse_from(args);

        if settings.clear {
            if let Err(e) = LastUsedParams::clear_at(config_path) {
                settings
                    .startup_warnings
                    .push(format!("could not clear {}: {}", config_path.display(), e));
            }
            return Self::apply_debug_flag(settings);
        }

        let last = LastUsedParams::load_from(config_path);

        // The command line always wins over persisted values.
        if !is_arg_explicitly_set(&matches, "input_dir") {
            if let Some(v) = last.input_dir {
                settings.input_dir = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "output_dir") {
            if let Some(v) = last.output_dir {
                settings.output_dir = v;
            }
        }

        settings = Self::apply_debug_flag(settings);

        let params = LastUsedParams::from(&settings);
        if let Err(e) = params.save_to(config_path) {
            settings
                .startup_warnings
                .push(format!("could not persist last-used params: {}", e));
        }

        settings
    }

    /// `--debug` overrides the log level.
    fn apply_debug_flag(mut settings: Settings) -> Settings {
        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }
        settings
    }
}

// ── Conversion ─────────────────────────────────────────────────────────────────

impl From<&Settings> for LastUsedParams {
    fn from(s: &Settings) -> Self {
        LastUsedParams {
            input_dir: Some(s.input_dir.clone()),
            output_dir: Some(s.output_dir.clone()),
        }
    }
}

/// Returns `true` when `name` was supplied explicitly on the command line
/// (not via default value or environment variable).
fn is_arg_explicitly_set(matches: &clap::ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(clap::parser::ValueSource::CommandLine)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
