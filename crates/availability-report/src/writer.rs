//! Report emission: serialise a finished [`Report`] into files.

use std::fs;
use std::path::{Path, PathBuf};

use availability_core::error::{AvailabilityError, Result};
use tracing::{debug, info, warn};

use crate::layout::Report;

/// One rendered output file, not yet on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Something that renders a [`Report`] into one or more files.
pub trait ReportWriter: Send + Sync {
    /// Short name used in log lines.
    fn name(&self) -> &'static str;

    /// Render `report` into named artifacts without touching the filesystem.
    fn render(&self, report: &Report) -> Result<Vec<Artifact>>;

    /// Render and write this writer's artifacts into `out_dir`.
    fn write(&self, report: &Report, out_dir: &Path) -> Result<Vec<PathBuf>>
    where
        Self: Sized,
    {
        emit_report(report, &[self as &dyn ReportWriter], out_dir)
    }
}

/// Write every artifact of every writer into `out_dir`, all or nothing.
///
/// All artifacts are rendered first and written to `<name>.tmp` siblings;
/// only when every temp file is on disk are they renamed into place. On any
/// failure the temp files and the files already renamed in this call are
/// removed, so a failed run leaves no partial report behind.
pub fn emit_report(
    report: &Report,
    writers: &[&dyn ReportWriter],
    out_dir: &Path,
) -> Result<Vec<PathBuf>> {
    let mut artifacts = Vec::new();
    for writer in writers {
        let rendered = writer.render(report)?;
        debug!("Writer {} rendered {} file(s)", writer.name(), rendered.len());
        artifacts.extend(rendered);
    }

    fs::create_dir_all(out_dir).map_err(|e| AvailabilityError::adapter(out_dir, e))?;

    let mut staged: Vec<(PathBuf, PathBuf)> = Vec::with_capacity(artifacts.len());
    for artifact in &artifacts {
        let path = out_dir.join(&artifact.file_name);
        let tmp = tmp_path(&path);
        if let Err(e) = fs::write(&tmp, &artifact.bytes) {
            let _ = fs::remove_file(&tmp);
            discard(staged.iter().map(|(tmp, _)| tmp));
            return Err(AvailabilityError::adapter(&tmp, e));
        }
        staged.push((tmp, path));
    }

    let mut written: Vec<PathBuf> = Vec::with_capacity(staged.len());
    for (i, (tmp, path)) in staged.iter().enumerate() {
        if let Err(e) = fs::rename(tmp, path) {
            warn!("Rolling back report files after failing to write {}", path.display());
            discard(written.iter());
            discard(staged[i..].iter().map(|(tmp, _)| tmp));
            return Err(AvailabilityError::adapter(path, e));
        }
        written.push(path.clone());
    }

    for path in &written {
        info!("Writing to file : {}", path.display());
    }
    Ok(written)
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}

fn discard<'a>(paths: impl Iterator<Item = &'a PathBuf>) {
    for path in paths {
        if let Err(e) = fs::remove_file(path) {
            debug!("Could not remove {}: {}", path.display(), e);
        }
    }
}

/// File-name fragment for a sheet: `"southern <= 99.6"` becomes
/// `"southern_le_99_6"`.
pub fn sanitize_sheet_name(name: &str) -> String {
    let replaced = name.replace("<=", "le").replace(">=", "ge");
    let mut out = String::with_capacity(replaced.len());
    for c in replaced.chars() {
        if c.is_ascii_alphanumeric() || c == '-' {
            out.push(c);
        } else if !out.ends_with('_') {
            out.push('_');
        }
    }
    out.trim_matches('_').to_string()
}

// ── JSON ──────────────────────────────────────────────────────────────────────

/// Single `Site_Availability_<YYYYMMDD>.json` holding every sheet.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonReportWriter;

impl ReportWriter for JsonReportWriter {
    fn name(&self) -> &'static str {
        "json"
    }

    fn render(&self, report: &Report) -> Result<Vec<Artifact>> {
        let file_name = format!("{}.json", report.file_stem());
        let bytes = serde_json::to_vec_pretty(report)
            .map_err(|e| AvailabilityError::adapter(&file_name, e))?;
        Ok(vec![Artifact { file_name, bytes }])
    }
}

// ── CSV ───────────────────────────────────────────────────────────────────────

/// One `Site_Availability_<YYYYMMDD>_<sheet>.csv` per sheet, laid out as the
/// sheet's cell grid.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvReportWriter;

impl CsvReportWriter {
    fn encode(grid: &[Vec<String>], path: &Path) -> Result<Vec<u8>> {
        let mut wtr = csv::Writer::from_writer(Vec::new());
        for row in grid {
            wtr.write_record(row)
                .map_err(|e| AvailabilityError::adapter(path, e))?;
        }
        wtr.into_inner()
            .map_err(|e| AvailabilityError::adapter(path, e.into_error()))
    }
}

impl ReportWriter for CsvReportWriter {
    fn name(&self) -> &'static str {
        "csv"
    }

    fn render(&self, report: &Report) -> Result<Vec<Artifact>> {
        let stem = report.file_stem();
        let mut artifacts = Vec::with_capacity(report.sheets.len());
        for sheet in &report.sheets {
            let file_name = format!("{}_{}.csv", stem, sanitize_sheet_name(&sheet.name));
            let bytes = Self::encode(&sheet.to_grid(), Path::new(&file_name))?;
            debug!("Rendered sheet {:?} as {}", sheet.name, file_name);
            artifacts.push(Artifact { file_name, bytes });
        }
        Ok(artifacts)
    }
}
