//! Export file discovery and loading.
//!
//! Finds the periodic availability exports under an input directory and reads
//! each one into a [`RawBatch`]. Files are returned sorted by path, so the
//! batch order seen by the merge (and therefore which file wins a shared
//! timestamp) is deterministic.

use std::path::{Path, PathBuf};

use availability_core::error::{AvailabilityError, Result};
use calamine::{open_workbook_auto, Data, DataType, Reader};
use regex::Regex;
use tracing::{debug, info, warn};

use crate::table::RawBatch;

// ── Public API ────────────────────────────────────────────────────────────────

/// Compile the file-name pattern used by [`discover_report_files`].
pub fn compile_pattern(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| AvailabilityError::adapter(pattern, e))
}

/// Find all export files under `dir` whose file name matches `pattern`,
/// recursively, sorted by path.
///
/// Office lock files (`~$…`) and hidden files are skipped.
pub fn discover_report_files(dir: &Path, pattern: &Regex) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(AvailabilityError::adapter(
            dir,
            "input directory does not exist",
        ));
    }

    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Skipping unreadable entry under {}: {}", dir.display(), e);
                None
            }
        })
        .filter(|entry| {
            let name = entry.file_name().to_string_lossy();
            entry.file_type().is_file()
                && !name.starts_with("~$")
                && !name.starts_with('.')
                && pattern.is_match(&name)
        })
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    Ok(files)
}

/// Read one export into a [`RawBatch`].
///
/// Spreadsheet exports (`.xlsx`, `.xlsm`, `.xlsb`, `.xls`, `.ods`) are read
/// from the worksheet named `sheet`; a workbook without that sheet is an
/// adapter error. Anything else is parsed as CSV and `sheet` is ignored.
pub fn read_batch(path: &Path, sheet: &str) -> Result<RawBatch> {
    if is_workbook(path) {
        read_workbook_batch(path, sheet)
    } else {
        read_csv_batch(path)
    }
}

/// Read a CSV export.
///
/// Cells are trimmed, a UTF-8 BOM on the first header is dropped, short rows
/// are padded with empty cells and extra cells are cut off. Fully blank rows
/// are skipped.
pub fn read_csv_batch(path: &Path) -> Result<RawBatch> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| AvailabilityError::adapter(path, e))?;

    let columns: Vec<String> = reader
        .headers()
        .map_err(|e| AvailabilityError::adapter(path, e))?
        .iter()
        .map(normalize_header_name)
        .collect();

    let rows = reader
        .records()
        .map(|record| {
            record
                .map(|r| r.iter().map(str::to_string).collect())
                .map_err(|e| AvailabilityError::adapter(path, e))
        })
        .collect::<Result<Vec<Vec<String>>>>()?;

    into_batch(path, columns, rows)
}

/// Read the worksheet `sheet` of a spreadsheet export, with the same row
/// shaping as [`read_csv_batch`].
pub fn read_workbook_batch(path: &Path, sheet: &str) -> Result<RawBatch> {
    let mut workbook =
        open_workbook_auto(path).map_err(|e| AvailabilityError::adapter(path, e.to_string()))?;

    if !workbook.sheet_names().iter().any(|name| name == sheet) {
        return Err(AvailabilityError::adapter(
            path,
            format!("sheet {:?} not found", sheet),
        ));
    }

    let range = workbook
        .worksheet_range(sheet)
        .map_err(|e| AvailabilityError::adapter(path, e.to_string()))?;

    let mut lines = range
        .rows()
        .map(|row| row.iter().map(cell_text).collect::<Vec<String>>());
    let columns: Vec<String> = lines
        .next()
        .unwrap_or_default()
        .iter()
        .map(|c| normalize_header_name(c))
        .collect();

    into_batch(path, columns, lines.collect())
}

/// Discover and read every export under `dir`, in path order.
///
/// Fails with [`AvailabilityError::NoSourceFiles`] when nothing matches, and
/// with the first adapter error when any file cannot be read.
pub fn load_batches(dir: &Path, pattern: &str, sheet: &str) -> Result<Vec<RawBatch>> {
    let pattern = compile_pattern(pattern)?;
    info!("Reading all export files from {}", dir.display());

    let files = discover_report_files(dir, &pattern)?;
    if files.is_empty() {
        return Err(AvailabilityError::NoSourceFiles(dir.to_path_buf()));
    }

    files
        .iter()
        .map(|path| {
            info!("Reading {}", path.display());
            read_batch(path, sheet)
        })
        .collect()
}

// ── Internal helpers ──────────────────────────────────────────────────────────

const WORKBOOK_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xlsb", "xls", "ods"];

fn is_workbook(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| WORKBOOK_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Text form of a spreadsheet cell; date cells become `YYYY-MM-DD HH:MM:SS`.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTimeIso(s) => s.trim().to_string(),
        Data::DateTime(_) => cell
            .as_datetime()
            .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_default(),
        _ => String::new(),
    }
}

/// Pad or cut rows to the header width and drop fully blank rows.
fn into_batch(path: &Path, columns: Vec<String>, raw_rows: Vec<Vec<String>>) -> Result<RawBatch> {
    if columns.iter().all(String::is_empty) {
        return Err(AvailabilityError::adapter(path, "missing header row"));
    }

    let mut rows = Vec::with_capacity(raw_rows.len());
    let mut blank = 0usize;
    for mut row in raw_rows {
        if row.iter().all(|c| c.trim().is_empty()) {
            blank += 1;
            continue;
        }
        row.truncate(columns.len());
        row.resize(columns.len(), String::new());
        rows.push(row);
    }

    debug!(
        "File {}: {} columns, {} rows, {} blank rows skipped",
        path.display(),
        columns.len(),
        rows.len(),
        blank
    );

    Ok(RawBatch::new(path, columns, rows))
}

/// Spreadsheet tools sometimes emit UTF-8 CSVs with a BOM on the first header.
fn normalize_header_name(name: &str) -> String {
    name.trim_start_matches('\u{feff}').trim().to_string()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(dir: &Path, name: &str, lines: &[&str]) -> PathBuf {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        path
    }

    fn csv_pattern() -> Regex {
        compile_pattern(r"(?i)\.csv$").unwrap()
    }

    // ── discover_report_files ─────────────────────────────────────────────────

    #[test]
    fn test_discover_sorted_and_filtered() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "c.csv", &["Time"]);
        write_file(dir.path(), "a.CSV", &["Time"]);
        write_file(dir.path(), "notes.txt", &["hello"]);
        write_file(dir.path(), "~$a.csv", &["lock"]);
        write_file(dir.path(), ".hidden.csv", &["Time"]);

        let files = discover_report_files(dir.path(), &csv_pattern()).unwrap();
        let names: Vec<&str> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, vec!["a.CSV", "c.csv"]);
    }

    #[test]
    fn test_discover_recursive() {
        let dir = TempDir::new().unwrap();
        let sub = dir.path().join("2024-06");
        std::fs::create_dir_all(&sub).unwrap();
        write_file(dir.path(), "week1.csv", &["Time"]);
        write_file(&sub, "week2.csv", &["Time"]);

        let files = discover_report_files(dir.path(), &csv_pattern()).unwrap();
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn test_discover_missing_directory_is_adapter_error() {
        let err = discover_report_files(
            Path::new("/tmp/does-not-exist-availability-test-xyz"),
            &csv_pattern(),
        )
        .unwrap_err();
        assert!(matches!(err, AvailabilityError::Adapter { .. }));
    }

    #[test]
    fn test_compile_pattern_invalid() {
        assert!(matches!(
            compile_pattern("(unclosed"),
            Err(AvailabilityError::Adapter { .. })
        ));
    }

    // ── read_batch ────────────────────────────────────────────────────────────

    #[test]
    fn test_read_batch_basic() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            dir.path(),
            "export.csv",
            &[
                "Time,Region,Cell Availability (Excl Cell Block)(%)",
                "2024-06-01, SOUTHERN ,99.5",
                "2024-06-02,EASTERN,98.1",
            ],
        );

        let batch = read_csv_batch(&path).unwrap();
        assert_eq!(batch.source, path);
        assert_eq!(
            batch.columns,
            vec!["Time", "Region", "Cell Availability (Excl Cell Block)(%)"]
        );
        assert_eq!(batch.rows.len(), 2);
        assert_eq!(batch.rows[0], vec!["2024-06-01", "SOUTHERN", "99.5"]);
    }

    #[test]
    fn test_read_batch_strips_bom() {
        let dir = TempDir::new().unwrap();
        let path = write_file(dir.path(), "bom.csv", &["\u{feff}Time,Region", "2024-06-01,EASTERN"]);

        let batch = read_csv_batch(&path).unwrap();
        assert_eq!(batch.columns[0], "Time");
    }

    #[test]
    fn test_read_batch_pads_and_truncates_rows() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            dir.path(),
            "ragged.csv",
            &["Time,Region,Cluster ID", "2024-06-01", "2024-06-02,EASTERN,C1,extra"],
        );

        let batch = read_csv_batch(&path).unwrap();
        assert_eq!(batch.rows[0], vec!["2024-06-01", "", ""]);
        assert_eq!(batch.rows[1], vec!["2024-06-02", "EASTERN", "C1"]);
    }

    #[test]
    fn test_read_batch_skips_blank_rows() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            dir.path(),
            "blank.csv",
            &["Time,Region", "2024-06-01,EASTERN", ",", "2024-06-02,SOUTHERN"],
        );

        let batch = read_csv_batch(&path).unwrap();
        assert_eq!(batch.rows.len(), 2);
    }

    #[test]
    fn test_read_batch_empty_file_is_adapter_error() {
        let dir = TempDir::new().unwrap();
        let path = write_file(dir.path(), "empty.csv", &[]);

        let err = read_csv_batch(&path).unwrap_err();
        assert!(matches!(err, AvailabilityError::Adapter { .. }));
    }

    // ── load_batches ──────────────────────────────────────────────────────────

    #[test]
    fn test_load_batches_in_path_order() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "b.csv", &["Time", "2024-06-02"]);
        write_file(dir.path(), "a.csv", &["Time", "2024-06-01"]);

        let batches = load_batches(dir.path(), r"\.csv$", "RAW DATA").unwrap();
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].rows[0][0], "2024-06-01");
        assert_eq!(batches[1].rows[0][0], "2024-06-02");
    }

    #[test]
    fn test_load_batches_no_files() {
        let dir = TempDir::new().unwrap();
        write_file(dir.path(), "readme.txt", &["nothing here"]);

        let err = load_batches(dir.path(), r"\.csv$", "RAW DATA").unwrap_err();
        assert!(matches!(err, AvailabilityError::NoSourceFiles(_)));
    }

    // ── workbooks ─────────────────────────────────────────────────────────────

    fn write_workbook(dir: &Path, name: &str, sheet: &str, rows: &[&[&str]]) -> PathBuf {
        let path = dir.join(name);
        let mut workbook = rust_xlsxwriter::Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(sheet).unwrap();
        for (r, row) in rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                match cell.parse::<f64>() {
                    Ok(v) => worksheet.write_number(r as u32, c as u16, v).unwrap(),
                    Err(_) => worksheet.write_string(r as u32, c as u16, *cell).unwrap(),
                };
            }
        }
        workbook.save(&path).unwrap();
        path
    }

    #[test]
    fn test_read_batch_workbook_named_sheet() {
        let dir = TempDir::new().unwrap();
        let path = write_workbook(
            dir.path(),
            "export.xlsx",
            "RAW DATA",
            &[
                &["Time", "Region", "Cell Availability (Excl Cell Block)(%)"],
                &["2024-06-01", "SOUTHERN", "99.5"],
                &["2024-06-02", "EASTERN", "100"],
            ],
        );

        let batch = read_batch(&path, "RAW DATA").unwrap();
        assert_eq!(batch.source, path);
        assert_eq!(
            batch.columns,
            vec!["Time", "Region", "Cell Availability (Excl Cell Block)(%)"]
        );
        assert_eq!(batch.rows[0], vec!["2024-06-01", "SOUTHERN", "99.5"]);
        assert_eq!(batch.rows[1], vec!["2024-06-02", "EASTERN", "100"]);
    }

    #[test]
    fn test_read_batch_workbook_missing_sheet() {
        let dir = TempDir::new().unwrap();
        let path = write_workbook(
            dir.path(),
            "export.xlsx",
            "Summary",
            &[&["Time"], &["2024-06-01"]],
        );

        let err = read_batch(&path, "RAW DATA").unwrap_err();
        match &err {
            AvailabilityError::Adapter { path: at, source } => {
                assert_eq!(at, &path);
                assert!(source.to_string().contains("RAW DATA"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_read_batch_csv_ignores_sheet() {
        let dir = TempDir::new().unwrap();
        let path = write_file(dir.path(), "plain.csv", &["Time", "2024-06-01"]);

        let batch = read_batch(&path, "RAW DATA").unwrap();
        assert_eq!(batch.rows, vec![vec!["2024-06-01".to_string()]]);
    }

    #[test]
    fn test_load_batches_mixed_formats() {
        let dir = TempDir::new().unwrap();
        write_workbook(
            dir.path(),
            "a.xlsx",
            "RAW DATA",
            &[&["Time", "Region"], &["2024-06-01", "EASTERN"]],
        );
        write_file(dir.path(), "b.csv", &["Time,Region", "2024-06-02,SOUTHERN"]);

        let batches = load_batches(dir.path(), r"(?i)\.(xlsx|csv)$", "RAW DATA").unwrap();
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].rows[0], vec!["2024-06-01", "EASTERN"]);
        assert_eq!(batches[1].rows[0], vec!["2024-06-02", "SOUTHERN"]);
    }
}
