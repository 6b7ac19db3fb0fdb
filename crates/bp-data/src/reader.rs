//! Input discovery and loading for the blood pressure analyzer.
//!
//! Reads tabular exports (CSV, JSON Lines, JSON arrays) and converts each row
//! into a [`RawReading`] for the normalizer. Nothing here interprets
//! timestamps; that is the normalizer's job.

use std::fs::File;
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use bp_core::error::{AnalyzerError, Result};
use bp_core::models::{ColumnMapping, RawReading};
use regex::Regex;
use serde_json::Value;
use tracing::{debug, warn};

/// File extensions accepted as input, lowercase.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["csv", "jsonl", "json"];

// ── Public API ────────────────────────────────────────────────────────────────

/// Find all supported input files recursively under `data_path`, sorted by
/// path.
pub fn find_input_files(data_path: &Path) -> Vec<PathBuf> {
    if !data_path.exists() {
        warn!("Data path does not exist: {}", data_path.display());
        return Vec::new();
    }

    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(data_path)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file() && is_supported(entry.path()))
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    files
}

/// Load every row from `path` (a file, or a directory of files).
///
/// Rows keep their input order; files in a directory are read in path order.
pub fn load_raw_readings(path: &Path, columns: &ColumnMapping) -> Result<Vec<RawReading>> {
    if !path.exists() {
        return Err(AnalyzerError::DataPathNotFound(path.to_path_buf()));
    }

    let files = if path.is_dir() {
        find_input_files(path)
    } else {
        vec![path.to_path_buf()]
    };
    if files.is_empty() {
        return Err(AnalyzerError::NoDataFiles(path.to_path_buf()));
    }

    let mut all_rows: Vec<RawReading> = Vec::new();
    for file_path in &files {
        let rows = load_file(file_path, columns)?;
        debug!("File {}: {} rows", file_path.display(), rows.len());
        all_rows.extend(rows);
    }

    debug!("Loaded {} rows from {} files", all_rows.len(), files.len());
    Ok(all_rows)
}

/// Load a single input file, dispatching on its extension.
pub fn load_file(path: &Path, columns: &ColumnMapping) -> Result<Vec<RawReading>> {
    match extension_of(path).as_deref() {
        Some("csv") => read_csv(path, columns),
        Some("jsonl") => read_jsonl(path, columns),
        Some("json") => read_json_array(path, columns),
        _ => Err(AnalyzerError::UnsupportedFormat(path.to_path_buf())),
    }
}

/// Interpret a pressure cell.
///
/// Numbers are rounded to whole mmHg; strings may carry a unit suffix such as
/// `"128 mmHg"`. Blank, `NaN`, negative, or non-numeric cells are `None`.
pub fn parse_pressure(value: &Value) -> Option<u16> {
    match value {
        Value::Number(n) => n.as_f64().and_then(pressure_from_f64),
        Value::String(s) => parse_pressure_str(s),
        _ => None,
    }
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn is_supported(path: &Path) -> bool {
    extension_of(path)
        .map(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}

fn source_id(path: &Path) -> String {
    path.display().to_string()
}

fn file_read_error(path: &Path, source: std::io::Error) -> AnalyzerError {
    AnalyzerError::FileRead {
        path: path.to_path_buf(),
        source,
    }
}

fn csv_error(path: &Path, err: csv::Error) -> AnalyzerError {
    AnalyzerError::Csv {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

fn read_csv(path: &Path, columns: &ColumnMapping) -> Result<Vec<RawReading>> {
    let file = File::open(path).map_err(|e| file_read_error(path, e))?;
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader.headers().map_err(|e| csv_error(path, e))?.clone();
    // Spreadsheet exports often start with a UTF-8 byte-order mark.
    let position = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim_start_matches('\u{feff}') == name)
            .ok_or_else(|| AnalyzerError::MissingColumn {
                path: path.to_path_buf(),
                column: name.to_string(),
            })
    };
    let ts_idx = position(&columns.timestamp)?;
    let sys_idx = position(&columns.systolic)?;
    let dia_idx = position(&columns.diastolic)?;

    let source = source_id(path);
    let mut rows = Vec::new();

    for (i, record) in reader.records().enumerate() {
        let record = record.map_err(|e| csv_error(path, e))?;
        let timestamp = record
            .get(ts_idx)
            .map(|s| Value::String(s.to_string()))
            .unwrap_or(Value::Null);

        rows.push(RawReading {
            source: source.clone(),
            row: i + 1,
            timestamp,
            systolic: record.get(sys_idx).and_then(parse_pressure_str),
            diastolic: record.get(dia_idx).and_then(parse_pressure_str),
        });
    }

    Ok(rows)
}

fn read_jsonl(path: &Path, columns: &ColumnMapping) -> Result<Vec<RawReading>> {
    let file = File::open(path).map_err(|e| file_read_error(path, e))?;
    let reader = std::io::BufReader::new(file);
    let source_name = source_id(path);
    let mut rows = Vec::new();

    for (i, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| file_read_error(path, e))?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let value: Value =
            serde_json::from_str(trimmed).map_err(|source| AnalyzerError::JsonRecord {
                path: path.to_path_buf(),
                line: i + 1,
                source,
            })?;
        rows.push(raw_from_object(&source_name, rows.len() + 1, &value, columns));
    }

    Ok(rows)
}

fn read_json_array(path: &Path, columns: &ColumnMapping) -> Result<Vec<RawReading>> {
    let content = std::fs::read_to_string(path).map_err(|e| file_read_error(path, e))?;
    let document: Value =
        serde_json::from_str(&content).map_err(|source| AnalyzerError::JsonParse {
            path: path.to_path_buf(),
            source,
        })?;
    let source = source_id(path);

    let items = match document {
        Value::Array(items) => items,
        obj @ Value::Object(_) => vec![obj],
        _ => return Err(AnalyzerError::UnsupportedFormat(path.to_path_buf())),
    };

    Ok(items
        .iter()
        .enumerate()
        .map(|(i, item)| raw_from_object(&source, i + 1, item, columns))
        .collect())
}

/// Build a row from a JSON object. Absent keys become null / missing.
fn raw_from_object(source: &str, row: usize, value: &Value, columns: &ColumnMapping) -> RawReading {
    let field = |name: &str| value.get(name).cloned().unwrap_or(Value::Null);
    RawReading {
        source: source.to_string(),
        row,
        timestamp: field(&columns.timestamp),
        systolic: parse_pressure(&field(&columns.systolic)),
        diastolic: parse_pressure(&field(&columns.diastolic)),
    }
}

fn parse_pressure_str(s: &str) -> Option<u16> {
    static LEADING_NUMBER: OnceLock<Regex> = OnceLock::new();
    let re = LEADING_NUMBER
        .get_or_init(|| Regex::new(r"^\s*(\d+(?:\.\d+)?)").expect("regex is valid"));
    let caps = re.captures(s)?;
    caps.get(1)?.as_str().parse::<f64>().ok().and_then(pressure_from_f64)
}

fn pressure_from_f64(value: f64) -> Option<u16> {
    if !value.is_finite() || value < 0.0 || value > f64::from(u16::MAX) {
        return None;
    }
    Some(value.round() as u16)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
