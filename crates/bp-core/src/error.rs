use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the blood pressure analyzer.
#[derive(Error, Debug)]
pub enum AnalyzerError {
    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A JSON document could not be parsed.
    #[error("Failed to parse JSON in {path}: {source}")]
    JsonParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A JSON Lines record could not be parsed.
    #[error("Failed to parse JSON in {path} at line {line}: {source}")]
    JsonRecord {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    /// A CSV file was structurally invalid.
    #[error("Failed to parse CSV {path}: {message}")]
    Csv { path: PathBuf, message: String },

    /// A timestamp value did not match any recognised format.
    ///
    /// Aborts the whole load; no partial dataset is produced.
    #[error("Malformed timestamp {value:?} in {source_id} at row {row}")]
    MalformedTimestamp {
        source_id: String,
        row: usize,
        value: String,
    },

    /// A required column is absent from the input header.
    #[error("Missing column \"{column}\" in {path}")]
    MissingColumn { path: PathBuf, column: String },

    /// The input file extension is not one of the supported formats.
    #[error("Unsupported input format: {0}")]
    UnsupportedFormat(PathBuf),

    /// The input path does not exist.
    #[error("Data path not found: {0}")]
    DataPathNotFound(PathBuf),

    /// No supported input files were found under the given directory.
    #[error("No input files found in {0}")]
    NoDataFiles(PathBuf),

    /// The PDF report could not be produced.
    #[error("Report error: {0}")]
    Report(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the analyzer crates.
pub type Result<T> = std::result::Result<T, AnalyzerError>;
