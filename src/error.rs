use std::path::PathBuf;

use thiserror::Error;

/// All errors produced while loading, normalizing and summarising crime data.
#[derive(Error, Debug)]
pub enum CrimeStatsError {
    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A delimited file could not be parsed.
    #[error("Failed to parse CSV {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A zip archive could not be opened or its entry read.
    #[error("Failed to read archive {path}: {source}")]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    /// The archive holds no entry to read the table from.
    #[error("Archive {0} contains no entries")]
    EmptyArchive(PathBuf),

    /// A Parquet file could not be read.
    #[error("Failed to read parquet {path}: {source}")]
    Parquet {
        path: PathBuf,
        #[source]
        source: parquet::errors::ParquetError,
    },

    /// An Arrow array or record batch could not be built or rendered.
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// The input file extension is not one of the supported formats.
    #[error("Unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    /// A column the schema requires is absent after header normalization.
    #[error("Table '{table}' is missing required column '{column}'")]
    MissingColumn { table: String, column: String },

    /// A date-time cell did not match the fixed report/occurrence format.
    #[error("Row {row}, column '{column}': '{value}' does not match the date format")]
    DateParse {
        row: usize,
        column: String,
        value: String,
    },

    /// A time-of-day cell did not match the 4-digit 24-hour format.
    #[error("Row {row}, column '{column}': '{value}' is not a HHMM time")]
    TimeParse {
        row: usize,
        column: String,
        value: String,
    },

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The JSON report could not be serialized.
    #[error("Failed to serialize JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CrimeStatsError>;
