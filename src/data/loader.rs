use std::fs::File;
use std::io::Read;
use std::path::Path;

use arrow::array::Array;
use arrow::util::display::array_value_to_string;
use log::{debug, info};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use zip::ZipArchive;

use super::model::RawTable;
use super::schema::normalize_header;
use crate::config::SourcePaths;
use crate::error::{CrimeStatsError, Result};

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// The three raw inputs of a run.
#[derive(Debug, Clone)]
pub struct Sources {
    pub incidents: RawTable,
    pub crime_codes: RawTable,
    pub mo_codes: RawTable,
}

/// Load all three inputs named by `paths`.
pub fn load_sources(paths: &SourcePaths) -> Result<Sources> {
    let crime_codes = load_table(&paths.crime_codes, "crime codes")?;
    let mo_codes = load_table(&paths.mo_codes, "MO codes")?;
    let incidents = load_table(&paths.incidents, "incidents")?;
    info!(
        "Loaded {} incidents, {} crime codes, {} MO codes",
        incidents.len(),
        crime_codes.len(),
        mo_codes.len()
    );
    Ok(Sources {
        incidents,
        crime_codes,
        mo_codes,
    })
}

/// Load a table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – delimited text with a header row
/// * `.zip`     – archive whose first entry is a delimited file
/// * `.parquet` – any flat schema; cells are rendered to text
///
/// Headers come back normalized (see [`normalize_header`]).
pub fn load_table(path: &Path, name: &str) -> Result<RawTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    debug!("Loading {name} from {}", path.display());
    match ext.as_str() {
        "csv" => load_csv(path, name),
        "zip" => load_zip(path, name),
        "parquet" | "pq" => load_parquet(path, name),
        other => Err(CrimeStatsError::UnsupportedFormat(other.to_string())),
    }
}

// ---------------------------------------------------------------------------
// Delimited loaders
// ---------------------------------------------------------------------------

fn load_csv(path: &Path, name: &str) -> Result<RawTable> {
    let file = File::open(path).map_err(|source| CrimeStatsError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    read_delimited(file, path, name)
}

/// The first entry of the archive is used whatever its name.
fn load_zip(path: &Path, name: &str) -> Result<RawTable> {
    let archive_err = |source| CrimeStatsError::Archive {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(|source| CrimeStatsError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let mut archive = ZipArchive::new(file).map_err(archive_err)?;
    if archive.is_empty() {
        return Err(CrimeStatsError::EmptyArchive(path.to_path_buf()));
    }
    info!(
        "Files in {}: {:?}",
        path.display(),
        archive.file_names().collect::<Vec<_>>()
    );

    let entry = archive.by_index(0).map_err(archive_err)?;
    debug!("Reading {name} from archive entry {}", entry.name());
    read_delimited(entry, path, name)
}

/// Read a header row plus records. Rows may be ragged; missing trailing
/// cells read as empty.
pub fn read_delimited<R: Read>(reader: R, path: &Path, name: &str) -> Result<RawTable> {
    let csv_err = |source| CrimeStatsError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(reader);
    let headers: Vec<String> = reader
        .headers()
        .map_err(csv_err)?
        .iter()
        .map(normalize_header)
        .collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(csv_err)?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(RawTable::new(name, headers, rows))
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file as text cells. Null cells become empty strings so
/// the same schema rules apply as for delimited input.
fn load_parquet(path: &Path, name: &str) -> Result<RawTable> {
    let parquet_err = |source| CrimeStatsError::Parquet {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(|source| CrimeStatsError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file).map_err(parquet_err)?;
    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| normalize_header(f.name()))
        .collect();
    let reader = builder.build().map_err(parquet_err)?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result?;
        for row in 0..batch.num_rows() {
            let mut cells = Vec::with_capacity(batch.num_columns());
            for col in batch.columns() {
                if col.is_null(row) {
                    cells.push(String::new());
                } else {
                    cells.push(array_value_to_string(col.as_ref(), row)?);
                }
            }
            rows.push(cells);
        }
    }

    Ok(RawTable::new(name, headers, rows))
}
