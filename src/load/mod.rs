// src/load/mod.rs

pub mod raw;

use csv::ReaderBuilder;
use std::{
    fs::{self, File},
    io::BufReader,
    path::{Path, PathBuf},
};
use tracing::{debug, info};

use crate::error::{PipelineError, Result};
pub use raw::{RawRecord, REQUIRED_COLUMNS};

/// Records sampled when validating a file.
const SAMPLE_ROWS: usize = 5;

/// A CSV file that exists, parses, and carries every required column.
#[derive(Debug, Clone)]
pub struct CsvSource {
    pub path: PathBuf,
    pub headers: Vec<String>,
    pub size_bytes: u64,
}

fn malformed(path: &Path, reason: impl Into<String>) -> PipelineError {
    PipelineError::MalformedCsv {
        path: path.to_path_buf(),
        reason: reason.into(),
    }
}

/// Check that `path` points at a readable sales CSV.
/// Reads the header and the first few records; nothing else is touched.
#[tracing::instrument(level = "info", skip(path), fields(path = %path.as_ref().display()))]
pub fn locate_csv(path: impl AsRef<Path>) -> Result<CsvSource> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(PipelineError::NotFound(path.to_path_buf()));
    }
    let path = fs::canonicalize(path)?;
    let size_bytes = fs::metadata(&path)?.len();

    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .from_reader(BufReader::new(File::open(&path)?));

    let headers: Vec<String> = rdr
        .headers()
        .map_err(|e| malformed(&path, e.to_string()))?
        .iter()
        .map(str::to_string)
        .collect();

    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|col| !headers.iter().any(|h| h == col))
        .collect();
    if !missing.is_empty() {
        return Err(malformed(
            &path,
            format!("missing columns: {}", missing.join(", ")),
        ));
    }

    for (idx, result) in rdr.records().take(SAMPLE_ROWS).enumerate() {
        let record = result.map_err(|e| malformed(&path, format!("record {}: {}", idx, e)))?;
        debug!(record = idx, fields = record.len(), "sampled");
    }

    info!(
        columns = headers.len(),
        size_mb = %format!("{:.1}", size_bytes as f64 / (1024.0 * 1024.0)),
        "validated CSV file"
    );

    Ok(CsvSource {
        path,
        headers,
        size_bytes,
    })
}

/// Read every row of a validated source.
#[tracing::instrument(level = "info", skip(source), fields(path = %source.path.display()))]
pub fn read_raw_records(source: &CsvSource) -> Result<Vec<RawRecord>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .from_reader(BufReader::new(File::open(&source.path)?));

    let mut rows = Vec::new();
    for (idx, result) in rdr.deserialize::<RawRecord>().enumerate() {
        let row = result.map_err(|e| malformed(&source.path, format!("record {}: {}", idx, e)))?;
        rows.push(row);
    }
    info!(rows = rows.len(), "loaded raw records");
    Ok(rows)
}
