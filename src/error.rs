// src/error.rs

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("CSV file not found: {0}")]
    NotFound(PathBuf),

    #[error("Malformed CSV {path}: {reason}")]
    MalformedCsv { path: PathBuf, reason: String },

    #[error("Warehouse unavailable at {path}: {source}")]
    WarehouseUnavailable {
        path: String,
        #[source]
        source: duckdb::Error,
    },

    #[error("Database query failed: {0}")]
    Database(#[from] duckdb::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
