pub mod config;
pub use config::Config;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AvseLensError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
    #[error("column not found: {0}")]
    MissingColumn(String),
    #[error("column '{column}' is not numeric (type {data_type})")]
    NonNumericColumn { column: String, data_type: String },
    #[error("bin count must be positive, got {0}")]
    InvalidBinCount(usize),
    #[error("column '{0}' has no non-null values")]
    EmptyColumn(String),
    #[error("chart error: {0}")]
    Chart(String),
    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, AvseLensError>;
