use thiserror::Error;

/// Application error type
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or invalid recipe, or malformed limits file
    #[error("Configuration error: {0}")]
    Config(String),

    /// Missing or unreadable input, or unsupported dataset format
    #[error("Input error: {0}")]
    Input(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Runtime error: {0}")]
    Runtime(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[cfg(feature = "parquet")]
    #[error("Parquet error: {0}")]
    Parquet(#[from] polars::error::PolarsError),
}
