pub mod csv;
#[cfg(feature = "parquet")]
pub mod parquet;

use std::fs::File;
use std::path::Path;

use crate::error::Error;
use crate::types::{Dataset, FileFormat, Result};

/// Common trait for dataset file formats
pub trait TableFormat {
    fn format(&self) -> FileFormat;

    /// Read the whole table, or at most `row_limit` rows where the format supports it
    fn read(&self, path: &Path, row_limit: Option<usize>) -> Result<Dataset>;

    /// Write the table to an already opened file
    fn write(&self, dataset: &Dataset, file: &mut File) -> Result<()>;
}

/// Pick the format handler for a path, by extension
pub fn format_for(path: &Path) -> Result<Box<dyn TableFormat>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("");

    let format = FileFormat::from_extension(ext).ok_or_else(|| {
        Error::Input(format!("Unsupported file extension: .{}", ext))
    })?;

    match format {
        FileFormat::Csv => Ok(Box::new(csv::CsvFormat::new())),
        #[cfg(feature = "parquet")]
        FileFormat::Parquet => Ok(Box::new(parquet::ParquetFormat)),
        #[cfg(not(feature = "parquet"))]
        FileFormat::Parquet => Err(Error::Input(
            "Parquet support is not enabled; rebuild with `--features parquet`".to_string(),
        )),
    }
}
