use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use csv::ReaderBuilder;

use crate::error::Error;
use crate::inference::parse_numeric;
use crate::types::{Result, LIMITS_HEADER};

/// Scaling bounds supplied for one column. `None` means "derive from data".
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ColumnLimits {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// External min/max overrides keyed by exact column name
#[derive(Debug, Clone, Default)]
pub struct LimitsTable {
    limits: HashMap<String, ColumnLimits>,
}

impl LimitsTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a limits file. Only CSV is supported.
    pub fn load(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        if ext != "csv" {
            return Err(Error::UnsupportedFormat(format!(
                "limits file must be CSV, got .{ext}"
            )));
        }

        let file = File::open(path).map_err(|e| {
            Error::Config(format!("cannot read limits file {}: {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(file))
    }

    /// Parse `column,min,max` rows. A leading literal header row is skipped and
    /// later rows for the same column replace earlier ones.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut table = Self::new();
        for (row_idx, result) in csv_reader.records().enumerate() {
            let record = result
                .map_err(|e| Error::Config(format!("malformed limits file: {e}")))?;
            if record.len() != 3 {
                return Err(Error::Config(format!(
                    "limits row {} has {} fields, expected 3",
                    row_idx + 1,
                    record.len()
                )));
            }

            if row_idx == 0 && record.iter().eq(LIMITS_HEADER.iter().copied()) {
                continue;
            }

            table.insert(
                &record[0],
                ColumnLimits {
                    min: parse_bound(&record[1]),
                    max: parse_bound(&record[2]),
                },
            );
        }

        Ok(table)
    }

    pub fn insert(&mut self, column: &str, limits: ColumnLimits) {
        self.limits.insert(column.to_string(), limits);
    }

    /// Exact-name lookup
    pub fn lookup(&self, column: &str) -> Option<ColumnLimits> {
        self.limits.get(column).copied()
    }

    pub fn len(&self) -> usize {
        self.limits.len()
    }
}

/// Blank, unparseable and NaN bounds all count as absent
fn parse_bound(field: &str) -> Option<f64> {
    parse_numeric(field).filter(|v| !v.is_nan())
}
