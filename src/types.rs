use std::cmp::Ordering;
use std::collections::HashSet;

/// Header row that may open a limits file
pub const LIMITS_HEADER: [&str; 3] = ["column", "min", "max"];

/// Suffix appended to the output stem to name the audit report
pub const REPORT_SUFFIX: &str = "_report";

/// Data type classification for columns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DType {
    Integer,
    Numeric,
    String,
    /// Dense integer codes produced by obfuscation
    Categorical,
}

impl DType {
    /// Whether min/max scaling applies to columns of this type
    pub fn is_numeric(self) -> bool {
        matches!(self, DType::Integer | DType::Numeric)
    }
}

/// Cell values of a single column. `None` marks a missing cell.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValues {
    Integer(Vec<Option<i64>>),
    Numeric(Vec<Option<f64>>),
    String(Vec<Option<String>>),
    Categorical(Vec<Option<u32>>),
}

impl ColumnValues {
    pub fn dtype(&self) -> DType {
        match self {
            ColumnValues::Integer(_) => DType::Integer,
            ColumnValues::Numeric(_) => DType::Numeric,
            ColumnValues::String(_) => DType::String,
            ColumnValues::Categorical(_) => DType::Categorical,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ColumnValues::Integer(v) => v.len(),
            ColumnValues::Numeric(v) => v.len(),
            ColumnValues::String(v) => v.len(),
            ColumnValues::Categorical(v) => v.len(),
        }
    }

    /// Numeric view of the column, `None` for non-numeric types
    pub fn as_f64(&self) -> Option<Vec<Option<f64>>> {
        match self {
            ColumnValues::Integer(v) => Some(v.iter().map(|x| x.map(|i| i as f64)).collect()),
            ColumnValues::Numeric(v) => Some(v.clone()),
            _ => None,
        }
    }

    /// Hashable, ordered key for every cell
    pub fn keys(&self) -> Vec<Option<ValueKey>> {
        match self {
            ColumnValues::Integer(v) => v.iter().map(|x| x.map(ValueKey::Integer)).collect(),
            ColumnValues::Numeric(v) => v
                .iter()
                .map(|x| x.map(ValueKey::float))
                .collect(),
            ColumnValues::String(v) => v
                .iter()
                .map(|x| x.as_ref().map(|s| ValueKey::String(s.clone())))
                .collect(),
            ColumnValues::Categorical(v) => {
                v.iter().map(|x| x.map(ValueKey::Categorical)).collect()
            }
        }
    }

    /// Number of distinct cells, counting missing as a value of its own
    pub fn distinct_count(&self) -> usize {
        self.keys().into_iter().collect::<HashSet<_>>().len()
    }
}

/// Comparable identity of a cell value.
///
/// Floats are held by bit pattern so that they can be hashed; ordering uses
/// `f64::total_cmp` on the decoded value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueKey {
    Integer(i64),
    Numeric(u64),
    String(String),
    Categorical(u32),
}

impl ValueKey {
    /// Key for a float; `-0.0` and every NaN payload collapse onto one key each
    pub fn float(value: f64) -> Self {
        let canonical = if value.is_nan() {
            f64::NAN
        } else if value == 0.0 {
            0.0
        } else {
            value
        };
        ValueKey::Numeric(canonical.to_bits())
    }

    fn rank(&self) -> u8 {
        match self {
            ValueKey::Integer(_) => 0,
            ValueKey::Numeric(_) => 1,
            ValueKey::String(_) => 2,
            ValueKey::Categorical(_) => 3,
        }
    }
}

impl Ord for ValueKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (ValueKey::Integer(a), ValueKey::Integer(b)) => a.cmp(b),
            (ValueKey::Numeric(a), ValueKey::Numeric(b)) => {
                f64::from_bits(*a).total_cmp(&f64::from_bits(*b))
            }
            (ValueKey::String(a), ValueKey::String(b)) => a.cmp(b),
            (ValueKey::Categorical(a), ValueKey::Categorical(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for ValueKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A named column
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: ColumnValues,
}

impl Column {
    pub fn new(name: impl Into<String>, values: ColumnValues) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    pub fn dtype(&self) -> DType {
        self.values.dtype()
    }
}

/// In-memory, column-oriented table. All columns share one row count.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dataset {
    columns: Vec<Column>,
    row_count: usize,
}

impl Dataset {
    /// Build a dataset, rejecting ragged columns
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let row_count = columns.first().map(|c| c.values.len()).unwrap_or(0);
        if let Some(bad) = columns.iter().find(|c| c.values.len() != row_count) {
            return Err(crate::error::Error::Input(format!(
                "column '{}' has {} rows, expected {}",
                bad.name,
                bad.values.len(),
                row_count
            )));
        }
        Ok(Self { columns, row_count })
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn columns_mut(&mut self) -> &mut [Column] {
        &mut self.columns
    }

    #[cfg(test)]
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Remove the columns at `indices`, keeping the order of the rest
    pub fn remove_columns(&mut self, indices: &HashSet<usize>) {
        let mut index = 0;
        self.columns.retain(|_| {
            let keep = !indices.contains(&index);
            index += 1;
            keep
        });
    }
}

/// Supported tabular file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Parquet,
}

impl FileFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "csv" => Some(FileFormat::Csv),
            "parquet" | "pq" => Some(FileFormat::Parquet),
            _ => None,
        }
    }
}

/// Result type for the application
pub type Result<T> = std::result::Result<T, crate::error::Error>;
