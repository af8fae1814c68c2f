use crate::types::{ColumnValues, DType};

/// Missing value tokens (compared case-insensitively after trimming)
pub const MISSING_TOKENS: &[&str] = &[
    "", "NA", "N/A", "NULL", "NaN", "-NaN", "None", "<NA>", "#N/A", "#NA", "-1.#IND", "1.#QNAN",
];

/// Type inference state for a column of text cells.
///
/// Starts at `Integer` and only ever widens: Integer -> Numeric -> String.
#[derive(Debug, Clone)]
pub struct TypeInferencer {
    current_type: Option<DType>,
    values_seen: u64,
}

impl TypeInferencer {
    pub fn new() -> Self {
        Self {
            current_type: None,
            values_seen: 0,
        }
    }

    /// Add a value for type inference
    pub fn observe(&mut self, value: &str) {
        if is_missing(value) {
            return;
        }

        self.values_seen += 1;
        let current = self.current_type.unwrap_or(DType::Integer);

        let new_type = match current {
            DType::Integer if is_integer(value) => return,
            DType::Integer | DType::Numeric if is_numeric(value) => DType::Numeric,
            _ => DType::String,
        };

        self.current_type = Some(new_type);
    }

    /// Get the current inferred type. Columns with no values at all are strings.
    pub fn inferred_type(&self) -> DType {
        if self.values_seen == 0 {
            return DType::String;
        }
        self.current_type.unwrap_or(DType::Integer)
    }

    /// Convert raw cells into typed values using the inferred type
    pub fn convert(&self, cells: Vec<String>) -> ColumnValues {
        match self.inferred_type() {
            DType::Integer => ColumnValues::Integer(
                cells
                    .iter()
                    .map(|c| if is_missing(c) { None } else { c.trim().parse().ok() })
                    .collect(),
            ),
            DType::Numeric => ColumnValues::Numeric(
                cells
                    .iter()
                    .map(|c| if is_missing(c) { None } else { parse_numeric(c) })
                    .collect(),
            ),
            _ => ColumnValues::String(
                cells
                    .into_iter()
                    .map(|c| if is_missing(&c) { None } else { Some(c) })
                    .collect(),
            ),
        }
    }
}

impl Default for TypeInferencer {
    fn default() -> Self {
        Self::new()
    }
}

/// Check if a value is missing
pub fn is_missing(value: &str) -> bool {
    let trimmed = value.trim();
    MISSING_TOKENS.iter().any(|t| trimmed.eq_ignore_ascii_case(t))
}

/// Check if a value is an integer
pub fn is_integer(value: &str) -> bool {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return false;
    }
    trimmed.parse::<i64>().is_ok()
}

/// Check if a value is numeric (integer or float)
pub fn is_numeric(value: &str) -> bool {
    parse_numeric(value).is_some()
}

/// Parse a numeric value
pub fn parse_numeric(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok()
}
