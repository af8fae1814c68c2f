use std::collections::{BTreeSet, HashMap};

use crate::matcher::ColumnMatcher;
use crate::progress::{Progress, Stage};
use crate::report::{Action, AuditReport};
use crate::types::{ColumnValues, Dataset, ValueKey};

/// Maps each distinct value of a column to a dense code in `[0, n)`.
///
/// Codes follow the sorted order of the distinct values, so the same column
/// always encodes the same way.
#[derive(Debug, Clone, Default)]
pub struct CodeBook {
    codes: HashMap<ValueKey, u32>,
}

impl CodeBook {
    /// Build a code book from the non-missing cells of `values`
    pub fn from_values(values: &ColumnValues) -> Self {
        let distinct: BTreeSet<ValueKey> = values.keys().into_iter().flatten().collect();
        let codes = distinct
            .into_iter()
            .enumerate()
            .map(|(code, key)| (key, code as u32))
            .collect();
        Self { codes }
    }

    pub fn code(&self, key: &ValueKey) -> Option<u32> {
        self.codes.get(key).copied()
    }

    /// Encode a column; missing cells stay missing
    pub fn encode(&self, values: &ColumnValues) -> ColumnValues {
        ColumnValues::Categorical(
            values
                .keys()
                .iter()
                .map(|key| key.as_ref().and_then(|k| self.code(k)))
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }
}

/// Replace the values of every matching column with dense integer codes.
///
/// In dry-run the actions are recorded but values are left untouched.
pub fn obfuscate_matching(
    dataset: &mut Dataset,
    matcher: &ColumnMatcher,
    dry_run: bool,
    report: &mut AuditReport,
    progress: &dyn Progress,
) -> Vec<String> {
    let indices = matcher.matching_indices(dataset.column_names());
    let mut obfuscated = Vec::with_capacity(indices.len());

    for idx in indices {
        let column = &mut dataset.columns_mut()[idx];
        report.record(Action::Obfuscate, &column.name, "");
        progress.column(Stage::Obfuscate, &column.name);
        if !dry_run {
            let book = CodeBook::from_values(&column.values);
            tracing::debug!(column = %column.name, codes = book.len(), "obfuscated");
            column.values = book.encode(&column.values);
        }
        obfuscated.push(column.name.clone());
    }

    obfuscated
}
