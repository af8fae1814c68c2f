use std::collections::HashSet;

use crate::matcher::ColumnMatcher;
use crate::progress::{Progress, Stage};
use crate::report::{Action, AuditReport};
use crate::types::Dataset;

/// Remove every column matching any drop pattern.
///
/// Matches are collected across all patterns first, so a column hit by
/// several patterns is recorded and removed once.
pub fn drop_matching(
    dataset: &mut Dataset,
    matcher: &ColumnMatcher,
    report: &mut AuditReport,
    progress: &dyn Progress,
) -> Vec<String> {
    if matcher.is_empty() {
        return Vec::new();
    }
    let indices = matcher.matching_indices(dataset.column_names());
    let mut dropped = Vec::with_capacity(indices.len());

    for &idx in &indices {
        let name = &dataset.columns()[idx].name;
        report.record(Action::Drop, name, "");
        progress.column(Stage::Drop, name);
        dropped.push(name.clone());
    }

    dataset.remove_columns(&indices.into_iter().collect());
    dropped
}

/// Remove columns holding a single distinct value (missing counts as a value)
pub fn drop_constant(
    dataset: &mut Dataset,
    report: &mut AuditReport,
    progress: &dyn Progress,
) -> Vec<String> {
    let mut doomed = HashSet::new();
    let mut dropped = Vec::new();

    for (idx, column) in dataset.columns().iter().enumerate() {
        let distinct = column.values.distinct_count();
        if distinct == 1 {
            report.record(Action::DropConstant, &column.name, "");
            progress.column(Stage::DropConstant, &column.name);
            doomed.insert(idx);
            dropped.push(column.name.clone());
        }
    }

    dataset.remove_columns(&doomed);
    dropped
}
