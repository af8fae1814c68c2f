use std::collections::HashMap;

use crate::progress::{Progress, Stage};
use crate::recipe::RenameRule;
use crate::report::{Action, AuditReport};
use crate::types::Dataset;

/// Target names for the columns a rule matches, as `(column index, new name)`.
///
/// When several columns map to the same target, each gets a `_{k}` suffix.
/// Suffixes count down in column order: three tied columns become
/// `t_3`, `t_2`, `t_1`.
pub fn plan_renames(names: &[&str], rule: &RenameRule) -> Vec<(usize, String)> {
    let mut renames: Vec<(usize, String)> = names
        .iter()
        .enumerate()
        .filter(|(_, name)| rule.matches(name))
        .map(|(idx, name)| (idx, rule.apply(name)))
        .collect();

    let mut remaining: HashMap<String, usize> = HashMap::new();
    for (_, target) in &renames {
        *remaining.entry(target.clone()).or_insert(0) += 1;
    }
    let totals = remaining.clone();

    for (_, target) in &mut renames {
        if totals.get(target.as_str()).copied().unwrap_or(0) < 2 {
            continue;
        }
        if let Some(left) = remaining.get_mut(target.as_str()) {
            let suffix = *left;
            *left -= 1;
            *target = format!("{target}_{suffix}");
        }
    }

    renames
}

/// Apply rename rules in order; each rule sees the names left by the previous one
pub fn apply_rules(
    dataset: &mut Dataset,
    rules: &[RenameRule],
    report: &mut AuditReport,
    progress: &dyn Progress,
) -> usize {
    let mut renamed = 0;

    for rule in rules {
        let plan = plan_renames(&dataset.column_names(), rule);
        tracing::debug!(pattern = rule.pattern(), matched = plan.len(), "rename rule");
        for (idx, target) in &plan {
            let name = &dataset.columns()[*idx].name;
            report.record(Action::Rename, name, target.as_str());
            progress.column(Stage::Rename, name);
        }

        let columns = dataset.columns_mut();
        for (idx, target) in plan {
            columns[idx].name = target;
            renamed += 1;
        }
    }

    renamed
}
