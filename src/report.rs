use std::fmt;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::staging;
use crate::types::{Result, REPORT_SUFFIX};

/// Kind of action recorded in the audit report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Drop,
    DropConstant,
    Obfuscate,
    ScaleDefault,
    ScaleCustom,
    Rename,
    Version,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Drop => "DROP",
            Action::DropConstant => "DROP_CONSTANT",
            Action::Obfuscate => "OBFUSCATE",
            Action::ScaleDefault => "SCALE_DEFAULT",
            Action::ScaleCustom => "SCALE_CUSTOM",
            Action::Rename => "RENAME",
            Action::Version => "VERSION",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One applied (or, in dry-run, intended) action
#[derive(Debug, Clone, PartialEq)]
pub struct AuditRecord {
    pub action: Action,
    pub column: String,
    pub details: String,
}

/// Append-only log of actions in pipeline order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuditReport {
    records: Vec<AuditRecord>,
}

impl AuditReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, action: Action, column: &str, details: impl Into<String>) {
        self.records.push(AuditRecord {
            action,
            column: column.to_string(),
            details: details.into(),
        });
    }

    pub fn records(&self) -> &[AuditRecord] {
        &self.records
    }

    /// Records of a single kind, in order
    pub fn of_kind(&self, action: Action) -> impl Iterator<Item = &AuditRecord> {
        self.records.iter().filter(move |r| r.action == action)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Write the report as CSV with a leading ordinal index column
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record(["index", "action", "column", "details"])?;
        for (index, record) in self.records.iter().enumerate() {
            csv_writer.write_record([
                index.to_string().as_str(),
                record.action.as_str(),
                record.column.as_str(),
                record.details.as_str(),
            ])?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    /// Write the report into a temporary file beside `path`, not yet in place
    pub fn stage(&self, path: &Path) -> Result<NamedTempFile> {
        let mut tmp = staging::temp_beside(path)?;
        self.write_csv(BufWriter::new(tmp.as_file_mut()))?;
        Ok(tmp)
    }

    /// Write the report to `path`, replacing it atomically
    pub fn emit(&self, path: &Path) -> Result<()> {
        staging::persist(self.stage(path)?, path)
    }
}

/// `{output-stem}_report.csv`, next to the output file
pub fn report_path(output: &Path) -> PathBuf {
    let stem = output
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    output.with_file_name(format!("{stem}{REPORT_SUFFIX}.csv"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_records_keep_insertion_order() {
        let mut report = AuditReport::new();
        report.record(Action::Drop, "notes", "");
        report.record(Action::ScaleDefault, "temp", "[0,10]");
        report.record(Action::Rename, "temp", "t");

        let actions: Vec<Action> = report.records().iter().map(|r| r.action).collect();
        assert_eq!(actions, vec![Action::Drop, Action::ScaleDefault, Action::Rename]);
        assert_eq!(report.of_kind(Action::Rename).count(), 1);
    }

    #[test]
    fn test_csv_has_index_column() {
        let mut report = AuditReport::new();
        report.record(Action::Version, "recipe", "1.0");
        report.record(Action::Drop, "notes, free text", "");

        let mut buf = Vec::new();
        report.write_csv(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert_eq!(
            text,
            "index,action,column,details\n0,VERSION,recipe,1.0\n1,DROP,\"notes, free text\",\n"
        );
    }

    #[test]
    fn test_emit_replaces_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out_report.csv");
        std::fs::write(&path, "stale").unwrap();
        let mut report = AuditReport::new();
        report.record(Action::Obfuscate, "site", "");

        report.emit(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "index,action,column,details\n0,OBFUSCATE,site,\n");
    }

    #[test]
    fn test_report_path() {
        assert_eq!(
            report_path(Path::new("/data/out_release_1.csv")),
            PathBuf::from("/data/out_release_1_report.csv")
        );
        assert_eq!(
            report_path(Path::new("table.parquet")),
            PathBuf::from("table_report.csv")
        );
    }
}
