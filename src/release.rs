use std::path::{Path, PathBuf};

use crate::error::Error;
use crate::formats::format_for;
use crate::limits::LimitsTable;
use crate::progress::Progress;
use crate::recipe::{derive_output_name, Recipe};
use crate::report::{report_path, Action, AuditReport};
use crate::staging;
use crate::transform::{TransformOptions, Transformer};
use crate::types::{FileFormat, Result};

/// Version recorded in every report
pub const TOOL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Everything a release run needs to know
#[derive(Debug, Clone, Default)]
pub struct ReleaseOptions {
    pub recipe_file: PathBuf,
    pub input_file: PathBuf,
    /// Derived from the input name and recipe version when absent
    pub output_file: Option<PathBuf>,
    pub limits_file: Option<PathBuf>,
    pub dry_run: bool,
    /// CSV input only
    pub row_limit: Option<usize>,
    pub no_scaling: bool,
}

/// What a completed run produced
#[derive(Debug, Clone)]
pub struct ReleaseOutcome {
    pub output_file: PathBuf,
    pub report_file: PathBuf,
    pub report: AuditReport,
    /// False in dry-run
    pub dataset_written: bool,
}

/// `{stem}_release_{version}{ext}` next to the input file
pub fn derived_output_path(input: &Path, version: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    let ext = input
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{e}"))
        .unwrap_or_default();
    input.with_file_name(derive_output_name(stem, &ext, version))
}

/// Load the recipe, limits and input, run the pipeline, then persist.
///
/// Any failure aborts before either artifact is in place: both are staged in
/// temporary files first, then moved into place dataset first. The dataset is
/// not written in dry-run; the report always is.
pub fn prepare_release(
    options: &ReleaseOptions,
    progress: &dyn Progress,
) -> Result<ReleaseOutcome> {
    if !options.input_file.is_file() {
        return Err(Error::Input(format!(
            "input file not found: {}",
            options.input_file.display()
        )));
    }

    let recipe = Recipe::load(&options.recipe_file)?;
    tracing::info!(version = %recipe.version, "Recipe loaded");

    let format = format_for(&options.input_file)?;
    let output_file = options
        .output_file
        .clone()
        .unwrap_or_else(|| derived_output_path(&options.input_file, &recipe.version));
    let report_file = report_path(&output_file);

    let output_format = output_file
        .extension()
        .and_then(|e| e.to_str())
        .and_then(FileFormat::from_extension);
    if output_format != Some(format.format()) {
        tracing::warn!(
            output = %output_file.display(),
            "Output extension differs from input; writing in the input format"
        );
    }

    let limits = match &options.limits_file {
        Some(path) => {
            tracing::info!("Reading limits...");
            let table = LimitsTable::load(path)?;
            tracing::debug!(entries = table.len(), "Limits loaded");
            Some(table)
        }
        None => None,
    };

    tracing::info!(input = %options.input_file.display(), "Reading data...");
    let mut dataset = format.read(&options.input_file, options.row_limit)?;
    tracing::debug!(
        rows = dataset.row_count(),
        columns = dataset.len(),
        "Dataset loaded"
    );

    let mut report = AuditReport::new();
    report.record(Action::Version, "recipe", recipe.version.as_str());
    report.record(Action::Version, "drpt", TOOL_VERSION);

    let transform_options = TransformOptions {
        dry_run: options.dry_run,
        no_scaling: options.no_scaling,
        scale_workers: None,
    };
    Transformer::new(&recipe, limits.as_ref(), transform_options, progress)
        .run(&mut dataset, &mut report)?;
    tracing::info!(
        actions = report.len(),
        dropped = report.of_kind(Action::Drop).count()
            + report.of_kind(Action::DropConstant).count(),
        obfuscated = report.of_kind(Action::Obfuscate).count(),
        renamed = report.of_kind(Action::Rename).count(),
        "Pipeline finished"
    );

    let dataset_written = if options.dry_run {
        tracing::info!("Dry run: dataset not written");
        tracing::info!("Generating report...");
        report.emit(&report_file)?;
        false
    } else {
        let mut staged_dataset = staging::temp_beside(&output_file)?;
        format.write(&dataset, staged_dataset.as_file_mut())?;
        tracing::info!("Generating report...");
        let staged_report = report.stage(&report_file)?;

        staging::persist(staged_dataset, &output_file)?;
        if let Err(e) = staging::persist(staged_report, &report_file) {
            // No released dataset without its report
            let _ = std::fs::remove_file(&output_file);
            return Err(e);
        }
        tracing::info!(output = %output_file.display(), "Dataset written");
        true
    };

    Ok(ReleaseOutcome {
        output_file,
        report_file,
        report,
        dataset_written,
    })
}
