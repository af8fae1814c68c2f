//! The recipe-driven column pipeline.
//!
//! Stages run strictly in order: drop, drop-constant, obfuscate, scale,
//! rename. Each stage takes the working [`Dataset`] by mutable reference and
//! appends to the shared [`AuditReport`].

pub mod drop;
pub mod obfuscate;
pub mod rename;
pub mod scale;

use std::num::NonZeroUsize;

use crate::limits::LimitsTable;
use crate::progress::{Progress, Stage};
use crate::recipe::Recipe;
use crate::report::AuditReport;
use crate::types::{Dataset, Result};

pub use scale::ScaleSettings;

/// Run-time switches for the pipeline
#[derive(Debug, Clone, Copy, Default)]
pub struct TransformOptions {
    /// Record actions without rewriting values
    pub dry_run: bool,
    /// Skip the scale stage regardless of the recipe
    pub no_scaling: bool,
    pub scale_workers: Option<NonZeroUsize>,
}

/// Applies a recipe (and optional limits) to a dataset.
///
/// In dry-run, column removals and renames still happen on the working
/// table so that later stages see the same columns as a real run and the
/// report comes out identical; obfuscation codes and scaled values are not
/// computed into the table.
pub struct Transformer<'a> {
    recipe: &'a Recipe,
    limits: Option<&'a LimitsTable>,
    options: TransformOptions,
    progress: &'a dyn Progress,
}

impl<'a> Transformer<'a> {
    pub fn new(
        recipe: &'a Recipe,
        limits: Option<&'a LimitsTable>,
        options: TransformOptions,
        progress: &'a dyn Progress,
    ) -> Self {
        Self {
            recipe,
            limits,
            options,
            progress,
        }
    }

    /// Whether the scale stage will run
    pub fn scaling_enabled(&self) -> bool {
        !self.options.no_scaling && !self.recipe.actions.disable_scaling
    }

    pub fn run(&self, dataset: &mut Dataset, report: &mut AuditReport) -> Result<()> {
        let actions = &self.recipe.actions;

        self.progress.stage(Stage::Drop);
        drop::drop_matching(dataset, &actions.drop, report, self.progress);

        if actions.drop_constant_columns {
            self.progress.stage(Stage::DropConstant);
            drop::drop_constant(dataset, report, self.progress);
        }

        self.progress.stage(Stage::Obfuscate);
        obfuscate::obfuscate_matching(
            dataset,
            &actions.obfuscate,
            self.options.dry_run,
            report,
            self.progress,
        );

        if self.scaling_enabled() {
            self.progress.stage(Stage::Scale);
            let settings = ScaleSettings {
                obfuscate: &actions.obfuscate,
                skip: &actions.skip_scaling,
                limits: self.limits,
                dry_run: self.options.dry_run,
                workers: self.options.scale_workers,
            };
            scale::scale_numeric(dataset, &settings, report, self.progress)?;
        } else {
            tracing::info!("Scaling disabled");
        }

        self.progress.stage(Stage::Rename);
        rename::apply_rules(dataset, &actions.rename, report, self.progress);

        Ok(())
    }
}
