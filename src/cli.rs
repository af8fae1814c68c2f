use clap::Parser;
use std::path::PathBuf;

use crate::release::ReleaseOptions;

/// Prepare a dataset for release by applying a column recipe
#[derive(Parser, Debug)]
#[command(name = "drpt")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Recipe JSON file
    pub recipe_file: PathBuf,

    /// Input dataset (.csv, or .parquet with the `parquet` feature)
    pub input_file: PathBuf,

    /// Report what would be done without writing the dataset
    #[arg(short, long, default_value_t = false)]
    pub dry_run: bool,

    /// Debug-level logging
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Read at most this many rows (CSV only)
    #[arg(short = 'n', long = "nrows")]
    pub nrows: Option<usize>,

    /// Disable scaling regardless of the recipe
    #[arg(long, alias = "ns", default_value_t = false)]
    pub no_scaling: bool,

    /// CSV of per-column limits: column,min,max
    #[arg(short, long)]
    pub limits_file: Option<PathBuf>,

    /// Output path (default: <input>_release_<version>.<ext> next to the input)
    #[arg(short, long)]
    pub output_file: Option<PathBuf>,
}

impl Cli {
    pub fn into_options(self) -> ReleaseOptions {
        ReleaseOptions {
            recipe_file: self.recipe_file,
            input_file: self.input_file,
            output_file: self.output_file,
            limits_file: self.limits_file,
            dry_run: self.dry_run,
            row_limit: self.nrows,
            no_scaling: self.no_scaling,
        }
    }
}
