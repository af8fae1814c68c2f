mod cli;
mod error;
mod formats;
mod inference;
mod limits;
mod logging;
mod matcher;
mod progress;
mod recipe;
mod release;
mod report;
mod staging;
mod transform;
mod types;

use std::process::ExitCode;

use clap::Parser;
use cli::Cli;
use progress::TracingProgress;

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let options = cli.into_options();
    match release::prepare_release(&options, &TracingProgress) {
        Ok(outcome) => {
            if outcome.dataset_written {
                eprintln!("Dataset written to: {}", outcome.output_file.display());
            }
            eprintln!(
                "Report written to: {} ({} actions)",
                outcome.report_file.display(),
                outcome.report.records().len()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
