use clap::Parser;
use marktidy::cli::{CliArgs, run_cli};
use marktidy::output::OutputFormatter;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args = CliArgs::parse();

    match run_cli(&args) {
        Ok(outcome) => {
            if let Some(output) = outcome.output {
                OutputFormatter::success(&format!("Organization complete: {}", output.display()));
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            OutputFormatter::error(&format!("Error: {}", e));
            ExitCode::FAILURE
        }
    }
}
