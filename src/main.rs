//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `pagegrade` library that handles:
//! - Command-line argument parsing
//! - Logger initialization
//! - User-facing output formatting
//!
//! All core functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use std::process;

use pagegrade::initialization::init_logger_with;
use pagegrade::{run_grade, Cli, GradeOptions, OutputFormat};

#[tokio::main]
async fn main() -> Result<()> {
    let options = GradeOptions::from(Cli::parse());

    init_logger_with(options.log_level.clone().into(), options.log_format.clone())
        .context("Failed to initialize logger")?;

    match run_grade(&options).await {
        Ok(report) => {
            match options.output {
                OutputFormat::Plain => print!("{}", report.to_plain()),
                OutputFormat::Json => {
                    println!("{}", report.to_json().context("Failed to serialize report")?)
                }
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("pagegrade error: {:#}", e);
            process::exit(1);
        }
    }
}
