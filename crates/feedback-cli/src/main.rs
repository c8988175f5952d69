//! Feedback Report
//!
//! Builds a topic/subtopic CSV report from free-text feedback.
//!
//! # Usage
//!
//! ```bash
//! feedback-report run --input feedback.csv --model model.json [--column Comments] [--seeds seeds.txt] [--output report.csv]
//! feedback-report config
//! ```
//!
//! # Configuration
//!
//! Configuration is loaded in order (later sources override earlier):
//! 1. Built-in defaults
//! 2. Config file (~/.config/feedback-topics/config.toml)
//! 3. Environment variables (FEEDBACK_*)
//! 4. CLI flags

use anyhow::Result;
use clap::Parser;

use feedback_cli::{run_report, show_config, Cli, Commands, RunOptions};

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            input,
            model,
            seeds,
            output,
            column,
            seed_column,
        } => {
            let options = RunOptions {
                input,
                model,
                seeds,
                output,
                column,
                seed_column,
            };
            run_report(cli.config.as_deref(), cli.log_level.as_deref(), &options)?;
        }
        Commands::Config => {
            show_config(cli.config.as_deref(), cli.log_level.as_deref())?;
        }
    }

    Ok(())
}
