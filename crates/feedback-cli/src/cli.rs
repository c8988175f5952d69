//! CLI argument parsing for the report builder.
//!
//! CLI flags override every other config source.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::DEFAULT_COLUMN;

/// Feedback topic report builder
///
/// Groups free-text feedback into topics and subtopics and writes a CSV
/// report with sentiment and generated summaries.
#[derive(Parser, Debug)]
#[command(name = "feedback-report")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to config file (overrides the default config location)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the report for a feedback file
    Run {
        /// Feedback file: .csv, .json array of strings, or one item per line
        #[arg(short, long)]
        input: PathBuf,

        /// Precomputed topic model snapshot (JSON)
        #[arg(short, long)]
        model: PathBuf,

        /// Seed topics file, laid out like the feedback file
        #[arg(short, long)]
        seeds: Option<PathBuf>,

        /// Override the report output path
        #[arg(short, long)]
        output: Option<String>,

        /// Column holding feedback when the input is CSV
        #[arg(long, default_value = DEFAULT_COLUMN)]
        column: String,

        /// Column holding seed phrases when the seed file is CSV
        #[arg(long, default_value = DEFAULT_COLUMN)]
        seed_column: String,
    },

    /// Print the effective configuration
    Config,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_run() {
        let cli = Cli::parse_from([
            "feedback-report",
            "run",
            "--input",
            "feedback.json",
            "--model",
            "model.json",
        ]);
        match cli.command {
            Commands::Run {
                input,
                model,
                seeds,
                output,
                column,
                seed_column,
            } => {
                assert_eq!(input, PathBuf::from("feedback.json"));
                assert_eq!(model, PathBuf::from("model.json"));
                assert!(seeds.is_none());
                assert!(output.is_none());
                assert_eq!(column, "Comments");
                assert_eq!(seed_column, "Comments");
            }
            _ => panic!("Expected Run command"),
        }
    }

    #[test]
    fn test_cli_run_with_overrides() {
        let cli = Cli::parse_from([
            "feedback-report",
            "run",
            "-i",
            "in.txt",
            "-m",
            "model.json",
            "-s",
            "seeds.txt",
            "-o",
            "out/report.csv",
        ]);
        match cli.command {
            Commands::Run { seeds, output, .. } => {
                assert_eq!(seeds, Some(PathBuf::from("seeds.txt")));
                assert_eq!(output.as_deref(), Some("out/report.csv"));
            }
            _ => panic!("Expected Run command"),
        }
    }

    #[test]
    fn test_cli_run_csv_columns() {
        let cli = Cli::parse_from([
            "feedback-report",
            "run",
            "-i",
            "survey.csv",
            "-m",
            "model.json",
            "--column",
            "Response",
            "--seed-column",
            "Seed",
        ]);
        match cli.command {
            Commands::Run {
                column,
                seed_column,
                ..
            } => {
                assert_eq!(column, "Response");
                assert_eq!(seed_column, "Seed");
            }
            _ => panic!("Expected Run command"),
        }
    }

    #[test]
    fn test_cli_global_flags() {
        let cli = Cli::parse_from([
            "feedback-report",
            "config",
            "--config",
            "/path/to/config.toml",
            "--log-level",
            "debug",
        ]);
        assert!(matches!(cli.command, Commands::Config));
        assert_eq!(cli.config.as_deref(), Some("/path/to/config.toml"));
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_cli_run_requires_model() {
        let result = Cli::try_parse_from(["feedback-report", "run", "--input", "in.txt"]);
        assert!(result.is_err());
    }
}
