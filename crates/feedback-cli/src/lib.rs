//! Feedback report CLI library exports.
//!
//! - `cli`: command-line argument parsing with clap
//! - `commands`: command implementations (run, config)

pub mod cli;
pub mod commands;

pub use cli::{Cli, Commands};
pub use commands::{
    load_csv_column, load_feedback, load_seeds, run_report, show_config, InputFormat, RunOptions,
    DEFAULT_COLUMN,
};
