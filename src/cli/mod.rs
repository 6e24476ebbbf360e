//! CLI module for javasema
//!
//! This module provides the command-line interface, including:
//! - Argument parsing (`args`)
//! - Command handlers (`commands`)
//! - Logging and configuration setup (`setup`)

pub mod args;
pub mod commands;
pub mod setup;

pub use args::{Cli, Commands, OutputFormat};
pub use commands::run;
pub use setup::{init_logging, load_configuration};

/// Parse CLI arguments using Clap
pub fn parse_args() -> Cli {
    args::parse_args()
}
