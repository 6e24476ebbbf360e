//! Setup and initialization functions for the CLI
//!
//! Logging goes through `tracing-subscriber`; `log` records from the library
//! reach it through the subscriber's `log` bridge.

use std::path::Path;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use crate::config::{load_config, load_config_from, SemaConfig};

/// Filter directive for a `-v` count; `RUST_LOG` wins when set
pub fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "javasema=debug",
        2 => "javasema=trace",
        _ => "trace",
    }
}

/// Install the global subscriber once at startup
pub fn init_logging(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));
    let result = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbosity > 1)
        .try_init();
    if let Err(e) = result {
        // Already configured, e.g. by a test harness
        eprintln!("Note: logging already configured: {}", e);
    }
}

/// Explicit `--config` files must load; otherwise discover from the
/// current directory and fall back to defaults
pub fn load_configuration(explicit: Option<&Path>) -> Result<SemaConfig> {
    match explicit {
        Some(path) => load_config_from(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display())),
        None => Ok(load_config()),
    }
}
