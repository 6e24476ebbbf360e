use std::fs;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use super::SemaConfig;
use crate::errors::{Result, SemaError};

pub const CONFIG_FILE_NAME: &str = ".javasema.toml";

const MAX_TRAVERSAL_DEPTH: usize = 10;

fn read_config_file(path: &Path) -> std::result::Result<String, std::io::Error> {
    let file = fs::File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut contents = String::new();
    reader.read_to_string(&mut contents)?;
    Ok(contents)
}

/// Parse a TOML document and validate the result
pub fn parse_and_validate_config(contents: &str) -> Result<SemaConfig> {
    let config = toml::from_str::<SemaConfig>(contents)?;
    config.validate()?;
    Ok(config)
}

/// Load an explicitly requested config file; every failure is an error
pub fn load_config_from(path: &Path) -> Result<SemaConfig> {
    let contents = read_config_file(path).map_err(|e| {
        SemaError::config_with_path(format!("cannot read file: {}", e), path)
    })?;
    let config = parse_and_validate_config(&contents).map_err(|e| match e {
        SemaError::Config { message, .. } => SemaError::config_with_path(message, path),
        other => SemaError::config_with_path(other.to_string(), path),
    })?;
    log::debug!("Loaded config from {}", path.display());
    Ok(config)
}

/// Try one candidate during discovery; problems are logged, not fatal
fn try_load_config_from_path(config_path: &Path) -> Option<SemaConfig> {
    let contents = match read_config_file(config_path) {
        Ok(contents) => contents,
        Err(e) => {
            if e.kind() != std::io::ErrorKind::NotFound {
                log::warn!(
                    "Failed to read config file {}: {}",
                    config_path.display(),
                    e
                );
            }
            return None;
        }
    };

    match parse_and_validate_config(&contents) {
        Ok(config) => {
            log::debug!("Loaded config from {}", config_path.display());
            Some(config)
        }
        Err(e) => {
            log::warn!(
                "Ignoring {}: {}. Using defaults.",
                config_path.display(),
                e
            );
            None
        }
    }
}

/// `start` and its parents, nearest first, at most `max_depth` of them
pub fn directory_ancestors(start: PathBuf, max_depth: usize) -> impl Iterator<Item = PathBuf> {
    std::iter::successors(Some(start), |dir| {
        let mut parent = dir.clone();
        if parent.pop() {
            Some(parent)
        } else {
            None
        }
    })
    .take(max_depth)
}

/// Search `start` and its ancestors for `.javasema.toml`
pub fn discover_config(start: PathBuf) -> SemaConfig {
    directory_ancestors(start, MAX_TRAVERSAL_DEPTH)
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find_map(|path| try_load_config_from_path(&path))
        .unwrap_or_else(|| {
            log::debug!(
                "No config found after checking {} directories. Using default config.",
                MAX_TRAVERSAL_DEPTH
            );
            SemaConfig::default()
        })
}

/// Discover configuration starting at the current directory
pub fn load_config() -> SemaConfig {
    match std::env::current_dir() {
        Ok(dir) => discover_config(dir),
        Err(e) => {
            log::warn!(
                "Failed to get current directory: {}. Using default config.",
                e
            );
            SemaConfig::default()
        }
    }
}
