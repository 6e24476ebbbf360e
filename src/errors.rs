//! Error types for javasema.
//!
//! Expected "cannot analyze" outcomes are not errors: recognizers return
//! `None` and the side-effect classifier returns `ThreeState::Unsure`. The
//! variants here cover the remaining failures: unreadable input, unparsable
//! source, bad configuration, and callers violating an entry point's contract.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for javasema operations
#[derive(Debug, Error)]
pub enum SemaError {
    /// Source text that tree-sitter could not parse cleanly
    #[error("Parse error{}: {message}", .line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    Parse { message: String, line: Option<usize> },

    /// An analysis entry point received a node kind it has no semantics for
    #[error("Unsupported root: expected {expected}, found {found}")]
    UnsupportedRoot {
        expected: &'static str,
        found: &'static str,
    },

    /// Two text edits touch the same source range
    #[error("Overlapping edits at byte {offset}")]
    OverlappingEdits { offset: usize },

    /// Configuration errors
    #[error("Configuration error{}: {message}", .path.as_ref().map(|p| format!(" in {}", p.display())).unwrap_or_default())]
    Config {
        message: String,
        path: Option<PathBuf>,
    },

    /// The tree-sitter grammar could not be loaded
    #[error("Language error: {0}")]
    Language(String),

    /// IO errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// TOML errors
    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}

impl SemaError {
    /// Create a parse error with an optional 1-based line
    pub fn parse(message: impl Into<String>, line: Option<usize>) -> Self {
        Self::Parse {
            message: message.into(),
            line,
        }
    }

    /// Create a contract violation for a walk started on the wrong node kind
    pub fn unsupported_root(expected: &'static str, found: &'static str) -> Self {
        Self::UnsupportedRoot { expected, found }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            path: None,
        }
    }

    /// Create a configuration error with path context
    pub fn config_with_path(message: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::Config {
            message: message.into(),
            path: Some(path.into()),
        }
    }

    /// Whether the error is caused by the caller rather than the input
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, Self::UnsupportedRoot { .. } | Self::OverlappingEdits { .. })
    }
}

/// Result type alias for javasema operations
pub type Result<T> = std::result::Result<T, SemaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display_includes_line() {
        let err = SemaError::parse("unexpected token", Some(3));
        assert_eq!(err.to_string(), "Parse error at line 3: unexpected token");

        let err = SemaError::parse("empty tree", None);
        assert_eq!(err.to_string(), "Parse error: empty tree");
    }

    #[test]
    fn test_contract_violation_classification() {
        assert!(SemaError::unsupported_root("expression", "block").is_contract_violation());
        assert!(SemaError::OverlappingEdits { offset: 4 }.is_contract_violation());
        assert!(!SemaError::config("bad limit").is_contract_violation());
    }

    #[test]
    fn test_config_error_with_path() {
        let err = SemaError::config_with_path("invalid", "/tmp/.javasema.toml");
        assert_eq!(
            err.to_string(),
            "Configuration error in /tmp/.javasema.toml: invalid"
        );
        match err {
            SemaError::Config { path, .. } => {
                assert_eq!(path, Some(PathBuf::from("/tmp/.javasema.toml")));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
