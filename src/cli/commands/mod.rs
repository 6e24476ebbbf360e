//! Command handlers
//!
//! Each handler parses one Java file, runs one analysis over it, and prints
//! either a colored text report or the same report as JSON.

pub mod loops;
pub mod negate;
pub mod side_effects;
pub mod switches;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use colored::*;
use serde::Serialize;

use crate::cli::args::{Commands, OutputFormat};
use crate::config::SemaConfig;
use crate::core::ThreeState;
use crate::syntax::{parse_java, NodeId, SyntaxTree};

/// Dispatch a parsed subcommand
pub fn run(command: Commands, config: &SemaConfig, format: OutputFormat) -> Result<()> {
    match command {
        Commands::SideEffects {
            path,
            line,
            non_local,
        } => side_effects::handle_side_effects_command(&path, line, non_local, config, format),
        Commands::Negate { path, line, apply } => {
            negate::handle_negate_command(&path, line, apply, config, format)
        }
        Commands::Loops { path } => loops::handle_loops_command(&path, config, format),
        Commands::Switches { path } => switches::handle_switches_command(&path, config, format),
        Commands::UnwrapBreaks { path, line } => {
            switches::handle_unwrap_breaks_command(&path, line, config)
        }
    }
}

/// Read and parse a Java file
pub(crate) fn load_tree(path: &Path) -> Result<SyntaxTree> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse_java(&source).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Location and one-line text of a node, as reported
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeSummary {
    pub line: usize,
    pub text: String,
}

impl NodeSummary {
    pub fn of(tree: &SyntaxTree, node: NodeId) -> Self {
        Self {
            line: tree.line_of(node),
            text: snippet(tree.text(node)),
        }
    }
}

/// Source text collapsed to one line and shortened
pub fn snippet(text: &str) -> String {
    const MAX_CHARS: usize = 72;
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() > MAX_CHARS {
        let short: String = collapsed.chars().take(MAX_CHARS - 3).collect();
        format!("{}...", short)
    } else {
        collapsed
    }
}

/// Verdict padded to a fixed width, then colored
pub(crate) fn colored_verdict(verdict: ThreeState) -> ColoredString {
    let text = format!("{:<6}", verdict.as_str());
    match verdict {
        ThreeState::No => text.as_str().green(),
        ThreeState::Unsure => text.as_str().yellow(),
        ThreeState::Yes => text.as_str().red().bold(),
    }
}

/// Print `report` as pretty JSON, or through `print_text`
pub(crate) fn emit<T: Serialize>(
    format: OutputFormat,
    report: &T,
    print_text: impl FnOnce(&T),
) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(report)?);
        }
        OutputFormat::Text => print_text(report),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snippet_collapses_whitespace() {
        assert_eq!(snippet("if (a)\n    {\n  b(); }"), "if (a) { b(); }");
    }

    #[test]
    fn test_snippet_truncates() {
        let long = "x".repeat(100);
        let short = snippet(&long);
        assert_eq!(short.chars().count(), 72);
        assert!(short.ends_with("..."));
    }

    #[test]
    fn test_load_tree_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Broken.java");
        fs::write(&path, "class {").unwrap();
        let err = load_tree(&path).unwrap_err();
        assert!(err.to_string().contains("Broken.java"));
    }
}
