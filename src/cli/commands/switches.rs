//! Switches and unwrap-breaks command handlers

use std::path::Path;

use anyhow::{anyhow, Result};
use colored::*;
use serde::Serialize;

use super::{emit, load_tree, NodeSummary};
use crate::analysis::{branch_count, is_rule_format, BranchCount};
use crate::cli::args::OutputFormat;
use crate::config::SemaConfig;
use crate::session::AnalysisSession;
use crate::syntax::Syntax;

#[derive(Debug, Serialize)]
pub struct BreakPlan {
    pub removed: Vec<NodeSummary>,
    pub replaced: Vec<(NodeSummary, String)>,
}

#[derive(Debug, Serialize)]
pub struct SwitchReport {
    pub switch: NodeSummary,
    pub is_expression: bool,
    pub rule_format: bool,
    pub branches: BranchCount,
    /// `None` when the breaks cannot be converted
    pub breaks: Option<BreakPlan>,
}

#[derive(Debug, Serialize)]
pub struct SwitchesReport {
    pub path: String,
    pub switches: Vec<SwitchReport>,
}

pub fn handle_switches_command(
    path: &Path,
    config: &SemaConfig,
    format: OutputFormat,
) -> Result<()> {
    let tree = load_tree(path)?;
    let session = AnalysisSession::new(&tree, config);
    let mut switches = Vec::new();
    for switch in session.switches() {
        let is_expression = matches!(
            tree.syntax(switch),
            Syntax::Switch {
                is_expression: true,
                ..
            }
        );
        let breaks = session.break_converter(switch).map(|converter| BreakPlan {
            removed: converter
                .removals()
                .iter()
                .map(|&b| NodeSummary::of(&tree, b))
                .collect(),
            replaced: converter
                .replacements()
                .iter()
                .map(|(b, text)| (NodeSummary::of(&tree, *b), text.clone()))
                .collect(),
        });
        switches.push(SwitchReport {
            switch: NodeSummary::of(&tree, switch),
            is_expression,
            rule_format: is_rule_format(&tree, switch),
            branches: branch_count(&tree, switch).unwrap_or_default(),
            breaks,
        });
    }
    let report = SwitchesReport {
        path: path.display().to_string(),
        switches,
    };
    emit(format, &report, print_switches)
}

fn print_switches(report: &SwitchesReport) {
    println!("{}", report.path.bold());
    for entry in &report.switches {
        let kind = if entry.is_expression {
            "expression"
        } else {
            "statement"
        };
        let style = if entry.rule_format { "rules" } else { "groups" };
        println!(
            "  {:>4}  {} {} with {} cases{}",
            entry.switch.line,
            kind,
            style,
            entry.branches.cases,
            if entry.branches.has_default {
                " and default"
            } else {
                ""
            }
        );
        match &entry.breaks {
            Some(plan) => {
                for removed in &plan.removed {
                    println!("        {} line {}", "remove".green(), removed.line);
                }
                for (replaced, text) in &plan.replaced {
                    println!(
                        "        {} line {} with {}",
                        "replace".yellow(),
                        replaced.line,
                        text
                    );
                }
            }
            None => println!("        {}", "breaks cannot be converted".red()),
        }
    }
}

pub fn handle_unwrap_breaks_command(path: &Path, line: usize, config: &SemaConfig) -> Result<()> {
    let tree = load_tree(path)?;
    let session = AnalysisSession::new(&tree, config);
    let switch = session
        .switches()
        .into_iter()
        .find(|&s| tree.line_of(s) == line)
        .ok_or_else(|| anyhow!("No switch starts on line {} of {}", line, path.display()))?;
    let converter = session
        .break_converter(switch)
        .ok_or_else(|| anyhow!("The breaks of the switch on line {} cannot be converted", line))?;
    print!("{}", converter.process()?);
    Ok(())
}
