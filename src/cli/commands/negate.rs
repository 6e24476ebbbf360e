//! Negate command handler

use std::path::Path;

use anyhow::{bail, Result};
use colored::*;
use serde::Serialize;

use super::{emit, load_tree, snippet, NodeSummary};
use crate::analysis::negation::context_precedence;
use crate::cli::args::OutputFormat;
use crate::config::SemaConfig;
use crate::session::AnalysisSession;

#[derive(Debug, Serialize)]
pub struct NegatedCondition {
    pub condition: NodeSummary,
    pub negated: String,
}

#[derive(Debug, Serialize)]
pub struct NegateReport {
    pub path: String,
    pub conditions: Vec<NegatedCondition>,
}

pub fn handle_negate_command(
    path: &Path,
    line: Option<usize>,
    apply: bool,
    config: &SemaConfig,
    format: OutputFormat,
) -> Result<()> {
    let tree = load_tree(path)?;
    let session = AnalysisSession::new(&tree, config);
    let engine = session.negation();
    let conditions: Vec<_> = session
        .conditions()
        .into_iter()
        .filter(|&c| line.map_or(true, |l| tree.line_of(c) == l))
        .collect();

    if apply {
        let Some(&target) = conditions.first() else {
            bail!(
                "No condition starts on line {} of {}",
                line.unwrap_or_default(),
                path.display()
            );
        };
        print!("{}", engine.replace_with_negation(target)?);
        return Ok(());
    }

    let conditions = conditions
        .into_iter()
        .map(|c| NegatedCondition {
            condition: NodeSummary::of(&tree, c),
            negated: snippet(&engine.negate(c, context_precedence(&tree, c))),
        })
        .collect();
    let report = NegateReport {
        path: path.display().to_string(),
        conditions,
    };
    emit(format, &report, print_negations)
}

fn print_negations(report: &NegateReport) {
    println!("{}", report.path.bold());
    for negation in &report.conditions {
        println!(
            "  {:>4}  {} {} {}",
            negation.condition.line,
            negation.condition.text,
            "=>".dimmed(),
            negation.negated.cyan()
        );
    }
}
