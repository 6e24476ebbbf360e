//! Side-effects command handler

use std::path::Path;

use anyhow::Result;
use colored::*;
use serde::Serialize;

use super::{colored_verdict, emit, load_tree, NodeSummary};
use crate::analysis::WalkMode;
use crate::cli::args::OutputFormat;
use crate::config::SemaConfig;
use crate::core::ThreeState;
use crate::session::AnalysisSession;
use crate::syntax::NodeId;

#[derive(Debug, Serialize)]
pub struct StatementReport {
    pub statement: NodeSummary,
    pub verdict: ThreeState,
    /// Expressions whose evaluation carries the effects
    pub effects: Vec<NodeSummary>,
}

#[derive(Debug, Serialize)]
pub struct SideEffectsReport {
    pub path: String,
    pub statements: Vec<StatementReport>,
}

pub fn handle_side_effects_command(
    path: &Path,
    line: Option<usize>,
    non_local: bool,
    config: &SemaConfig,
    format: OutputFormat,
) -> Result<()> {
    let tree = load_tree(path)?;
    let session = AnalysisSession::new(&tree, config);
    let classifier = session.side_effects();

    let mut statements = Vec::new();
    for statement in session.body_statements() {
        if line.is_some_and(|l| tree.line_of(statement) != l) {
            continue;
        }
        let local_only = |n: NodeId| non_local && classifier.is_local_effect(n);
        let verdict = classifier
            .classify(statement, WalkMode::Collect, &local_only)?
            .verdict;
        let effects = classifier
            .extract_side_effecting_subexpressions(statement)?
            .into_iter()
            .map(|e| NodeSummary::of(&tree, e))
            .collect();
        statements.push(StatementReport {
            statement: NodeSummary::of(&tree, statement),
            verdict,
            effects,
        });
    }
    log::debug!("Classified {} statements", statements.len());

    let report = SideEffectsReport {
        path: path.display().to_string(),
        statements,
    };
    emit(format, &report, print_side_effects)
}

fn print_side_effects(report: &SideEffectsReport) {
    println!("{}", report.path.bold());
    for statement in &report.statements {
        println!(
            "  {:>4}  {}  {}",
            statement.statement.line,
            colored_verdict(statement.verdict),
            statement.statement.text
        );
        for effect in &statement.effects {
            println!("              {} {}", "↳".dimmed(), effect.text.dimmed());
        }
    }
}
