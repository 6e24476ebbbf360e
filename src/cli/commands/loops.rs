//! Loops command handler

use std::path::Path;

use anyhow::Result;
use colored::*;
use serde::Serialize;

use super::{emit, load_tree, NodeSummary};
use crate::analysis::{CountingLoop, Direction};
use crate::cli::args::OutputFormat;
use crate::config::SemaConfig;
use crate::session::AnalysisSession;
use crate::syntax::SyntaxTree;

#[derive(Debug, Serialize)]
pub struct CountingLoopSummary {
    pub counter: String,
    pub counter_type: String,
    pub initializer: String,
    pub bound: String,
    pub inclusive: bool,
    pub direction: Direction,
    pub may_overflow: bool,
}

impl CountingLoopSummary {
    fn of(tree: &SyntaxTree, counting: &CountingLoop) -> Self {
        Self {
            counter: counting.counter_name().to_string(),
            counter_type: counting.counter_type().keyword().to_string(),
            initializer: tree.text(counting.initializer()).to_string(),
            bound: tree.text(counting.bound()).to_string(),
            inclusive: counting.is_inclusive(),
            direction: counting.direction(),
            may_overflow: counting.may_overflow(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoopReport {
    #[serde(rename = "loop")]
    pub loop_node: NodeSummary,
    /// `None` when the loop is not a counting loop
    pub counting: Option<CountingLoopSummary>,
}

#[derive(Debug, Serialize)]
pub struct LoopsReport {
    pub path: String,
    pub loops: Vec<LoopReport>,
}

pub fn handle_loops_command(path: &Path, config: &SemaConfig, format: OutputFormat) -> Result<()> {
    let tree = load_tree(path)?;
    let session = AnalysisSession::new(&tree, config);
    let loops = session
        .for_loops()
        .into_iter()
        .map(|l| LoopReport {
            loop_node: NodeSummary::of(&tree, l),
            counting: session
                .counting_loop(l)
                .map(|c| CountingLoopSummary::of(&tree, &c)),
        })
        .collect();
    let report = LoopsReport {
        path: path.display().to_string(),
        loops,
    };
    emit(format, &report, print_loops)
}

fn print_loops(report: &LoopsReport) {
    println!("{}", report.path.bold());
    for entry in &report.loops {
        match &entry.counting {
            Some(c) => {
                let arrow = match c.direction {
                    Direction::Ascending => "up",
                    Direction::Descending => "down",
                };
                let end = if c.inclusive { "]" } else { ")" };
                let mut line = format!(
                    "{} {} from {} {} to {}{}",
                    c.counter_type, c.counter, c.initializer, arrow, c.bound, end
                );
                if c.may_overflow {
                    line.push_str(&format!(" {}", "(may overflow)".yellow()));
                }
                println!("  {:>4}  {}  {}", entry.loop_node.line, "counting".green(), line);
            }
            None => println!(
                "  {:>4}  {}  {}",
                entry.loop_node.line,
                "other   ".dimmed(),
                entry.loop_node.text
            ),
        }
    }
}
