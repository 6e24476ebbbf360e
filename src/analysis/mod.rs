//! Expression-semantics analyses
//!
//! This module provides the analyses offered to inspections:
//! - Logical negation of boolean expressions (`negation`)
//! - Side-effect classification of expressions and statements (`side_effects`)
//! - Counting-loop recognition (`counting_loop`)
//! - Break rewriting for switch unwrapping (`break_converter`)
//! - Control-flow and switch shape helpers they share

pub mod break_converter;
pub mod control_flow;
pub mod counting_loop;
pub mod exceptional;
pub mod negation;
pub mod side_effects;
pub mod switch_shape;

pub use break_converter::BreakConverter;
pub use control_flow::{is_in_loop, statement_may_complete_normally, variable_is_assigned};
pub use counting_loop::{CountingLoop, Direction};
pub use exceptional::{ExceptionalEffectHeuristic, NamePrefixHeuristic};
pub use negation::NegationEngine;
pub use side_effects::{SideEffectClassifier, SideEffectVerdict, WalkMode};
pub use switch_shape::{branch_count, is_rule_format, BranchCount};
