//! Expression-semantics analysis for Java syntax trees
//!
//! javasema answers the questions code inspections ask about Java
//! expressions and statements:
//! - what is the negation of this condition, written naturally
//! - may evaluating this subtree have an observable side effect
//! - is this `for` loop a plain counting loop
//! - how must the breaks of a switch change before it is unwrapped
//!
//! Sources are parsed with tree-sitter into a closed [`syntax::Syntax`]
//! model; name resolution and purity knowledge come from a
//! [`semantics::SemanticModel`].

// Export modules for library usage
pub mod analysis;
pub mod cli;
pub mod config;
pub mod core;
pub mod errors;
pub mod semantics;
pub mod session;
pub mod syntax;

// Re-export commonly used types
pub use crate::analysis::{
    BreakConverter, CountingLoop, Direction, NegationEngine, SideEffectClassifier,
    SideEffectVerdict, WalkMode,
};
pub use crate::config::SemaConfig;
pub use crate::core::{JavaType, PrimitiveType, ThreeState};
pub use crate::errors::{Result, SemaError};
pub use crate::semantics::{LocalSemantics, SemanticModel};
pub use crate::session::AnalysisSession;
pub use crate::syntax::{parse_java, NodeId, Syntax, SyntaxTree};
