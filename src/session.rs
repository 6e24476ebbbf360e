//! One parsed compilation unit with everything the analyses need

use crate::analysis::{
    BreakConverter, CountingLoop, NamePrefixHeuristic, NegationEngine, SideEffectClassifier,
};
use crate::config::SemaConfig;
use crate::semantics::LocalSemantics;
use crate::syntax::{NodeId, Syntax, SyntaxTree};

/// Bundles a tree, its configuration and the semantic model over both,
/// and hands out the analyses wired to them
pub struct AnalysisSession<'a> {
    tree: &'a SyntaxTree,
    config: &'a SemaConfig,
    model: LocalSemantics<'a>,
    heuristic: NamePrefixHeuristic,
}

impl<'a> AnalysisSession<'a> {
    pub fn new(tree: &'a SyntaxTree, config: &'a SemaConfig) -> Self {
        Self {
            tree,
            config,
            model: LocalSemantics::new(tree, config),
            heuristic: NamePrefixHeuristic::from_config(&config.side_effects),
        }
    }

    pub fn tree(&self) -> &'a SyntaxTree {
        self.tree
    }

    pub fn config(&self) -> &'a SemaConfig {
        self.config
    }

    pub fn model(&self) -> &LocalSemantics<'a> {
        &self.model
    }

    pub fn negation(&self) -> NegationEngine<'_> {
        NegationEngine::new(&self.model, &self.config.negation)
    }

    pub fn side_effects(&self) -> SideEffectClassifier<'_> {
        SideEffectClassifier::new(&self.model, &self.config.side_effects, &self.heuristic)
    }

    pub fn counting_loop(&self, loop_node: NodeId) -> Option<CountingLoop> {
        CountingLoop::recognize(&self.model, loop_node)
    }

    pub fn break_converter(&self, switch: NodeId) -> Option<BreakConverter<'a>> {
        BreakConverter::from(self.tree, switch)
    }

    /// Basic `for` loops, in source order
    pub fn for_loops(&self) -> Vec<NodeId> {
        self.tree
            .find_all(|t, id| matches!(t.syntax(id), Syntax::For { .. }))
    }

    /// Switch statements and expressions, in source order
    pub fn switches(&self) -> Vec<NodeId> {
        self.tree
            .find_all(|t, id| matches!(t.syntax(id), Syntax::Switch { .. }))
    }

    /// Top-level statements of every method, constructor and initializer
    /// body, in source order
    pub fn body_statements(&self) -> Vec<NodeId> {
        let tree = self.tree;
        tree.find_all(|t, id| {
            let Some(parent) = t.parent(id) else {
                return false;
            };
            matches!(t.syntax(parent), Syntax::Block { .. })
                && t.parent(parent).is_some_and(|owner| {
                    matches!(
                        t.syntax(owner),
                        Syntax::Method { .. } | Syntax::Initializer { .. }
                    )
                })
        })
    }

    /// Conditions of `if`, `while`, `do` and `for` statements
    pub fn conditions(&self) -> Vec<NodeId> {
        let mut found = Vec::new();
        for id in self.tree.descendants(self.tree.root()) {
            match self.tree.syntax(id) {
                Syntax::If { condition, .. }
                | Syntax::While { condition, .. }
                | Syntax::DoWhile { condition, .. }
                | Syntax::For {
                    condition: Some(condition),
                    ..
                } => found.push(*condition),
                _ => {}
            }
        }
        found
    }
}
