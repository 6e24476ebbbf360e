//! Side-effect classification of expression and statement subtrees
//!
//! The classifier walks a subtree once, asking each node whether evaluating
//! it has an effect observable outside the subtree, and folds the answers
//! into a [`SideEffectVerdict`]. The fold only ever moves up the order
//! `No < Unsure < Yes`.
//!
//! Walk rules:
//!
//! - A node that contributes `Yes` is not descended into; its effect
//!   already decides the subtree.
//! - A node that contributes `Unsure` is descended into, so a definite
//!   effect below it can still raise the verdict.
//! - Lambda bodies and class bodies are skipped. Declaring them does
//!   nothing until they run, and running them is a call analyzed at the
//!   call site.
//! - In [`WalkMode::Eager`] the walk stops at the first `Yes`.

use std::ops::ControlFlow;

use serde::Serialize;

use super::exceptional::ExceptionalEffectHeuristic;
use crate::config::SideEffectConfig;
use crate::core::ThreeState;
use crate::errors::{Result, SemaError};
use crate::semantics::{
    ClassRef, Declaration, MethodRef, Purity, SearchBudget, SemanticModel, VariableKind,
};
use crate::syntax::navigation::{
    enclosing_class, find_continued_statement, find_exited_statement, find_yield_target,
};
use crate::syntax::{NodeId, OperatorToken, PrefixOp, Syntax, SyntaxTree};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkMode {
    /// Stop at the first definite side effect
    Eager,
    /// Visit everything and record every contributing node
    Collect,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SideEffectVerdict {
    pub verdict: ThreeState,
    /// Nodes that contributed `Unsure` or `Yes`, in visiting order.
    /// Eager walks record at most the node that stopped them.
    pub contributors: Vec<NodeId>,
}

impl SideEffectVerdict {
    fn new() -> Self {
        Self {
            verdict: ThreeState::No,
            contributors: Vec::new(),
        }
    }

    fn record(&mut self, node: NodeId, verdict: ThreeState) {
        self.verdict = self.verdict.merge(verdict);
        self.contributors.push(node);
    }
}

pub struct SideEffectClassifier<'a> {
    model: &'a dyn SemanticModel,
    config: &'a SideEffectConfig,
    heuristic: &'a dyn ExceptionalEffectHeuristic,
}

impl<'a> SideEffectClassifier<'a> {
    pub fn new(
        model: &'a dyn SemanticModel,
        config: &'a SideEffectConfig,
        heuristic: &'a dyn ExceptionalEffectHeuristic,
    ) -> Self {
        Self {
            model,
            config,
            heuristic,
        }
    }

    fn tree(&self) -> &SyntaxTree {
        self.model.tree()
    }

    /// Classify the subtree at `root`. `ignore` suppresses the
    /// contribution of individual nodes; their children are still walked.
    pub fn classify(
        &self,
        root: NodeId,
        mode: WalkMode,
        ignore: &dyn Fn(NodeId) -> bool,
    ) -> Result<SideEffectVerdict> {
        let syntax = self.tree().syntax(root);
        if syntax.is_declaration() {
            return Err(SemaError::unsupported_root(
                "expression or statement",
                syntax.kind_name(),
            ));
        }
        let _span = tracing::debug_span!("classify_side_effects", root = root.0).entered();
        let mut acc = SideEffectVerdict::new();
        let _ = self.walk(root, root, mode, ignore, &mut acc);
        log::debug!(
            "Side effects of '{}': {} ({} contributors)",
            abbreviate(self.tree().text(root)),
            acc.verdict,
            acc.contributors.len()
        );
        Ok(acc)
    }

    fn walk(
        &self,
        root: NodeId,
        node: NodeId,
        mode: WalkMode,
        ignore: &dyn Fn(NodeId) -> bool,
        acc: &mut SideEffectVerdict,
    ) -> ControlFlow<()> {
        let verdict = if ignore(node) {
            None
        } else {
            self.contribution(root, node)
        };
        match verdict {
            Some(ThreeState::Yes) => {
                acc.record(node, ThreeState::Yes);
                return match mode {
                    WalkMode::Eager => ControlFlow::Break(()),
                    WalkMode::Collect => ControlFlow::Continue(()),
                };
            }
            Some(ThreeState::Unsure) => acc.record(node, ThreeState::Unsure),
            Some(ThreeState::No) | None => {}
        }
        let syntax = self.tree().syntax(node);
        let opaque = matches!(
            syntax,
            Syntax::Lambda { .. } | Syntax::Class { .. } | Syntax::AnonymousClass { .. }
        );
        if opaque && node != root {
            return ControlFlow::Continue(());
        }
        for child in syntax.children() {
            self.walk(root, child, mode, ignore, acc)?;
        }
        ControlFlow::Continue(())
    }

    /// Whether evaluating `node` may have any observable effect
    pub fn may_have_side_effects(&self, node: NodeId) -> Result<bool> {
        let verdict = self.classify(node, WalkMode::Eager, &|_| false)?;
        Ok(verdict.verdict.may_hold())
    }

    /// Like [`Self::may_have_side_effects`], treating writes to locals and
    /// parameters, local declarations, and `continue`/`return`/`throw` as
    /// local
    pub fn may_have_non_local_side_effects(&self, node: NodeId) -> Result<bool> {
        let ignore = |n: NodeId| self.is_local_effect(n);
        let verdict = self.classify(node, WalkMode::Eager, &ignore)?;
        Ok(verdict.verdict.may_hold())
    }

    /// Whether the node's own effect stays inside the enclosing function
    pub fn is_local_effect(&self, node: NodeId) -> bool {
        let tree = self.tree();
        let written = match tree.syntax(node) {
            Syntax::Declarator { .. } => return is_local_declarator(tree, node),
            Syntax::Continue { .. } | Syntax::Return { .. } | Syntax::Throw { .. } => return true,
            Syntax::Assignment { target, .. } => *target,
            Syntax::Prefix { op, operand } if op.is_update() => *operand,
            Syntax::Postfix { operand, .. } => *operand,
            _ => return false,
        };
        matches!(
            self.model.resolve(tree.skip_parens(written)),
            Some(Declaration::Variable(var))
                if matches!(var.kind, VariableKind::Local | VariableKind::Parameter)
        )
    }

    /// Top-most expressions whose evaluation may have an effect, in source
    /// order. Removing `expr` while keeping these keeps its behavior.
    pub fn extract_side_effecting_subexpressions(&self, expr: NodeId) -> Result<Vec<NodeId>> {
        let tree = self.tree();
        let verdict = self.classify(expr, WalkMode::Collect, &|_| false)?;
        let mut found: Vec<NodeId> = verdict
            .contributors
            .iter()
            .copied()
            .filter(|&n| tree.syntax(n).is_expression())
            .collect();
        found.sort_by_key(|&n| tree.span(n).start);
        let topmost: Vec<NodeId> = found
            .iter()
            .copied()
            .filter(|&n| !found.iter().any(|&other| other != n && tree.is_ancestor(other, n)))
            .collect();
        Ok(topmost)
    }

    /// Verdict of `node` alone, as seen from a walk rooted at `root`
    pub fn node_verdict(&self, root: NodeId, node: NodeId) -> ThreeState {
        self.contribution(root, node).unwrap_or(ThreeState::No)
    }

    /// `None` when the node kind has no effect of its own
    fn contribution(&self, root: NodeId, node: NodeId) -> Option<ThreeState> {
        let tree = self.tree();
        let escapes = |target: Option<NodeId>| match target {
            Some(target) => !tree.is_ancestor(root, target),
            None => true,
        };
        match tree.syntax(node) {
            Syntax::Assignment { .. } | Syntax::Postfix { .. } | Syntax::Throw { .. } => {
                Some(ThreeState::Yes)
            }
            Syntax::Prefix { op, .. } if op.is_update() => Some(ThreeState::Yes),
            Syntax::Declarator { .. } if is_local_declarator(tree, node) => Some(ThreeState::Yes),
            Syntax::Parameter { .. } => {
                let parent = tree.parent(node).map(|p| tree.syntax(p));
                matches!(parent, Some(Syntax::ForEach { .. } | Syntax::Catch { .. }))
                    .then_some(ThreeState::Yes)
            }
            Syntax::Return { .. } => (!is_function_body(tree, root)).then_some(ThreeState::Yes),
            Syntax::Break { .. } => {
                escapes(find_exited_statement(tree, node)).then_some(ThreeState::Yes)
            }
            Syntax::Continue { .. } => {
                escapes(find_continued_statement(tree, node)).then_some(ThreeState::Yes)
            }
            Syntax::Yield { .. } => {
                escapes(find_yield_target(tree, node)).then_some(ThreeState::Yes)
            }
            Syntax::InstanceOf { bindings, .. } if !bindings.is_empty() => {
                let owner = pattern_scope_owner(tree, node);
                (!tree.is_ancestor(root, owner)).then_some(ThreeState::Yes)
            }
            Syntax::MethodCall { .. } => Some(self.call_verdict(node)),
            Syntax::New { .. } => Some(self.construction_verdict(node)),
            Syntax::NewArray { .. } => Some(ThreeState::No),
            Syntax::ConstructorCall { .. } => Some(ThreeState::Unsure),
            _ => None,
        }
    }

    fn call_verdict(&self, call: NodeId) -> ThreeState {
        let Some(Declaration::Method(method)) = self.model.resolve(call) else {
            log::trace!("Unresolved call '{}'", abbreviate(self.tree().text(call)));
            return ThreeState::Unsure;
        };
        if let Some(field) = self.model.field_of_getter(&method) {
            if field.is_volatile {
                return ThreeState::Yes;
            }
            if self.model.is_overridable(&method) && self.may_be_overridden(&method) {
                return ThreeState::Unsure;
            }
            return ThreeState::No;
        }
        if self.model.field_of_setter(&method).is_some() {
            return ThreeState::Yes;
        }
        // a trivial accessor cannot throw whatever its name says
        if self
            .heuristic
            .may_have_exceptional_side_effect(self.model, &method)
        {
            return ThreeState::Unsure;
        }
        match self.model.purity_of(&method) {
            Purity::Pure => ThreeState::No,
            Purity::Mutates => ThreeState::Yes,
            Purity::Unknown => ThreeState::Unsure,
        }
    }

    /// Whether some subclass overrides `method`. Giving up on the search
    /// counts as "maybe".
    fn may_be_overridden(&self, method: &MethodRef) -> bool {
        let tree = self.tree();
        let class = ClassRef {
            qualified_name: method.class_name.clone(),
            node: method.node.and_then(|m| enclosing_class(tree, m)),
        };
        let budget = SearchBudget {
            limit: self.config.inheritor_search_limit,
        };
        let mut seen = 0;
        for inheritor in self.model.find_inheritors(&class, budget) {
            seen += 1;
            if seen > budget.limit {
                log::debug!(
                    "Stopped looking for overrides of {} after {} classes",
                    method.signature(),
                    budget.limit
                );
                return true;
            }
            if self
                .model
                .find_method_in_class(&inheritor, &method.name, method.arity)
                .is_some()
            {
                return true;
            }
        }
        false
    }

    fn construction_verdict(&self, new_expr: NodeId) -> ThreeState {
        let Syntax::New { ty, body, .. } = self.tree().syntax(new_expr) else {
            return ThreeState::Unsure;
        };
        let class = self.model.resolve_class(ty, new_expr);
        if let Some(body) = body {
            let anonymous = ClassRef {
                qualified_name: String::new(),
                node: Some(*body),
            };
            let runs_initializers = self.model.class_shape(&anonymous).map_or(true, |shape| {
                shape.has_instance_initializers || shape.has_instance_field_initializers
            });
            if runs_initializers {
                return ThreeState::Unsure;
            }
            if class.as_ref().is_some_and(|c| self.is_interface(c)) {
                return ThreeState::No;
            }
        }
        if let Some(constructor) = self.model.resolve_constructor(new_expr) {
            match self.model.purity_of(&constructor) {
                Purity::Pure => return ThreeState::No,
                Purity::Mutates => return ThreeState::Yes,
                Purity::Unknown => {}
            }
        }
        let Some(class) = class else {
            return ThreeState::Unsure;
        };
        if self.config.is_side_effect_free_class(&class.qualified_name)
            || is_core_throwable(&class)
        {
            return ThreeState::No;
        }
        let trivial = self.model.class_shape(&class).is_some_and(|shape| {
            !shape.is_interface()
                && !shape.has_explicit_constructor
                && shape.extends_object
                && !shape.has_instance_initializers
                && !shape.has_instance_field_initializers
        });
        if trivial {
            ThreeState::No
        } else {
            ThreeState::Unsure
        }
    }

    fn is_interface(&self, class: &ClassRef) -> bool {
        match self.model.class_shape(class) {
            Some(shape) => shape.is_interface(),
            None => self.config.is_known_interface(&class.qualified_name),
        }
    }
}

fn is_local_declarator(tree: &SyntaxTree, declarator: NodeId) -> bool {
    tree.parent(declarator)
        .is_some_and(|p| matches!(tree.syntax(p), Syntax::LocalVariable { .. }))
}

/// Whether `root` is the whole body of a method or lambda
fn is_function_body(tree: &SyntaxTree, root: NodeId) -> bool {
    match tree.parent(root).map(|p| tree.syntax(p)) {
        Some(Syntax::Method { body: Some(body), .. }) => *body == root,
        Some(Syntax::Lambda { body, .. }) => *body == root,
        _ => false,
    }
}

/// Node whose subtree contains every use of the instanceof's pattern
/// variables. Conditions of statements may introduce the variables into
/// the statements that follow, so the enclosing block owns them.
fn pattern_scope_owner(tree: &SyntaxTree, instance_of: NodeId) -> NodeId {
    let mut current = instance_of;
    while let Some(parent) = tree.parent(current) {
        match tree.syntax(parent) {
            Syntax::Parenthesized { .. }
            | Syntax::Prefix {
                op: PrefixOp::Not, ..
            }
            | Syntax::Polyadic {
                op: OperatorToken::AndAnd | OperatorToken::OrOr,
                ..
            } => current = parent,
            Syntax::If { condition, .. }
            | Syntax::While { condition, .. }
            | Syntax::DoWhile { condition, .. }
                if *condition == current =>
            {
                return tree.parent(parent).unwrap_or(parent);
            }
            Syntax::For {
                condition: Some(condition),
                ..
            } if *condition == current => return tree.parent(parent).unwrap_or(parent),
            Syntax::Conditional { condition, .. } if *condition == current => return parent,
            _ => return current,
        }
    }
    current
}

/// Exceptions and errors of `java.lang` and `java.io`
fn is_core_throwable(class: &ClassRef) -> bool {
    let in_core_package = matches!(class.package(), Some("java.lang" | "java.io"));
    let name = class.simple_name();
    in_core_package
        && (name.ends_with("Exception") || name.ends_with("Error") || name == "Throwable")
}

fn abbreviate(text: &str) -> String {
    const MAX: usize = 60;
    let line = text.lines().next().unwrap_or("");
    if line.len() < text.len() || line.chars().count() > MAX {
        let short: String = line.chars().take(MAX).collect();
        format!("{}...", short)
    } else {
        line.to_string()
    }
}
