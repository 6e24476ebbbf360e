//! Statement-level control-flow queries

use crate::semantics::{Declaration, SemanticModel};
use crate::syntax::navigation::{find_exited_statement, outermost_labeled};
use crate::syntax::{LiteralKind, NodeId, Syntax, SyntaxTree};

/// Whether execution can fall off the end of `statement`. Conservative in
/// the "may" direction: `true` unless completion is provably impossible.
pub fn statement_may_complete_normally(tree: &SyntaxTree, statement: NodeId) -> bool {
    match tree.syntax(statement) {
        Syntax::Break { .. }
        | Syntax::Continue { .. }
        | Syntax::Return { .. }
        | Syntax::Throw { .. }
        | Syntax::Yield { .. } => false,
        Syntax::Block { statements } => statements
            .iter()
            .all(|&s| statement_may_complete_normally(tree, s)),
        Syntax::If {
            then_branch,
            else_branch,
            ..
        } => match else_branch {
            Some(else_branch) => {
                statement_may_complete_normally(tree, *then_branch)
                    || statement_may_complete_normally(tree, *else_branch)
            }
            None => true,
        },
        Syntax::While { condition, .. } | Syntax::DoWhile { condition, .. } => {
            !is_true_literal(tree, *condition) || has_break_targeting(tree, statement)
        }
        Syntax::For { condition, .. } => {
            let endless = condition.map_or(true, |c| is_true_literal(tree, c));
            !endless || has_break_targeting(tree, statement)
        }
        Syntax::Labeled { body, .. } => {
            statement_may_complete_normally(tree, *body) || has_break_targeting(tree, statement)
        }
        Syntax::Synchronized { body, .. } => statement_may_complete_normally(tree, *body),
        Syntax::Try {
            body,
            catches,
            finally,
            ..
        } => {
            let finally_completes =
                finally.map_or(true, |f| statement_may_complete_normally(tree, f));
            let body_completes = statement_may_complete_normally(tree, *body)
                || catches.iter().any(|&c| match tree.syntax(c) {
                    Syntax::Catch { body, .. } => statement_may_complete_normally(tree, *body),
                    _ => true,
                });
            finally_completes && body_completes
        }
        Syntax::Switch {
            arms,
            is_expression: false,
            ..
        } => switch_may_complete_normally(tree, statement, arms),
        _ => true,
    }
}

fn switch_may_complete_normally(tree: &SyntaxTree, switch: NodeId, arms: &[NodeId]) -> bool {
    let has_default = arms.iter().any(|&arm| {
        let labels = match tree.syntax(arm) {
            Syntax::SwitchGroup { labels, .. } | Syntax::SwitchRule { labels, .. } => labels,
            _ => return false,
        };
        labels
            .iter()
            .any(|&l| matches!(tree.syntax(l), Syntax::SwitchLabel { is_default: true, .. }))
    });
    if !has_default || has_break_targeting(tree, switch) {
        return true;
    }
    let any_rule_completes = arms.iter().any(|&arm| match tree.syntax(arm) {
        Syntax::SwitchRule { body, .. } => statement_may_complete_normally(tree, *body),
        _ => false,
    });
    let last_group_completes = match arms.last().map(|&a| tree.syntax(a)) {
        Some(Syntax::SwitchGroup { statements, .. }) => statements
            .iter()
            .all(|&s| statement_may_complete_normally(tree, s)),
        _ => false,
    };
    any_rule_completes || last_group_completes
}

fn is_true_literal(tree: &SyntaxTree, expr: NodeId) -> bool {
    matches!(
        tree.syntax(tree.skip_parens(expr)),
        Syntax::Literal {
            kind: LiteralKind::Boolean(true)
        }
    )
}

/// Whether some `break` inside `statement` exits it
fn has_break_targeting(tree: &SyntaxTree, statement: NodeId) -> bool {
    let labeled = outermost_labeled(tree, statement);
    tree.descendants(statement).into_iter().any(|node| {
        matches!(tree.syntax(node), Syntax::Break { .. })
            && find_exited_statement(tree, node).is_some_and(|target| {
                target == statement || (tree.is_ancestor(labeled, target) && tree.is_ancestor(target, statement))
            })
    })
}

/// Whether `variable` (a declarator or parameter) is written anywhere
/// inside `scope`: plain or compound assignment, increment or decrement
pub fn variable_is_assigned(model: &dyn SemanticModel, variable: NodeId, scope: NodeId) -> bool {
    let tree = model.tree();
    tree.descendants(scope).into_iter().any(|node| {
        let target = match tree.syntax(node) {
            Syntax::Assignment { target, .. } => *target,
            Syntax::Prefix { op, operand } if op.is_update() => *operand,
            Syntax::Postfix { operand, .. } => *operand,
            _ => return false,
        };
        refers_to(model, tree.skip_parens(target), variable)
    })
}

/// Whether `expr` is a plain use of `variable`
pub fn refers_to(model: &dyn SemanticModel, expr: NodeId, variable: NodeId) -> bool {
    match model.tree().syntax(expr) {
        Syntax::Name { .. } | Syntax::FieldAccess { .. } => matches!(
            model.resolve(expr),
            Some(Declaration::Variable(var)) if var.declaration == variable
        ),
        _ => false,
    }
}

/// Whether `node` executes as part of a loop body or condition in its
/// own function
pub fn is_in_loop(tree: &SyntaxTree, node: NodeId) -> bool {
    let mut child = node;
    for ancestor in tree.ancestors(node) {
        match tree.syntax(ancestor) {
            Syntax::Method { .. }
            | Syntax::Lambda { .. }
            | Syntax::Class { .. }
            | Syntax::AnonymousClass { .. }
            | Syntax::Initializer { .. } => return false,
            Syntax::For { init, .. } if init.contains(&child) => {}
            Syntax::ForEach { iterable, .. } if *iterable == child => {}
            s if s.is_loop() => return true,
            _ => {}
        }
        child = ancestor;
    }
    false
}
