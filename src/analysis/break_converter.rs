//! Rewriting the `break`s of a switch statement before it is unwrapped
//!
//! Turning a switch statement into an `if` chain leaves its `break`s
//! pointing at whatever encloses the switch. Each break that exits the
//! switch must either go away, because control reaches the end of the
//! switch anyway, or become the jump that runs after the switch.

use crate::errors::Result;
use crate::semantics::CommentTracker;
use crate::syntax::edits::apply_edits;
use crate::syntax::navigation::{
    enclosing_function, find_exited_statement, is_last_statement, next_statement,
    outermost_labeled,
};
use crate::syntax::{NodeId, Syntax, SyntaxTree};

#[derive(Debug)]
pub struct BreakConverter<'t> {
    tree: &'t SyntaxTree,
    switch: NodeId,
    removals: Vec<NodeId>,
    replacements: Vec<(NodeId, String)>,
}

impl<'t> BreakConverter<'t> {
    /// `None` for switch expressions, non-switch nodes, and switches with
    /// a break that can neither be dropped nor replaced by one statement
    pub fn from(tree: &'t SyntaxTree, switch: NodeId) -> Option<Self> {
        if !matches!(
            tree.syntax(switch),
            Syntax::Switch {
                is_expression: false,
                ..
            }
        ) {
            return None;
        }
        let _span = tracing::debug_span!("break_converter", switch = switch.0).entered();
        let construct = outermost_labeled(tree, switch);
        let mut converter = Self {
            tree,
            switch,
            removals: Vec::new(),
            replacements: Vec::new(),
        };
        for jump in tree.descendants(switch) {
            if !matches!(tree.syntax(jump), Syntax::Break { .. }) {
                continue;
            }
            let exits_switch = find_exited_statement(tree, jump).is_some_and(|target| {
                tree.is_ancestor(construct, target) && tree.is_ancestor(target, switch)
            });
            if !exits_switch {
                continue;
            }
            if converter.is_removable(jump) {
                converter.removals.push(jump);
                continue;
            }
            let Some(replacement) = jump_after(tree, construct) else {
                log::debug!(
                    "Break at line {} has no single-statement replacement",
                    tree.line_of(jump)
                );
                return None;
            };
            if retargets(tree, jump, switch, &replacement) {
                log::debug!(
                    "'{}' at line {} would bind to an inner loop or switch",
                    replacement,
                    tree.line_of(jump)
                );
                return None;
            }
            converter.replacements.push((jump, replacement));
        }
        log::debug!(
            "Switch at line {}: {} breaks removed, {} replaced",
            tree.line_of(switch),
            converter.removals.len(),
            converter.replacements.len()
        );
        Some(converter)
    }

    pub fn switch(&self) -> NodeId {
        self.switch
    }

    /// Breaks that fall through to the end of the switch anyway
    pub fn removals(&self) -> &[NodeId] {
        &self.removals
    }

    pub fn replacements(&self) -> &[(NodeId, String)] {
        &self.replacements
    }

    /// Whether dropping `statement` keeps control flowing to the end of
    /// the switch
    fn is_removable(&self, statement: NodeId) -> bool {
        let tree = self.tree;
        let Some(parent) = tree.parent(statement) else {
            return false;
        };
        match tree.syntax(parent) {
            Syntax::SwitchRule { .. } => tree.parent(parent) == Some(self.switch),
            Syntax::SwitchGroup { .. } => {
                tree.parent(parent) == Some(self.switch)
                    && is_last_statement(tree, statement)
                    && matches!(
                        tree.syntax(self.switch),
                        Syntax::Switch { arms, .. } if arms.last() == Some(&parent)
                    )
            }
            Syntax::Block { .. } => is_last_statement(tree, statement) && self.is_removable(parent),
            Syntax::If { .. } | Syntax::Labeled { .. } => self.is_removable(parent),
            _ => false,
        }
    }

    /// Rewrite the source: removable breaks are dropped, the rest replaced
    pub fn process(&self) -> Result<String> {
        let tree = self.tree;
        let mut tracker = CommentTracker::new(tree);
        let mut edits = Vec::with_capacity(self.removals.len() + self.replacements.len());
        for &jump in &self.removals {
            let is_sole_branch = tree
                .parent(jump)
                .is_some_and(|p| matches!(tree.syntax(p), Syntax::If { .. } | Syntax::Labeled { .. }));
            if is_sole_branch {
                edits.push(tracker.replace_and_restore_comments(jump, ";"));
            } else {
                edits.push(tracker.delete_and_restore_comments(jump));
            }
        }
        for (jump, replacement) in &self.replacements {
            edits.push(tracker.replace_and_restore_comments(*jump, replacement));
        }
        apply_edits(tree.source(), edits)
    }
}

/// Single statement equivalent to falling off the end of `statement`
fn jump_after(tree: &SyntaxTree, statement: NodeId) -> Option<String> {
    if let Some(next) = next_statement(tree, statement) {
        return match tree.syntax(next) {
            Syntax::Break { .. }
            | Syntax::Continue { .. }
            | Syntax::Return { .. }
            | Syntax::Throw { .. } => Some(tree.text(next).to_string()),
            _ => None,
        };
    }
    let parent = tree.parent(statement)?;
    let parent_syntax = tree.syntax(parent);
    if parent_syntax.is_loop() {
        return Some("continue;".to_string());
    }
    if !matches!(parent_syntax, Syntax::Block { .. }) {
        return None;
    }
    let outer = tree.parent(parent)?;
    match tree.syntax(outer) {
        s if s.is_loop() => Some("continue;".to_string()),
        Syntax::Method {
            return_type,
            body: Some(body),
            ..
        } if *body == parent => {
            let returns_nothing = return_type.as_ref().map_or(true, |t| t.is_void());
            returns_nothing.then(|| "return;".to_string())
        }
        Syntax::Lambda { body, .. } if *body == parent => {
            (!returns_value(tree, outer)).then(|| "return;".to_string())
        }
        Syntax::Block { .. } => jump_after(tree, parent),
        _ => None,
    }
}

/// Whether a lambda body contains `return value;` of its own
fn returns_value(tree: &SyntaxTree, lambda: NodeId) -> bool {
    tree.descendants(lambda).into_iter().any(|node| {
        matches!(tree.syntax(node), Syntax::Return { value: Some(_) })
            && enclosing_function(tree, node) == Some(lambda)
    })
}

/// Whether an unlabeled `break;`/`continue;` at `jump` would bind to a
/// loop or switch nested inside `switch`
fn retargets(tree: &SyntaxTree, jump: NodeId, switch: NodeId, replacement: &str) -> bool {
    let compact: String = replacement.chars().filter(|c| !c.is_whitespace()).collect();
    if compact != "break;" && compact != "continue;" {
        return false;
    }
    tree.ancestors(jump)
        .take_while(|&a| a != switch)
        .any(|a| {
            let syntax = tree.syntax(a);
            syntax.is_loop() || matches!(syntax, Syntax::Switch { .. })
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::parse_java;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    fn first_switch(tree: &SyntaxTree) -> NodeId {
        tree.find(|t, id| matches!(t.syntax(id), Syntax::Switch { .. }))
            .unwrap()
    }

    fn convert(source: &str) -> Option<String> {
        let tree = parse_java(source).unwrap();
        BreakConverter::from(&tree, first_switch(&tree)).map(|c| c.process().unwrap())
    }

    #[test]
    fn test_rule_breaks_are_removed() {
        let source = "class A { void f(int k) { switch (k) { case 1 -> { g(); break; } default -> h(); } } }";
        assert_eq!(
            convert(source).unwrap(),
            "class A { void f(int k) { switch (k) { case 1 -> { g(); } default -> h(); } } }"
        );
    }

    #[test]
    fn test_old_style_switch_in_void_method() {
        let source = indoc! {r#"
            class A {
                void f(int k) {
                    switch (k) {
                        case 1:
                            g();
                            break;
                        default:
                            h();
                            break;
                    }
                }
            }
        "#};
        let expected = indoc! {r#"
            class A {
                void f(int k) {
                    switch (k) {
                        case 1:
                            g();
                            return;
                        default:
                            h();
                    }
                }
            }
        "#};
        assert_eq!(convert(source).unwrap(), expected);
    }

    #[test]
    fn test_switch_in_loop_body_continues() {
        let source = "class A { int f(int k) { while (k > 0) { switch (k) { case 1: g(); break; default: h(); } } return 0; } }";
        assert_eq!(
            convert(source).unwrap(),
            "class A { int f(int k) { while (k > 0) { switch (k) { case 1: g(); continue; default: h(); } } return 0; } }"
        );
    }

    #[test]
    fn test_following_jump_is_reused() {
        let source = "class A { int f(int k) { switch (k) { case 1: g(); break; default: h(); } return k * 2; } }";
        assert_eq!(
            convert(source).unwrap(),
            "class A { int f(int k) { switch (k) { case 1: g(); return k * 2; default: h(); } return k * 2; } }"
        );
    }

    #[test]
    fn test_no_replacement_available() {
        let source = "class A { int x; void f(int k) { switch (k) { case 1: g(); break; default: h(); } x = 1; } }";
        assert_eq!(convert(source), None);
    }

    #[test]
    fn test_switch_expression_is_rejected() {
        let source = "class A { int f(int k) { return switch (k) { case 1 -> 2; default -> 3; }; } }";
        let tree = parse_java(source).unwrap();
        assert!(BreakConverter::from(&tree, first_switch(&tree)).is_none());
        assert!(BreakConverter::from(&tree, tree.root()).is_none());
    }

    #[test]
    fn test_labeled_in_if() {
        let source = "class A { void f(int k, boolean c) { switch (k) { case 1 -> { if (c) lbl: break; } default -> h(); } } }";
        assert_eq!(
            convert(source).unwrap(),
            "class A { void f(int k, boolean c) { switch (k) { case 1 -> { if (c) lbl: ; } default -> h(); } } }"
        );
    }

    #[test]
    fn test_if_in_labeled() {
        let source = "class A { void f(int k, boolean c) { switch (k) { case 1 -> { lbl: if (c) break; } default -> h(); } } }";
        assert_eq!(
            convert(source).unwrap(),
            "class A { void f(int k, boolean c) { switch (k) { case 1 -> { lbl: if (c) ; } default -> h(); } } }"
        );
    }

    #[test]
    fn test_nested_blocks() {
        let source = "class A { void f(int k) { switch (k) { case 1 -> { { g(); break; } } default -> h(); } } }";
        assert_eq!(
            convert(source).unwrap(),
            "class A { void f(int k) { switch (k) { case 1 -> { { g(); } } default -> h(); } } }"
        );
    }

    #[test]
    fn test_break_before_other_statements_is_replaced() {
        let source = "class A { void f(int k, boolean c) { switch (k) { case 1 -> { if (c) break; g(); } default -> h(); } } }";
        assert_eq!(
            convert(source).unwrap(),
            "class A { void f(int k, boolean c) { switch (k) { case 1 -> { if (c) return; g(); } default -> h(); } } }"
        );
    }

    #[test]
    fn test_labeled_switch_break() {
        let source = "class A { void f(int k) { sw: switch (k) { case 1: for (;;) { break sw; } default: h(); } } }";
        assert_eq!(
            convert(source).unwrap(),
            "class A { void f(int k) { sw: switch (k) { case 1: for (;;) { return; } default: h(); } } }"
        );
    }

    #[test]
    fn test_replacement_that_would_retarget_is_refused() {
        let source = "class A { void f(int k) { while (k > 0) { sw: switch (k) { case 1: for (;;) { break sw; } default: h(); } } } }";
        assert_eq!(convert(source), None);
    }

    #[test]
    fn test_breaks_of_inner_loops_are_untouched() {
        let source = "class A { void f(int k) { switch (k) { case 1 -> { for (;;) { break; } } default -> h(); } } }";
        let tree = parse_java(source).unwrap();
        let converter = BreakConverter::from(&tree, first_switch(&tree)).unwrap();
        assert!(converter.removals().is_empty());
        assert!(converter.replacements().is_empty());
    }
}
