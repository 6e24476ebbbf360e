//! Jump-target and statement-order queries over a [`SyntaxTree`]

use super::{NodeId, Syntax, SyntaxTree};

/// Nodes that no jump can cross
fn is_jump_boundary(syntax: &Syntax) -> bool {
    matches!(
        syntax,
        Syntax::Method { .. }
            | Syntax::Lambda { .. }
            | Syntax::Class { .. }
            | Syntax::AnonymousClass { .. }
            | Syntax::Initializer { .. }
            | Syntax::CompilationUnit { .. }
    )
}

/// Statement a `break` exits: the labeled statement for `break label;`,
/// otherwise the nearest enclosing loop or switch statement
pub fn find_exited_statement(tree: &SyntaxTree, jump: NodeId) -> Option<NodeId> {
    let label = match tree.syntax(jump) {
        Syntax::Break { label } => label.as_deref(),
        _ => return None,
    };
    for ancestor in tree.ancestors(jump) {
        let syntax = tree.syntax(ancestor);
        if is_jump_boundary(syntax) {
            return None;
        }
        match (label, syntax) {
            (Some(wanted), Syntax::Labeled { label, .. }) if label == wanted => {
                return Some(ancestor)
            }
            (None, Syntax::Switch { is_expression: true, .. }) => return None,
            (None, s) if s.is_loop() || matches!(s, Syntax::Switch { .. }) => {
                return Some(ancestor)
            }
            _ => {}
        }
    }
    None
}

/// Loop a `continue` resumes
pub fn find_continued_statement(tree: &SyntaxTree, jump: NodeId) -> Option<NodeId> {
    let label = match tree.syntax(jump) {
        Syntax::Continue { label } => label.as_deref(),
        _ => return None,
    };
    for ancestor in tree.ancestors(jump) {
        let syntax = tree.syntax(ancestor);
        if is_jump_boundary(syntax) || matches!(syntax, Syntax::Switch { is_expression: true, .. }) {
            return None;
        }
        match (label, syntax) {
            (Some(wanted), Syntax::Labeled { label, body }) if label == wanted => {
                return tree.syntax(*body).is_loop().then_some(*body);
            }
            (None, s) if s.is_loop() => return Some(ancestor),
            _ => {}
        }
    }
    None
}

/// Switch expression a `yield` produces a value for
pub fn find_yield_target(tree: &SyntaxTree, jump: NodeId) -> Option<NodeId> {
    tree.ancestors(jump)
        .take_while(|&a| !is_jump_boundary(tree.syntax(a)))
        .find(|&a| matches!(tree.syntax(a), Syntax::Switch { is_expression: true, .. }))
}

/// Nearest enclosing method, constructor or lambda
pub fn enclosing_function(tree: &SyntaxTree, node: NodeId) -> Option<NodeId> {
    tree.ancestors(node)
        .take_while(|&a| {
            !matches!(
                tree.syntax(a),
                Syntax::Class { .. } | Syntax::AnonymousClass { .. } | Syntax::Initializer { .. }
            )
        })
        .find(|&a| matches!(tree.syntax(a), Syntax::Method { .. } | Syntax::Lambda { .. }))
}

/// Nearest enclosing class declaration or anonymous class body
pub fn enclosing_class(tree: &SyntaxTree, node: NodeId) -> Option<NodeId> {
    tree.ancestors(node)
        .find(|&a| matches!(tree.syntax(a), Syntax::Class { .. } | Syntax::AnonymousClass { .. }))
}

/// Statement following `statement` in its block or switch group
pub fn next_statement(tree: &SyntaxTree, statement: NodeId) -> Option<NodeId> {
    let parent = tree.parent(statement)?;
    let siblings = tree.statements_of(parent);
    let position = siblings.iter().position(|&s| s == statement)?;
    siblings.get(position + 1).copied()
}

/// Whether `statement` is the final statement of its block or switch group
pub fn is_last_statement(tree: &SyntaxTree, statement: NodeId) -> bool {
    tree.parent(statement)
        .map(|parent| tree.statements_of(parent).last() == Some(&statement))
        .unwrap_or(false)
}

/// Walk up through `Labeled` wrappers to the outermost one
pub fn outermost_labeled(tree: &SyntaxTree, mut statement: NodeId) -> NodeId {
    while let Some(parent) = tree.parent(statement) {
        if matches!(tree.syntax(parent), Syntax::Labeled { .. }) {
            statement = parent;
        } else {
            break;
        }
    }
    statement
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::parse_java;
    use indoc::indoc;

    fn breaks(tree: &SyntaxTree) -> Vec<NodeId> {
        tree.find_all(|t, id| matches!(t.syntax(id), Syntax::Break { .. }))
    }

    #[test]
    fn test_unlabeled_break_exits_nearest_loop_or_switch() {
        let source = indoc! {r#"
            class A {
                void f(int k) {
                    while (true) {
                        switch (k) {
                            case 1: break;
                        }
                        break;
                    }
                }
            }
        "#};
        let tree = parse_java(source).unwrap();
        let found = breaks(&tree);
        let switch = tree.find(|t, id| matches!(t.syntax(id), Syntax::Switch { .. })).unwrap();
        let loop_node = tree.find(|t, id| matches!(t.syntax(id), Syntax::While { .. })).unwrap();
        assert_eq!(find_exited_statement(&tree, found[0]), Some(switch));
        assert_eq!(find_exited_statement(&tree, found[1]), Some(loop_node));
    }

    #[test]
    fn test_labeled_jumps() {
        let source = indoc! {r#"
            class A {
                void f() {
                    outer:
                    for (int i = 0; i < 3; i++) {
                        for (;;) {
                            if (i > 1) break outer;
                            continue outer;
                        }
                    }
                }
            }
        "#};
        let tree = parse_java(source).unwrap();
        let labeled = tree.find(|t, id| matches!(t.syntax(id), Syntax::Labeled { .. })).unwrap();
        let Syntax::Labeled { body, .. } = tree.syntax(labeled) else {
            unreachable!()
        };
        let jump = breaks(&tree)[0];
        assert_eq!(find_exited_statement(&tree, jump), Some(labeled));
        let cont = tree.find(|t, id| matches!(t.syntax(id), Syntax::Continue { .. })).unwrap();
        assert_eq!(find_continued_statement(&tree, cont), Some(*body));
    }

    #[test]
    fn test_break_does_not_cross_lambda() {
        let source = indoc! {r#"
            class A {
                void f() {
                    while (true) {
                        Runnable r = () -> { for (;;) { break; } };
                    }
                }
            }
        "#};
        let tree = parse_java(source).unwrap();
        let jump = breaks(&tree)[0];
        let target = find_exited_statement(&tree, jump).unwrap();
        assert!(matches!(tree.syntax(target), Syntax::For { .. }));
        assert!(enclosing_function(&tree, jump)
            .map(|f| matches!(tree.syntax(f), Syntax::Lambda { .. }))
            .unwrap_or(false));
    }

    #[test]
    fn test_next_statement() {
        let tree = parse_java("class A { void f() { a(); b(); } }").unwrap();
        let a = tree.find_by_text("a();").unwrap();
        let b = tree.find_by_text("b();").unwrap();
        assert_eq!(next_statement(&tree, a), Some(b));
        assert_eq!(next_statement(&tree, b), None);
        assert!(is_last_statement(&tree, b));
    }
}
