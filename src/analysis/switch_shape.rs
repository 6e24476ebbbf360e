//! Shape queries on `switch` statements and expressions

use serde::Serialize;

use crate::syntax::{NodeId, Syntax, SyntaxTree};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct BranchCount {
    /// Case values across all labels; `case 1, 2 ->` counts twice
    pub cases: usize,
    pub has_default: bool,
}

impl BranchCount {
    pub fn total(&self) -> usize {
        self.cases + usize::from(self.has_default)
    }
}

/// Case values and default presence, or `None` for non-switch nodes
pub fn branch_count(tree: &SyntaxTree, switch: NodeId) -> Option<BranchCount> {
    let Syntax::Switch { arms, .. } = tree.syntax(switch) else {
        return None;
    };
    let mut count = BranchCount::default();
    for &arm in arms {
        let labels = match tree.syntax(arm) {
            Syntax::SwitchGroup { labels, .. } | Syntax::SwitchRule { labels, .. } => labels,
            _ => continue,
        };
        for &label in labels {
            if let Syntax::SwitchLabel {
                values, is_default, ..
            } = tree.syntax(label)
            {
                count.has_default |= *is_default;
                count.cases += values.len();
            }
        }
    }
    Some(count)
}

/// Whether the switch uses `case X ->` arms
pub fn is_rule_format(tree: &SyntaxTree, switch: NodeId) -> bool {
    match tree.syntax(switch) {
        Syntax::Switch { arms, .. } => arms
            .first()
            .is_some_and(|&arm| matches!(tree.syntax(arm), Syntax::SwitchRule { .. })),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::parse_java;

    fn switch_in(body: &str) -> (SyntaxTree, NodeId) {
        let tree = parse_java(&format!("class A {{ void f(int k) {{ {body} }} }}")).unwrap();
        let switch = tree
            .find(|t, id| matches!(t.syntax(id), Syntax::Switch { .. }))
            .unwrap();
        (tree, switch)
    }

    #[test]
    fn test_branch_count_old_style() {
        let (tree, switch) = switch_in("switch (k) { case 1: case 2: g(); break; default: h(); }");
        let count = branch_count(&tree, switch).unwrap();
        assert_eq!(count, BranchCount { cases: 2, has_default: true });
        assert_eq!(count.total(), 3);
        assert!(!is_rule_format(&tree, switch));
    }

    #[test]
    fn test_branch_count_rules() {
        let (tree, switch) = switch_in("switch (k) { case 1, 2, 3 -> g(); case 4 -> h(); }");
        let count = branch_count(&tree, switch).unwrap();
        assert_eq!(count, BranchCount { cases: 4, has_default: false });
        assert!(is_rule_format(&tree, switch));
    }

    #[test]
    fn test_not_a_switch() {
        let (tree, switch) = switch_in("switch (k) { }");
        assert_eq!(branch_count(&tree, switch), Some(BranchCount::default()));
        assert!(!is_rule_format(&tree, switch));
        assert_eq!(branch_count(&tree, tree.root()), None);
    }
}
