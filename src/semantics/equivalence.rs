//! Structural equivalence of expressions

use crate::syntax::{NodeId, Syntax, SyntaxTree};

/// Decides whether two subtrees compute the same value
pub trait EquivalenceOracle {
    /// `a` lives in `left`, `b` in `right`; the trees may be the same
    fn are_equivalent(&self, left: &SyntaxTree, a: NodeId, right: &SyntaxTree, b: NodeId) -> bool;
}

/// Equivalence by shape: same constructs, same names and operators, same
/// literal text. Parentheses are ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralEquivalence;

impl EquivalenceOracle for StructuralEquivalence {
    fn are_equivalent(&self, left: &SyntaxTree, a: NodeId, right: &SyntaxTree, b: NodeId) -> bool {
        let a = left.skip_parens(a);
        let b = right.skip_parens(b);
        let same_node = match (left.syntax(a), right.syntax(b)) {
            (Syntax::Literal { kind: x }, Syntax::Literal { kind: y }) => {
                return x == y && normalized(left.text(a)) == normalized(right.text(b))
            }
            (Syntax::Name { name: x }, Syntax::Name { name: y }) => x == y,
            (Syntax::This, Syntax::This) | (Syntax::Super, Syntax::Super) => true,
            (Syntax::FieldAccess { field: x, .. }, Syntax::FieldAccess { field: y, .. }) => x == y,
            (Syntax::ArrayAccess { .. }, Syntax::ArrayAccess { .. }) => true,
            (Syntax::MethodCall { name: x, object: ox, args: ax }, Syntax::MethodCall { name: y, object: oy, args: ay }) => {
                x == y && ox.is_some() == oy.is_some() && ax.len() == ay.len()
            }
            (Syntax::New { ty: x, args: ax, body: bx, .. }, Syntax::New { ty: y, args: ay, body: by, .. }) => {
                x == y && ax.len() == ay.len() && bx.is_none() && by.is_none()
            }
            (Syntax::Assignment { op: x, .. }, Syntax::Assignment { op: y, .. }) => x == y,
            (Syntax::Polyadic { op: x, operands: ox }, Syntax::Polyadic { op: y, operands: oy }) => {
                x == y && ox.len() == oy.len()
            }
            (Syntax::Prefix { op: x, .. }, Syntax::Prefix { op: y, .. }) => x == y,
            (Syntax::Postfix { op: x, .. }, Syntax::Postfix { op: y, .. }) => x == y,
            (Syntax::Conditional { .. }, Syntax::Conditional { .. }) => true,
            (Syntax::InstanceOf { ty: x, bindings: bx, .. }, Syntax::InstanceOf { ty: y, bindings: by, .. }) => {
                x == y && bx.is_empty() && by.is_empty()
            }
            (Syntax::Cast { ty: x, .. }, Syntax::Cast { ty: y, .. }) => x == y,
            (Syntax::ClassLiteral { ty: x }, Syntax::ClassLiteral { ty: y }) => x == y,
            (Syntax::MethodReference, Syntax::MethodReference) => {
                return normalized(left.text(a)) == normalized(right.text(b))
            }
            _ => false,
        };
        if !same_node {
            return false;
        }
        let left_children = left.children(a);
        let right_children = right.children(b);
        left_children.len() == right_children.len()
            && left_children
                .iter()
                .zip(&right_children)
                .all(|(&x, &y)| self.are_equivalent(left, x, right, y))
    }
}

fn normalized(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}
