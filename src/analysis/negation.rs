//! Logical negation of boolean expressions, as source text
//!
//! [`NegationEngine::negate`] produces the text of `!(expr)` in its most
//! natural form: dual method calls, De Morgan, inverted comparisons, and
//! double negation elimination, while adding only the parentheses the
//! surrounding context needs.
//!
//! Ordering comparisons over floating-point operands are never inverted:
//! with a NaN operand both `x > y` and `x <= y` are false, so their negation
//! keeps the explicit `!`.

use crate::config::NegationConfig;
use crate::errors::Result;
use crate::semantics::{CommentTracker, Declaration, EquivalenceOracle, SemanticModel};
use crate::syntax::edits::apply_edits;
use crate::syntax::operators::precedence;
use crate::syntax::{AssignOp, LiteralKind, NodeId, OperatorToken, PrefixOp, Syntax, SyntaxTree};

pub struct NegationEngine<'a> {
    model: &'a dyn SemanticModel,
    config: &'a NegationConfig,
}

impl<'a> NegationEngine<'a> {
    pub fn new(model: &'a dyn SemanticModel, config: &'a NegationConfig) -> Self {
        Self { model, config }
    }

    /// Text of the negation of `expr`, valid where an operand of
    /// `context` precedence is expected
    pub fn negate(&self, expr: NodeId, context: u8) -> String {
        let mut tracker = CommentTracker::new(self.model.tree());
        self.negate_with_tracker(expr, context, &mut tracker)
    }

    /// Like [`Self::negate`], recording reused nodes in a caller's tracker
    pub fn negate_with_tracker(
        &self,
        expr: NodeId,
        context: u8,
        tracker: &mut CommentTracker<'_>,
    ) -> String {
        let _span = tracing::debug_span!("negate", node = expr.0).entered();
        let text = self.negated_text(expr, context, tracker);
        log::trace!("Negated '{}' as '{}'", self.model.tree().text(expr), text);
        text
    }

    /// Empty text when there is nothing to negate
    pub fn negate_optional(&self, expr: Option<NodeId>, context: u8) -> String {
        expr.map(|e| self.negate(e, context)).unwrap_or_default()
    }

    /// Replace `expr` with its negation and return the rewritten source.
    /// Comments inside `expr` survive exactly once.
    pub fn replace_with_negation(&self, expr: NodeId) -> Result<String> {
        let tree = self.model.tree();
        let _span = tracing::debug_span!("replace_with_negation", node = expr.0).entered();
        let context = context_precedence(tree, expr);
        let mut tracker = CommentTracker::new(tree);
        let text = self.negated_text(expr, context, &mut tracker);
        let edit = tracker.replace_and_restore_comments(expr, &text);
        apply_edits(tree.source(), vec![edit])
    }

    /// Whether `a` and `b` can never both be true nor both be false
    pub fn are_expressions_opposite(
        &self,
        a: NodeId,
        b: NodeId,
        oracle: &dyn EquivalenceOracle,
    ) -> bool {
        let tree = self.model.tree();
        let a = tree.skip_parens(a);
        let b = tree.skip_parens(b);
        let equivalent = |x: NodeId, y: NodeId| oracle.are_equivalent(tree, x, tree, y);

        if negated_operand(tree, a).is_some_and(|inner| equivalent(inner, b))
            || negated_operand(tree, b).is_some_and(|inner| equivalent(a, inner))
        {
            return true;
        }

        let (
            Syntax::Polyadic {
                op: left_op,
                operands: left,
            },
            Syntax::Polyadic {
                op: right_op,
                operands: right,
            },
        ) = (tree.syntax(a), tree.syntax(b))
        else {
            return false;
        };
        if !left_op.is_comparison() || left.len() != 2 || right.len() != 2 {
            return false;
        }
        if left_op.is_relational() && left.iter().chain(right).any(|&o| self.is_floating(o)) {
            return false;
        }
        let inverse = left_op.negated();
        let same_order = equivalent(left[0], right[0]) && equivalent(left[1], right[1]);
        let swapped = equivalent(left[0], right[1]) && equivalent(left[1], right[0]);
        (same_order && inverse == Some(*right_op))
            || (swapped && inverse.and_then(OperatorToken::flipped) == Some(*right_op))
    }

    fn negated_text(&self, expr: NodeId, context: u8, tracker: &mut CommentTracker<'_>) -> String {
        let tree = self.model.tree();
        if let Some(dual) = self.dual_call_text(expr, tracker) {
            return dual;
        }
        match tree.syntax(expr) {
            Syntax::Parenthesized { inner } => format!(
                "({})",
                self.negated_text(*inner, precedence::NUM_PRECEDENCES, tracker)
            ),
            Syntax::Assignment {
                op: AssignOp::Compound(token @ (OperatorToken::BitAnd | OperatorToken::BitOr)),
                target,
                value,
            } if is_statement_expression(tree, expr) => {
                let flipped = if *token == OperatorToken::BitAnd {
                    "|="
                } else {
                    "&="
                };
                format!(
                    "{} {} {}",
                    tracker.text(*target),
                    flipped,
                    self.negated_text(*value, precedence::ASSIGNMENT, tracker)
                )
            }
            Syntax::Conditional {
                condition,
                then_expr,
                else_expr,
            } => {
                let text = format!(
                    "{} ? {} : {}",
                    tracker.text(*condition),
                    self.negated_text(*then_expr, precedence::CONDITIONAL, tracker),
                    self.negated_text(*else_expr, precedence::CONDITIONAL, tracker)
                );
                parenthesize_if(text, precedence::CONDITIONAL > context)
            }
            Syntax::Prefix {
                op: PrefixOp::Not,
                operand,
            } => tracker.text_with_precedence(tree.skip_parens(*operand), context),
            Syntax::Polyadic { op, operands } if op.is_comparison() => {
                self.negated_comparison(expr, *op, operands, context, tracker)
            }
            Syntax::Polyadic { op, operands } if op.is_logical() => {
                let flipped = if *op == OperatorToken::AndAnd {
                    OperatorToken::OrOr
                } else {
                    OperatorToken::AndAnd
                };
                let new_precedence = flipped.precedence();
                let parts: Vec<String> = operands
                    .iter()
                    .map(|&o| self.negated_text(o, new_precedence, tracker))
                    .collect();
                let separator = format!(" {} ", flipped.as_str());
                parenthesize_if(parts.join(&separator), new_precedence > context)
            }
            Syntax::Literal {
                kind: LiteralKind::Boolean(value),
            } => (!value).to_string(),
            _ => self.wrapped_in_not(expr, context, tracker),
        }
    }

    fn negated_comparison(
        &self,
        expr: NodeId,
        op: OperatorToken,
        operands: &[NodeId],
        context: u8,
        tracker: &mut CommentTracker<'_>,
    ) -> String {
        if op.is_relational() && operands.iter().any(|&o| self.is_floating(o)) {
            log::debug!(
                "Keeping '{}' under '!': floating-point operands",
                self.model.tree().text(expr)
            );
            return self.wrapped_in_not(expr, context, tracker);
        }
        let (Some(inverse), [lhs, rhs]) = (op.negated(), operands) else {
            return self.wrapped_in_not(expr, context, tracker);
        };
        let text = format!(
            "{} {} {}",
            tracker.text(*lhs),
            inverse.as_str(),
            tracker.text(*rhs)
        );
        parenthesize_if(text, op.precedence() > context)
    }

    fn wrapped_in_not(&self, expr: NodeId, context: u8, tracker: &mut CommentTracker<'_>) -> String {
        let text = format!("!{}", tracker.text_with_precedence(expr, precedence::PREFIX));
        parenthesize_if(text, precedence::PREFIX > context)
    }

    /// `opt.isEmpty()` for `opt.isPresent()` and the like
    fn dual_call_text(&self, expr: NodeId, tracker: &mut CommentTracker<'_>) -> Option<String> {
        let tree = self.model.tree();
        let Syntax::MethodCall { object, args, .. } = tree.syntax(expr) else {
            return None;
        };
        let Some(Declaration::Method(method)) = self.model.resolve(expr) else {
            return None;
        };
        let dual = self.config.dual_of(&method.class_name, &method.name)?;
        log::debug!("Negating {} through its dual {}", method.signature(), dual);
        let args: Vec<String> = args.iter().map(|&a| tracker.text(a)).collect();
        Some(match object {
            Some(object) => format!("{}.{}({})", tracker.text(*object), dual, args.join(", ")),
            None => format!("{}({})", dual, args.join(", ")),
        })
    }

    fn is_floating(&self, expr: NodeId) -> bool {
        self.model
            .type_of(expr)
            .is_some_and(|ty| ty.is_floating_point())
    }
}

fn parenthesize_if(text: String, needed: bool) -> String {
    if needed {
        format!("({})", text)
    } else {
        text
    }
}

fn is_statement_expression(tree: &SyntaxTree, expr: NodeId) -> bool {
    tree.parent(expr)
        .is_some_and(|p| matches!(tree.syntax(p), Syntax::ExpressionStatement { .. }))
}

/// Whether `expr` is a logical `!`, looking through parentheses
pub fn is_negation(tree: &SyntaxTree, expr: NodeId) -> bool {
    negated_operand(tree, expr).is_some()
}

/// Operand of a logical `!`, with parentheses stripped on both sides
pub fn negated_operand(tree: &SyntaxTree, expr: NodeId) -> Option<NodeId> {
    match tree.syntax(tree.skip_parens(expr)) {
        Syntax::Prefix {
            op: PrefixOp::Not,
            operand,
        } => Some(tree.skip_parens(*operand)),
        _ => None,
    }
}

/// Loosest precedence a replacement for `node` may have without changing
/// how its parent parses
pub fn context_precedence(tree: &SyntaxTree, node: NodeId) -> u8 {
    let Some(parent) = tree.parent(node) else {
        return precedence::NUM_PRECEDENCES;
    };
    match tree.syntax(parent) {
        Syntax::Polyadic { op, operands } => {
            if op.is_chainable() || operands.first() == Some(&node) {
                op.precedence()
            } else {
                op.precedence() - 1
            }
        }
        Syntax::Prefix { .. } | Syntax::Cast { .. } => precedence::PREFIX,
        Syntax::Postfix { .. } => precedence::POSTFIX,
        Syntax::Conditional { condition, .. } if *condition == node => precedence::CONDITIONAL - 1,
        Syntax::Conditional { .. } => precedence::CONDITIONAL,
        Syntax::Assignment { .. } => precedence::ASSIGNMENT,
        Syntax::InstanceOf { .. } => precedence::RELATIONAL,
        Syntax::MethodCall {
            object: Some(object),
            ..
        } if *object == node => precedence::METHOD_CALL,
        Syntax::FieldAccess { .. } => precedence::METHOD_CALL,
        Syntax::ArrayAccess { array, .. } if *array == node => precedence::PARENTHESIZED,
        _ => precedence::NUM_PRECEDENCES,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SemaConfig;
    use crate::semantics::{LocalSemantics, StructuralEquivalence};
    use crate::syntax::parse_java;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    fn negate_in_source(source: &str, expr: &str) -> String {
        let tree = parse_java(source).unwrap();
        let config = SemaConfig::default();
        let model = LocalSemantics::new(&tree, &config);
        let engine = NegationEngine::new(&model, &config.negation);
        let node = tree.find_by_text(expr).unwrap();
        engine.negate(node, precedence::NUM_PRECEDENCES)
    }

    fn negate_in(params: &str, expr: &str) -> String {
        negate_in_source(
            &format!("class A {{ boolean f({params}) {{ return {expr}; }} }}"),
            expr,
        )
    }

    #[test]
    fn test_de_morgan() {
        assert_eq!(negate_in("boolean a, boolean b", "a && b"), "!a || !b");
        assert_eq!(
            negate_in("boolean a, boolean b, boolean c", "a || b || c"),
            "!a && !b && !c"
        );
    }

    #[test]
    fn test_de_morgan_parenthesizes_nested_operands() {
        assert_eq!(
            negate_in("boolean a, boolean b, boolean c", "a || b && c"),
            "!a && (!b || !c)"
        );
        assert_eq!(
            negate_in("boolean a, boolean b, boolean c", "a && (b || c)"),
            "!a || (!b && !c)"
        );
    }

    #[test]
    fn test_comparisons_invert() {
        assert_eq!(negate_in("int i, int j", "i < j"), "i >= j");
        assert_eq!(negate_in("int i, int j", "i >= j"), "i < j");
        assert_eq!(negate_in("Object o", "o == null"), "o != null");
    }

    #[test]
    fn test_floating_point_ordering_keeps_not() {
        assert_eq!(negate_in("double x, double y", "x > y"), "!(x > y)");
        assert_eq!(negate_in("Double d", "d < 1.0"), "!(d < 1.0)");
        assert_eq!(negate_in("int i", "i <= 0.5"), "!(i <= 0.5)");
    }

    #[test]
    fn test_floating_point_equality_inverts() {
        assert_eq!(negate_in("double x, double y", "x == y"), "x != y");
    }

    #[test]
    fn test_double_negation_is_removed() {
        assert_eq!(negate_in("boolean a", "!a"), "a");
        assert_eq!(negate_in("boolean a, boolean b", "!(a && b)"), "a && b");
    }

    #[test]
    fn test_literals_conditionals_and_fallback() {
        assert_eq!(negate_in("", "true"), "false");
        assert_eq!(
            negate_in("boolean c, boolean a, boolean b", "c ? a : b"),
            "c ? !a : !b"
        );
        assert_eq!(negate_in("String s", "s.isEmpty()"), "!s.isEmpty()");
        assert_eq!(
            negate_in("Object o", "o instanceof String"),
            "!(o instanceof String)"
        );
    }

    #[test]
    fn test_parenthesized_is_rewrapped() {
        assert_eq!(negate_in("boolean a, boolean b", "(a || b)"), "(!a && !b)");
    }

    #[test]
    fn test_dual_methods() {
        let source = indoc! {r#"
            import java.util.Optional;
            class A {
                boolean f(Optional<String> opt) { return opt.isPresent(); }
            }
        "#};
        assert_eq!(negate_in_source(source, "opt.isPresent()"), "opt.isEmpty()");
    }

    #[test]
    fn test_compound_boolean_assignment_statement() {
        let source = indoc! {r#"
            class A {
                void f(boolean flag, int x) { flag &= x > 0; }
            }
        "#};
        assert_eq!(negate_in_source(source, "flag &= x > 0"), "flag |= x <= 0");
    }

    #[test]
    fn test_negate_optional_of_nothing_is_empty() {
        let tree = parse_java("class A {}").unwrap();
        let config = SemaConfig::default();
        let model = LocalSemantics::new(&tree, &config);
        let engine = NegationEngine::new(&model, &config.negation);
        assert_eq!(engine.negate_optional(None, precedence::NUM_PRECEDENCES), "");
    }

    #[test]
    fn test_replace_with_negation_restores_comments() {
        let source = "class A { void f(boolean a, boolean b) { if (a /* why */ && b) g(); } }";
        let tree = parse_java(source).unwrap();
        let config = SemaConfig::default();
        let model = LocalSemantics::new(&tree, &config);
        let engine = NegationEngine::new(&model, &config.negation);
        let node = tree.find_by_text("a /* why */ && b").unwrap();
        assert_eq!(
            engine.replace_with_negation(node).unwrap(),
            "class A { void f(boolean a, boolean b) { if (/* why */ !a || !b) g(); } }"
        );
    }

    #[test]
    fn test_replace_with_negation_respects_parent_precedence() {
        let source = "class A { boolean f(boolean x, boolean a, boolean b) { return x && a == b; } }";
        let tree = parse_java(source).unwrap();
        let config = SemaConfig::default();
        let model = LocalSemantics::new(&tree, &config);
        let engine = NegationEngine::new(&model, &config.negation);
        let node = tree.find_by_text("a == b").unwrap();
        assert_eq!(
            engine.replace_with_negation(node).unwrap(),
            "class A { boolean f(boolean x, boolean a, boolean b) { return x && a != b; } }"
        );
        let x = tree.find_by_text("x").unwrap();
        assert!(engine.replace_with_negation(x).unwrap().contains("return !x && a == b;"));
    }

    #[test]
    fn test_negation_queries() {
        let source = "class A { boolean f(boolean a) { return !((a)); } }";
        let tree = parse_java(source).unwrap();
        let node = tree.find_by_text("!((a))").unwrap();
        assert!(is_negation(&tree, node));
        let operand = negated_operand(&tree, node).unwrap();
        assert_eq!(tree.text(operand), "a");
        let a = tree.find_by_text("a").unwrap();
        assert!(!is_negation(&tree, a));
    }

    #[test]
    fn test_opposite_expressions() {
        let source = indoc! {r#"
            class A {
                void f(int a, int b, double x, double y, boolean p) {
                    g(a < b, a >= b, b <= a, a > b);
                    g(x < y, x >= y);
                    g(p, !p);
                }
            }
        "#};
        let tree = parse_java(source).unwrap();
        let config = SemaConfig::default();
        let model = LocalSemantics::new(&tree, &config);
        let engine = NegationEngine::new(&model, &config.negation);
        let at = |text: &str| tree.find_by_text(text).unwrap();
        let oracle = StructuralEquivalence;
        assert!(engine.are_expressions_opposite(at("a < b"), at("a >= b"), &oracle));
        assert!(engine.are_expressions_opposite(at("a < b"), at("b <= a"), &oracle));
        assert!(!engine.are_expressions_opposite(at("a < b"), at("a > b"), &oracle));
        assert!(!engine.are_expressions_opposite(at("x < y"), at("x >= y"), &oracle));
        assert!(engine.are_expressions_opposite(at("p"), at("!p"), &oracle));
    }
}
