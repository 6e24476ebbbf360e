//! Recognition of `for` loops that count a variable towards a bound

use serde::Serialize;

use super::control_flow::{refers_to, variable_is_assigned};
use crate::core::{JavaType, PrimitiveType};
use crate::semantics::SemanticModel;
use crate::syntax::{
    AssignOp, LiteralKind, NodeId, OperatorToken, PostfixOp, PrefixOp, Syntax, SyntaxTree,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Ascending,
    Descending,
}

/// A loop of the shape `for (T i = init; i OP bound; i±±)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountingLoop {
    loop_node: NodeId,
    counter: NodeId,
    counter_name: String,
    counter_type: PrimitiveType,
    initializer: NodeId,
    bound: NodeId,
    inclusive: bool,
    direction: Direction,
    may_overflow: bool,
}

impl CountingLoop {
    /// `None` unless `loop_node` is a `for` loop with a single integral
    /// counter stepped by one towards a bound that does not depend on it
    pub fn recognize(model: &dyn SemanticModel, loop_node: NodeId) -> Option<Self> {
        let tree = model.tree();
        let Syntax::For {
            init,
            condition: Some(condition),
            update,
            body,
        } = tree.syntax(loop_node)
        else {
            return None;
        };
        let (counter, counter_name, declared_type, initializer) = match init.as_slice() {
            [local] => single_declarator(tree, *local)?,
            _ => return None,
        };
        let counter_type = match declared_type {
            JavaType::Var => model.type_of(initializer)?,
            ty => ty.clone(),
        }
        .as_primitive()
        .filter(|p| p.is_integral())?;

        let step = match update.as_slice() {
            [single] => unit_step(model, *single, counter)?,
            _ => return None,
        };

        let (op, bound) = counter_comparison(model, *condition, counter)?;
        if tree
            .descendants(bound)
            .into_iter()
            .any(|n| refers_to(model, n, counter))
        {
            log::trace!("Loop bound '{}' depends on the counter", tree.text(bound));
            return None;
        }
        let (direction, inclusive, may_overflow) = match op {
            OperatorToken::Lt => (Direction::Ascending, false, false),
            OperatorToken::Le => (Direction::Ascending, true, false),
            OperatorToken::Gt => (Direction::Descending, false, false),
            OperatorToken::Ge => (Direction::Descending, true, false),
            OperatorToken::Ne => (step, false, true),
            _ => return None,
        };
        if direction != step {
            return None;
        }
        if !bound_fits(model, counter_type, bound) {
            log::trace!(
                "Loop bound '{}' is not assignable to {}",
                tree.text(bound),
                counter_type.keyword()
            );
            return None;
        }
        if variable_is_assigned(model, counter, *body)
            || variable_is_assigned(model, counter, *condition)
        {
            return None;
        }

        log::debug!(
            "Counting loop over '{}' at line {}: {:?}{}",
            counter_name,
            tree.line_of(loop_node),
            direction,
            if may_overflow { ", may overflow" } else { "" }
        );
        Some(Self {
            loop_node,
            counter,
            counter_name,
            counter_type,
            initializer,
            bound,
            inclusive,
            direction,
            may_overflow,
        })
    }

    pub fn loop_node(&self) -> NodeId {
        self.loop_node
    }

    /// Declarator of the counter variable
    pub fn counter(&self) -> NodeId {
        self.counter
    }

    pub fn counter_name(&self) -> &str {
        &self.counter_name
    }

    pub fn counter_type(&self) -> PrimitiveType {
        self.counter_type
    }

    pub fn initializer(&self) -> NodeId {
        self.initializer
    }

    pub fn bound(&self) -> NodeId {
        self.bound
    }

    /// Whether the bound itself is the last counter value (`<=`, `>=`)
    pub fn is_inclusive(&self) -> bool {
        self.inclusive
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn is_descending(&self) -> bool {
        self.direction == Direction::Descending
    }

    /// Set for `!=` conditions, where the counter can wrap past the bound
    pub fn may_overflow(&self) -> bool {
        self.may_overflow
    }
}

/// Declarator, name, declared type and initializer of a one-variable
/// local declaration
fn single_declarator(tree: &SyntaxTree, local: NodeId) -> Option<(NodeId, String, &JavaType, NodeId)> {
    let Syntax::LocalVariable {
        ty, declarators, ..
    } = tree.syntax(local)
    else {
        return None;
    };
    let [declarator] = declarators.as_slice() else {
        return None;
    };
    match tree.syntax(*declarator) {
        Syntax::Declarator {
            name,
            dims: 0,
            init: Some(init),
        } => Some((*declarator, name.clone(), ty, *init)),
        _ => None,
    }
}

/// Direction of an update that moves the counter by exactly one
fn unit_step(model: &dyn SemanticModel, update: NodeId, counter: NodeId) -> Option<Direction> {
    let tree = model.tree();
    let is_counter = |id: NodeId| refers_to(model, tree.skip_parens(id), counter);
    match tree.syntax(tree.skip_parens(update)) {
        Syntax::ExpressionStatement { expr } => unit_step(model, *expr, counter),
        Syntax::Postfix { op, operand } if is_counter(*operand) => Some(match op {
            PostfixOp::Inc => Direction::Ascending,
            PostfixOp::Dec => Direction::Descending,
        }),
        Syntax::Prefix { op, operand } if is_counter(*operand) => match op {
            PrefixOp::Inc => Some(Direction::Ascending),
            PrefixOp::Dec => Some(Direction::Descending),
            _ => None,
        },
        Syntax::Assignment { op, target, value } if is_counter(*target) => match op {
            AssignOp::Compound(OperatorToken::Add) if is_one(tree, *value) => {
                Some(Direction::Ascending)
            }
            AssignOp::Compound(OperatorToken::Sub) if is_one(tree, *value) => {
                Some(Direction::Descending)
            }
            AssignOp::Assign => match tree.syntax(tree.skip_parens(*value)) {
                Syntax::Polyadic {
                    op: OperatorToken::Add,
                    operands,
                } => match operands.as_slice() {
                    [a, b] if is_counter(*a) && is_one(tree, *b) => Some(Direction::Ascending),
                    [a, b] if is_one(tree, *a) && is_counter(*b) => Some(Direction::Ascending),
                    _ => None,
                },
                Syntax::Polyadic {
                    op: OperatorToken::Sub,
                    operands,
                } => match operands.as_slice() {
                    [a, b] if is_counter(*a) && is_one(tree, *b) => Some(Direction::Descending),
                    _ => None,
                },
                _ => None,
            },
            _ => None,
        },
        _ => None,
    }
}

fn is_one(tree: &SyntaxTree, expr: NodeId) -> bool {
    let expr = tree.skip_parens(expr);
    matches!(
        tree.syntax(expr),
        Syntax::Literal {
            kind: LiteralKind::Int | LiteralKind::Long
        }
    ) && matches!(tree.text(expr), "1" | "1L" | "1l")
}

/// The comparison as `counter OP bound`, flipping it when the counter is
/// on the right
fn counter_comparison(
    model: &dyn SemanticModel,
    condition: NodeId,
    counter: NodeId,
) -> Option<(OperatorToken, NodeId)> {
    let tree = model.tree();
    let Syntax::Polyadic { op, operands } = tree.syntax(tree.skip_parens(condition)) else {
        return None;
    };
    if !op.is_comparison() {
        return None;
    }
    let [left, right] = operands.as_slice() else {
        return None;
    };
    if refers_to(model, tree.skip_parens(*left), counter) {
        Some((*op, *right))
    } else if refers_to(model, tree.skip_parens(*right), counter) {
        Some((op.flipped()?, *left))
    } else {
        None
    }
}

/// Whether the bound's value can be held by the counter. Unknown bound
/// types are accepted; integer constants may narrow to `byte`, `short` and
/// `char` counters when the value is in range, as in a Java assignment.
fn bound_fits(model: &dyn SemanticModel, counter_type: PrimitiveType, bound: NodeId) -> bool {
    let Some(bound_type) = model.type_of(bound) else {
        return true;
    };
    if JavaType::primitive(counter_type).is_assignment_compatible(&bound_type) {
        return true;
    }
    let range = match counter_type {
        PrimitiveType::Byte => i64::from(i8::MIN)..=i64::from(i8::MAX),
        PrimitiveType::Short => i64::from(i16::MIN)..=i64::from(i16::MAX),
        PrimitiveType::Char => 0..=i64::from(u16::MAX),
        _ => return false,
    };
    int_constant(model.tree(), bound).is_some_and(|value| range.contains(&value))
}

/// Value of an `int` literal, optionally negated
fn int_constant(tree: &SyntaxTree, expr: NodeId) -> Option<i64> {
    let expr = tree.skip_parens(expr);
    match tree.syntax(expr) {
        Syntax::Literal {
            kind: LiteralKind::Int,
        } => parse_int_literal(tree.text(expr)),
        Syntax::Prefix {
            op: PrefixOp::Minus,
            operand,
        } => int_constant(tree, *operand).map(|v| -v),
        _ => None,
    }
}

fn parse_int_literal(text: &str) -> Option<i64> {
    let digits: String = text.chars().filter(|&c| c != '_').collect();
    let lower = digits.to_ascii_lowercase();
    let (radix, body) = if let Some(hex) = lower.strip_prefix("0x") {
        (16, hex)
    } else if let Some(bin) = lower.strip_prefix("0b") {
        (2, bin)
    } else if lower.len() > 1 && lower.starts_with('0') {
        (8, &lower[1..])
    } else {
        (10, lower.as_str())
    };
    i64::from_str_radix(body, radix).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SemaConfig;
    use crate::semantics::LocalSemantics;
    use crate::syntax::parse_java;

    fn recognize_in(params: &str, loop_text: &str) -> Option<(CountingLoop, String, String)> {
        let source = format!("class A {{ void f({params}) {{ {loop_text} }} }}");
        let tree = parse_java(&source).unwrap();
        let config = SemaConfig::default();
        let model = LocalSemantics::new(&tree, &config);
        let node = tree.find_by_text(loop_text).unwrap();
        CountingLoop::recognize(&model, node).map(|l| {
            let init = tree.text(l.initializer()).to_string();
            let bound = tree.text(l.bound()).to_string();
            (l, init, bound)
        })
    }

    #[test]
    fn test_ascending_exclusive() {
        let (l, init, bound) = recognize_in("", "for (int i = 0; i < 10; i++) {}").unwrap();
        assert_eq!(l.counter_name(), "i");
        assert_eq!(init, "0");
        assert_eq!(bound, "10");
        assert!(!l.is_inclusive());
        assert_eq!(l.direction(), Direction::Ascending);
        assert!(!l.may_overflow());
        assert_eq!(l.counter_type(), PrimitiveType::Int);
    }

    #[test]
    fn test_descending_inclusive() {
        let (l, _, _) = recognize_in("", "for (long i = 10; i >= 0; i--) {}").unwrap();
        assert!(l.is_descending());
        assert!(l.is_inclusive());
        assert_eq!(l.counter_type(), PrimitiveType::Long);
    }

    #[test]
    fn test_not_equal_may_overflow() {
        let (l, _, _) = recognize_in("", "for (int i = 0; i != 10; i++) {}").unwrap();
        assert!(l.may_overflow());
        assert_eq!(l.direction(), Direction::Ascending);
    }

    #[test]
    fn test_non_unit_step_is_rejected() {
        assert!(recognize_in("", "for (int i = 0; i < 10; i += 2) {}").is_none());
    }

    #[test]
    fn test_update_forms() {
        for update in ["i++", "++i", "i += 1", "i = i + 1", "i = 1 + i"] {
            let text = format!("for (int i = 0; i < n; {update}) {{}}");
            let (l, _, bound) = recognize_in("int n", &text).unwrap();
            assert_eq!(l.direction(), Direction::Ascending, "{update}");
            assert_eq!(bound, "n");
        }
        for update in ["i--", "--i", "i -= 1", "i = i - 1"] {
            let text = format!("for (int i = n; i > 0; {update}) {{}}");
            assert!(recognize_in("int n", &text).unwrap().0.is_descending(), "{update}");
        }
        assert!(recognize_in("int n", "for (int i = n; i > 0; i = 1 - i) {}").is_none());
    }

    #[test]
    fn test_counter_on_right_is_flipped() {
        let (l, _, bound) = recognize_in("int n", "for (int i = 0; n > i; i++) {}").unwrap();
        assert_eq!(l.direction(), Direction::Ascending);
        assert!(!l.is_inclusive());
        assert_eq!(bound, "n");
    }

    #[test]
    fn test_direction_must_match_step() {
        assert!(recognize_in("", "for (int i = 0; i < 10; i--) {}").is_none());
        assert!(recognize_in("", "for (int i = 0; i == 10; i++) {}").is_none());
    }

    #[test]
    fn test_counter_type_rules() {
        assert!(recognize_in("", "for (var i = 0; i < 10; i++) {}").is_some());
        assert!(recognize_in("", "for (double d = 0; d < 10; d++) {}").is_none());
        assert!(recognize_in("long n", "for (int i = 0; i < n; i++) {}").is_none());
        assert!(recognize_in("int n", "for (long i = 0; i < n; i++) {}").is_some());
        assert!(recognize_in("", "for (byte b = 0; b < 10; b++) {}").is_some());
    }

    #[test]
    fn test_int_literal_values() {
        assert_eq!(parse_int_literal("1_000"), Some(1000));
        assert_eq!(parse_int_literal("0x7F"), Some(127));
        assert_eq!(parse_int_literal("0b101"), Some(5));
        assert_eq!(parse_int_literal("017"), Some(15));
        assert_eq!(parse_int_literal("0"), Some(0));
    }

    #[test]
    fn test_narrowed_bound_must_be_in_range() {
        assert!(recognize_in("", "for (byte b = 0; b <= 127; b++) {}").is_some());
        assert!(recognize_in("", "for (byte b = 0; b < 128; b++) {}").is_none());
        assert!(recognize_in("", "for (byte b = 0; b > -128; b--) {}").is_some());
        assert!(recognize_in("", "for (short s = 0; s < 0x8000; s++) {}").is_none());
        assert!(recognize_in("", "for (char c = 0; c < 65535; c++) {}").is_some());
        assert!(recognize_in("", "for (char c = 0; c > -1; c--) {}").is_none());
    }

    #[test]
    fn test_counter_reassigned_in_body() {
        assert!(recognize_in("", "for (int i = 0; i < 10; i++) { i = 3; }").is_none());
        assert!(recognize_in("", "for (int i = 0; i < 10; i++) { int j = i; j++; }").is_some());
    }

    #[test]
    fn test_rejected_shapes() {
        assert!(recognize_in("", "for (int i = 0, j = 0; i < 10; i++) {}").is_none());
        assert!(recognize_in("", "for (int i = 0; i < 10; i++, g()) {}").is_none());
        assert!(recognize_in("int[] xs", "for (int i = 0; i < xs[i]; i++) {}").is_none());
        assert!(recognize_in("", "for (int i = 0; ; i++) {}").is_none());
        assert!(recognize_in("int[] xs", "for (int x : xs) {}").is_none());
    }
}
