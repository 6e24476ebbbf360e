//! Static types of expressions
//!
//! Typing is best effort: anything that depends on declarations outside the
//! compilation unit is `None` unless a small table of well-known library
//! methods covers it.

use super::{Declaration, SemanticModel};
use crate::core::{JavaType, PrimitiveType};
use crate::syntax::{LiteralKind, NodeId, OperatorToken, PrefixOp, Syntax};

/// Result types of common library methods, by method name
fn library_return_type(name: &str) -> Option<JavaType> {
    let primitive = match name {
        "equals" | "equalsIgnoreCase" | "isEmpty" | "isBlank" | "contains" | "containsKey"
        | "containsValue" | "startsWith" | "endsWith" | "matches" | "hasNext" | "isPresent"
        | "anyMatch" | "allMatch" | "noneMatch" => PrimitiveType::Boolean,
        "size" | "length" | "hashCode" | "compareTo" | "compareToIgnoreCase" | "indexOf"
        | "lastIndexOf" | "ordinal" => PrimitiveType::Int,
        "charAt" => PrimitiveType::Char,
        "toString" | "name" | "trim" | "strip" | "substring" | "toLowerCase" | "toUpperCase" => {
            return Some(JavaType::string())
        }
        _ => return None,
    };
    Some(JavaType::primitive(primitive))
}

pub fn infer_type<M: SemanticModel + ?Sized>(model: &M, node: NodeId) -> Option<JavaType> {
    let tree = model.tree();
    match tree.syntax(node) {
        Syntax::Literal { kind } => Some(match kind {
            LiteralKind::Int => JavaType::primitive(PrimitiveType::Int),
            LiteralKind::Long => JavaType::primitive(PrimitiveType::Long),
            LiteralKind::Float => JavaType::primitive(PrimitiveType::Float),
            LiteralKind::Double => JavaType::primitive(PrimitiveType::Double),
            LiteralKind::Char => JavaType::primitive(PrimitiveType::Char),
            LiteralKind::Boolean(_) => JavaType::primitive(PrimitiveType::Boolean),
            LiteralKind::String => JavaType::string(),
            LiteralKind::Null => JavaType::Null,
        }),
        Syntax::Name { .. } => match model.resolve(node)? {
            Declaration::Variable(var) => known(var.ty),
            _ => None,
        },
        Syntax::FieldAccess { object, field } => {
            if field == "length"
                && matches!(model.type_of(*object), Some(JavaType::Array { .. }))
            {
                return Some(JavaType::primitive(PrimitiveType::Int));
            }
            match model.resolve(node)? {
                Declaration::Variable(var) => known(var.ty),
                _ => None,
            }
        }
        Syntax::MethodCall { name, .. } => {
            let declared = match model.resolve(node) {
                Some(Declaration::Method(method)) => method.node.and_then(|m| match tree.syntax(m) {
                    Syntax::Method {
                        return_type: Some(ty),
                        ..
                    } => known(ty.clone()),
                    _ => None,
                }),
                _ => None,
            };
            declared.or_else(|| library_return_type(name))
        }
        Syntax::This => match model.resolve(node)? {
            Declaration::Class(class) => Some(JavaType::class(class.qualified_name)),
            _ => None,
        },
        Syntax::Parenthesized { inner } => model.type_of(*inner),
        Syntax::Cast { ty, .. } => known(ty.clone()),
        Syntax::New { ty, .. } => known(ty.clone()),
        Syntax::NewArray { ty, .. } => known(ty.clone()),
        Syntax::ClassLiteral { .. } => Some(JavaType::class("java.lang.Class")),
        Syntax::InstanceOf { .. } => Some(JavaType::primitive(PrimitiveType::Boolean)),
        Syntax::Prefix { op, operand } => match op {
            PrefixOp::Not => Some(JavaType::primitive(PrimitiveType::Boolean)),
            PrefixOp::Inc | PrefixOp::Dec => model.type_of(*operand),
            PrefixOp::Minus | PrefixOp::Plus | PrefixOp::BitNot => model
                .type_of(*operand)?
                .unboxed()?
                .promote_unary()
                .map(JavaType::primitive),
        },
        Syntax::Postfix { operand, .. } => model.type_of(*operand),
        Syntax::Assignment { target, .. } => model.type_of(*target),
        Syntax::ArrayAccess { array, .. } => match model.type_of(*array)? {
            JavaType::Array { element } => known(*element),
            _ => None,
        },
        Syntax::Conditional {
            then_expr,
            else_expr,
            ..
        } => {
            let then_ty = model.type_of(*then_expr);
            let else_ty = model.type_of(*else_expr);
            match (then_ty, else_ty) {
                (Some(a), Some(b)) if a == b => Some(a),
                (Some(a), Some(b)) => match (a.unboxed(), b.unboxed()) {
                    (Some(x), Some(y)) if x.is_numeric() && y.is_numeric() => {
                        x.promote(y).map(JavaType::primitive)
                    }
                    _ if a == JavaType::Null => Some(b),
                    _ => Some(a),
                },
                (Some(a), None) | (None, Some(a)) => Some(a),
                (None, None) => None,
            }
        }
        Syntax::Polyadic { op, operands } => polyadic_type(model, *op, operands),
        _ => None,
    }
}

fn known(ty: JavaType) -> Option<JavaType> {
    match ty {
        JavaType::Unknown | JavaType::Var => None,
        other => Some(other),
    }
}

fn polyadic_type<M: SemanticModel + ?Sized>(
    model: &M,
    op: OperatorToken,
    operands: &[NodeId],
) -> Option<JavaType> {
    if op.is_comparison() || op.is_logical() {
        return Some(JavaType::primitive(PrimitiveType::Boolean));
    }
    let types: Vec<Option<JavaType>> = operands.iter().map(|&o| model.type_of(o)).collect();
    match op {
        OperatorToken::Add if types.iter().flatten().any(JavaType::is_string) => {
            Some(JavaType::string())
        }
        OperatorToken::BitAnd | OperatorToken::BitOr | OperatorToken::BitXor
            if types.iter().flatten().any(JavaType::is_boolean) =>
        {
            Some(JavaType::primitive(PrimitiveType::Boolean))
        }
        OperatorToken::Shl | OperatorToken::Shr | OperatorToken::UShr => types
            .first()?
            .as_ref()?
            .unboxed()?
            .promote_unary()
            .map(JavaType::primitive),
        _ => {
            let mut result: Option<PrimitiveType> = None;
            for ty in types {
                let primitive = ty?.unboxed()?;
                result = Some(match result {
                    None => primitive.promote_unary()?,
                    Some(acc) => acc.promote(primitive)?,
                });
            }
            result.map(JavaType::primitive)
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::SemaConfig;
    use crate::core::JavaType;
    use crate::semantics::{LocalSemantics, SemanticModel};
    use crate::syntax::parse_java;

    fn type_in_method(params: &str, expr: &str) -> Option<JavaType> {
        let source = format!("class A {{ Object f({params}) {{ return {expr}; }} }}");
        let tree = parse_java(&source).unwrap();
        let config = SemaConfig::default();
        let model = LocalSemantics::new(&tree, &config);
        let node = tree.find_by_text(expr).unwrap();
        model.type_of(node)
    }

    #[test]
    fn test_numeric_promotion() {
        assert_eq!(type_in_method("byte b, short s", "b + s"), Some(JavaType::parse("int")));
        assert_eq!(type_in_method("int i, long l", "i * l"), Some(JavaType::parse("long")));
        assert_eq!(type_in_method("int i, Double d", "i - d"), Some(JavaType::parse("double")));
    }

    #[test]
    fn test_string_concatenation() {
        assert_eq!(type_in_method("int i", "\"n=\" + i"), Some(JavaType::string()));
    }

    #[test]
    fn test_boolean_operators() {
        assert_eq!(type_in_method("int a, int b", "a < b"), Some(JavaType::parse("boolean")));
        assert_eq!(type_in_method("boolean a, boolean b", "a & b"), Some(JavaType::parse("boolean")));
        assert_eq!(type_in_method("int a, int b", "a & b"), Some(JavaType::parse("int")));
    }

    #[test]
    fn test_array_length_and_access() {
        assert_eq!(type_in_method("long[] xs", "xs.length"), Some(JavaType::parse("int")));
        assert_eq!(type_in_method("long[] xs", "xs[0]"), Some(JavaType::parse("long")));
    }

    #[test]
    fn test_unknown_names_have_no_type() {
        assert_eq!(type_in_method("", "undefinedThing"), None);
    }
}
