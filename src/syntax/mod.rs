//! Closed syntax model for Java compilation units
//!
//! A [`SyntaxTree`] is an arena of [`Node`]s. Every node carries one
//! [`Syntax`] variant, its byte span in the source, and a non-owning parent
//! index. Trees are immutable once built; rewrites are expressed as text
//! edits against the source (see [`edits`]).

pub mod edits;
pub mod navigation;
pub mod operators;
pub mod parser;

use crate::core::JavaType;
use operators::precedence;
use serde::Serialize;

pub use operators::{AssignOp, OperatorToken, PostfixOp, PrefixOp};
pub use parser::parse_java;

/// Index of a node inside its [`SyntaxTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Half-open byte range into the source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn contains(&self, other: Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Annotation {
    /// Name as written, e.g. `Contract` or `org.jetbrains.annotations.Contract`
    pub name: String,
    /// Raw text between the parentheses, if any
    pub arguments: Option<String>,
}

impl Annotation {
    pub fn simple_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Modifiers {
    pub is_public: bool,
    pub is_private: bool,
    pub is_protected: bool,
    pub is_static: bool,
    pub is_final: bool,
    pub is_abstract: bool,
    pub is_volatile: bool,
    pub is_default: bool,
    pub annotations: Vec<Annotation>,
}

impl Modifiers {
    pub fn annotation(&self, simple_name: &str) -> Option<&Annotation> {
        self.annotations
            .iter()
            .find(|a| a.simple_name() == simple_name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassKind {
    Class,
    Interface,
    Enum,
    Record,
    Annotation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LiteralKind {
    Int,
    Long,
    Float,
    Double,
    Char,
    String,
    Boolean(bool),
    Null,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Import {
    pub path: String,
    pub is_static: bool,
    pub is_wildcard: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Comment {
    pub span: Span,
    pub is_line: bool,
}

/// One syntactic construct. Child links are [`NodeId`]s into the same tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Syntax {
    CompilationUnit {
        package: Option<String>,
        imports: Vec<Import>,
        types: Vec<NodeId>,
    },
    Class {
        kind: ClassKind,
        name: String,
        modifiers: Modifiers,
        superclass: Option<JavaType>,
        interfaces: Vec<JavaType>,
        members: Vec<NodeId>,
    },
    /// Body of an anonymous class, owned by a `New` node
    AnonymousClass { members: Vec<NodeId> },
    /// Method or constructor declaration; `return_type` is `None` for constructors
    Method {
        name: String,
        modifiers: Modifiers,
        return_type: Option<JavaType>,
        params: Vec<NodeId>,
        body: Option<NodeId>,
    },
    Parameter {
        name: String,
        ty: JavaType,
        modifiers: Modifiers,
        varargs: bool,
    },
    Field {
        modifiers: Modifiers,
        ty: JavaType,
        declarators: Vec<NodeId>,
    },
    Initializer { is_static: bool, body: NodeId },
    Block { statements: Vec<NodeId> },
    LocalVariable {
        ty: JavaType,
        modifiers: Modifiers,
        declarators: Vec<NodeId>,
    },
    Declarator {
        name: String,
        dims: usize,
        init: Option<NodeId>,
    },
    ExpressionStatement { expr: NodeId },
    If {
        condition: NodeId,
        then_branch: NodeId,
        else_branch: Option<NodeId>,
    },
    While { condition: NodeId, body: NodeId },
    DoWhile { body: NodeId, condition: NodeId },
    For {
        init: Vec<NodeId>,
        condition: Option<NodeId>,
        update: Vec<NodeId>,
        body: NodeId,
    },
    ForEach {
        variable: NodeId,
        iterable: NodeId,
        body: NodeId,
    },
    Labeled { label: String, body: NodeId },
    Break { label: Option<String> },
    Continue { label: Option<String> },
    Return { value: Option<NodeId> },
    Yield { value: NodeId },
    Throw { value: NodeId },
    Try {
        resources: Vec<NodeId>,
        body: NodeId,
        catches: Vec<NodeId>,
        finally: Option<NodeId>,
    },
    Catch { parameter: NodeId, body: NodeId },
    Switch {
        selector: NodeId,
        arms: Vec<NodeId>,
        is_expression: bool,
    },
    /// Old-style `case X:` arm with its statements
    SwitchGroup {
        labels: Vec<NodeId>,
        statements: Vec<NodeId>,
    },
    /// Arrow-style `case X ->` arm
    SwitchRule { labels: Vec<NodeId>, body: NodeId },
    SwitchLabel {
        values: Vec<NodeId>,
        guard: Option<NodeId>,
        is_default: bool,
    },
    Synchronized { lock: NodeId, body: NodeId },
    Assert {
        condition: NodeId,
        message: Option<NodeId>,
    },
    Empty,
    /// `this(...)` or `super(...)` at the start of a constructor
    ConstructorCall {
        is_super: bool,
        qualifier: Option<NodeId>,
        args: Vec<NodeId>,
    },
    Literal { kind: LiteralKind },
    Name { name: String },
    This,
    Super,
    FieldAccess { object: NodeId, field: String },
    ArrayAccess { array: NodeId, index: NodeId },
    MethodCall {
        object: Option<NodeId>,
        name: String,
        args: Vec<NodeId>,
    },
    New {
        ty: JavaType,
        qualifier: Option<NodeId>,
        args: Vec<NodeId>,
        body: Option<NodeId>,
    },
    NewArray {
        ty: JavaType,
        dimensions: Vec<NodeId>,
        init: Option<NodeId>,
    },
    ArrayInit { elements: Vec<NodeId> },
    Assignment {
        op: AssignOp,
        target: NodeId,
        value: NodeId,
    },
    /// Binary operator application; same-operator chains of associative
    /// operators hold more than two operands
    Polyadic {
        op: OperatorToken,
        operands: Vec<NodeId>,
    },
    Prefix { op: PrefixOp, operand: NodeId },
    Postfix { op: PostfixOp, operand: NodeId },
    Parenthesized { inner: NodeId },
    Conditional {
        condition: NodeId,
        then_expr: NodeId,
        else_expr: NodeId,
    },
    InstanceOf {
        operand: NodeId,
        ty: JavaType,
        bindings: Vec<NodeId>,
    },
    PatternVariable { name: String, ty: JavaType },
    Cast { ty: JavaType, operand: NodeId },
    Lambda { params: Vec<NodeId>, body: NodeId },
    MethodReference,
    ClassLiteral { ty: JavaType },
    /// Constructs without a model of their own; children are kept so walks
    /// still see nested expressions
    Other {
        kind: String,
        children: Vec<NodeId>,
    },
}

impl Syntax {
    /// Direct children in source order
    pub fn children(&self) -> Vec<NodeId> {
        fn opt(id: &Option<NodeId>) -> impl Iterator<Item = NodeId> + '_ {
            id.iter().copied()
        }
        match self {
            Syntax::CompilationUnit { types, .. } => types.clone(),
            Syntax::Class { members, .. } | Syntax::AnonymousClass { members } => members.clone(),
            Syntax::Method { params, body, .. } => {
                params.iter().copied().chain(opt(body)).collect()
            }
            Syntax::Field { declarators, .. } | Syntax::LocalVariable { declarators, .. } => {
                declarators.clone()
            }
            Syntax::Initializer { body, .. } => vec![*body],
            Syntax::Block { statements } => statements.clone(),
            Syntax::Declarator { init, .. } => opt(init).collect(),
            Syntax::ExpressionStatement { expr } => vec![*expr],
            Syntax::If {
                condition,
                then_branch,
                else_branch,
            } => [*condition, *then_branch]
                .into_iter()
                .chain(opt(else_branch))
                .collect(),
            Syntax::While { condition, body } => vec![*condition, *body],
            Syntax::DoWhile { body, condition } => vec![*body, *condition],
            Syntax::For {
                init,
                condition,
                update,
                body,
            } => init
                .iter()
                .copied()
                .chain(opt(condition))
                .chain(update.iter().copied())
                .chain(std::iter::once(*body))
                .collect(),
            Syntax::ForEach {
                variable,
                iterable,
                body,
            } => vec![*variable, *iterable, *body],
            Syntax::Labeled { body, .. } => vec![*body],
            Syntax::Return { value } => opt(value).collect(),
            Syntax::Yield { value } | Syntax::Throw { value } => vec![*value],
            Syntax::Try {
                resources,
                body,
                catches,
                finally,
            } => resources
                .iter()
                .copied()
                .chain(std::iter::once(*body))
                .chain(catches.iter().copied())
                .chain(opt(finally))
                .collect(),
            Syntax::Catch { parameter, body } => vec![*parameter, *body],
            Syntax::Switch { selector, arms, .. } => {
                std::iter::once(*selector).chain(arms.iter().copied()).collect()
            }
            Syntax::SwitchGroup { labels, statements } => {
                labels.iter().chain(statements.iter()).copied().collect()
            }
            Syntax::SwitchRule { labels, body } => labels
                .iter()
                .copied()
                .chain(std::iter::once(*body))
                .collect(),
            Syntax::SwitchLabel { values, guard, .. } => {
                values.iter().copied().chain(opt(guard)).collect()
            }
            Syntax::Synchronized { lock, body } => vec![*lock, *body],
            Syntax::Assert { condition, message } => {
                std::iter::once(*condition).chain(opt(message)).collect()
            }
            Syntax::ConstructorCall {
                qualifier, args, ..
            } => opt(qualifier).chain(args.iter().copied()).collect(),
            Syntax::FieldAccess { object, .. } => vec![*object],
            Syntax::ArrayAccess { array, index } => vec![*array, *index],
            Syntax::MethodCall { object, args, .. } => {
                opt(object).chain(args.iter().copied()).collect()
            }
            Syntax::New {
                qualifier,
                args,
                body,
                ..
            } => opt(qualifier)
                .chain(args.iter().copied())
                .chain(opt(body))
                .collect(),
            Syntax::NewArray {
                dimensions, init, ..
            } => dimensions.iter().copied().chain(opt(init)).collect(),
            Syntax::ArrayInit { elements } => elements.clone(),
            Syntax::Assignment { target, value, .. } => vec![*target, *value],
            Syntax::Polyadic { operands, .. } => operands.clone(),
            Syntax::Prefix { operand, .. } | Syntax::Postfix { operand, .. } => vec![*operand],
            Syntax::Parenthesized { inner } => vec![*inner],
            Syntax::Conditional {
                condition,
                then_expr,
                else_expr,
            } => vec![*condition, *then_expr, *else_expr],
            Syntax::InstanceOf {
                operand, bindings, ..
            } => std::iter::once(*operand)
                .chain(bindings.iter().copied())
                .collect(),
            Syntax::Cast { operand, .. } => vec![*operand],
            Syntax::Lambda { params, body } => params
                .iter()
                .copied()
                .chain(std::iter::once(*body))
                .collect(),
            Syntax::Other { children, .. } => children.clone(),
            Syntax::Parameter { .. }
            | Syntax::Break { .. }
            | Syntax::Continue { .. }
            | Syntax::Empty
            | Syntax::Literal { .. }
            | Syntax::Name { .. }
            | Syntax::This
            | Syntax::Super
            | Syntax::PatternVariable { .. }
            | Syntax::MethodReference
            | Syntax::ClassLiteral { .. } => Vec::new(),
        }
    }

    /// Stable lowercase name of the variant, used in diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self {
            Syntax::CompilationUnit { .. } => "compilation unit",
            Syntax::Class { .. } => "class",
            Syntax::AnonymousClass { .. } => "anonymous class",
            Syntax::Method { .. } => "method",
            Syntax::Parameter { .. } => "parameter",
            Syntax::Field { .. } => "field",
            Syntax::Initializer { .. } => "initializer",
            Syntax::Block { .. } => "block",
            Syntax::LocalVariable { .. } => "local variable",
            Syntax::Declarator { .. } => "declarator",
            Syntax::ExpressionStatement { .. } => "expression statement",
            Syntax::If { .. } => "if",
            Syntax::While { .. } => "while",
            Syntax::DoWhile { .. } => "do-while",
            Syntax::For { .. } => "for",
            Syntax::ForEach { .. } => "for-each",
            Syntax::Labeled { .. } => "labeled statement",
            Syntax::Break { .. } => "break",
            Syntax::Continue { .. } => "continue",
            Syntax::Return { .. } => "return",
            Syntax::Yield { .. } => "yield",
            Syntax::Throw { .. } => "throw",
            Syntax::Try { .. } => "try",
            Syntax::Catch { .. } => "catch",
            Syntax::Switch {
                is_expression: true,
                ..
            } => "switch expression",
            Syntax::Switch { .. } => "switch statement",
            Syntax::SwitchGroup { .. } => "switch group",
            Syntax::SwitchRule { .. } => "switch rule",
            Syntax::SwitchLabel { .. } => "switch label",
            Syntax::Synchronized { .. } => "synchronized",
            Syntax::Assert { .. } => "assert",
            Syntax::Empty => "empty statement",
            Syntax::ConstructorCall { .. } => "constructor call",
            Syntax::Literal { .. } => "literal",
            Syntax::Name { .. } => "name",
            Syntax::This => "this",
            Syntax::Super => "super",
            Syntax::FieldAccess { .. } => "field access",
            Syntax::ArrayAccess { .. } => "array access",
            Syntax::MethodCall { .. } => "method call",
            Syntax::New { .. } => "new",
            Syntax::NewArray { .. } => "new array",
            Syntax::ArrayInit { .. } => "array initializer",
            Syntax::Assignment { .. } => "assignment",
            Syntax::Polyadic { .. } => "binary expression",
            Syntax::Prefix { .. } => "prefix expression",
            Syntax::Postfix { .. } => "postfix expression",
            Syntax::Parenthesized { .. } => "parenthesized expression",
            Syntax::Conditional { .. } => "conditional",
            Syntax::InstanceOf { .. } => "instanceof",
            Syntax::PatternVariable { .. } => "pattern variable",
            Syntax::Cast { .. } => "cast",
            Syntax::Lambda { .. } => "lambda",
            Syntax::MethodReference => "method reference",
            Syntax::ClassLiteral { .. } => "class literal",
            Syntax::Other { .. } => "other",
        }
    }

    pub fn is_expression(&self) -> bool {
        matches!(
            self,
            Syntax::Literal { .. }
                | Syntax::Name { .. }
                | Syntax::This
                | Syntax::Super
                | Syntax::FieldAccess { .. }
                | Syntax::ArrayAccess { .. }
                | Syntax::MethodCall { .. }
                | Syntax::New { .. }
                | Syntax::NewArray { .. }
                | Syntax::ArrayInit { .. }
                | Syntax::Assignment { .. }
                | Syntax::Polyadic { .. }
                | Syntax::Prefix { .. }
                | Syntax::Postfix { .. }
                | Syntax::Parenthesized { .. }
                | Syntax::Conditional { .. }
                | Syntax::InstanceOf { .. }
                | Syntax::Cast { .. }
                | Syntax::Lambda { .. }
                | Syntax::MethodReference
                | Syntax::ClassLiteral { .. }
                | Syntax::Switch {
                    is_expression: true,
                    ..
                }
        )
    }

    pub fn is_loop(&self) -> bool {
        matches!(
            self,
            Syntax::While { .. } | Syntax::DoWhile { .. } | Syntax::For { .. } | Syntax::ForEach { .. }
        )
    }

    /// Declarations that no expression-level analysis accepts as a root
    pub fn is_declaration(&self) -> bool {
        matches!(
            self,
            Syntax::CompilationUnit { .. }
                | Syntax::Class { .. }
                | Syntax::AnonymousClass { .. }
                | Syntax::Method { .. }
                | Syntax::Field { .. }
                | Syntax::Initializer { .. }
                | Syntax::Parameter { .. }
        )
    }

    /// Binding strength when printed; lower binds tighter. Non-expressions
    /// report [`precedence::NUM_PRECEDENCES`].
    pub fn precedence(&self) -> u8 {
        match self {
            Syntax::Literal { .. }
            | Syntax::Name { .. }
            | Syntax::This
            | Syntax::Super
            | Syntax::ClassLiteral { .. }
            | Syntax::ArrayAccess { .. }
            | Syntax::ArrayInit { .. }
            | Syntax::Parenthesized { .. } => precedence::PARENTHESIZED,
            Syntax::FieldAccess { .. }
            | Syntax::MethodCall { .. }
            | Syntax::New { .. }
            | Syntax::NewArray { .. }
            | Syntax::MethodReference => precedence::METHOD_CALL,
            Syntax::Postfix { .. } => precedence::POSTFIX,
            Syntax::Prefix { .. } => precedence::PREFIX,
            Syntax::Cast { .. } => precedence::TYPE_CAST,
            Syntax::Polyadic { op, .. } => op.precedence(),
            Syntax::InstanceOf { .. } => precedence::RELATIONAL,
            Syntax::Conditional { .. } => precedence::CONDITIONAL,
            Syntax::Assignment { .. } => precedence::ASSIGNMENT,
            Syntax::Lambda { .. } => precedence::LAMBDA,
            Syntax::Switch {
                is_expression: true,
                ..
            } => precedence::METHOD_CALL,
            _ => precedence::NUM_PRECEDENCES,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub syntax: Syntax,
    pub span: Span,
    pub parent: Option<NodeId>,
}

/// Immutable arena of lowered nodes plus the source they were lowered from
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    source: String,
    nodes: Vec<Node>,
    root: NodeId,
    comments: Vec<Comment>,
}

impl SyntaxTree {
    pub(crate) fn from_parts(
        source: String,
        nodes: Vec<Node>,
        root: NodeId,
        comments: Vec<Comment>,
    ) -> Self {
        Self {
            source,
            nodes,
            root,
            comments,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn syntax(&self, id: NodeId) -> &Syntax {
        &self.node(id).syntax
    }

    pub fn span(&self, id: NodeId) -> Span {
        self.node(id).span
    }

    pub fn text(&self, id: NodeId) -> &str {
        let span = self.span(id);
        &self.source[span.start..span.end]
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.syntax(id).children()
    }

    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    pub fn comment_text(&self, comment: &Comment) -> &str {
        &self.source[comment.span.start..comment.span.end]
    }

    /// Strict ancestors, nearest first
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&current| self.parent(current))
    }

    /// Whether `ancestor` is `node` or lies above it
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        ancestor == node || self.ancestors(node).any(|a| a == ancestor)
    }

    /// `id` and everything below it, pre-order
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            out.push(current);
            let mut children = self.children(current);
            children.reverse();
            stack.extend(children);
        }
        out
    }

    /// Strip any number of enclosing parentheses, downwards
    pub fn skip_parens(&self, mut id: NodeId) -> NodeId {
        while let Syntax::Parenthesized { inner } = self.syntax(id) {
            id = *inner;
        }
        id
    }

    /// First parent that is not a parenthesized expression
    pub fn parent_skipping_parens(&self, id: NodeId) -> Option<NodeId> {
        self.ancestors(id)
            .find(|&a| !matches!(self.syntax(a), Syntax::Parenthesized { .. }))
    }

    /// Outermost node, in source order, whose text is exactly `text`
    pub fn find_by_text(&self, text: &str) -> Option<NodeId> {
        self.find(|tree, id| tree.text(id) == text)
    }

    /// First node in pre-order matching the predicate
    pub fn find(&self, predicate: impl Fn(&SyntaxTree, NodeId) -> bool) -> Option<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .find(|&id| predicate(self, id))
    }

    pub fn find_all(&self, predicate: impl Fn(&SyntaxTree, NodeId) -> bool) -> Vec<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .filter(|&id| predicate(self, id))
            .collect()
    }

    /// 1-based line of the node's first byte
    pub fn line_of(&self, id: NodeId) -> usize {
        let start = self.span(id).start;
        self.source[..start].bytes().filter(|&b| b == b'\n').count() + 1
    }

    /// Statements of a block or switch group, empty for anything else
    pub fn statements_of(&self, id: NodeId) -> &[NodeId] {
        match self.syntax(id) {
            Syntax::Block { statements } | Syntax::SwitchGroup { statements, .. } => statements,
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree(source: &str) -> SyntaxTree {
        parse_java(source).unwrap()
    }

    #[test]
    fn test_parent_links_point_back() {
        let t = tree("class A { void f() { int x = 1 + 2; } }");
        for id in t.descendants(t.root()) {
            for child in t.children(id) {
                assert_eq!(t.parent(child), Some(id), "child of {}", t.syntax(id).kind_name());
            }
        }
    }

    #[test]
    fn test_find_by_text_prefers_outermost() {
        let t = tree("class A { boolean f(boolean a) { return (a); } }");
        let found = t.find_by_text("(a)").unwrap();
        assert!(matches!(t.syntax(found), Syntax::Parenthesized { .. }));
        assert!(matches!(t.syntax(t.skip_parens(found)), Syntax::Name { .. }));
    }

    #[test]
    fn test_line_of() {
        let t = tree("class A {\n  void f() {\n    g();\n  }\n}");
        let call = t.find_by_text("g()").unwrap();
        assert_eq!(t.line_of(call), 3);
    }

    #[test]
    fn test_ancestors_and_is_ancestor() {
        let t = tree("class A { void f() { if (true) { g(); } } }");
        let call = t.find_by_text("g()").unwrap();
        let if_stmt = t
            .find(|t, id| matches!(t.syntax(id), Syntax::If { .. }))
            .unwrap();
        assert!(t.is_ancestor(if_stmt, call));
        assert!(!t.is_ancestor(call, if_stmt));
        assert_eq!(t.ancestors(call).last(), Some(t.root()));
    }
}
