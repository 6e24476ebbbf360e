//! Tree-sitter integration for Java
//!
//! Parses source with the tree-sitter-java grammar and lowers the concrete
//! syntax tree into the closed [`Syntax`] model. Grammar nodes the analyses
//! have no model for become [`Syntax::Other`] with their children kept.

use super::operators::{AssignOp, OperatorToken, PostfixOp, PrefixOp};
use super::{
    Annotation, ClassKind, Comment, Import, LiteralKind, Modifiers, Node, NodeId, Span, Syntax,
    SyntaxTree,
};
use crate::core::JavaType;
use crate::errors::{Result, SemaError};
use tree_sitter::{Node as TsNode, Parser};

/// Parse a Java compilation unit
pub fn parse_java(source: &str) -> Result<SyntaxTree> {
    let _span = tracing::debug_span!("parse_java", bytes = source.len()).entered();

    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_java::LANGUAGE.into())
        .map_err(|e| SemaError::Language(e.to_string()))?;

    let tree = parser
        .parse(source, None)
        .ok_or_else(|| SemaError::parse("parser produced no tree", None))?;

    let root = tree.root_node();
    if root.has_error() {
        let line = first_error(root).map(|node| node.start_position().row + 1);
        return Err(SemaError::parse("source contains syntax errors", line));
    }

    let mut lowering = Lowering::new(source);
    lowering.collect_comments(root);
    let root_id = lowering.program(root);
    log::debug!(
        "Lowered {} nodes and {} comments",
        lowering.nodes.len(),
        lowering.comments.len()
    );
    Ok(SyntaxTree::from_parts(
        source.to_string(),
        lowering.nodes,
        root_id,
        lowering.comments,
    ))
}

fn first_error(node: TsNode) -> Option<TsNode> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    let children: Vec<TsNode> = node.children(&mut cursor).collect();
    children
        .into_iter()
        .filter(|child| child.has_error() || child.is_missing())
        .find_map(first_error)
}

fn is_comment(node: &TsNode) -> bool {
    matches!(node.kind(), "line_comment" | "block_comment" | "comment")
}

fn span_of(node: TsNode) -> Span {
    Span::new(node.start_byte(), node.end_byte())
}

/// Named children without comments
fn named(node: TsNode) -> Vec<TsNode> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|child| !is_comment(child))
        .collect()
}

fn all_children(node: TsNode) -> Vec<TsNode> {
    let mut cursor = node.walk();
    node.children(&mut cursor).collect()
}

fn fields<'t>(node: TsNode<'t>, name: &str) -> Vec<TsNode<'t>> {
    let mut cursor = node.walk();
    node.children_by_field_name(name, &mut cursor)
        .filter(|child| !is_comment(child))
        .collect()
}

fn child_of_kind<'t>(node: TsNode<'t>, kind: &str) -> Option<TsNode<'t>> {
    all_children(node).into_iter().find(|c| c.kind() == kind)
}

fn is_type_kind(kind: &str) -> bool {
    matches!(
        kind,
        "type_identifier"
            | "scoped_type_identifier"
            | "generic_type"
            | "integral_type"
            | "floating_point_type"
            | "boolean_type"
            | "void_type"
            | "array_type"
            | "annotated_type"
            | "type_arguments"
            | "type_parameters"
            | "dimensions"
            | "modifiers"
            | "annotation"
            | "marker_annotation"
            | "throws"
            | "superclass"
            | "super_interfaces"
            | "extends_interfaces"
            | "permits"
    )
}

fn is_statement_kind(kind: &str) -> bool {
    matches!(
        kind,
        "block"
            | "expression_statement"
            | "local_variable_declaration"
            | "if_statement"
            | "while_statement"
            | "do_statement"
            | "for_statement"
            | "enhanced_for_statement"
            | "labeled_statement"
            | "break_statement"
            | "continue_statement"
            | "return_statement"
            | "yield_statement"
            | "throw_statement"
            | "try_statement"
            | "try_with_resources_statement"
            | "synchronized_statement"
            | "assert_statement"
            | "switch_statement"
            | "explicit_constructor_invocation"
            | "empty_statement"
            | ";"
    )
}

fn is_type_declaration_kind(kind: &str) -> bool {
    matches!(
        kind,
        "class_declaration"
            | "interface_declaration"
            | "enum_declaration"
            | "record_declaration"
            | "annotation_type_declaration"
    )
}

struct Lowering<'s> {
    source: &'s str,
    nodes: Vec<Node>,
    comments: Vec<Comment>,
}

impl<'s> Lowering<'s> {
    fn new(source: &'s str) -> Self {
        Self {
            source,
            nodes: Vec::new(),
            comments: Vec::new(),
        }
    }

    fn text(&self, node: TsNode) -> &'s str {
        &self.source[node.start_byte()..node.end_byte()]
    }

    fn alloc(&mut self, syntax: Syntax, span: Span) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        for child in syntax.children() {
            self.nodes[child.index()].parent = Some(id);
        }
        self.nodes.push(Node {
            syntax,
            span,
            parent: None,
        });
        id
    }

    fn collect_comments(&mut self, node: TsNode) {
        if is_comment(&node) {
            self.comments.push(Comment {
                span: span_of(node),
                is_line: node.kind() == "line_comment"
                    || self.text(node).starts_with("//"),
            });
            return;
        }
        for child in all_children(node) {
            self.collect_comments(child);
        }
    }

    fn parse_type(&self, node: Option<TsNode>) -> JavaType {
        node.map(|n| JavaType::parse(self.text(n)))
            .unwrap_or(JavaType::Unknown)
    }

    /// Operator token of a binary/unary/assignment node
    fn operator_text(&self, node: TsNode) -> &'s str {
        if let Some(op) = node.child_by_field_name("operator") {
            return self.text(op);
        }
        all_children(node)
            .into_iter()
            .find(|c| !c.is_named() && !matches!(c.kind(), "(" | ")"))
            .map(|c| self.text(c))
            .unwrap_or("")
    }

    // ---- declarations -------------------------------------------------

    fn program(&mut self, node: TsNode) -> NodeId {
        let mut package = None;
        let mut imports = Vec::new();
        let mut types = Vec::new();
        for child in named(node) {
            match child.kind() {
                "package_declaration" => {
                    package = named(child)
                        .into_iter()
                        .find(|c| matches!(c.kind(), "identifier" | "scoped_identifier"))
                        .map(|c| self.text(c).to_string());
                }
                "import_declaration" => {
                    let children = all_children(child);
                    let path = children
                        .iter()
                        .find(|c| matches!(c.kind(), "identifier" | "scoped_identifier"))
                        .map(|c| self.text(*c).to_string())
                        .unwrap_or_default();
                    imports.push(Import {
                        path,
                        is_static: children.iter().any(|c| c.kind() == "static"),
                        is_wildcard: children.iter().any(|c| c.kind() == "asterisk"),
                    });
                }
                _ => types.push(self.any(child)),
            }
        }
        self.alloc(
            Syntax::CompilationUnit {
                package,
                imports,
                types,
            },
            span_of(node),
        )
    }

    fn modifiers(&self, owner: TsNode) -> Modifiers {
        let mut modifiers = Modifiers::default();
        let Some(node) = child_of_kind(owner, "modifiers") else {
            return modifiers;
        };
        for child in all_children(node) {
            match child.kind() {
                "public" => modifiers.is_public = true,
                "private" => modifiers.is_private = true,
                "protected" => modifiers.is_protected = true,
                "static" => modifiers.is_static = true,
                "final" => modifiers.is_final = true,
                "abstract" => modifiers.is_abstract = true,
                "volatile" => modifiers.is_volatile = true,
                "default" => modifiers.is_default = true,
                "annotation" | "marker_annotation" => {
                    let name = child
                        .child_by_field_name("name")
                        .map(|n| self.text(n).to_string())
                        .unwrap_or_default();
                    let arguments = child.child_by_field_name("arguments").map(|args| {
                        let raw = self.text(args).trim();
                        raw.strip_prefix('(')
                            .and_then(|r| r.strip_suffix(')'))
                            .unwrap_or(raw)
                            .trim()
                            .to_string()
                    });
                    modifiers.annotations.push(Annotation { name, arguments });
                }
                _ => {}
            }
        }
        modifiers
    }

    fn type_declaration(&mut self, node: TsNode) -> NodeId {
        let kind = match node.kind() {
            "interface_declaration" => ClassKind::Interface,
            "enum_declaration" => ClassKind::Enum,
            "record_declaration" => ClassKind::Record,
            "annotation_type_declaration" => ClassKind::Annotation,
            _ => ClassKind::Class,
        };
        let name = node
            .child_by_field_name("name")
            .map(|n| self.text(n).to_string())
            .unwrap_or_default();
        let modifiers = self.modifiers(node);
        let superclass = node
            .child_by_field_name("superclass")
            .and_then(|s| named(s).into_iter().next())
            .map(|t| JavaType::parse(self.text(t)));

        let interfaces = all_children(node)
            .into_iter()
            .filter(|c| matches!(c.kind(), "super_interfaces" | "extends_interfaces"))
            .flat_map(|c| named(c).into_iter())
            .flat_map(|list| {
                if list.kind() == "type_list" {
                    named(list)
                } else {
                    vec![list]
                }
            })
            .map(|t| JavaType::parse(self.text(t)))
            .collect();

        let mut members = Vec::new();
        if let Some(params) = node.child_by_field_name("parameters") {
            members.extend(self.formal_parameters(params));
        }
        if let Some(body) = node.child_by_field_name("body") {
            members.extend(self.class_members(body));
        }
        self.alloc(
            Syntax::Class {
                kind,
                name,
                modifiers,
                superclass,
                interfaces,
                members,
            },
            span_of(node),
        )
    }

    fn class_members(&mut self, body: TsNode) -> Vec<NodeId> {
        let mut members = Vec::new();
        for child in named(body) {
            match child.kind() {
                "field_declaration" | "constant_declaration" => members.push(self.field(child)),
                "method_declaration"
                | "constructor_declaration"
                | "compact_constructor_declaration" => members.push(self.method(child)),
                "block" => {
                    let block = self.block(child);
                    members.push(self.alloc(
                        Syntax::Initializer {
                            is_static: false,
                            body: block,
                        },
                        span_of(child),
                    ));
                }
                "static_initializer" => {
                    let Some(block_node) = child_of_kind(child, "block") else {
                        continue;
                    };
                    let block = self.block(block_node);
                    members.push(self.alloc(
                        Syntax::Initializer {
                            is_static: true,
                            body: block,
                        },
                        span_of(child),
                    ));
                }
                "enum_body_declarations" => members.extend(self.class_members(child)),
                kind if is_type_declaration_kind(kind) => {
                    members.push(self.type_declaration(child))
                }
                _ => members.push(self.other(child)),
            }
        }
        members
    }

    fn field(&mut self, node: TsNode) -> NodeId {
        let modifiers = self.modifiers(node);
        let ty = self.parse_type(node.child_by_field_name("type"));
        let declarators = fields(node, "declarator")
            .into_iter()
            .map(|d| self.declarator(d))
            .collect();
        self.alloc(
            Syntax::Field {
                modifiers,
                ty,
                declarators,
            },
            span_of(node),
        )
    }

    fn declarator(&mut self, node: TsNode) -> NodeId {
        let name = node
            .child_by_field_name("name")
            .map(|n| self.text(n).to_string())
            .unwrap_or_default();
        let dims = node
            .child_by_field_name("dimensions")
            .map(|d| self.text(d).matches('[').count())
            .unwrap_or(0);
        let init = node.child_by_field_name("value").map(|v| self.expr(v));
        self.alloc(Syntax::Declarator { name, dims, init }, span_of(node))
    }

    fn method(&mut self, node: TsNode) -> NodeId {
        let modifiers = self.modifiers(node);
        let name = node
            .child_by_field_name("name")
            .map(|n| self.text(n).to_string())
            .unwrap_or_default();
        let return_type = match node.kind() {
            "method_declaration" => Some(self.parse_type(node.child_by_field_name("type"))),
            _ => None,
        };
        let params = node
            .child_by_field_name("parameters")
            .map(|p| self.formal_parameters(p))
            .unwrap_or_default();
        let body = node
            .child_by_field_name("body")
            .filter(|b| matches!(b.kind(), "block" | "constructor_body"))
            .map(|b| self.block(b));
        self.alloc(
            Syntax::Method {
                name,
                modifiers,
                return_type,
                params,
                body,
            },
            span_of(node),
        )
    }

    fn formal_parameters(&mut self, node: TsNode) -> Vec<NodeId> {
        named(node)
            .into_iter()
            .filter_map(|p| match p.kind() {
                "formal_parameter" => Some(self.formal_parameter(p)),
                "spread_parameter" => Some(self.spread_parameter(p)),
                "identifier" => Some(self.inferred_parameter(p)),
                _ => None,
            })
            .collect()
    }

    fn formal_parameter(&mut self, node: TsNode) -> NodeId {
        let modifiers = self.modifiers(node);
        let mut ty = self.parse_type(node.child_by_field_name("type"));
        if let Some(dims) = node.child_by_field_name("dimensions") {
            for _ in 0..self.text(dims).matches('[').count() {
                ty = JavaType::array_of(ty);
            }
        }
        let name = node
            .child_by_field_name("name")
            .map(|n| self.text(n).to_string())
            .unwrap_or_default();
        self.alloc(
            Syntax::Parameter {
                name,
                ty,
                modifiers,
                varargs: false,
            },
            span_of(node),
        )
    }

    fn spread_parameter(&mut self, node: TsNode) -> NodeId {
        let modifiers = self.modifiers(node);
        let children = named(node);
        let ty_node = node.child_by_field_name("type").or_else(|| {
            children
                .iter()
                .copied()
                .find(|c| c.kind() != "modifiers" && c.kind() != "variable_declarator")
        });
        let ty = JavaType::array_of(self.parse_type(ty_node));
        let name = children
            .iter()
            .find(|c| c.kind() == "variable_declarator")
            .and_then(|d| d.child_by_field_name("name"))
            .map(|n| self.text(n).to_string())
            .unwrap_or_default();
        self.alloc(
            Syntax::Parameter {
                name,
                ty,
                modifiers,
                varargs: true,
            },
            span_of(node),
        )
    }

    fn inferred_parameter(&mut self, node: TsNode) -> NodeId {
        self.alloc(
            Syntax::Parameter {
                name: self.text(node).to_string(),
                ty: JavaType::Unknown,
                modifiers: Modifiers::default(),
                varargs: false,
            },
            span_of(node),
        )
    }

    // ---- statements ---------------------------------------------------

    /// Lower a node in statement or declaration position
    fn any(&mut self, node: TsNode) -> NodeId {
        let kind = node.kind();
        if is_type_declaration_kind(kind) {
            self.type_declaration(node)
        } else if is_statement_kind(kind) || kind == "switch_expression" {
            self.statement(node)
        } else {
            self.expr(node)
        }
    }

    fn block(&mut self, node: TsNode) -> NodeId {
        let statements = named(node)
            .into_iter()
            .map(|s| self.statement(s))
            .collect();
        self.alloc(Syntax::Block { statements }, span_of(node))
    }

    /// Condition of if/while/do: the mandatory parentheses are not kept
    fn condition(&mut self, node: Option<TsNode>, owner: TsNode) -> NodeId {
        match node {
            Some(c) if c.kind() == "parenthesized_expression" => match named(c).into_iter().next() {
                Some(inner) => self.expr(inner),
                None => self.other(c),
            },
            Some(c) => self.expr(c),
            None => self.alloc(Syntax::Empty, Span::new(owner.start_byte(), owner.start_byte())),
        }
    }

    fn statement_field(&mut self, owner: TsNode, field: &str) -> NodeId {
        match owner.child_by_field_name(field) {
            Some(node) => self.statement(node),
            None => self.alloc(Syntax::Empty, Span::new(owner.end_byte(), owner.end_byte())),
        }
    }

    fn statement(&mut self, node: TsNode) -> NodeId {
        let span = span_of(node);
        match node.kind() {
            "block" | "constructor_body" => self.block(node),
            "expression_statement" => match named(node).into_iter().next() {
                Some(inner) => {
                    let expr = self.expr(inner);
                    self.alloc(Syntax::ExpressionStatement { expr }, span)
                }
                None => self.alloc(Syntax::Empty, span),
            },
            "local_variable_declaration" => {
                let modifiers = self.modifiers(node);
                let ty = self.parse_type(node.child_by_field_name("type"));
                let declarators = fields(node, "declarator")
                    .into_iter()
                    .map(|d| self.declarator(d))
                    .collect();
                self.alloc(
                    Syntax::LocalVariable {
                        ty,
                        modifiers,
                        declarators,
                    },
                    span,
                )
            }
            "if_statement" => {
                let condition = self.condition(node.child_by_field_name("condition"), node);
                let then_branch = self.statement_field(node, "consequence");
                let else_branch = node
                    .child_by_field_name("alternative")
                    .map(|a| self.statement(a));
                self.alloc(
                    Syntax::If {
                        condition,
                        then_branch,
                        else_branch,
                    },
                    span,
                )
            }
            "while_statement" => {
                let condition = self.condition(node.child_by_field_name("condition"), node);
                let body = self.statement_field(node, "body");
                self.alloc(Syntax::While { condition, body }, span)
            }
            "do_statement" => {
                let body = self.statement_field(node, "body");
                let condition = self.condition(node.child_by_field_name("condition"), node);
                self.alloc(Syntax::DoWhile { body, condition }, span)
            }
            "for_statement" => {
                let init = fields(node, "init")
                    .into_iter()
                    .map(|i| {
                        if i.kind() == "local_variable_declaration" {
                            self.statement(i)
                        } else {
                            self.expr(i)
                        }
                    })
                    .collect();
                let condition = node.child_by_field_name("condition").map(|c| self.expr(c));
                let update = fields(node, "update")
                    .into_iter()
                    .map(|u| self.expr(u))
                    .collect();
                let body = self.statement_field(node, "body");
                self.alloc(
                    Syntax::For {
                        init,
                        condition,
                        update,
                        body,
                    },
                    span,
                )
            }
            "enhanced_for_statement" => {
                let ty_node = node.child_by_field_name("type");
                let name_node = node.child_by_field_name("name");
                let start = child_of_kind(node, "modifiers")
                    .or(ty_node)
                    .map(|n| n.start_byte())
                    .unwrap_or(node.start_byte());
                let end = name_node.map(|n| n.end_byte()).unwrap_or(start);
                let parameter = Syntax::Parameter {
                    name: name_node
                        .map(|n| self.text(n).to_string())
                        .unwrap_or_default(),
                    ty: self.parse_type(ty_node),
                    modifiers: self.modifiers(node),
                    varargs: false,
                };
                let variable = self.alloc(parameter, Span::new(start, end));
                let iterable = match node.child_by_field_name("value") {
                    Some(v) => self.expr(v),
                    None => self.alloc(Syntax::Empty, Span::new(end, end)),
                };
                let body = self.statement_field(node, "body");
                self.alloc(
                    Syntax::ForEach {
                        variable,
                        iterable,
                        body,
                    },
                    span,
                )
            }
            "labeled_statement" => {
                let children = named(node);
                let label = children
                    .iter()
                    .find(|c| c.kind() == "identifier")
                    .map(|c| self.text(*c).to_string())
                    .unwrap_or_default();
                let body = match children.iter().find(|c| c.kind() != "identifier") {
                    Some(inner) => self.statement(*inner),
                    None => self.alloc(Syntax::Empty, Span::new(span.end, span.end)),
                };
                self.alloc(Syntax::Labeled { label, body }, span)
            }
            "break_statement" | "continue_statement" => {
                let label = named(node)
                    .into_iter()
                    .find(|c| c.kind() == "identifier")
                    .map(|c| self.text(c).to_string());
                let syntax = if node.kind() == "break_statement" {
                    Syntax::Break { label }
                } else {
                    Syntax::Continue { label }
                };
                self.alloc(syntax, span)
            }
            "return_statement" => {
                let value = named(node).into_iter().next().map(|v| self.expr(v));
                self.alloc(Syntax::Return { value }, span)
            }
            "yield_statement" | "throw_statement" => {
                let value = match named(node).into_iter().next() {
                    Some(v) => self.expr(v),
                    None => self.alloc(Syntax::Empty, Span::new(span.end, span.end)),
                };
                let syntax = if node.kind() == "yield_statement" {
                    Syntax::Yield { value }
                } else {
                    Syntax::Throw { value }
                };
                self.alloc(syntax, span)
            }
            "try_statement" | "try_with_resources_statement" => self.try_statement(node),
            "switch_expression" | "switch_statement" => self.switch(node),
            "synchronized_statement" => {
                let lock_node = named(node)
                    .into_iter()
                    .find(|c| c.kind() == "parenthesized_expression");
                let lock = self.condition(lock_node, node);
                let body = self.statement_field(node, "body");
                self.alloc(Syntax::Synchronized { lock, body }, span)
            }
            "assert_statement" => {
                let mut parts = named(node).into_iter();
                let condition = match parts.next() {
                    Some(c) => self.expr(c),
                    None => self.alloc(Syntax::Empty, span),
                };
                let message = parts.next().map(|m| self.expr(m));
                self.alloc(Syntax::Assert { condition, message }, span)
            }
            "explicit_constructor_invocation" => {
                let is_super = node
                    .child_by_field_name("constructor")
                    .map(|c| self.text(c) == "super")
                    .unwrap_or(false);
                let qualifier = node.child_by_field_name("object").map(|o| self.expr(o));
                let args = self.arguments(node);
                self.alloc(
                    Syntax::ConstructorCall {
                        is_super,
                        qualifier,
                        args,
                    },
                    span,
                )
            }
            ";" | "empty_statement" => self.alloc(Syntax::Empty, span),
            kind if is_type_declaration_kind(kind) => self.type_declaration(node),
            _ => self.expr(node),
        }
    }

    fn try_statement(&mut self, node: TsNode) -> NodeId {
        let resources = node
            .child_by_field_name("resources")
            .map(|spec| {
                named(spec)
                    .into_iter()
                    .filter(|r| r.kind() == "resource")
                    .map(|r| self.resource(r))
                    .collect()
            })
            .unwrap_or_default();
        let body = self.statement_field(node, "body");
        let mut catches = Vec::new();
        let mut finally = None;
        for child in named(node) {
            match child.kind() {
                "catch_clause" => catches.push(self.catch_clause(child)),
                "finally_clause" => {
                    if let Some(block) = child_of_kind(child, "block") {
                        finally = Some(self.block(block));
                    }
                }
                _ => {}
            }
        }
        self.alloc(
            Syntax::Try {
                resources,
                body,
                catches,
                finally,
            },
            span_of(node),
        )
    }

    fn resource(&mut self, node: TsNode) -> NodeId {
        let Some(ty_node) = node.child_by_field_name("type") else {
            return match named(node).into_iter().next() {
                Some(expr) => self.expr(expr),
                None => self.other(node),
            };
        };
        let name_node = node.child_by_field_name("name");
        let value = node.child_by_field_name("value").map(|v| self.expr(v));
        let declarator_start = name_node.map(|n| n.start_byte()).unwrap_or(node.start_byte());
        let declarator = self.alloc(
            Syntax::Declarator {
                name: name_node
                    .map(|n| self.text(n).to_string())
                    .unwrap_or_default(),
                dims: 0,
                init: value,
            },
            Span::new(declarator_start, node.end_byte()),
        );
        let ty = JavaType::parse(self.text(ty_node));
        let modifiers = self.modifiers(node);
        self.alloc(
            Syntax::LocalVariable {
                ty,
                modifiers,
                declarators: vec![declarator],
            },
            span_of(node),
        )
    }

    fn catch_clause(&mut self, node: TsNode) -> NodeId {
        let parameter = match child_of_kind(node, "catch_formal_parameter") {
            Some(p) => {
                let ty = child_of_kind(p, "catch_type")
                    .map(|t| JavaType::parse(self.text(t)))
                    .unwrap_or(JavaType::Unknown);
                let name = p
                    .child_by_field_name("name")
                    .map(|n| self.text(n).to_string())
                    .unwrap_or_default();
                let modifiers = self.modifiers(p);
                self.alloc(
                    Syntax::Parameter {
                        name,
                        ty,
                        modifiers,
                        varargs: false,
                    },
                    span_of(p),
                )
            }
            None => self.alloc(Syntax::Empty, Span::new(node.start_byte(), node.start_byte())),
        };
        let body = self.statement_field(node, "body");
        self.alloc(Syntax::Catch { parameter, body }, span_of(node))
    }

    fn switch(&mut self, node: TsNode) -> NodeId {
        let is_expression = is_switch_in_expression_position(node);
        let selector = self.condition(node.child_by_field_name("condition"), node);
        let mut arms = Vec::new();
        if let Some(body) = node.child_by_field_name("body") {
            for arm in named(body) {
                match arm.kind() {
                    "switch_block_statement_group" => {
                        let mut labels = Vec::new();
                        let mut statements = Vec::new();
                        for child in named(arm) {
                            if child.kind() == "switch_label" {
                                labels.push(self.switch_label(child));
                            } else {
                                statements.push(self.statement(child));
                            }
                        }
                        arms.push(self.alloc(Syntax::SwitchGroup { labels, statements }, span_of(arm)));
                    }
                    "switch_rule" => {
                        let mut labels = Vec::new();
                        let mut rule_body = None;
                        for child in named(arm) {
                            if child.kind() == "switch_label" {
                                labels.push(self.switch_label(child));
                            } else if rule_body.is_none() {
                                rule_body = Some(self.statement(child));
                            }
                        }
                        let body = match rule_body {
                            Some(b) => b,
                            None => self.alloc(Syntax::Empty, Span::new(arm.end_byte(), arm.end_byte())),
                        };
                        arms.push(self.alloc(Syntax::SwitchRule { labels, body }, span_of(arm)));
                    }
                    _ => {}
                }
            }
        }
        self.alloc(
            Syntax::Switch {
                selector,
                arms,
                is_expression,
            },
            span_of(node),
        )
    }

    fn switch_label(&mut self, node: TsNode) -> NodeId {
        let is_default = all_children(node).iter().any(|c| c.kind() == "default")
            || self.text(node).trim_start().starts_with("default");
        let mut values = Vec::new();
        let mut guard = None;
        for child in named(node) {
            match child.kind() {
                "guard" => {
                    guard = named(child).into_iter().next().map(|g| self.expr(g));
                }
                "pattern" | "type_pattern" | "record_pattern" => {
                    self.pattern_bindings(child, &mut values)
                }
                _ => values.push(self.expr(child)),
            }
        }
        self.alloc(
            Syntax::SwitchLabel {
                values,
                guard,
                is_default,
            },
            span_of(node),
        )
    }

    /// Pattern variables introduced by a type or record pattern, in order
    fn pattern_bindings(&mut self, node: TsNode, out: &mut Vec<NodeId>) {
        match node.kind() {
            "type_pattern" | "record_pattern_component" => {
                let children = named(node);
                let name = children.iter().rev().find(|c| c.kind() == "identifier");
                let ty = children.iter().find(|c| c.kind() != "identifier");
                match (name, ty) {
                    (Some(name), Some(ty)) => {
                        let syntax = Syntax::PatternVariable {
                            name: self.text(*name).to_string(),
                            ty: JavaType::parse(self.text(*ty)),
                        };
                        out.push(self.alloc(syntax, span_of(node)));
                    }
                    _ => {
                        for child in children {
                            self.pattern_bindings(child, out);
                        }
                    }
                }
            }
            _ => {
                for child in named(node) {
                    self.pattern_bindings(child, out);
                }
            }
        }
    }

    // ---- expressions --------------------------------------------------

    fn arguments(&mut self, node: TsNode) -> Vec<NodeId> {
        node.child_by_field_name("arguments")
            .or_else(|| child_of_kind(node, "argument_list"))
            .map(|list| named(list).into_iter().map(|a| self.expr(a)).collect())
            .unwrap_or_default()
    }

    fn expr_field(&mut self, owner: TsNode, field: &str) -> NodeId {
        match owner.child_by_field_name(field) {
            Some(node) => self.expr(node),
            None => self.alloc(Syntax::Empty, Span::new(owner.end_byte(), owner.end_byte())),
        }
    }

    fn expr(&mut self, node: TsNode) -> NodeId {
        let span = span_of(node);
        let syntax = match node.kind() {
            "parenthesized_expression" => match named(node).into_iter().next() {
                Some(inner) => Syntax::Parenthesized {
                    inner: self.expr(inner),
                },
                None => return self.other(node),
            },
            "binary_expression" => return self.binary(node),
            "unary_expression" => {
                let Some(op) = PrefixOp::from_text(self.operator_text(node)) else {
                    return self.other(node);
                };
                let operand = self.expr_field(node, "operand");
                Syntax::Prefix { op, operand }
            }
            "update_expression" => {
                let children = all_children(node);
                let Some(operand_node) = children.iter().copied().find(|c| c.is_named() && !is_comment(c)) else {
                    return self.other(node);
                };
                let Some(op_node) = children.iter().copied().find(|c| !c.is_named()) else {
                    return self.other(node);
                };
                let op_text = self.text(op_node);
                let operand = self.expr(operand_node);
                if op_node.start_byte() < operand_node.start_byte() {
                    match PrefixOp::from_text(op_text) {
                        Some(op) => Syntax::Prefix { op, operand },
                        None => Syntax::Other {
                            kind: node.kind().to_string(),
                            children: vec![operand],
                        },
                    }
                } else {
                    match PostfixOp::from_text(op_text) {
                        Some(op) => Syntax::Postfix { op, operand },
                        None => Syntax::Other {
                            kind: node.kind().to_string(),
                            children: vec![operand],
                        },
                    }
                }
            }
            "assignment_expression" => {
                let Some(op) = AssignOp::from_text(self.operator_text(node)) else {
                    return self.other(node);
                };
                let target = self.expr_field(node, "left");
                let value = self.expr_field(node, "right");
                Syntax::Assignment { op, target, value }
            }
            "ternary_expression" => {
                let condition = self.expr_field(node, "condition");
                let then_expr = self.expr_field(node, "consequence");
                let else_expr = self.expr_field(node, "alternative");
                Syntax::Conditional {
                    condition,
                    then_expr,
                    else_expr,
                }
            }
            "method_invocation" => {
                let object = node.child_by_field_name("object").map(|o| self.expr(o));
                let name = node
                    .child_by_field_name("name")
                    .map(|n| self.text(n).to_string())
                    .unwrap_or_default();
                let args = self.arguments(node);
                Syntax::MethodCall { object, name, args }
            }
            "object_creation_expression" => {
                let new_keyword = child_of_kind(node, "new").map(|n| n.start_byte());
                let qualifier = match new_keyword {
                    Some(new_start) => named(node)
                        .into_iter()
                        .find(|c| c.end_byte() <= new_start)
                        .map(|q| self.expr(q)),
                    None => None,
                };
                let ty = self.parse_type(node.child_by_field_name("type"));
                let args = self.arguments(node);
                let body = child_of_kind(node, "class_body").map(|b| {
                    let members = self.class_members(b);
                    self.alloc(Syntax::AnonymousClass { members }, span_of(b))
                });
                Syntax::New {
                    ty,
                    qualifier,
                    args,
                    body,
                }
            }
            "array_creation_expression" => {
                let mut ty = self.parse_type(node.child_by_field_name("type"));
                let mut dimensions = Vec::new();
                let mut rank = 0;
                for child in named(node) {
                    match child.kind() {
                        "dimensions_expr" => {
                            rank += 1;
                            if let Some(size) = named(child).into_iter().next() {
                                dimensions.push(self.expr(size));
                            }
                        }
                        "dimensions" => rank += self.text(child).matches('[').count(),
                        _ => {}
                    }
                }
                for _ in 0..rank {
                    ty = JavaType::array_of(ty);
                }
                let init = node.child_by_field_name("value").map(|v| self.expr(v));
                Syntax::NewArray {
                    ty,
                    dimensions,
                    init,
                }
            }
            "array_initializer" => Syntax::ArrayInit {
                elements: named(node).into_iter().map(|e| self.expr(e)).collect(),
            },
            "field_access" => {
                let field = node
                    .child_by_field_name("field")
                    .map(|f| self.text(f).to_string())
                    .unwrap_or_default();
                if field == "this" {
                    Syntax::This
                } else {
                    let object = self.expr_field(node, "object");
                    Syntax::FieldAccess { object, field }
                }
            }
            "array_access" => {
                let array = self.expr_field(node, "array");
                let index = self.expr_field(node, "index");
                Syntax::ArrayAccess { array, index }
            }
            "instanceof_expression" => {
                let operand = self.expr_field(node, "left");
                let right = node.child_by_field_name("right");
                let pattern = node.child_by_field_name("pattern");
                let ty = match (right, pattern) {
                    (Some(r), _) => JavaType::parse(self.text(r)),
                    (None, Some(p)) => named(p)
                        .into_iter()
                        .next()
                        .map(|t| JavaType::parse(self.text(t)))
                        .unwrap_or(JavaType::Unknown),
                    (None, None) => JavaType::Unknown,
                };
                let mut bindings = Vec::new();
                if let (Some(name), Some(r)) = (node.child_by_field_name("name"), right) {
                    let syntax = Syntax::PatternVariable {
                        name: self.text(name).to_string(),
                        ty: ty.clone(),
                    };
                    bindings.push(self.alloc(syntax, Span::new(r.start_byte(), name.end_byte())));
                }
                if let Some(p) = pattern {
                    self.pattern_bindings(p, &mut bindings);
                }
                Syntax::InstanceOf {
                    operand,
                    ty,
                    bindings,
                }
            }
            "cast_expression" => {
                let ty = self.parse_type(node.child_by_field_name("type"));
                let operand = self.expr_field(node, "value");
                Syntax::Cast { ty, operand }
            }
            "lambda_expression" => {
                let params = match node.child_by_field_name("parameters") {
                    Some(p) if p.kind() == "identifier" => vec![self.inferred_parameter(p)],
                    Some(p) => self.formal_parameters(p),
                    None => Vec::new(),
                };
                let body = match node.child_by_field_name("body") {
                    Some(b) if b.kind() == "block" => self.block(b),
                    Some(b) => self.expr(b),
                    None => self.alloc(Syntax::Empty, Span::new(span.end, span.end)),
                };
                Syntax::Lambda { params, body }
            }
            "inferred_parameters" | "formal_parameters" => return self.other(node),
            "method_reference" => Syntax::MethodReference,
            "class_literal" => Syntax::ClassLiteral {
                ty: self.parse_type(named(node).into_iter().next()),
            },
            "this" => Syntax::This,
            "super" => Syntax::Super,
            "identifier" => Syntax::Name {
                name: self.text(node).to_string(),
            },
            "decimal_integer_literal"
            | "hex_integer_literal"
            | "octal_integer_literal"
            | "binary_integer_literal" => {
                let kind = if self.text(node).ends_with(['l', 'L']) {
                    LiteralKind::Long
                } else {
                    LiteralKind::Int
                };
                Syntax::Literal { kind }
            }
            "decimal_floating_point_literal" | "hex_floating_point_literal" => {
                let kind = if self.text(node).ends_with(['f', 'F']) {
                    LiteralKind::Float
                } else {
                    LiteralKind::Double
                };
                Syntax::Literal { kind }
            }
            "true" => Syntax::Literal {
                kind: LiteralKind::Boolean(true),
            },
            "false" => Syntax::Literal {
                kind: LiteralKind::Boolean(false),
            },
            "character_literal" => Syntax::Literal {
                kind: LiteralKind::Char,
            },
            "string_literal" | "text_block" => Syntax::Literal {
                kind: LiteralKind::String,
            },
            "null_literal" => Syntax::Literal {
                kind: LiteralKind::Null,
            },
            "switch_expression" | "switch_statement" => return self.switch(node),
            kind if is_statement_kind(kind) => return self.statement(node),
            kind if is_type_declaration_kind(kind) => return self.type_declaration(node),
            _ => return self.other(node),
        };
        self.alloc(syntax, span)
    }

    fn binary(&mut self, node: TsNode) -> NodeId {
        let Some(op) = OperatorToken::from_text(self.operator_text(node)) else {
            return self.other(node);
        };
        let mut operand_nodes = Vec::new();
        if op.is_chainable() {
            self.collect_chain(node, op, &mut operand_nodes);
        } else {
            operand_nodes.extend(node.child_by_field_name("left"));
            operand_nodes.extend(node.child_by_field_name("right"));
        }
        let operands = operand_nodes.into_iter().map(|n| self.expr(n)).collect();
        self.alloc(Syntax::Polyadic { op, operands }, span_of(node))
    }

    fn collect_chain<'t>(&self, node: TsNode<'t>, op: OperatorToken, out: &mut Vec<TsNode<'t>>) {
        let same_op = node.kind() == "binary_expression"
            && OperatorToken::from_text(self.operator_text(node)) == Some(op);
        if !same_op {
            out.push(node);
            return;
        }
        for side in ["left", "right"] {
            if let Some(child) = node.child_by_field_name(side) {
                self.collect_chain(child, op, out);
            }
        }
    }

    /// Keep the children of an unmodelled construct
    fn other(&mut self, node: TsNode) -> NodeId {
        let children = named(node)
            .into_iter()
            .filter(|c| !is_type_kind(c.kind()))
            .map(|c| match c.kind() {
                "class_body" => {
                    let members = self.class_members(c);
                    self.alloc(Syntax::AnonymousClass { members }, span_of(c))
                }
                "argument_list" => {
                    let args = named(c).into_iter().map(|a| self.expr(a)).collect();
                    self.alloc(
                        Syntax::Other {
                            kind: "argument_list".to_string(),
                            children: args,
                        },
                        span_of(c),
                    )
                }
                _ => self.any(c),
            })
            .collect();
        self.alloc(
            Syntax::Other {
                kind: node.kind().to_string(),
                children,
            },
            span_of(node),
        )
    }
}

/// A switch is a statement when it sits directly in a statement slot
fn is_switch_in_expression_position(node: TsNode) -> bool {
    let Some(parent) = node.parent() else {
        return false;
    };
    match parent.kind() {
        "block"
        | "constructor_body"
        | "switch_block_statement_group"
        | "labeled_statement"
        | "program"
        | "expression_statement"
        | "if_statement"
        | "while_statement"
        | "do_statement"
        | "enhanced_for_statement" => false,
        "for_statement" => parent
            .child_by_field_name("body")
            .map(|body| body.id() != node.id())
            .unwrap_or(true),
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    fn find_kind(tree: &SyntaxTree, kind: &str) -> NodeId {
        tree.find(|t, id| t.syntax(id).kind_name() == kind)
            .unwrap_or_else(|| panic!("no {kind} node"))
    }

    #[test]
    fn test_rejects_syntax_errors_with_line() {
        let err = parse_java("class A {\n void f() { int x = ; }\n}").unwrap_err();
        match err {
            SemaError::Parse { line, .. } => assert_eq!(line, Some(2)),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_flattens_logical_chains_but_not_comparisons() {
        let tree = parse_java("class A { boolean f(int a, int b, boolean c) { return a < b && b < 3 && c; } }").unwrap();
        let chain = tree.find_by_text("a < b && b < 3 && c").unwrap();
        match tree.syntax(chain) {
            Syntax::Polyadic { op, operands } => {
                assert_eq!(*op, OperatorToken::AndAnd);
                assert_eq!(operands.len(), 3);
                assert!(matches!(
                    tree.syntax(operands[0]),
                    Syntax::Polyadic { op: OperatorToken::Lt, operands } if operands.len() == 2
                ));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_parenthesized_operand_stays_separate() {
        let tree = parse_java("class A { boolean f(boolean a, boolean b, boolean c) { return a && (b && c); } }").unwrap();
        let chain = tree.find_by_text("a && (b && c)").unwrap();
        match tree.syntax(chain) {
            Syntax::Polyadic { operands, .. } => {
                assert_eq!(operands.len(), 2);
                assert!(matches!(tree.syntax(operands[1]), Syntax::Parenthesized { .. }));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_conditions_drop_mandatory_parentheses() {
        let tree = parse_java("class A { void f(boolean a) { if (a) {} while (!a) {} } }").unwrap();
        let if_node = find_kind(&tree, "if");
        let Syntax::If { condition, .. } = tree.syntax(if_node) else {
            unreachable!()
        };
        assert_eq!(tree.text(*condition), "a");
        let while_node = find_kind(&tree, "while");
        let Syntax::While { condition, .. } = tree.syntax(while_node) else {
            unreachable!()
        };
        assert!(matches!(tree.syntax(*condition), Syntax::Prefix { op: PrefixOp::Not, .. }));
    }

    #[test]
    fn test_update_expressions() {
        let tree = parse_java("class A { void f(int i) { i++; --i; } }").unwrap();
        let post = tree.find_by_text("i++").unwrap();
        assert!(matches!(tree.syntax(post), Syntax::Postfix { op: PostfixOp::Inc, .. }));
        let pre = tree.find_by_text("--i").unwrap();
        assert!(matches!(tree.syntax(pre), Syntax::Prefix { op: PrefixOp::Dec, .. }));
    }

    #[test]
    fn test_switch_statement_versus_expression() {
        let source = indoc! {r#"
            class A {
                int f(int k) {
                    switch (k) {
                        case 1: break;
                        default: k++;
                    }
                    return switch (k) { case 1 -> 10; default -> 20; };
                }
            }
        "#};
        let tree = parse_java(source).unwrap();
        let switches = tree.find_all(|t, id| matches!(t.syntax(id), Syntax::Switch { .. }));
        assert_eq!(switches.len(), 2);
        let kinds: Vec<bool> = switches
            .iter()
            .map(|id| matches!(tree.syntax(*id), Syntax::Switch { is_expression: true, .. }))
            .collect();
        assert_eq!(kinds, vec![false, true]);
    }

    #[test]
    fn test_instanceof_pattern_binding() {
        let tree = parse_java("class A { boolean f(Object o) { return o instanceof String s && s.isEmpty(); } }").unwrap();
        let binding = tree
            .find(|t, id| matches!(t.syntax(id), Syntax::PatternVariable { .. }))
            .unwrap();
        match tree.syntax(binding) {
            Syntax::PatternVariable { name, ty } => {
                assert_eq!(name, "s");
                assert_eq!(ty, &JavaType::string());
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_comments_are_collected() {
        let source = "class A {\n // leading\n void f() { /* inner */ }\n}";
        let tree = parse_java(source).unwrap();
        let texts: Vec<&str> = tree.comments().iter().map(|c| tree.comment_text(c)).collect();
        assert_eq!(texts, vec!["// leading", "/* inner */"]);
        assert!(tree.comments()[0].is_line);
    }

    #[test]
    fn test_modifiers_and_annotations() {
        let source = indoc! {r#"
            class A {
                private volatile int count;
                @Contract(pure = true)
                static int twice(int x) { return x * 2; }
            }
        "#};
        let tree = parse_java(source).unwrap();
        let method = find_kind(&tree, "method");
        let Syntax::Method { modifiers, .. } = tree.syntax(method) else {
            unreachable!()
        };
        assert!(modifiers.is_static);
        let contract = modifiers.annotation("Contract").unwrap();
        assert_eq!(contract.arguments.as_deref(), Some("pure = true"));

        let field = find_kind(&tree, "field");
        let Syntax::Field { modifiers, .. } = tree.syntax(field) else {
            unreachable!()
        };
        assert!(modifiers.is_private && modifiers.is_volatile);
    }
}
