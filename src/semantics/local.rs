//! Semantic model over a single compilation unit
//!
//! Names resolve by walking scopes outwards from the use site. Anything
//! declared outside the file is a "library" declaration: it gets a qualified
//! name through imports or the implicit `java.lang` package, and its purity
//! comes from the configured signature tables.

use super::{
    typing, ClassRef, ClassShape, Declaration, FieldInfo, MethodRef, Purity, SearchBudget,
    SemanticModel, VariableKind, VariableRef,
};
use crate::config::SemaConfig;
use crate::core::JavaType;
use crate::syntax::navigation::enclosing_class;
use crate::syntax::{AssignOp, ClassKind, Import, Modifiers, NodeId, Syntax, SyntaxTree};
use std::collections::{HashSet, VecDeque};

/// `java.lang` types that are visible without an import
const JAVA_LANG: &[&str] = &[
    "Object",
    "String",
    "StringBuilder",
    "StringBuffer",
    "CharSequence",
    "Boolean",
    "Byte",
    "Character",
    "Short",
    "Integer",
    "Long",
    "Float",
    "Double",
    "Number",
    "Void",
    "Math",
    "StrictMath",
    "System",
    "Thread",
    "Runnable",
    "Iterable",
    "Comparable",
    "AutoCloseable",
    "Class",
    "Enum",
    "Record",
    "Throwable",
    "Exception",
    "Error",
    "RuntimeException",
    "AssertionError",
    "ArithmeticException",
    "ArrayIndexOutOfBoundsException",
    "ClassCastException",
    "CloneNotSupportedException",
    "IllegalArgumentException",
    "IllegalStateException",
    "IndexOutOfBoundsException",
    "InterruptedException",
    "NegativeArraySizeException",
    "NullPointerException",
    "NumberFormatException",
    "SecurityException",
    "StringIndexOutOfBoundsException",
    "UnsupportedOperationException",
    "OutOfMemoryError",
    "StackOverflowError",
];

const PURE_ANNOTATIONS: &[&str] = &["Pure", "SideEffectFree", "Immutable"];

pub struct LocalSemantics<'t> {
    tree: &'t SyntaxTree,
    config: &'t SemaConfig,
    package: Option<String>,
    imports: Vec<Import>,
    classes: Vec<NodeId>,
}

impl<'t> LocalSemantics<'t> {
    pub fn new(tree: &'t SyntaxTree, config: &'t SemaConfig) -> Self {
        let (package, imports) = match tree.syntax(tree.root()) {
            Syntax::CompilationUnit {
                package, imports, ..
            } => (package.clone(), imports.clone()),
            _ => (None, Vec::new()),
        };
        let classes = tree.find_all(|t, id| matches!(t.syntax(id), Syntax::Class { .. }));
        log::debug!(
            "Local semantics over {} classes, {} imports",
            classes.len(),
            imports.len()
        );
        Self {
            tree,
            config,
            package,
            imports,
            classes,
        }
    }

    pub fn config(&self) -> &SemaConfig {
        self.config
    }

    // ---- classes ------------------------------------------------------

    /// Qualified name of an in-file class; anonymous classes are named
    /// after their enclosing class with a `$` suffix
    pub fn class_name(&self, class: NodeId) -> String {
        let mut segments = Vec::new();
        let mut anonymous = false;
        for id in std::iter::once(class).chain(self.tree.ancestors(class)) {
            match self.tree.syntax(id) {
                Syntax::Class { name, .. } => segments.push(name.clone()),
                Syntax::AnonymousClass { .. } if id == class => anonymous = true,
                _ => {}
            }
        }
        segments.reverse();
        let mut name = segments.join(".");
        if let Some(package) = &self.package {
            name = if name.is_empty() {
                package.clone()
            } else {
                format!("{}.{}", package, name)
            };
        }
        if anonymous {
            name.push('$');
        }
        name
    }

    fn class_ref(&self, class: NodeId) -> ClassRef {
        ClassRef {
            qualified_name: self.class_name(class),
            node: Some(class),
        }
    }

    /// In-file class for a simple or (partially) qualified name
    fn find_class(&self, name: &str) -> Option<NodeId> {
        let simple = name.rsplit('.').next().unwrap_or(name);
        self.classes.iter().copied().find(|&id| match self.tree.syntax(id) {
            Syntax::Class { name: declared, .. } if declared == simple => {
                !name.contains('.') || self.class_name(id).ends_with(name)
            }
            _ => false,
        })
    }

    /// Qualified name for a type name as written in this file
    pub fn qualify(&self, name: &str) -> String {
        if let Some(class) = self.find_class(name) {
            return self.class_name(class);
        }
        if name.contains('.') {
            return name.to_string();
        }
        let suffix = format!(".{}", name);
        if let Some(import) = self
            .imports
            .iter()
            .find(|i| !i.is_static && !i.is_wildcard && i.path.ends_with(&suffix))
        {
            return import.path.clone();
        }
        if JAVA_LANG.contains(&name) {
            return format!("java.lang.{}", name);
        }
        name.to_string()
    }

    /// Declared superclass: in-file node, or qualified library name
    fn superclass(&self, class: NodeId) -> Option<Result<NodeId, String>> {
        let ty = match self.tree.syntax(class) {
            Syntax::Class {
                superclass: Some(ty),
                ..
            } => ty.clone(),
            Syntax::AnonymousClass { .. } => match self.tree.parent(class).map(|p| self.tree.syntax(p)) {
                Some(Syntax::New { ty, .. }) => ty.clone(),
                _ => return None,
            },
            _ => return None,
        };
        let name = ty.erasure()?;
        Some(match self.find_class(name) {
            Some(node) if node != class => Ok(node),
            _ => Err(self.qualify(name)),
        })
    }

    /// Direct supertypes (superclass and interfaces) as qualified names
    fn direct_supertypes(&self, class: NodeId) -> Vec<String> {
        let mut names = Vec::new();
        match self.tree.syntax(class) {
            Syntax::Class {
                superclass,
                interfaces,
                ..
            } => {
                for ty in superclass.iter().chain(interfaces.iter()) {
                    if let Some(name) = ty.erasure() {
                        names.push(self.qualify(name));
                    }
                }
            }
            Syntax::AnonymousClass { .. } => {
                if let Some(Syntax::New { ty, .. }) = self.tree.parent(class).map(|p| self.tree.syntax(p)) {
                    if let Some(name) = ty.erasure() {
                        names.push(self.qualify(name));
                    }
                }
            }
            _ => {}
        }
        names
    }

    fn members(&self, class: NodeId) -> &[NodeId] {
        match self.tree.syntax(class) {
            Syntax::Class { members, .. } | Syntax::AnonymousClass { members } => members,
            _ => &[],
        }
    }

    /// Classes enclosing `node`, innermost first
    fn enclosing_classes(&self, node: NodeId) -> Vec<NodeId> {
        std::iter::once(node)
            .chain(self.tree.ancestors(node))
            .filter(|&id| {
                id != node
                    && matches!(
                        self.tree.syntax(id),
                        Syntax::Class { .. } | Syntax::AnonymousClass { .. }
                    )
            })
            .collect()
    }

    /// In-file classes from `class` up its superclass chain
    fn hierarchy(&self, class: NodeId) -> Vec<NodeId> {
        let mut chain = vec![class];
        let mut current = class;
        while let Some(Ok(parent)) = self.superclass(current) {
            if chain.contains(&parent) {
                break;
            }
            chain.push(parent);
            current = parent;
        }
        chain
    }

    /// Library class at the top of an in-file hierarchy
    fn library_superclass(&self, class: NodeId) -> Option<String> {
        let top = *self.hierarchy(class).last()?;
        match self.superclass(top) {
            Some(Err(name)) => Some(name),
            _ => None,
        }
    }

    // ---- variables ----------------------------------------------------

    fn local_from_declaration(&self, local: NodeId, name: &str, kind: VariableKind) -> Option<VariableRef> {
        let (ty, modifiers, declarators) = match self.tree.syntax(local) {
            Syntax::LocalVariable {
                ty,
                modifiers,
                declarators,
            }
            | Syntax::Field {
                ty,
                modifiers,
                declarators,
            } => (ty, modifiers, declarators),
            _ => return None,
        };
        declarators.iter().find_map(|&d| match self.tree.syntax(d) {
            Syntax::Declarator {
                name: declared,
                dims,
                init,
            } if declared == name => {
                let mut ty = ty.clone();
                if ty == JavaType::Var {
                    ty = init
                        .and_then(|i| self.type_of(i))
                        .unwrap_or(JavaType::Unknown);
                }
                for _ in 0..*dims {
                    ty = JavaType::array_of(ty);
                }
                Some(VariableRef {
                    name: name.to_string(),
                    kind,
                    declaration: d,
                    ty,
                    is_static: modifiers.is_static,
                    is_volatile: modifiers.is_volatile,
                })
            }
            _ => None,
        })
    }

    fn parameter(&self, param: NodeId, name: &str, kind: VariableKind) -> Option<VariableRef> {
        match self.tree.syntax(param) {
            Syntax::Parameter {
                name: declared, ty, ..
            } if declared == name => Some(VariableRef {
                name: name.to_string(),
                kind,
                declaration: param,
                ty: ty.clone(),
                is_static: false,
                is_volatile: false,
            }),
            _ => None,
        }
    }

    /// Nearest pattern variable named `name` declared inside `scope` before `use_site`
    fn pattern_variable(&self, scope: NodeId, name: &str, use_site: NodeId) -> Option<VariableRef> {
        let use_start = self.tree.span(use_site).start;
        self.tree
            .descendants(scope)
            .into_iter()
            .filter(|&id| self.tree.span(id).end <= use_start)
            .filter_map(|id| match self.tree.syntax(id) {
                Syntax::PatternVariable { name: declared, ty } if declared == name => Some((
                    id,
                    VariableRef {
                        name: name.to_string(),
                        kind: VariableKind::Pattern,
                        declaration: id,
                        ty: ty.clone(),
                        is_static: false,
                        is_volatile: false,
                    },
                )),
                _ => None,
            })
            .max_by_key(|(id, _)| self.tree.span(*id).start)
            .map(|(_, var)| var)
    }

    /// Field `name` visible in `class`, searching the in-file superclass chain
    fn field_in_class(&self, class: NodeId, name: &str) -> Option<VariableRef> {
        self.hierarchy(class).into_iter().find_map(|c| {
            self.members(c)
                .iter()
                .find_map(|&m| self.local_from_declaration(m, name, VariableKind::Field))
        })
    }

    fn resolve_variable(&self, use_site: NodeId, name: &str) -> Option<VariableRef> {
        let tree = self.tree;
        let mut child = use_site;
        for ancestor in tree.ancestors(use_site) {
            let found = match tree.syntax(ancestor) {
                Syntax::Block { statements } | Syntax::SwitchGroup { statements, .. } => statements
                    .iter()
                    .take_while(|&&s| s != child)
                    .find_map(|&s| self.local_from_declaration(s, name, VariableKind::Local)),
                Syntax::For { init, .. } => init
                    .iter()
                    .find_map(|&i| self.local_from_declaration(i, name, VariableKind::Local)),
                Syntax::ForEach { variable, .. } if *variable != child => {
                    self.parameter(*variable, name, VariableKind::Local)
                }
                Syntax::Catch { parameter, .. } => {
                    self.parameter(*parameter, name, VariableKind::Local)
                }
                Syntax::Try { resources, .. } => resources
                    .iter()
                    .take_while(|&&r| r != child)
                    .find_map(|&r| self.local_from_declaration(r, name, VariableKind::Local)),
                Syntax::Lambda { params, .. } => params
                    .iter()
                    .find_map(|&p| self.parameter(p, name, VariableKind::Parameter))
                    .or_else(|| self.pattern_variable(ancestor, name, use_site)),
                Syntax::Method { params, .. } => params
                    .iter()
                    .find_map(|&p| self.parameter(p, name, VariableKind::Parameter))
                    .or_else(|| self.pattern_variable(ancestor, name, use_site)),
                Syntax::Initializer { .. } => self.pattern_variable(ancestor, name, use_site),
                Syntax::Class { .. } | Syntax::AnonymousClass { .. } => {
                    self.field_in_class(ancestor, name)
                }
                _ => None,
            };
            if found.is_some() {
                return found;
            }
            child = ancestor;
        }
        None
    }

    fn field_info(var: &VariableRef) -> FieldInfo {
        FieldInfo {
            name: var.name.clone(),
            ty: var.ty.clone(),
            is_volatile: var.is_volatile,
            is_static: var.is_static,
            declaration: Some(var.declaration),
        }
    }

    // ---- methods ------------------------------------------------------

    fn method_ref(&self, method: NodeId) -> Option<MethodRef> {
        let Syntax::Method {
            name,
            return_type,
            params,
            ..
        } = self.tree.syntax(method)
        else {
            return None;
        };
        let class = enclosing_class(self.tree, method)?;
        Some(MethodRef {
            class_name: self.class_name(class),
            name: if return_type.is_some() {
                name.clone()
            } else {
                MethodRef::CONSTRUCTOR.to_string()
            },
            arity: params.len(),
            node: Some(method),
        })
    }

    fn accepts_arity(&self, method: NodeId, arity: usize) -> bool {
        let Syntax::Method { params, .. } = self.tree.syntax(method) else {
            return false;
        };
        let varargs = params
            .last()
            .map(|&p| matches!(self.tree.syntax(p), Syntax::Parameter { varargs: true, .. }))
            .unwrap_or(false);
        params.len() == arity || (varargs && arity + 1 >= params.len())
    }

    /// Method declared directly in an in-file class
    fn declared_method(&self, class: NodeId, name: &str, arity: usize) -> Option<NodeId> {
        self.members(class).iter().copied().find(|&m| match self.tree.syntax(m) {
            Syntax::Method {
                name: declared,
                return_type: Some(_),
                ..
            } => declared == name && self.accepts_arity(m, arity),
            _ => false,
        })
    }

    fn method_in_hierarchy(&self, class: NodeId, name: &str, arity: usize) -> Option<MethodRef> {
        self.hierarchy(class)
            .into_iter()
            .find_map(|c| self.declared_method(c, name, arity))
            .and_then(|m| self.method_ref(m))
    }

    fn resolve_method(&self, call: NodeId) -> Option<MethodRef> {
        let Syntax::MethodCall { object, name, args } = self.tree.syntax(call) else {
            return None;
        };
        let arity = args.len();
        let receiver_class = match object.map(|o| (o, self.tree.syntax(o))) {
            None => {
                for class in self.enclosing_classes(call) {
                    if let Some(method) = self.method_in_hierarchy(class, name, arity) {
                        return Some(method);
                    }
                }
                let suffix = format!(".{}", name);
                return self
                    .imports
                    .iter()
                    .find(|i| i.is_static && !i.is_wildcard && i.path.ends_with(&suffix))
                    .map(|i| {
                        let class = &i.path[..i.path.len() - suffix.len()];
                        MethodRef::library(class, name.clone(), arity)
                    })
                    .or_else(|| {
                        let class = *self.enclosing_classes(call).first()?;
                        let library = self.library_superclass(class)?;
                        Some(MethodRef::library(library, name.clone(), arity))
                    });
            }
            Some((_, Syntax::This)) => {
                let class = *self.enclosing_classes(call).first()?;
                return self.method_in_hierarchy(class, name, arity).or_else(|| {
                    let library = self.library_superclass(class)?;
                    Some(MethodRef::library(library, name.clone(), arity))
                });
            }
            Some((_, Syntax::Super)) => {
                let class = *self.enclosing_classes(call).first()?;
                return match self.superclass(class)? {
                    Ok(parent) => self.method_in_hierarchy(parent, name, arity),
                    Err(library) => Some(MethodRef::library(library, name.clone(), arity)),
                };
            }
            Some((receiver, _)) => match self.resolve(receiver) {
                Some(Declaration::Class(class)) => class,
                _ => {
                    let ty = self.type_of(receiver)?;
                    self.resolve_class(&ty, call)?
                }
            },
        };
        match receiver_class.node {
            Some(class) => self.method_in_hierarchy(class, name, arity).or_else(|| {
                let library = self.library_superclass(class)?;
                Some(MethodRef::library(library, name.clone(), arity))
            }),
            None => Some(MethodRef::library(
                receiver_class.qualified_name,
                name.clone(),
                arity,
            )),
        }
    }

    fn method_modifiers(&self, method: &MethodRef) -> Option<&Modifiers> {
        match self.tree.syntax(method.node?) {
            Syntax::Method { modifiers, .. } => Some(modifiers),
            _ => None,
        }
    }

    /// Single statement of a method body
    fn single_statement(&self, method: NodeId) -> Option<NodeId> {
        let Syntax::Method { body: Some(body), .. } = self.tree.syntax(method) else {
            return None;
        };
        match self.tree.statements_of(*body) {
            [only] => Some(*only),
            _ => None,
        }
    }

    /// Field a name or `this.name` expression refers to
    fn referenced_field(&self, expr: NodeId) -> Option<VariableRef> {
        let expr = self.tree.skip_parens(expr);
        match self.tree.syntax(expr) {
            Syntax::Name { .. } => match self.resolve(expr)? {
                Declaration::Variable(v) if v.kind == VariableKind::Field => Some(v),
                _ => None,
            },
            Syntax::FieldAccess { object, field } => match self.tree.syntax(*object) {
                Syntax::This => {
                    let class = *self.enclosing_classes(expr).first()?;
                    self.field_in_class(class, field)
                }
                _ => None,
            },
            _ => None,
        }
    }
}

impl SemanticModel for LocalSemantics<'_> {
    fn tree(&self) -> &SyntaxTree {
        self.tree
    }

    fn resolve(&self, node: NodeId) -> Option<Declaration> {
        match self.tree.syntax(node) {
            Syntax::Name { name } => {
                if let Some(var) = self.resolve_variable(node, name) {
                    return Some(Declaration::Variable(var));
                }
                let looks_like_type = name.chars().next().is_some_and(char::is_uppercase);
                if looks_like_type || self.find_class(name).is_some() {
                    return self
                        .resolve_class(&JavaType::class(name.clone()), node)
                        .map(Declaration::Class);
                }
                None
            }
            Syntax::FieldAccess { object, field } => {
                let class = match self.tree.syntax(*object) {
                    Syntax::This => *self.enclosing_classes(node).first()?,
                    Syntax::Super => {
                        let current = *self.enclosing_classes(node).first()?;
                        self.superclass(current)?.ok()?
                    }
                    _ => match self.resolve(*object) {
                        Some(Declaration::Class(class)) => class.node?,
                        _ => {
                            let ty = self.type_of(*object)?;
                            self.resolve_class(&ty, node)?.node?
                        }
                    },
                };
                self.field_in_class(class, field).map(Declaration::Variable)
            }
            Syntax::MethodCall { .. } => self.resolve_method(node).map(Declaration::Method),
            Syntax::New { .. } => self.resolve_constructor(node).map(Declaration::Method),
            Syntax::This => self
                .enclosing_classes(node)
                .first()
                .map(|&c| Declaration::Class(self.class_ref(c))),
            _ => None,
        }
    }

    fn type_of(&self, node: NodeId) -> Option<JavaType> {
        typing::infer_type(self, node)
    }

    fn resolve_class(&self, ty: &JavaType, _context: NodeId) -> Option<ClassRef> {
        let name = ty.erasure()?;
        Some(match self.find_class(name) {
            Some(node) => self.class_ref(node),
            None => ClassRef::library(self.qualify(name)),
        })
    }

    fn resolve_constructor(&self, new_expr: NodeId) -> Option<MethodRef> {
        let Syntax::New { ty, args, .. } = self.tree.syntax(new_expr) else {
            return None;
        };
        let arity = args.len();
        let class = self.resolve_class(ty, new_expr)?;
        let Some(class_node) = class.node else {
            return Some(MethodRef::library(
                class.qualified_name,
                MethodRef::CONSTRUCTOR,
                arity,
            ));
        };
        let constructors: Vec<NodeId> = self
            .members(class_node)
            .iter()
            .copied()
            .filter(|&m| matches!(self.tree.syntax(m), Syntax::Method { return_type: None, .. }))
            .collect();
        if constructors.is_empty() {
            return (arity == 0).then(|| MethodRef::library(
                class.qualified_name.clone(),
                MethodRef::CONSTRUCTOR,
                0,
            ));
        }
        constructors
            .into_iter()
            .find(|&c| self.accepts_arity(c, arity))
            .and_then(|c| self.method_ref(c))
    }

    fn purity_of(&self, method: &MethodRef) -> Purity {
        let side_effects = &self.config.side_effects;
        if side_effects.is_mutating_method(&method.class_name, &method.name) {
            return Purity::Mutates;
        }
        if side_effects.is_pure_method(&method.class_name, &method.name) {
            return Purity::Pure;
        }
        let Some(modifiers) = self.method_modifiers(method) else {
            return Purity::Unknown;
        };
        if let Some(contract) = modifiers.annotation("Contract") {
            let args: String = contract
                .arguments
                .as_deref()
                .unwrap_or("")
                .chars()
                .filter(|c| !c.is_whitespace())
                .collect();
            if args.contains("mutates=") {
                return Purity::Mutates;
            }
            if args.contains("pure=true") {
                return Purity::Pure;
            }
        }
        if PURE_ANNOTATIONS
            .iter()
            .any(|a| modifiers.annotation(a).is_some())
        {
            return Purity::Pure;
        }
        Purity::Unknown
    }

    fn has_fail_contract(&self, method: &MethodRef) -> bool {
        self.method_modifiers(method)
            .and_then(|m| m.annotation("Contract"))
            .and_then(|a| a.arguments.as_deref())
            .is_some_and(|args| args.contains("fail"))
    }

    fn field_of_getter(&self, method: &MethodRef) -> Option<FieldInfo> {
        if method.arity != 0 || method.is_constructor() {
            return None;
        }
        let statement = self.single_statement(method.node?)?;
        let Syntax::Return { value: Some(value) } = self.tree.syntax(statement) else {
            return None;
        };
        self.referenced_field(*value).map(|v| Self::field_info(&v))
    }

    fn field_of_setter(&self, method: &MethodRef) -> Option<FieldInfo> {
        if method.arity != 1 || method.is_constructor() {
            return None;
        }
        let node = method.node?;
        let Syntax::Method { params, .. } = self.tree.syntax(node) else {
            return None;
        };
        let Syntax::Parameter { name: param, .. } = self.tree.syntax(*params.first()?) else {
            return None;
        };
        let statement = self.single_statement(node)?;
        let Syntax::ExpressionStatement { expr } = self.tree.syntax(statement) else {
            return None;
        };
        let Syntax::Assignment {
            op: AssignOp::Assign,
            target,
            value,
        } = self.tree.syntax(*expr)
        else {
            return None;
        };
        let assigns_param = matches!(
            self.tree.syntax(self.tree.skip_parens(*value)),
            Syntax::Name { name } if name == param
        );
        if !assigns_param {
            return None;
        }
        self.referenced_field(*target).map(|v| Self::field_info(&v))
    }

    fn is_overridable(&self, method: &MethodRef) -> bool {
        let Some(node) = method.node else {
            return false;
        };
        let Syntax::Method {
            modifiers,
            return_type,
            ..
        } = self.tree.syntax(node)
        else {
            return false;
        };
        if return_type.is_none() || modifiers.is_private || modifiers.is_static || modifiers.is_final {
            return false;
        }
        match enclosing_class(self.tree, node).map(|c| self.tree.syntax(c)) {
            Some(Syntax::Class {
                kind, modifiers, ..
            }) => !modifiers.is_final && !matches!(kind, ClassKind::Enum | ClassKind::Record),
            _ => false,
        }
    }

    fn class_shape(&self, class: &ClassRef) -> Option<ClassShape> {
        let node = class.node?;
        let (kind, superclass) = match self.tree.syntax(node) {
            Syntax::Class {
                kind, superclass, ..
            } => (*kind, superclass.is_none()),
            Syntax::AnonymousClass { .. } => (ClassKind::Class, false),
            _ => return None,
        };
        let members = self.members(node);
        let mut shape = ClassShape {
            kind,
            has_explicit_constructor: false,
            extends_object: superclass && kind == ClassKind::Class,
            has_instance_initializers: false,
            has_instance_field_initializers: false,
        };
        for &member in members {
            match self.tree.syntax(member) {
                Syntax::Method {
                    return_type: None, ..
                } => shape.has_explicit_constructor = true,
                Syntax::Initializer {
                    is_static: false, ..
                } => shape.has_instance_initializers = true,
                Syntax::Field {
                    modifiers,
                    declarators,
                    ..
                } if !modifiers.is_static => {
                    let initialized = declarators.iter().any(|&d| {
                        matches!(self.tree.syntax(d), Syntax::Declarator { init: Some(_), .. })
                    });
                    shape.has_instance_field_initializers |= initialized;
                }
                _ => {}
            }
        }
        Some(shape)
    }

    fn find_method_in_class(
        &self,
        class: &ClassRef,
        name: &str,
        arity: usize,
    ) -> Option<MethodRef> {
        let node = class.node?;
        self.declared_method(node, name, arity)
            .and_then(|m| self.method_ref(m))
    }

    fn find_inheritors<'a>(
        &'a self,
        class: &ClassRef,
        budget: SearchBudget,
    ) -> Box<dyn Iterator<Item = ClassRef> + 'a> {
        let candidates: Vec<NodeId> = self
            .classes
            .iter()
            .copied()
            .chain(self.tree.find_all(|t, id| matches!(t.syntax(id), Syntax::AnonymousClass { .. })))
            .collect();
        let mut queue: VecDeque<String> = VecDeque::from([class.qualified_name.clone()]);
        let mut seen: HashSet<NodeId> = HashSet::new();
        let mut pending: VecDeque<NodeId> = VecDeque::new();

        let iter = std::iter::from_fn(move || loop {
            if let Some(found) = pending.pop_front() {
                let reference = self.class_ref(found);
                queue.push_back(reference.qualified_name.clone());
                return Some(reference);
            }
            let target = queue.pop_front()?;
            for &candidate in &candidates {
                if seen.contains(&candidate) {
                    continue;
                }
                if self.direct_supertypes(candidate).iter().any(|s| *s == target) {
                    seen.insert(candidate);
                    pending.push_back(candidate);
                }
            }
        });
        Box::new(iter.take(budget.limit.saturating_add(1)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::parse_java;
    use indoc::indoc;

    fn with_model<R>(source: &str, f: impl FnOnce(&SyntaxTree, &LocalSemantics) -> R) -> R {
        let tree = parse_java(source).unwrap();
        let config = SemaConfig::default();
        let model = LocalSemantics::new(&tree, &config);
        f(&tree, &model)
    }

    fn name_at(tree: &SyntaxTree, text: &str, nth: usize) -> NodeId {
        tree.find_all(|t, id| matches!(t.syntax(id), Syntax::Name { name } if name == text))[nth]
    }

    #[test]
    fn test_locals_shadow_fields() {
        let source = indoc! {r#"
            class A {
                int x;
                int f() {
                    int x = 1;
                    return x;
                }
                int g() { return x; }
            }
        "#};
        with_model(source, |tree, model| {
            let in_f = name_at(tree, "x", 0);
            let in_g = name_at(tree, "x", 1);
            match model.resolve(in_f) {
                Some(Declaration::Variable(v)) => assert_eq!(v.kind, VariableKind::Local),
                other => panic!("unexpected {other:?}"),
            }
            match model.resolve(in_g) {
                Some(Declaration::Variable(v)) => assert_eq!(v.kind, VariableKind::Field),
                other => panic!("unexpected {other:?}"),
            }
        });
    }

    #[test]
    fn test_var_type_is_inferred() {
        let source = "class A { void f() { var n = 10L; long m = n; } }";
        with_model(source, |tree, model| {
            let use_site = name_at(tree, "n", 0);
            assert_eq!(model.type_of(use_site), Some(JavaType::parse("long")));
        });
    }

    #[test]
    fn test_qualify_through_imports_and_java_lang() {
        let source = indoc! {r#"
            package p;
            import java.util.Optional;
            class A {}
        "#};
        with_model(source, |_, model| {
            assert_eq!(model.qualify("Optional"), "java.util.Optional");
            assert_eq!(model.qualify("String"), "java.lang.String");
            assert_eq!(model.qualify("A"), "p.A");
            assert_eq!(model.qualify("Unknown"), "Unknown");
        });
    }

    #[test]
    fn test_library_call_resolves_through_receiver_type() {
        let source = indoc! {r#"
            import java.util.Optional;
            class A {
                boolean f(Optional<String> o) { return o.isPresent(); }
            }
        "#};
        with_model(source, |tree, model| {
            let call = tree.find_by_text("o.isPresent()").unwrap();
            match model.resolve(call) {
                Some(Declaration::Method(m)) => {
                    assert_eq!(m.signature(), "java.util.Optional#isPresent");
                    assert_eq!(model.purity_of(&m), Purity::Pure);
                }
                other => panic!("unexpected {other:?}"),
            }
        });
    }

    #[test]
    fn test_getter_and_setter_detection() {
        let source = indoc! {r#"
            class A {
                private volatile int count;
                int getCount() { return this.count; }
                void setCount(int c) { count = c; }
                int twice() { return count * 2; }
            }
        "#};
        with_model(source, |tree, model| {
            let class = tree.find(|t, id| matches!(t.syntax(id), Syntax::Class { .. })).unwrap();
            let class = model.class_ref(class);
            let getter = model.find_method_in_class(&class, "getCount", 0).unwrap();
            let field = model.field_of_getter(&getter).unwrap();
            assert_eq!(field.name, "count");
            assert!(field.is_volatile);
            let setter = model.find_method_in_class(&class, "setCount", 1).unwrap();
            assert!(model.field_of_setter(&setter).is_some());
            let other = model.find_method_in_class(&class, "twice", 0).unwrap();
            assert!(model.field_of_getter(&other).is_none());
        });
    }

    #[test]
    fn test_contract_annotations() {
        let source = indoc! {r#"
            class A {
                @Contract(pure = true) int a() { return 1; }
                @Contract(value = "null -> fail") void b(Object o) {}
                @Contract(mutates = "this") void c() {}
            }
        "#};
        with_model(source, |tree, model| {
            let class = model.class_ref(tree.find(|t, id| matches!(t.syntax(id), Syntax::Class { .. })).unwrap());
            let a = model.find_method_in_class(&class, "a", 0).unwrap();
            let b = model.find_method_in_class(&class, "b", 1).unwrap();
            let c = model.find_method_in_class(&class, "c", 0).unwrap();
            assert_eq!(model.purity_of(&a), Purity::Pure);
            assert!(model.has_fail_contract(&b));
            assert_eq!(model.purity_of(&c), Purity::Mutates);
        });
    }

    #[test]
    fn test_inheritors_are_transitive_and_capped() {
        let source = indoc! {r#"
            class Base {}
            class Mid extends Base {}
            class Leaf extends Mid {}
            class Other {}
        "#};
        with_model(source, |tree, model| {
            let base = model.class_ref(tree.find(|t, id| matches!(t.syntax(id), Syntax::Class { name, .. } if name == "Base")).unwrap());
            let names: Vec<String> = model
                .find_inheritors(&base, SearchBudget { limit: 10 })
                .map(|c| c.qualified_name)
                .collect();
            assert_eq!(names, vec!["Mid".to_string(), "Leaf".to_string()]);
            assert_eq!(model.find_inheritors(&base, SearchBudget { limit: 0 }).count(), 1);
        });
    }

    #[test]
    fn test_class_shape() {
        let source = indoc! {r#"
            class Plain { static int counter = 0; int x; }
            class Busy { int y = compute(); { init(); } }
        "#};
        with_model(source, |tree, model| {
            let plain = model.class_ref(tree.find(|t, id| matches!(t.syntax(id), Syntax::Class { name, .. } if name == "Plain")).unwrap());
            let shape = model.class_shape(&plain).unwrap();
            assert!(shape.extends_object);
            assert!(!shape.has_instance_field_initializers);
            let busy = model.class_ref(tree.find(|t, id| matches!(t.syntax(id), Syntax::Class { name, .. } if name == "Busy")).unwrap());
            let shape = model.class_shape(&busy).unwrap();
            assert!(shape.has_instance_initializers && shape.has_instance_field_initializers);
        });
    }
}
