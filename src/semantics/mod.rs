//! Semantic oracles consumed by the analyses
//!
//! The analyses never resolve names themselves. They ask a [`SemanticModel`]
//! for declarations, types, purity signatures and inheritors. [`LocalSemantics`]
//! answers from a single compilation unit plus configured library tables.

pub mod comments;
pub mod equivalence;
pub mod local;
pub mod typing;

use crate::core::JavaType;
use crate::syntax::{ClassKind, NodeId, SyntaxTree};
use serde::Serialize;

pub use comments::CommentTracker;
pub use equivalence::{EquivalenceOracle, StructuralEquivalence};
pub use local::LocalSemantics;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableKind {
    Local,
    Parameter,
    Field,
    Pattern,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariableRef {
    pub name: String,
    pub kind: VariableKind,
    /// Declaring node: a `Declarator`, `Parameter` or `PatternVariable`
    pub declaration: NodeId,
    pub ty: JavaType,
    pub is_static: bool,
    pub is_volatile: bool,
}

/// A resolved method or constructor. Constructors are named `<init>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct MethodRef {
    /// Declaring class, qualified when known
    pub class_name: String,
    pub name: String,
    pub arity: usize,
    /// Declaration in the analyzed compilation unit, if it lives there
    pub node: Option<NodeId>,
}

impl MethodRef {
    pub const CONSTRUCTOR: &'static str = "<init>";

    pub fn library(class_name: impl Into<String>, name: impl Into<String>, arity: usize) -> Self {
        Self {
            class_name: class_name.into(),
            name: name.into(),
            arity,
            node: None,
        }
    }

    /// `pkg.Class#method`, the key used by configured signature tables
    pub fn signature(&self) -> String {
        format!("{}#{}", self.class_name, self.name)
    }

    pub fn is_constructor(&self) -> bool {
        self.name == Self::CONSTRUCTOR
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ClassRef {
    pub qualified_name: String,
    /// Declaration in the analyzed compilation unit, if it lives there
    pub node: Option<NodeId>,
}

impl ClassRef {
    pub fn library(qualified_name: impl Into<String>) -> Self {
        Self {
            qualified_name: qualified_name.into(),
            node: None,
        }
    }

    pub fn simple_name(&self) -> &str {
        self.qualified_name
            .rsplit('.')
            .next()
            .unwrap_or(&self.qualified_name)
    }

    pub fn package(&self) -> Option<&str> {
        self.qualified_name.rsplit_once('.').map(|(pkg, _)| pkg)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "declaration", rename_all = "lowercase")]
pub enum Declaration {
    Variable(VariableRef),
    Method(MethodRef),
    Class(ClassRef),
}

/// Purity/mutation signature of a routine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Purity {
    Pure,
    Mutates,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldInfo {
    pub name: String,
    pub ty: JavaType,
    pub is_volatile: bool,
    pub is_static: bool,
    pub declaration: Option<NodeId>,
}

/// What object construction of a class may run implicitly
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassShape {
    pub kind: ClassKind,
    pub has_explicit_constructor: bool,
    /// No `extends` clause, so the superclass is `java.lang.Object`
    pub extends_object: bool,
    pub has_instance_initializers: bool,
    pub has_instance_field_initializers: bool,
}

impl ClassShape {
    pub fn is_interface(&self) -> bool {
        matches!(self.kind, ClassKind::Interface | ClassKind::Annotation)
    }
}

/// Cap on whole-program searches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SearchBudget {
    pub limit: usize,
}

impl Default for SearchBudget {
    fn default() -> Self {
        Self { limit: 10 }
    }
}

/// Name resolution, typing and whole-program queries over one tree
pub trait SemanticModel {
    fn tree(&self) -> &SyntaxTree;

    /// Declaration a name, field access, call or `new` refers to
    fn resolve(&self, node: NodeId) -> Option<Declaration>;

    fn type_of(&self, node: NodeId) -> Option<JavaType>;

    /// Class a type spelling refers to at `context`
    fn resolve_class(&self, ty: &JavaType, context: NodeId) -> Option<ClassRef>;

    fn resolve_constructor(&self, new_expr: NodeId) -> Option<MethodRef>;

    fn purity_of(&self, method: &MethodRef) -> Purity;

    /// Whether the method's contract says it fails (throws) for some inputs
    fn has_fail_contract(&self, method: &MethodRef) -> bool;

    fn field_of_getter(&self, method: &MethodRef) -> Option<FieldInfo>;

    fn field_of_setter(&self, method: &MethodRef) -> Option<FieldInfo>;

    /// Whether a subclass could override the method
    fn is_overridable(&self, method: &MethodRef) -> bool;

    fn class_shape(&self, class: &ClassRef) -> Option<ClassShape>;

    /// Method declared directly in `class`, not inherited
    fn find_method_in_class(&self, class: &ClassRef, name: &str, arity: usize)
        -> Option<MethodRef>;

    /// Subclasses and implementors, lazily, within the budget
    fn find_inheritors<'a>(
        &'a self,
        class: &ClassRef,
        budget: SearchBudget,
    ) -> Box<dyn Iterator<Item = ClassRef> + 'a>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_signature() {
        let method = MethodRef::library("java.util.Optional", "isPresent", 0);
        assert_eq!(method.signature(), "java.util.Optional#isPresent");
        assert!(!method.is_constructor());
        assert!(MethodRef::library("Foo", MethodRef::CONSTRUCTOR, 1).is_constructor());
    }

    #[test]
    fn test_class_ref_names() {
        let class = ClassRef::library("java.lang.IllegalStateException");
        assert_eq!(class.simple_name(), "IllegalStateException");
        assert_eq!(class.package(), Some("java.lang"));
        assert_eq!(ClassRef::library("Local").package(), None);
    }
}
