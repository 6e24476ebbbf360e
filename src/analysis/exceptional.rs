//! Methods whose observable effect is throwing
//!
//! Assertion and precondition helpers are often value-pure, yet calling one
//! can end the enclosing computation with an exception. The side-effect
//! classifier asks an [`ExceptionalEffectHeuristic`] before trusting purity.

use crate::config::{class_name_matches, SideEffectConfig};
use crate::semantics::{MethodRef, SemanticModel};

pub trait ExceptionalEffectHeuristic {
    fn may_have_exceptional_side_effect(&self, model: &dyn SemanticModel, method: &MethodRef)
        -> bool;
}

/// Name-prefix matching (`assert*`, `check*`, `require*` by default),
/// configured precondition classes, and `@Contract` fail clauses
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamePrefixHeuristic {
    prefixes: Vec<String>,
    classes: Vec<String>,
}

impl NamePrefixHeuristic {
    pub fn new(prefixes: Vec<String>, classes: Vec<String>) -> Self {
        Self { prefixes, classes }
    }

    pub fn from_config(config: &SideEffectConfig) -> Self {
        Self::new(
            config.exceptional_name_prefixes.clone(),
            config.exceptional_classes.clone(),
        )
    }
}

impl Default for NamePrefixHeuristic {
    fn default() -> Self {
        Self::from_config(&SideEffectConfig::default())
    }
}

impl ExceptionalEffectHeuristic for NamePrefixHeuristic {
    fn may_have_exceptional_side_effect(
        &self,
        model: &dyn SemanticModel,
        method: &MethodRef,
    ) -> bool {
        if self.prefixes.iter().any(|p| method.name.starts_with(p.as_str())) {
            return true;
        }
        if self
            .classes
            .iter()
            .any(|c| class_name_matches(c, &method.class_name))
        {
            return true;
        }
        model.has_fail_contract(method)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SemaConfig;
    use crate::semantics::{Declaration, LocalSemantics};
    use crate::syntax::parse_java;
    use indoc::indoc;

    fn check(source: &str, call: &str) -> bool {
        let tree = parse_java(source).unwrap();
        let config = SemaConfig::default();
        let model = LocalSemantics::new(&tree, &config);
        let node = tree.find_by_text(call).unwrap();
        let Some(Declaration::Method(method)) = model.resolve(node) else {
            panic!("{call} did not resolve");
        };
        NamePrefixHeuristic::default().may_have_exceptional_side_effect(&model, &method)
    }

    #[test]
    fn test_name_prefixes() {
        let source = indoc! {r#"
            class A {
                void checkIndex(int i) {}
                int compute(int i) { return i; }
                void f() { checkIndex(1); compute(2); }
            }
        "#};
        assert!(check(source, "checkIndex(1)"));
        assert!(!check(source, "compute(2)"));
    }

    #[test]
    fn test_precondition_class_and_fail_contract() {
        let source = indoc! {r#"
            import com.google.common.base.Preconditions;
            class A {
                @Contract("null -> fail")
                static String orFail(String s) { return s; }
                void f(String s) { Preconditions.isValid(s); orFail(s); }
            }
        "#};
        assert!(check(source, "Preconditions.isValid(s)"));
        assert!(check(source, "orFail(s)"));
    }
}
