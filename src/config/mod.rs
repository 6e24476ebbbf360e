//! Configuration for javasema
//!
//! Everything here is optional in `.javasema.toml`; missing tables and
//! fields fall back to the defaults in [`defaults`].

pub mod defaults;
mod loader;

use crate::errors::{Result, SemaError};
use serde::{Deserialize, Serialize};

pub use loader::{
    directory_ancestors, discover_config, load_config, load_config_from,
    parse_and_validate_config, CONFIG_FILE_NAME,
};

/// Root configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SemaConfig {
    #[serde(default)]
    pub negation: NegationConfig,

    #[serde(default)]
    pub side_effects: SideEffectConfig,
}

impl SemaConfig {
    pub fn validate(&self) -> Result<()> {
        self.negation.validate()?;
        self.side_effects.validate()
    }
}

/// Negation engine settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NegationConfig {
    /// Method pairs whose calls negate each other, e.g. `isPresent`/`isEmpty`
    #[serde(default = "defaults::default_dual_methods")]
    pub dual_methods: Vec<DualMethod>,
}

impl Default for NegationConfig {
    fn default() -> Self {
        Self {
            dual_methods: defaults::default_dual_methods(),
        }
    }
}

impl NegationConfig {
    fn validate(&self) -> Result<()> {
        for dual in &self.dual_methods {
            if dual.class.is_empty() || dual.method.is_empty() || dual.dual.is_empty() {
                return Err(SemaError::config(format!(
                    "dual method entry needs class, method and dual: {:?}",
                    dual
                )));
            }
            if dual.method == dual.dual {
                return Err(SemaError::config(format!(
                    "method {}#{} cannot be its own dual",
                    dual.class, dual.method
                )));
            }
        }
        Ok(())
    }

    /// Dual of `class#method`, in either direction of a configured pair
    pub fn dual_of(&self, class: &str, method: &str) -> Option<&str> {
        self.dual_methods.iter().find_map(|d| {
            if !class_name_matches(&d.class, class) {
                None
            } else if d.method == method {
                Some(d.dual.as_str())
            } else if d.dual == method {
                Some(d.method.as_str())
            } else {
                None
            }
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DualMethod {
    /// Qualified declaring class
    pub class: String,
    pub method: String,
    pub dual: String,
}

impl DualMethod {
    pub fn new(class: &str, method: &str, dual: &str) -> Self {
        Self {
            class: class.to_string(),
            method: method.to_string(),
            dual: dual.to_string(),
        }
    }
}

/// Side-effect classifier settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SideEffectConfig {
    /// Method name prefixes of assertion/precondition style methods
    #[serde(default = "defaults::default_exceptional_name_prefixes")]
    pub exceptional_name_prefixes: Vec<String>,

    /// Classes whose every method may throw as its purpose
    #[serde(default = "defaults::default_exceptional_classes")]
    pub exceptional_classes: Vec<String>,

    /// Classes whose construction never has a visible effect
    #[serde(default = "defaults::default_side_effect_free_classes")]
    pub side_effect_free_classes: Vec<String>,

    /// Library interfaces, for anonymous class instantiation
    #[serde(default = "defaults::default_known_interfaces")]
    pub known_interfaces: Vec<String>,

    /// `pkg.Class#method` signatures (`#*` for every method) that are pure
    #[serde(default = "defaults::default_pure_methods")]
    pub pure_methods: Vec<String>,

    /// Signatures known to mutate state
    #[serde(default = "defaults::default_mutating_methods")]
    pub mutating_methods: Vec<String>,

    /// Inheritors examined before a getter is treated as possibly overridden
    #[serde(default = "defaults::default_inheritor_search_limit")]
    pub inheritor_search_limit: usize,
}

impl Default for SideEffectConfig {
    fn default() -> Self {
        Self {
            exceptional_name_prefixes: defaults::default_exceptional_name_prefixes(),
            exceptional_classes: defaults::default_exceptional_classes(),
            side_effect_free_classes: defaults::default_side_effect_free_classes(),
            known_interfaces: defaults::default_known_interfaces(),
            pure_methods: defaults::default_pure_methods(),
            mutating_methods: defaults::default_mutating_methods(),
            inheritor_search_limit: defaults::default_inheritor_search_limit(),
        }
    }
}

impl SideEffectConfig {
    fn validate(&self) -> Result<()> {
        if self.inheritor_search_limit == 0 {
            return Err(SemaError::config(
                "side_effects.inheritor_search_limit must be at least 1",
            ));
        }
        if self.exceptional_name_prefixes.iter().any(|p| p.is_empty()) {
            return Err(SemaError::config(
                "side_effects.exceptional_name_prefixes cannot contain empty prefixes",
            ));
        }
        for signature in self.pure_methods.iter().chain(&self.mutating_methods) {
            if parse_signature(signature).is_none() {
                return Err(SemaError::config(format!(
                    "invalid method signature '{}', expected 'pkg.Class#method'",
                    signature
                )));
            }
        }
        Ok(())
    }

    pub fn is_pure_method(&self, class: &str, method: &str) -> bool {
        self.pure_methods
            .iter()
            .any(|s| signature_matches(s, class, method))
    }

    pub fn is_mutating_method(&self, class: &str, method: &str) -> bool {
        self.mutating_methods
            .iter()
            .any(|s| signature_matches(s, class, method))
    }

    pub fn is_side_effect_free_class(&self, class: &str) -> bool {
        self.side_effect_free_classes
            .iter()
            .any(|c| class_name_matches(c, class))
    }

    pub fn is_known_interface(&self, class: &str) -> bool {
        self.known_interfaces
            .iter()
            .any(|c| class_name_matches(c, class))
    }

    pub fn is_exceptional_class(&self, class: &str) -> bool {
        self.exceptional_classes
            .iter()
            .any(|c| class_name_matches(c, class))
    }
}

/// Split `pkg.Class#method` into class and method
fn parse_signature(signature: &str) -> Option<(&str, &str)> {
    let (class, method) = signature.split_once('#')?;
    (!class.is_empty() && !method.is_empty()).then_some((class, method))
}

fn signature_matches(signature: &str, class: &str, method: &str) -> bool {
    match parse_signature(signature) {
        Some((pattern_class, pattern_method)) => {
            class_name_matches(pattern_class, class)
                && (pattern_method == "*" || pattern_method == method)
        }
        None => false,
    }
}

/// A configured qualified name matches itself, and matches an unqualified
/// name with the same simple name (imports that could not be followed)
pub fn class_name_matches(configured: &str, actual: &str) -> bool {
    if configured == actual {
        return true;
    }
    !actual.contains('.') && configured.rsplit('.').next() == Some(actual)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(SemaConfig::default().validate().is_ok());
    }

    #[test]
    fn test_dual_lookup_is_symmetric() {
        let config = NegationConfig::default();
        assert_eq!(config.dual_of("java.util.Optional", "isPresent"), Some("isEmpty"));
        assert_eq!(config.dual_of("java.util.Optional", "isEmpty"), Some("isPresent"));
        assert_eq!(config.dual_of("java.util.stream.Stream", "anyMatch"), Some("noneMatch"));
        assert_eq!(config.dual_of("java.util.List", "isEmpty"), None);
    }

    #[test]
    fn test_signature_wildcards() {
        let config = SideEffectConfig {
            pure_methods: vec!["java.lang.Math#*".to_string()],
            ..SideEffectConfig::default()
        };
        assert!(config.is_pure_method("java.lang.Math", "abs"));
        assert!(config.is_pure_method("Math", "max"));
        assert!(!config.is_pure_method("com.acme.Math", "abs"));
    }

    #[test]
    fn test_rejects_malformed_signatures() {
        let config = SemaConfig {
            side_effects: SideEffectConfig {
                mutating_methods: vec!["java.util.List.add".to_string()],
                ..SideEffectConfig::default()
            },
            ..SemaConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_search_limit() {
        let mut config = SemaConfig::default();
        config.side_effects.inheritor_search_limit = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("inheritor_search_limit"));
    }
}
