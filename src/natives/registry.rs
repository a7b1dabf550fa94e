#![forbid(unsafe_code)]

//! Pluggable leaf predicates
//!
//! Native predicates are the format and comparison checks invoked by name from
//! rule lines. The engine calls them through [`NativeRegistry`] and never
//! implements their internals; new leaf checks can be registered without
//! touching the recursive core.

use serde_json::Value;
use std::collections::BTreeMap;

/// A leaf check implemented outside the rule grammar
///
/// The two methods mirror the engine's two evaluation phases: `accept` is
/// consulted while selecting a shape (first-match-wins), `reject` while
/// applying refinements (all-must-pass). Most predicates implement exactly
/// one of them and leave the other at its always-true default.
///
/// `subject` is `None` when the checked location is absent (an undefined
/// object member or tuple position). Predicates must be `Send + Sync`;
/// concurrent validate calls share one registry.
pub trait NativePredicate: Send + Sync {
    /// Shape-selection predicate
    fn accept(&self, subject: Option<&Value>, args: &[Value]) -> bool {
        let _ = (subject, args);
        true
    }

    /// Refinement predicate
    fn reject(&self, subject: Option<&Value>, args: &[Value]) -> bool {
        let _ = (subject, args);
        true
    }
}

/// Registry of native predicates, keyed by name
///
/// Kept in a sorted map so the catalog's native merge is deterministic.
pub struct NativeRegistry {
    predicates: BTreeMap<String, Box<dyn NativePredicate>>,
}

impl NativeRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        NativeRegistry {
            predicates: BTreeMap::new(),
        }
    }

    /// Creates a registry holding the built-in predicate catalog
    pub fn with_builtins() -> Self {
        let mut registry = NativeRegistry::new();
        crate::natives::builtin::install(&mut registry);
        registry
    }

    /// Registers a predicate under `name`, replacing any previous one
    pub fn register(&mut self, name: impl Into<String>, predicate: impl NativePredicate + 'static) {
        self.predicates.insert(name.into(), Box::new(predicate));
    }

    /// Looks up a predicate by name
    pub fn get(&self, name: &str) -> Option<&dyn NativePredicate> {
        self.predicates.get(name).map(|boxed| boxed.as_ref())
    }

    /// Returns true if `name` is registered
    pub fn contains(&self, name: &str) -> bool {
        self.predicates.contains_key(name)
    }

    /// Iterates over registered names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.predicates.keys().map(String::as_str)
    }

    /// Number of registered predicates
    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    /// Returns true if nothing is registered
    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }
}

impl Default for NativeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct NonEmpty;

    impl NativePredicate for NonEmpty {
        fn accept(&self, subject: Option<&Value>, _args: &[Value]) -> bool {
            subject.and_then(Value::as_str).is_some_and(|s| !s.is_empty())
        }
    }

    #[test]
    fn test_register_and_dispatch() {
        let mut registry = NativeRegistry::new();
        assert!(registry.is_empty());

        registry.register("non-empty", NonEmpty);
        assert!(registry.contains("non-empty"));
        assert_eq!(registry.len(), 1);

        let predicate = registry.get("non-empty").unwrap();
        assert!(predicate.accept(Some(&json!("x")), &[]));
        assert!(!predicate.accept(Some(&json!("")), &[]));
        assert!(!predicate.accept(None, &[]));
        // Default reject is always true.
        assert!(predicate.reject(Some(&json!("")), &[]));
    }

    #[test]
    fn test_registry_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}
        assert_send::<NativeRegistry>();
        assert_sync::<NativeRegistry>();
    }

    #[test]
    fn test_names_sorted() {
        let mut registry = NativeRegistry::new();
        registry.register("zeta", NonEmpty);
        registry.register("alpha", NonEmpty);
        let names: Vec<_> = registry.names().collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
    }
}
