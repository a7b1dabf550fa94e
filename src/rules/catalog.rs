#![forbid(unsafe_code)]

//! RuleCatalog: immutable name → rule mapping
//!
//! Built once from a rule document, read-only during validation. Entries may
//! reference each other, including cycles; recursive schemas are intentional
//! and termination is enforced by the evaluator's depth guard, not here.

use crate::error::SchemaError;
use crate::natives::NativeRegistry;
use crate::rules::RuleLine;
use indexmap::IndexMap;
use serde_json::{Value, json};

/// One catalog entry: a parsed rule line or a native predicate marker
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogEntry {
    /// Declared with the reserved rule string `"native"`, or merged in from
    /// the registry; dispatched to the native registry by name
    Native,
    /// An ordinary parsed rule line
    Rule(RuleLine),
}

/// Immutable mapping from rule name to rule line
///
/// The entry point rule is stored under the reserved empty name. Names present
/// in the native registry but absent from the document are merged in as native
/// entries; user definitions always win over the merge.
#[derive(Debug, Clone)]
pub struct RuleCatalog {
    entries: IndexMap<String, CatalogEntry>,
}

impl RuleCatalog {
    /// The reserved name of the entry point rule
    pub const ENTRY_RULE: &'static str = "";

    /// Builds a catalog from a rule document
    ///
    /// The document must be an object mapping rule names to rule lines.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] if the document is not an object or any member
    /// fails to parse as a rule line.
    pub fn from_value(document: &Value, natives: &NativeRegistry) -> Result<Self, SchemaError> {
        let Value::Object(map) = document else {
            return Err(SchemaError::NotAnObject);
        };
        let mut entries = IndexMap::with_capacity(map.len());
        for (name, value) in map {
            let entry = if value.as_str() == Some("native") {
                CatalogEntry::Native
            } else {
                CatalogEntry::Rule(
                    RuleLine::parse(value).map_err(|message| SchemaError::invalid(name, message))?,
                )
            };
            entries.insert(name.clone(), entry);
        }
        for name in natives.names() {
            if !entries.contains_key(name) {
                entries.insert(name.to_string(), CatalogEntry::Native);
            }
        }
        Ok(RuleCatalog { entries })
    }

    /// Looks up a rule by name
    pub fn get(&self, name: &str) -> Option<&CatalogEntry> {
        self.entries.get(name)
    }

    /// Returns true if the catalog defines the entry point rule
    pub fn has_entry_rule(&self) -> bool {
        self.entries.contains_key(Self::ENTRY_RULE)
    }

    /// Iterates over rule names in document order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of entries, merged natives included
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the catalog has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The rule document describing rule documents themselves
///
/// Every member of a rule document is one `ruleline`: a string (type name,
/// literal, comment, or class reference), a scalar, an array of rule lines
/// (alternation or invocation), or an object template. The document validates
/// against itself; self-validation is an ordinary case for the engine.
pub fn grammar_document() -> Value {
    json!({
        "": ["object", {}, "ruleline"],
        "ruleline": [
            "string",
            "number",
            "boolean",
            "null",
            ["array", "ruleline"],
            ["object", {}, "ruleline"]
        ]
    })
}
