#![forbid(unsafe_code)]

//! jsonrule: declarative schema validation for JSON documents
//!
//! A rule document is itself JSON: an object mapping rule names to rule
//! lines, with the empty name as the entry point. Validation walks the
//! subject and the rules together, and a false verdict comes with a trail of
//! `[path, rule]` rejections pinpointing where and why matching failed.
//!
//! ```
//! use jsonrule::{NativeRegistry, RuleCatalog, Validator};
//! use serde_json::json;
//!
//! let natives = NativeRegistry::with_builtins();
//! let rules = json!({"": ["object", {"aaa": "number", "bbb": "string"}]});
//! let catalog = RuleCatalog::from_value(&rules, &natives).unwrap();
//!
//! let mut validator = Validator::new(&catalog, &natives);
//! assert!(validator.validate(&json!({"aaa": 10, "bbb": "x"})).unwrap());
//! assert!(!validator.validate(&json!({"aaa": "ten"})).unwrap());
//! assert_eq!(validator.rejections_value(), json!([[["aaa"], "number"]]));
//! ```

pub mod cli;
pub mod engine;
pub mod error;
pub mod natives;
pub mod output;
pub mod path;
pub mod rules;

// Re-export the core API for convenient access
pub use engine::{Rejection, Validator};
pub use error::{JsonRuleError, SchemaError, ValidateError};
pub use natives::{NativePredicate, NativeRegistry};
pub use path::{Path, Segment};
pub use rules::{CatalogEntry, RuleCatalog, RuleLine, grammar_document};
