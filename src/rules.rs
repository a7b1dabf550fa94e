//! The rule grammar: AST, parsing, and the catalog of named rules

pub mod catalog;
pub mod line;

pub use catalog::{CatalogEntry, RuleCatalog, grammar_document};
pub use line::{CompareOp, Condition, Invocation, RuleLine, TypeName};
