//! Error types for jsonrule
//!
//! This module defines the error types used throughout jsonrule, following
//! a hierarchical structure that separates rule-document construction defects
//! from fatal validation errors.

/// Errors raised while building a [`RuleCatalog`](crate::rules::RuleCatalog)
/// from a rule document
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// The rule document is not a JSON object
    #[error("rule document must be an object mapping rule names to rule lines")]
    NotAnObject,

    /// A rule line could not be parsed
    #[error("invalid rule '{name}': {message}")]
    InvalidRule { name: String, message: String },
}

impl SchemaError {
    /// Convenience constructor for [`SchemaError::InvalidRule`]
    pub fn invalid(name: impl Into<String>, message: impl Into<String>) -> Self {
        SchemaError::InvalidRule {
            name: name.into(),
            message: message.into(),
        }
    }
}

/// Fatal errors raised during a `validate` call
///
/// These abort the call and discard any rejections accumulated so far; they
/// signal schema-authoring defects, never data problems. Data problems are
/// reported as ordinary [`Rejection`](crate::engine::Rejection)s.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum ValidateError {
    /// A referenced class name is absent from the catalog
    #[error("undefined rule: '{0}'")]
    UndefinedRule(String),

    /// The recursion depth guard tripped, signaling a non-terminating
    /// recursive rule definition
    #[error("recursion depth exceeded ({0}); rule definitions do not terminate")]
    RecursionLimit(usize),
}

/// Top-level error type for jsonrule
#[derive(Debug, thiserror::Error)]
pub enum JsonRuleError {
    /// Rule-document construction error
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Fatal validation error
    #[error("validation error: {0}")]
    Validate(#[from] ValidateError),

    /// JSON parse error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let e = ValidateError::UndefinedRule("missing".to_string());
        assert_eq!(e.to_string(), "undefined rule: 'missing'");

        let e = SchemaError::invalid("", "entry rule is not a rule line");
        assert!(e.to_string().contains("invalid rule ''"));
    }

    #[test]
    fn test_error_conversion() {
        fn top(e: impl Into<JsonRuleError>) -> JsonRuleError {
            e.into()
        }
        assert!(matches!(
            top(ValidateError::RecursionLimit(512)),
            JsonRuleError::Validate(_)
        ));
        assert!(matches!(top(SchemaError::NotAnObject), JsonRuleError::Schema(_)));
    }
}
