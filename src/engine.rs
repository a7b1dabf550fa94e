#![forbid(unsafe_code)]

//! Validation engine: the public [`Validator`] and its rejection reports
//!
//! A `Validator` borrows a catalog and a native registry and owns nothing but
//! the rejection trail of its last call. Calls are all-or-nothing: a fatal
//! [`ValidateError`] leaves the trail empty, a false verdict leaves the trail
//! non-empty, and a true verdict always leaves it empty.

mod evaluator;

use crate::error::ValidateError;
use crate::natives::NativeRegistry;
use crate::path::Segment;
use crate::rules::RuleCatalog;
use evaluator::Evaluator;
use serde_json::Value;
use std::fmt;

/// One recorded rejection: where validation failed and which rule failed there
///
/// The trail reads innermost-first; the last entry is the outermost rule that
/// gave up.
#[derive(Debug, Clone, PartialEq)]
pub struct Rejection {
    path: Vec<Segment>,
    rule: Value,
}

impl Rejection {
    pub(crate) fn new(path: Vec<Segment>, rule: Value) -> Self {
        Rejection { path, rule }
    }

    /// Root-to-node segments of the failing location
    pub fn path(&self) -> &[Segment] {
        &self.path
    }

    /// The failing rule, rendered back to its JSON encoding
    pub fn rule(&self) -> &Value {
        &self.rule
    }

    /// Renders the rejection as `[path, rule]`
    pub fn to_value(&self) -> Value {
        let path = Value::Array(self.path.iter().map(Segment::to_value).collect());
        Value::Array(vec![path, self.rule.clone()])
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", crate::path::render_pointer(&self.path), self.rule)
    }
}

/// Validates JSON values against a rule catalog
///
/// The catalog and registry are shared read-only; per-call state lives in a
/// private evaluator, so cloning a validator (or creating one per thread over
/// the same catalog) is how concurrent validation is done.
pub struct Validator<'a> {
    catalog: &'a RuleCatalog,
    natives: &'a NativeRegistry,
    rejections: Vec<Rejection>,
}

impl<'a> Validator<'a> {
    pub fn new(catalog: &'a RuleCatalog, natives: &'a NativeRegistry) -> Self {
        Validator {
            catalog,
            natives,
            rejections: Vec::new(),
        }
    }

    /// Validates `subject` against the catalog's entry point rule
    ///
    /// Returns the verdict; on a false verdict the rejection trail is
    /// available from [`rejections`](Self::rejections).
    ///
    /// # Errors
    ///
    /// [`ValidateError`] on undefined rule references or runaway recursion.
    /// The trail is cleared; fatal errors report schema defects, not data.
    pub fn validate(&mut self, subject: &Value) -> Result<bool, ValidateError> {
        self.validate_rule(subject, RuleCatalog::ENTRY_RULE, &[])
    }

    /// Validates `subject` against a named rule with explicit arguments
    ///
    /// The name may also spell a built-in type check (`"any"`, `"string"`);
    /// those evaluate without a catalog entry. Arguments reach native
    /// predicates only.
    pub fn validate_rule(
        &mut self,
        subject: &Value,
        rule: &str,
        args: &[Value],
    ) -> Result<bool, ValidateError> {
        self.rejections.clear();
        let mut evaluator = Evaluator::new(self.catalog, self.natives);
        match evaluator.eval_named(Some(subject), rule, args) {
            Ok(verdict) => {
                self.rejections = evaluator.into_rejections();
                Ok(verdict)
            }
            Err(fatal) => Err(fatal),
        }
    }

    /// The rejection trail of the last call, innermost-first
    pub fn rejections(&self) -> &[Rejection] {
        &self.rejections
    }

    /// The trail rendered as a JSON array of `[path, rule]` pairs
    pub fn rejections_value(&self) -> Value {
        Value::Array(self.rejections.iter().map(Rejection::to_value).collect())
    }
}
