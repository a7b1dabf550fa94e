#![forbid(unsafe_code)]

//! Serializable validation reports
//!
//! One [`FileReport`] per checked document, aggregated into a [`CheckReport`].
//! These are the machine-readable output of the CLI; the JSON format is their
//! direct serde rendering.

use crate::engine::Rejection;
use crate::path::Segment;
use serde::Serialize;
use serde_json::Value;

/// One rejection in serialized form: the failing location and rule
#[derive(Debug, Clone, Serialize)]
pub struct RejectionRecord {
    /// Root-to-node segments as a JSON array of keys and indices
    pub path: Value,
    /// The failing rule, rendered back to its document encoding
    pub rule: Value,
    /// Pointer-style rendering of the path, for readability
    pub location: String,
}

impl RejectionRecord {
    pub fn from_rejection(rejection: &Rejection) -> Self {
        let segments = rejection.path();
        RejectionRecord {
            path: Value::Array(segments.iter().map(Segment::to_value).collect()),
            rule: rejection.rule().clone(),
            location: crate::path::render_pointer(segments),
        }
    }
}

/// Outcome of validating one document
#[derive(Debug, Serialize)]
pub struct FileReport {
    pub file: String,
    pub valid: bool,
    /// Fatal error message, if the document could not be validated at all
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub rejections: Vec<RejectionRecord>,
}

impl FileReport {
    /// A document that validated cleanly
    pub fn valid(file: impl Into<String>) -> Self {
        FileReport {
            file: file.into(),
            valid: true,
            error: None,
            rejections: Vec::new(),
        }
    }

    /// A document rejected by the rules, with its trail
    pub fn rejected(file: impl Into<String>, rejections: &[Rejection]) -> Self {
        FileReport {
            file: file.into(),
            valid: false,
            error: None,
            rejections: rejections
                .iter()
                .map(RejectionRecord::from_rejection)
                .collect(),
        }
    }

    /// A document that could not be validated (I/O, parse, or schema fault)
    pub fn failed(file: impl Into<String>, error: impl ToString) -> Self {
        FileReport {
            file: file.into(),
            valid: false,
            error: Some(error.to_string()),
            rejections: Vec::new(),
        }
    }
}

/// Aggregate outcome over all checked documents
#[derive(Debug, Serialize)]
pub struct CheckReport {
    pub valid: bool,
    pub files_checked: usize,
    pub files_rejected: usize,
    pub files: Vec<FileReport>,
}

impl CheckReport {
    pub fn new(files: Vec<FileReport>) -> Self {
        let files_rejected = files.iter().filter(|f| !f.valid).count();
        CheckReport {
            valid: files_rejected == 0,
            files_checked: files.len(),
            files_rejected,
            files,
        }
    }
}
