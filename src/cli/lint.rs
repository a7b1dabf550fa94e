//! Lint command implementation
//!
//! Validates a rule document two ways: against the embedded grammar (which is
//! itself an ordinary rule document), then by actually building a catalog from
//! it, which catches operand faults the grammar's shape check cannot express.

use crate::cli::args::{ColorChoice, OutputFormat};
use crate::cli::common::{EXIT_ERROR, EXIT_REJECTED, EXIT_SUCCESS, load_json};
use crate::engine::Validator;
use crate::error::JsonRuleError;
use crate::natives::NativeRegistry;
use crate::output::{CheckReport, FileReport, HumanFormatter};
use crate::rules::{RuleCatalog, grammar_document};

/// Run the lint command
///
/// # Returns
///
/// Exit code: 0 well formed, 1 rejected by the grammar or catalog
/// construction, 2 on I/O errors.
pub fn run_lint(schema: &str, format: OutputFormat, color: ColorChoice) -> i32 {
    let report = match run_lint_inner(schema) {
        Ok(report) => CheckReport::new(vec![report]),
        Err(e) => {
            eprintln!("Error: {}", e);
            return EXIT_ERROR;
        }
    };

    match format {
        OutputFormat::Human => {
            let formatter = HumanFormatter::new(crate::cli::common::color_choice(color));
            if let Err(e) = formatter.print(&report) {
                eprintln!("Error: {}", e);
                return EXIT_ERROR;
            }
        }
        OutputFormat::Json => match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error: {}", e);
                return EXIT_ERROR;
            }
        },
    }

    if report.valid { EXIT_SUCCESS } else { EXIT_REJECTED }
}

fn run_lint_inner(schema: &str) -> Result<FileReport, JsonRuleError> {
    let document = load_json(schema)?;
    let natives = NativeRegistry::with_builtins();

    let grammar = grammar_document();
    let grammar_catalog = RuleCatalog::from_value(&grammar, &natives)?;
    let mut validator = Validator::new(&grammar_catalog, &natives);
    if !validator.validate(&document)? {
        return Ok(FileReport::rejected(schema, validator.rejections()));
    }

    // Shape is fine; now surface operand-level faults.
    match RuleCatalog::from_value(&document, &natives) {
        Ok(_) => Ok(FileReport::valid(schema)),
        Err(e) => Ok(FileReport::failed(schema, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn temp_json(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn test_lint_well_formed() {
        let schema = temp_json(r#"{"": ["string", ["array", "number"]]}"#);
        let report = run_lint_inner(schema.path().to_str().unwrap()).unwrap();
        assert!(report.valid);
    }

    #[test]
    fn test_lint_rejects_non_object() {
        let schema = temp_json(r#"["rules", "must", "be", "objects"]"#);
        let report = run_lint_inner(schema.path().to_str().unwrap()).unwrap();
        assert!(!report.valid);
        assert!(!report.rejections.is_empty());
    }

    #[test]
    fn test_lint_catches_bad_operands() {
        // Shape-valid but max-size wants an unsigned integer.
        let schema = temp_json(r#"{"": ["max-size", "three"]}"#);
        let report = run_lint_inner(schema.path().to_str().unwrap()).unwrap();
        assert!(!report.valid);
        assert!(report.error.is_some());
    }

    #[test]
    fn test_lint_grammar_itself() {
        let grammar = serde_json::to_string(&grammar_document()).unwrap();
        let schema = temp_json(&grammar);
        let report = run_lint_inner(schema.path().to_str().unwrap()).unwrap();
        assert!(report.valid);
    }
}
