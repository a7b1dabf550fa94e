//! Check command implementation
//!
//! Loads the rule document once, then validates every input document against
//! it in parallel. Each worker gets its own validator over the shared catalog
//! and registry; rejection trails never mix between documents.

use crate::cli::args::{ColorChoice, OutputFormat};
use crate::cli::common::{EXIT_ERROR, EXIT_REJECTED, EXIT_SUCCESS, load_json};
use crate::engine::Validator;
use crate::error::JsonRuleError;
use crate::natives::NativeRegistry;
use crate::output::{CheckReport, FileReport, HumanFormatter};
use crate::rules::RuleCatalog;
use rayon::prelude::*;

/// Run the check command
///
/// # Arguments
///
/// * `schema` - Path to the rule document
/// * `files` - Documents to validate (`-` for stdin)
/// * `rule` - Optional named rule overriding the entry point
/// * `format` - Output format
/// * `color` - Color choice for human output
///
/// # Returns
///
/// Exit code: 0 all documents valid, 1 at least one rejected, 2 on schema or
/// I/O errors.
pub fn run_check(
    schema: &str,
    files: &[String],
    rule: Option<&str>,
    format: OutputFormat,
    color: ColorChoice,
) -> i32 {
    let report = match run_check_inner(schema, files, rule) {
        Ok(report) => report,
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

fn run_check_inner(
    schema: &str,
    files: &[String],
    rule: Option<&str>,
) -> Result<CheckReport, JsonRuleError> {
    let document = load_json(schema)?;
    let natives = NativeRegistry::with_builtins();
    let catalog = RuleCatalog::from_value(&document, &natives)?;

    let reports: Vec<FileReport> = files
        .par_iter()
        .map(|file| check_file(file, &catalog, &natives, rule))
        .collect();

    Ok(CheckReport::new(reports))
}

/// Validates one document with its own validator over the shared catalog
fn check_file(
    file: &str,
    catalog: &RuleCatalog,
    natives: &NativeRegistry,
    rule: Option<&str>,
) -> FileReport {
    let value = match load_json(file) {
        Ok(value) => value,
        Err(e) => return FileReport::failed(file, e),
    };
    let mut validator = Validator::new(catalog, natives);
    let verdict = match rule {
        Some(name) => validator.validate_rule(&value, name, &[]),
        None => validator.validate(&value),
    };
    match verdict {
        Ok(true) => FileReport::valid(file),
        Ok(false) => FileReport::rejected(file, validator.rejections()),
        Err(e) => FileReport::failed(file, e),
    }
}
