//! Common helpers shared across CLI commands

use crate::cli::args::ColorChoice;
use crate::error::JsonRuleError;
use serde_json::Value;
use std::io::{IsTerminal, Read};
use std::path::Path;

/// Exit codes
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_REJECTED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Loads a JSON document from a file, or from stdin for `-`
///
/// # Errors
///
/// Returns `JsonRuleError::Io` if the file cannot be read and
/// `JsonRuleError::Json` if it does not parse.
pub(crate) fn load_json(path: &str) -> Result<Value, JsonRuleError> {
    let text = if path == "-" {
        let mut buffer = String::new();
        std::io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        std::fs::read_to_string(Path::new(path))?
    };
    Ok(serde_json::from_str(&text)?)
}

/// Maps the CLI color flag to termcolor's choice, downgrading `auto` when
/// stderr is not a terminal
pub(crate) fn color_choice(color: ColorChoice) -> termcolor::ColorChoice {
    match color {
        ColorChoice::Always => termcolor::ColorChoice::Always,
        ColorChoice::Never => termcolor::ColorChoice::Never,
        ColorChoice::Auto => {
            if std::io::stderr().is_terminal() {
                termcolor::ColorChoice::Auto
            } else {
                termcolor::ColorChoice::Never
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_json_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"aaa": 1}}"#).unwrap();
        let value = load_json(file.path().to_str().unwrap()).unwrap();
        assert_eq!(value["aaa"], 1);
    }

    #[test]
    fn test_load_json_errors() {
        assert!(matches!(
            load_json("/nonexistent/file.json"),
            Err(JsonRuleError::Io(_))
        ));

        let mut file = NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(matches!(
            load_json(file.path().to_str().unwrap()),
            Err(JsonRuleError::Json(_))
        ));
    }

    #[test]
    fn test_color_choice_mapping() {
        assert!(matches!(
            color_choice(ColorChoice::Always),
            termcolor::ColorChoice::Always
        ));
        assert!(matches!(
            color_choice(ColorChoice::Never),
            termcolor::ColorChoice::Never
        ));
    }
}
