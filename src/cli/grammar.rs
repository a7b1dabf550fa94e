//! Grammar command implementation

use crate::cli::common::{EXIT_ERROR, EXIT_SUCCESS};
use crate::rules::grammar_document;

/// Prints the embedded grammar rule document to stdout
pub fn run_grammar() -> i32 {
    match serde_json::to_string_pretty(&grammar_document()) {
        Ok(json) => {
            println!("{}", json);
            EXIT_SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            EXIT_ERROR
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_grammar_succeeds() {
        assert_eq!(run_grammar(), EXIT_SUCCESS);
    }
}
