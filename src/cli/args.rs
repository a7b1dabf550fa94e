//! CLI argument parsing using clap

use clap::{Parser, Subcommand, ValueEnum};

/// Output format for validation commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// One JSON report object
    Json,
}

/// Color output choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    /// Automatically detect if the terminal supports color
    Auto,
    /// Always use color
    Always,
    /// Never use color
    Never,
}

/// jsonrule CLI main entry point
#[derive(Parser, Debug)]
#[command(name = "jsonrule")]
#[command(about = "Validate JSON documents against declarative rule documents")]
#[command(version)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,

    /// Output coloring
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate documents against a rule document
    Check {
        /// Rule document to validate against
        schema: String,

        /// Documents to validate ("-" reads stdin)
        #[arg(default_value = "-")]
        files: Vec<String>,

        /// Validate against a named rule instead of the entry point
        #[arg(long)]
        rule: Option<String>,

        /// Output format
        #[arg(short, long, default_value = "human")]
        format: OutputFormat,
    },

    /// Check that a rule document is well formed
    Lint {
        /// Rule document to lint
        schema: String,

        /// Output format
        #[arg(short, long, default_value = "human")]
        format: OutputFormat,
    },

    /// Print the grammar rule document describing rule documents
    Grammar,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_verify_cli() {
        // Verify that the CLI struct is properly configured
        Cli::command().debug_assert();
    }

    #[test]
    fn test_check_default_args() {
        let cli = Cli::parse_from(["jsonrule", "check", "schema.json"]);
        match cli.command {
            Command::Check {
                schema,
                files,
                rule,
                format,
            } => {
                assert_eq!(schema, "schema.json");
                assert_eq!(files, vec!["-"]);
                assert_eq!(rule, None);
                assert_eq!(format, OutputFormat::Human);
            }
            _ => panic!("Expected Check command"),
        }
        assert_eq!(cli.color, ColorChoice::Auto);
    }

    #[test]
    fn test_check_with_files_and_rule() {
        let cli = Cli::parse_from([
            "jsonrule", "check", "schema.json", "a.json", "b.json", "--rule", "side",
        ]);
        match cli.command {
            Command::Check { files, rule, .. } => {
                assert_eq!(files, vec!["a.json", "b.json"]);
                assert_eq!(rule, Some("side".to_string()));
            }
            _ => panic!("Expected Check command"),
        }
    }

    #[test]
    fn test_check_short_format() {
        let cli = Cli::parse_from(["jsonrule", "check", "schema.json", "-f", "json"]);
        match cli.command {
            Command::Check { format, .. } => {
                assert_eq!(format, OutputFormat::Json);
            }
            _ => panic!("Expected Check command"),
        }
    }

    #[test]
    fn test_lint() {
        let cli = Cli::parse_from(["jsonrule", "lint", "schema.json"]);
        match cli.command {
            Command::Lint { schema, format } => {
                assert_eq!(schema, "schema.json");
                assert_eq!(format, OutputFormat::Human);
            }
            _ => panic!("Expected Lint command"),
        }
    }

    #[test]
    fn test_grammar() {
        let cli = Cli::parse_from(["jsonrule", "grammar"]);
        assert!(matches!(cli.command, Command::Grammar));
    }

    #[test]
    fn test_global_color_flag() {
        let cli = Cli::parse_from(["jsonrule", "--color", "always", "grammar"]);
        assert_eq!(cli.color, ColorChoice::Always);

        let cli = Cli::parse_from(["jsonrule", "lint", "s.json", "--color", "never"]);
        assert_eq!(cli.color, ColorChoice::Never);
    }

    #[test]
    fn test_missing_schema() {
        assert!(Cli::try_parse_from(["jsonrule", "check"]).is_err());
        assert!(Cli::try_parse_from(["jsonrule", "lint"]).is_err());
    }

    #[test]
    fn test_invalid_format() {
        let result = Cli::try_parse_from(["jsonrule", "check", "s.json", "--format", "invalid"]);
        assert!(result.is_err());
    }
}
