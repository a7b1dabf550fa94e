//! jsonrule CLI entry point

use clap::Parser;
use jsonrule::cli::{Command, args::Cli};
use std::process;

fn main() {
    let cli = Cli::parse();

    let exit_code = match cli.command {
        Command::Check {
            schema,
            files,
            rule,
            format,
        } => jsonrule::cli::check::run_check(&schema, &files, rule.as_deref(), format, cli.color),
        Command::Lint { schema, format } => {
            jsonrule::cli::lint::run_lint(&schema, format, cli.color)
        }
        Command::Grammar => jsonrule::cli::grammar::run_grammar(),
    };

    process::exit(exit_code);
}
