//! Command-line interface

pub mod args;
pub mod check;
pub mod common;
pub mod grammar;
pub mod lint;

pub use args::{Cli, Command};
