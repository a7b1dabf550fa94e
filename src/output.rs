//! Output formatters (human and JSON)

pub mod human;
pub mod report;

pub use human::HumanFormatter;
pub use report::{CheckReport, FileReport, RejectionRecord};
