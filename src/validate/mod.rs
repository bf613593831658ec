pub mod report;
pub mod rule;

pub use report::{Severity, ValidationMessage, ValidationReport};
pub use rule::Rule;
