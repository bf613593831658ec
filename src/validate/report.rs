use std::fmt;

use serde::{Deserialize, Serialize};

/// Severity of a single validation message.
///
/// Only `Error` messages make a report invalid; `Warning` and `Info` ride
/// along for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "INFO"),
            Severity::Warning => write!(f, "WARNING"),
            Severity::Error => write!(f, "ERROR"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationMessage {
    pub severity: Severity,
    /// Property the message refers to; `None` for cross-field messages.
    pub property: Option<String>,
    pub message: String,
}

impl ValidationMessage {
    pub fn error(property: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            property: Some(property.into()),
            message: message.into(),
        }
    }

    pub fn warning(property: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            property: Some(property.into()),
            message: message.into(),
        }
    }

    pub fn entity_error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            property: None,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.property {
            Some(property) => write!(f, "[{}] {}: {}", self.severity, property, self.message),
            None => write!(f, "[{}] {}", self.severity, self.message),
        }
    }
}

/// Outcome of a whole-object validation pass: an ordered list of
/// severity-leveled messages plus the derived validity flag.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationReport {
    messages: Vec<ValidationMessage>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Valid iff no message carries `Severity::Error`.
    pub fn is_valid(&self) -> bool {
        !self
            .messages
            .iter()
            .any(|m| m.severity == Severity::Error)
    }

    pub fn push(&mut self, message: ValidationMessage) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[ValidationMessage] {
        &self.messages
    }

    pub fn errors(&self) -> impl Iterator<Item = &ValidationMessage> {
        self.messages
            .iter()
            .filter(|m| m.severity == Severity::Error)
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.messages.is_empty() {
            return write!(f, "valid");
        }
        let rendered: Vec<String> = self.messages.iter().map(|m| m.to_string()).collect();
        write!(f, "{}", rendered.join("; "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_report_is_valid() {
        assert!(ValidationReport::new().is_valid());
    }

    #[test]
    fn test_warnings_do_not_invalidate() {
        let mut report = ValidationReport::new();
        report.push(ValidationMessage::warning("age", "unusually high"));
        assert!(report.is_valid());
        assert_eq!(report.len(), 1);
    }

    #[test]
    fn test_error_invalidates() {
        let mut report = ValidationReport::new();
        report.push(ValidationMessage::warning("age", "unusually high"));
        report.push(ValidationMessage::error("name", "is required"));
        assert!(!report.is_valid());
        assert_eq!(report.errors().count(), 1);
    }
}
