// Boundary validation - typed issue lists instead of stubbed "always success"
// Every domain validator returns a ValidationReport so callers see all issues at once

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A single field-level problem found while validating an input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub field: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Collected outcome of a validation pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn success(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.issues.push(ValidationIssue::new(field, message));
    }

    /// Merge another report, prefixing its field names (e.g. `offer.amount_minor`)
    pub fn merge_prefixed(&mut self, prefix: &str, other: ValidationReport) {
        for issue in other.issues {
            self.issues.push(ValidationIssue {
                field: format!("{}.{}", prefix, issue.field),
                message: issue.message,
            });
        }
    }

    /// Check a string field is non-blank and no longer than `max` characters
    pub fn check_text(&mut self, field: &str, value: &str, max: usize) {
        if value.trim().is_empty() {
            self.push(field, "must not be empty");
        } else if value.chars().count() > max {
            self.push(field, format!("must be at most {} characters", max));
        }
    }

    pub fn into_result(self) -> Result<(), ValidationError> {
        if self.success() {
            Ok(())
        } else {
            Err(ValidationError { issues: self.issues })
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Validation failed: {}", format_issues(.issues))]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

fn format_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
