//! Validation results
//!
//! Validation never mutates and never throws: every violation in a record is
//! collected in one pass so an editor can show the complete list.

use serde::{Deserialize, Serialize};

/// Accumulated validation errors and warnings for one record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Hard violations (duplicate keys, structural problems).
    pub errors: Vec<String>,
    /// Soft issues (missing recommended fields).
    pub warnings: Vec<String>,
}

impl ValidationResult {
    /// Creates an empty result.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether no errors were recorded. Warnings do not affect validity.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Records an error.
    pub fn add_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    /// Records a warning.
    pub fn add_warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    /// Folds a nested record's result into this one, prefixing each message
    /// with its context (e.g. `widget[3]`).
    pub fn absorb(&mut self, context: &str, child: ValidationResult) {
        for error in child.errors {
            self.errors.push(format!("{context}: {error}"));
        }
        for warning in child.warnings {
            self.warnings.push(format!("{context}: {warning}"));
        }
    }
}
