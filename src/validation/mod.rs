//! Validation
//!
//! Two independent checks share one result shape:
//! - [`tree`] checks a schema against itself (definition conflicts)
//! - [`instance`] checks a JSON document against a schema
//!
//! Neither ever returns `Err`; failures are data in [`ValidationResult::errors`].

pub mod instance;
mod locate;
pub mod tree;

pub use instance::{validate_json, InstanceValidator};
pub use tree::{build_validation_tree, ValidationTreeNode};

use serde::{Deserialize, Serialize};

/// One failed check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// JSON-pointer-style path for instance errors, conflict token for schema errors
    pub path: String,
    pub message: String,
    /// 1-based line in the validated text, when the error could be located
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    /// 1-based column in the validated text, when the error could be located
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<usize>,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            line: None,
            column: None,
        }
    }

    pub fn at(mut self, line: usize, column: usize) -> Self {
        self.line = Some(line);
        self.column = Some(column);
        self
    }
}

/// Outcome of a validation run. `valid` is always `errors.is_empty()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<ValidationError>,
}

impl ValidationResult {
    pub fn ok() -> Self {
        Self::from_errors(Vec::new())
    }

    pub fn from_errors(errors: Vec<ValidationError>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::ok()
    }
}
