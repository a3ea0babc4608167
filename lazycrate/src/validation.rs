//! Validation errors
//!
//! Every problem the descriptor validator finds is reported as a
//! [`ValidationError`] naming the offending attribute path (for example
//! `filters.status.value` or `multiSortMeta.1.field`). Errors are collected
//! into [`ValidationErrors`] so a caller can report the complete list at once.
//!
//! # Example
//!
//! ```rust,ignore
//! use lazycrate::validation::{ValidationError, ValidationErrorKind, ValidationErrors};
//!
//! let mut errors = ValidationErrors::new();
//! errors.add(ValidationError::shape("filters.name", "The filters.name.operator field must be missing when filters.name.value is present"));
//! assert_eq!(errors.len(), 1);
//! assert_eq!(errors.errors()[0].kind, ValidationErrorKind::Shape);
//! ```

use serde::Serialize;
use std::fmt;
use utoipa::ToSchema;

/// Category of a validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ValidationErrorKind {
    /// A filter or sort entry mixes or omits alternative-shape keys, or a key
    /// is missing/unknown.
    Shape,
    /// A value's runtime type is outside the allowed set.
    Type,
    /// Mode-specific cardinality or format violation.
    Structural,
}

/// Validation error with attribute path and message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ValidationError {
    /// The attribute path that failed validation
    pub field: String,
    /// Human-readable error message
    pub message: String,
    /// Failure category
    pub kind: ValidationErrorKind,
}

impl ValidationError {
    #[must_use]
    pub fn new(
        field: impl Into<String>,
        message: impl Into<String>,
        kind: ValidationErrorKind,
    ) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            kind,
        }
    }

    #[must_use]
    pub fn shape(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(field, message, ValidationErrorKind::Shape)
    }

    #[must_use]
    pub fn invalid_type(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(field, message, ValidationErrorKind::Type)
    }

    #[must_use]
    pub fn structural(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(field, message, ValidationErrorKind::Structural)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Collection of validation errors
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    #[must_use]
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    pub fn add(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    #[must_use]
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// True when at least one error was recorded for `field`.
    #[must_use]
    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    /// Messages only, in the order the errors were recorded.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.errors.iter().map(|e| e.message.clone()).collect()
    }

    /// Convert to Result
    ///
    /// # Errors
    ///
    /// Returns `self` when any error was recorded.
    pub fn result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl Default for ValidationErrors {
    fn default() -> Self {
        Self::new()
    }
}

impl From<ValidationError> for ValidationErrors {
    fn from(error: ValidationError) -> Self {
        Self {
            errors: vec![error],
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Validation failed with {} error(s):", self.errors.len())?;
        for error in &self.errors {
            write!(f, "\n  - {error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}
