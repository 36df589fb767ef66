//! Field-level validation errors for request bodies.
//!
//! Request DTOs expose `validate()` which either produces the typed input a
//! repository accepts or a [`ValidationErrors`] listing every bad field, so a
//! client sees all problems at once and nothing is written.

use std::fmt;

use serde::Serialize;

/// One invalid field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// All invalid fields of one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.push(FieldError {
            field: field.to_string(),
            message: message.into(),
        });
    }

    #[must_use]
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::default();
        errors.add(field, message);
        errors
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[FieldError] {
        &self.0
    }

    /// Record the error of `result` under `field` and return its value.
    pub fn check<T, E: fmt::Display>(&mut self, field: &str, result: Result<T, E>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                self.add(field, e.to_string());
                None
            }
        }
    }

    /// Require a non-blank string, returning it trimmed.
    pub fn required(&mut self, field: &str, value: Option<&str>) -> Option<String> {
        match value.map(str::trim) {
            Some(v) if !v.is_empty() => Some(v.to_string()),
            _ => {
                self.add(field, "is required");
                None
            }
        }
    }

    /// `Ok(value)` when no errors were recorded.
    ///
    /// # Errors
    ///
    /// Returns `self` if any field failed.
    pub fn finish<T>(self, value: impl FnOnce() -> Option<T>) -> Result<T, Self> {
        if !self.is_empty() {
            return Err(self);
        }
        value().ok_or(self)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<String> = self
            .0
            .iter()
            .map(|e| format!("{} {}", e.field, e.message))
            .collect();
        write!(f, "{}", fields.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Trim an optional string, mapping blank to `None`.
#[must_use]
pub fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_required() {
        let mut errors = ValidationErrors::default();
        assert_eq!(errors.required("a", Some("  x ")), Some("x".to_string()));
        assert_eq!(errors.required("b", Some("   ")), None);
        assert_eq!(errors.required("c", None), None);
        assert_eq!(errors.as_slice().len(), 2);
        assert_eq!(errors.as_slice()[0].field, "b");
    }

    #[test]
    fn test_finish() {
        let ok = ValidationErrors::default().finish(|| Some(5));
        assert_eq!(ok.unwrap(), 5);

        let err = ValidationErrors::single("x", "bad").finish(|| Some(5));
        assert!(err.is_err());
    }

    #[test]
    fn test_display_joins_fields() {
        let mut errors = ValidationErrors::default();
        errors.add("title", "is required");
        errors.add("slug", "is invalid");
        assert_eq!(errors.to_string(), "title is required; slug is invalid");
    }

    #[test]
    fn test_optional_text() {
        assert_eq!(optional_text(Some(" a ")), Some("a".to_string()));
        assert_eq!(optional_text(Some("  ")), None);
        assert_eq!(optional_text(None), None);
    }
}
