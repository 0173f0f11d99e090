//! Validation error mapping shared by the inbound HTTP handlers.
//!
//! Every request validation failure is a 422 carrying `{field, code}`
//! details so clients can point at the offending input.

use serde_json::json;

use crate::domain::{ArticleValidationError, CredentialValidationError, Error};

/// Newtype wrapper for payload field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(self) -> &'static str {
        self.0
    }
}

fn field_error(field: &str, code: &str, message: impl Into<String>) -> Error {
    Error::validation_failed(message).with_details(json!({
        "field": field,
        "code": code,
    }))
}

/// A required payload field was absent.
pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let field = field.as_str();
    field_error(field, "missing_field", format!("{field} is required"))
}

/// Unwrap a required payload field.
pub(crate) fn require<T>(value: Option<T>, field: FieldName) -> Result<T, Error> {
    value.ok_or_else(|| missing_field_error(field))
}

impl From<CredentialValidationError> for Error {
    fn from(err: CredentialValidationError) -> Self {
        field_error(err.field(), err.code(), err.to_string())
    }
}

impl From<ArticleValidationError> for Error {
    fn from(err: ArticleValidationError) -> Self {
        match err {
            ArticleValidationError::EmptyTitle => field_error("title", "empty", err.to_string()),
        }
    }
}
