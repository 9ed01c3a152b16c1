//! Request validation.
//!
//! Untrusted JSON is checked against a fixed schema before anything touches
//! the user store. Shape problems (missing field, wrong JSON type) and
//! content problems (empty, too short, malformed email) are both reported as
//! a single [`FieldError`] naming the first offending field in schema order.

mod register_user;

use serde_json::{Map, Value};
use thiserror::Error;
use validator::ValidationErrors;

use crate::config::{
    DEFAULT_PASSWORD_MIN_LENGTH, DEFAULT_USERNAME_MAX_LENGTH, DEFAULT_USERNAME_MIN_LENGTH,
};

pub use register_user::RegisterUser;

/// First offending field of a rejected payload, rendered as `field: reason`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {reason}")]
pub struct FieldError {
    pub field: &'static str,
    pub reason: String,
}

impl FieldError {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// Configurable content rules applied on top of the schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationRules {
    pub username_min_length: u64,
    pub username_max_length: u64,
    pub password_min_length: u64,
    pub require_email_format: bool,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            username_min_length: DEFAULT_USERNAME_MIN_LENGTH,
            username_max_length: DEFAULT_USERNAME_MAX_LENGTH,
            password_min_length: DEFAULT_PASSWORD_MIN_LENGTH,
            require_email_format: true,
        }
    }
}

/// A typed payload that can be parsed out of untyped JSON.
pub trait Schema: Sized {
    fn parse(value: &Value, rules: &ValidationRules) -> Result<Self, FieldError>;
}

/// JSON type name as reported in `Expected ..., received ...` reasons.
pub(crate) fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

pub(crate) fn require_object(value: &Value) -> Result<&Map<String, Value>, FieldError> {
    value.as_object().ok_or_else(|| {
        FieldError::new("body", format!("Expected object, received {}", kind_of(value)))
    })
}

pub(crate) fn require_string(
    object: &Map<String, Value>,
    field: &'static str,
) -> Result<String, FieldError> {
    match object.get(field) {
        None => Err(FieldError::new(field, "Required")),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(FieldError::new(
            field,
            format!("Expected string, received {}", kind_of(other)),
        )),
    }
}

/// First recorded error for `field`, if any.
pub(crate) fn first_error_for(errors: &ValidationErrors, field: &'static str) -> Option<FieldError> {
    errors
        .field_errors()
        .get(field)
        .and_then(|errs| errs.first())
        .map(|e| {
            let reason = e
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| format!("Invalid {}", e.code));
            FieldError::new(field, reason)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_error_display() {
        let err = FieldError::new("username", "Required");
        assert_eq!(err.to_string(), "username: Required");
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(kind_of(&json!(null)), "null");
        assert_eq!(kind_of(&json!(true)), "boolean");
        assert_eq!(kind_of(&json!(1.5)), "number");
        assert_eq!(kind_of(&json!([])), "array");
        assert_eq!(kind_of(&json!({})), "object");
    }

    #[test]
    fn test_require_string_distinguishes_missing_and_mistyped() {
        let value = json!({ "email": 42, "password": null });
        let object = value.as_object().unwrap();

        assert_eq!(
            require_string(object, "username"),
            Err(FieldError::new("username", "Required"))
        );
        assert_eq!(
            require_string(object, "email"),
            Err(FieldError::new("email", "Expected string, received number"))
        );
        assert_eq!(
            require_string(object, "password"),
            Err(FieldError::new("password", "Expected string, received null"))
        );
    }
}
