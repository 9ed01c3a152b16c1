//! Registration payload schema.

use std::borrow::Cow;

use serde_json::Value;
use utoipa::ToSchema;
use validator::{Validate, ValidateEmail, ValidateLength, ValidationError, ValidationErrors};

use super::{first_error_for, require_object, require_string, FieldError, Schema, ValidationRules};

/// Schema order; the first field in this list with a problem is reported.
const FIELDS: [&str; 3] = ["username", "email", "password"];

/// Validated registration payload
#[derive(Clone, Validate, ToSchema)]
pub struct RegisterUser {
    /// Unique account name
    #[validate(length(min = 1, message = "Must not be empty"))]
    #[schema(example = "ada")]
    pub username: String,
    /// Unique email address
    #[validate(length(min = 1, message = "Must not be empty"))]
    #[schema(example = "ada@example.com")]
    pub email: String,
    /// Plaintext password, only ever held long enough to derive a credential
    #[validate(length(min = 1, message = "Must not be empty"))]
    #[schema(example = "correct horse battery staple", min_length = 8)]
    pub password: String,
}

// Don't expose the plaintext password in debug output
impl std::fmt::Debug for RegisterUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterUser")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl Schema for RegisterUser {
    fn parse(value: &Value, rules: &ValidationRules) -> Result<Self, FieldError> {
        let object = require_object(value)?;

        let username = require_string(object, "username");
        let email = require_string(object, "email");
        let password = require_string(object, "password");
        let shape_errors = [
            username.as_ref().err().cloned(),
            email.as_ref().err().cloned(),
            password.as_ref().err().cloned(),
        ];

        // Fields that failed the shape check are stood in by empty strings;
        // their shape error always wins over any content error below.
        let candidate = Self {
            username: username.unwrap_or_default(),
            email: email.unwrap_or_default(),
            password: password.unwrap_or_default(),
        };
        let content_errors = candidate.content_errors(rules);

        for (field, shape_error) in FIELDS.into_iter().zip(shape_errors) {
            if let Some(err) = shape_error {
                return Err(err);
            }
            if let Some(err) = first_error_for(&content_errors, field) {
                return Err(err);
            }
        }

        Ok(candidate)
    }
}

impl RegisterUser {
    /// Schema rules (derived) followed by the configured rules.
    fn content_errors(&self, rules: &ValidationRules) -> ValidationErrors {
        let mut errors = self.validate().err().unwrap_or_else(ValidationErrors::new);

        if !self.username.validate_length(
            Some(rules.username_min_length),
            Some(rules.username_max_length),
            None,
        ) {
            errors.add(
                "username",
                rule_error(
                    "length",
                    format!(
                        "Must be between {} and {} characters",
                        rules.username_min_length, rules.username_max_length
                    ),
                ),
            );
        }

        if rules.require_email_format && !self.email.validate_email() {
            errors.add("email", rule_error("email", "Invalid email"));
        }

        if !self
            .password
            .validate_length(Some(rules.password_min_length), None, None)
        {
            errors.add(
                "password",
                rule_error(
                    "length",
                    format!("Must be at least {} characters", rules.password_min_length),
                ),
            );
        }

        errors
    }
}

fn rule_error(code: &'static str, message: impl Into<Cow<'static, str>>) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    error
}
