//! Validated JSON extractor - Combines body parsing with schema validation.

use axum::{
    async_trait,
    extract::{FromRef, FromRequest, Request},
    Json,
};
use serde_json::Value;

use crate::errors::AppError;
use crate::validation::{FieldError, Schema, ValidationRules};

/// Validated JSON extractor that rejects bad payloads before the handler runs.
///
/// The body is read as untyped JSON so that shape problems (missing fields,
/// wrong JSON types) are reported per field instead of as a serde message.
///
/// # Example
///
/// ```rust,ignore
/// use user_registry::api::extractors::ValidatedJson;
/// use user_registry::validation::RegisterUser;
///
/// async fn create_user(ValidatedJson(payload): ValidatedJson<RegisterUser>) {
///     // payload is already validated
/// }
/// ```
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: Schema,
    ValidationRules: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|e| FieldError::new("body", e.body_text()))?;

        let rules = ValidationRules::from_ref(state);
        let payload = T::parse(&value, &rules)?;

        Ok(ValidatedJson(payload))
    }
}
