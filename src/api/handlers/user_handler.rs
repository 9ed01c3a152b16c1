//! User registration handlers.

use axum::{extract::State, response::Json, routing::post, Router};

use crate::api::extractors::ValidatedJson;
use crate::api::AppState;
use crate::config::SUCCESS_MESSAGE;
use crate::domain::UserResponse;
use crate::errors::AppResult;
use crate::types::ApiResponse;
use crate::validation::RegisterUser;

/// Create user routes
pub fn user_routes() -> Router<AppState> {
    Router::new().route("/users", post(create_user))
}

/// Register a new user
#[utoipa::path(
    post,
    path = "/users",
    tag = "Users",
    request_body = RegisterUser,
    responses(
        (status = 200, description = "User registered successfully", body = UserResponse),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Username or email already exists"),
        (status = 500, description = "Store failure")
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterUser>,
) -> AppResult<Json<ApiResponse<UserResponse>>> {
    let user = state.registration.register(payload).await?;

    Ok(Json(ApiResponse::with_message(
        UserResponse::from(user),
        SUCCESS_MESSAGE,
    )))
}
