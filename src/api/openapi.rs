//! OpenAPI documentation configuration.

use utoipa::OpenApi;

use crate::api::handlers::user_handler;
use crate::domain::UserResponse;
use crate::validation::RegisterUser;

/// OpenAPI documentation for the user registry
#[derive(OpenApi)]
#[openapi(
    info(
        title = "User Registry",
        version = "0.1.0",
        description = "User registration with transactional uniqueness checks"
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    paths(user_handler::create_user),
    components(schemas(RegisterUser, UserResponse)),
    tags(
        (name = "Users", description = "User registration")
    )
)]
pub struct ApiDoc;
