//! Domain layer - Core business entities and logic
//!
//! Contains the user entity, its response view and the credential
//! derivation capability. Nothing here knows about HTTP or the database.

pub mod password;
pub mod user;

pub use password::{Argon2Deriver, CredentialDeriver, PasswordCredential};
pub use user::{NewUser, User, UserResponse};

#[cfg(any(test, feature = "test-utils"))]
pub use password::MockCredentialDeriver;
