//! User Registry - account registration over HTTP
//!
//! A single `POST /users` endpoint that validates the payload, then checks
//! username and email uniqueness and inserts the user inside one database
//! transaction.
//!
//! # Architecture Layers
//!
//! - **cli**: Command-line interface
//! - **commands**: CLI command implementations
//! - **config**: Application configuration and constants
//! - **validation**: Request schema and field rules
//! - **domain**: User entity and credential derivation
//! - **services**: Registration use case
//! - **infra**: Database, entities, migrations, Unit of Work
//! - **api**: HTTP handlers, extractors, and routes
//! - **types**: Shared response types
//! - **errors**: Centralized error handling
//!
//! # CLI Usage
//!
//! ```bash
//! # Start the server
//! cargo run -- serve
//!
//! # Run migrations
//! cargo run -- migrate up
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod services;
pub mod types;
pub mod validation;

// Re-export commonly used types at crate root
pub use api::AppState;
pub use config::Config;
pub use domain::{User, UserResponse};
pub use errors::{AppError, AppResult};
