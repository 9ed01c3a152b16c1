//! Application state - Dependency injection container.
//!
//! Holds the registration service behind its trait plus the validation
//! rules the request extractor needs.

use std::sync::Arc;

use axum::extract::FromRef;

use crate::config::Config;
use crate::domain::Argon2Deriver;
use crate::errors::AppResult;
use crate::infra::{Database, Persistence};
use crate::services::{Registrar, RegistrationService};
use crate::validation::ValidationRules;

/// Application state shared by every handler.
#[derive(Clone)]
pub struct AppState {
    /// Registration service
    pub registration: Arc<dyn RegistrationService>,
    /// Content rules applied by `ValidatedJson`
    pub validation: ValidationRules,
}

impl AppState {
    /// Wire the SeaORM store and the Argon2 deriver from configuration.
    pub fn from_config(database: &Database, config: &Config) -> AppResult<Self> {
        let uow = Arc::new(Persistence::from_config(database.get_connection(), config));
        let deriver = Argon2Deriver::new(config.argon2_memory_kib, config.argon2_iterations)?;

        Ok(Self::new(
            Arc::new(Registrar::new(uow, deriver)),
            config.validation.clone(),
        ))
    }

    /// Create application state with a manually injected service.
    pub fn new(registration: Arc<dyn RegistrationService>, validation: ValidationRules) -> Self {
        Self {
            registration,
            validation,
        }
    }
}

impl FromRef<AppState> for ValidationRules {
    fn from_ref(state: &AppState) -> Self {
        state.validation.clone()
    }
}
