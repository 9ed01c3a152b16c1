//! Application settings loaded from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use super::constants::{
    DEFAULT_ARGON2_ITERATIONS, DEFAULT_ARGON2_MEMORY_KIB, DEFAULT_DATABASE_MAX_CONNECTIONS,
    DEFAULT_DATABASE_URL, DEFAULT_PASSWORD_MIN_LENGTH, DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT,
    DEFAULT_TRANSACTION_TIMEOUT_MS, DEFAULT_USERNAME_MAX_LENGTH, DEFAULT_USERNAME_MIN_LENGTH,
};
use crate::validation::ValidationRules;

/// Isolation level requested for registration transactions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IsolationSetting {
    #[default]
    ReadCommitted,
    RepeatableRead,
    Serializable,
}

impl FromStr for IsolationSetting {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "read_committed" => Ok(Self::ReadCommitted),
            "repeatable_read" => Ok(Self::RepeatableRead),
            "serializable" => Ok(Self::Serializable),
            other => Err(format!("unknown isolation level '{}'", other)),
        }
    }
}

/// Application configuration
#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub server_host: String,
    pub server_port: u16,
    pub transaction_timeout: Duration,
    pub transaction_isolation: IsolationSetting,
    pub validation: ValidationRules,
    pub argon2_memory_kib: u32,
    pub argon2_iterations: u32,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[REDACTED]")
            .field("database_max_connections", &self.database_max_connections)
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .field("transaction_timeout", &self.transaction_timeout)
            .field("transaction_isolation", &self.transaction_isolation)
            .field("validation", &self.validation)
            .field("argon2_memory_kib", &self.argon2_memory_kib)
            .field("argon2_iterations", &self.argon2_iterations)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            database_max_connections: DEFAULT_DATABASE_MAX_CONNECTIONS,
            server_host: DEFAULT_SERVER_HOST.to_string(),
            server_port: DEFAULT_SERVER_PORT,
            transaction_timeout: Duration::from_millis(DEFAULT_TRANSACTION_TIMEOUT_MS),
            transaction_isolation: IsolationSetting::default(),
            validation: ValidationRules::default(),
            argon2_memory_kib: DEFAULT_ARGON2_MEMORY_KIB,
            argon2_iterations: DEFAULT_ARGON2_ITERATIONS,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Missing or unparseable values fall back to their defaults.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            database_max_connections: parsed("DATABASE_MAX_CONNECTIONS")
                .unwrap_or(DEFAULT_DATABASE_MAX_CONNECTIONS),
            server_host: env::var("SERVER_HOST")
                .unwrap_or_else(|_| DEFAULT_SERVER_HOST.to_string()),
            server_port: parsed("SERVER_PORT").unwrap_or(DEFAULT_SERVER_PORT),
            transaction_timeout: Duration::from_millis(
                parsed("TRANSACTION_TIMEOUT_MS").unwrap_or(DEFAULT_TRANSACTION_TIMEOUT_MS),
            ),
            transaction_isolation: parsed("TRANSACTION_ISOLATION").unwrap_or_default(),
            validation: ValidationRules {
                username_min_length: parsed("USERNAME_MIN_LENGTH")
                    .unwrap_or(DEFAULT_USERNAME_MIN_LENGTH),
                username_max_length: parsed("USERNAME_MAX_LENGTH")
                    .unwrap_or(DEFAULT_USERNAME_MAX_LENGTH),
                password_min_length: parsed("PASSWORD_MIN_LENGTH")
                    .unwrap_or(DEFAULT_PASSWORD_MIN_LENGTH),
                require_email_format: parsed("VALIDATE_EMAIL_FORMAT").unwrap_or(true),
            },
            argon2_memory_kib: parsed("ARGON2_MEMORY_KIB").unwrap_or(DEFAULT_ARGON2_MEMORY_KIB),
            argon2_iterations: parsed("ARGON2_ITERATIONS").unwrap_or(DEFAULT_ARGON2_ITERATIONS),
        }
    }

    /// Get the full server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

/// Read and parse an environment variable, logging values that do not parse.
fn parsed<T: FromStr>(key: &str) -> Option<T> {
    let raw = env::var(key).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, value = %raw, "Ignoring unparseable configuration value");
            None
        }
    }
}
