//! Registration service - Transactional check-then-insert for new users.
//!
//! SOLID (SRP): Handles account creation only.
//! DDD: Orchestrates the credential deriver and the store via Unit of Work.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::{CredentialDeriver, NewUser, User};
use crate::errors::{AppError, AppResult};
use crate::infra::{TransactionScope, UnitOfWork};
use crate::validation::RegisterUser;

/// Registration service trait for dependency injection.
#[async_trait]
pub trait RegistrationService: Send + Sync {
    /// Create a user after confirming username and email are both free.
    async fn register(&self, payload: RegisterUser) -> AppResult<User>;
}

/// Concrete implementation of RegistrationService using Unit of Work.
pub struct Registrar<U: UnitOfWork, D: CredentialDeriver> {
    uow: Arc<U>,
    deriver: Arc<D>,
}

impl<U: UnitOfWork, D: CredentialDeriver + 'static> Registrar<U, D> {
    pub fn new(uow: Arc<U>, deriver: D) -> Self {
        Self {
            uow,
            deriver: Arc::new(deriver),
        }
    }

    /// Everything that happens between begin and commit.
    async fn register_within(&self, scope: &U::Scope, payload: RegisterUser) -> AppResult<User> {
        if scope.username_exists(&payload.username).await? {
            return Err(AppError::DuplicateUsername);
        }

        if scope.email_exists(&payload.email).await? {
            return Err(AppError::DuplicateEmail);
        }

        // Argon2 is CPU-bound; keep it off the async workers
        let deriver = self.deriver.clone();
        let password = payload.password;
        let credential = tokio::task::spawn_blocking(move || deriver.derive(&password))
            .await
            .map_err(|e| {
                AppError::internal(format!("Credential derivation task failed: {}", e))
            })??;

        scope
            .insert_user(NewUser {
                username: payload.username,
                email: payload.email,
                credential,
            })
            .await
    }
}

#[async_trait]
impl<U: UnitOfWork, D: CredentialDeriver + 'static> RegistrationService for Registrar<U, D> {
    async fn register(&self, payload: RegisterUser) -> AppResult<User> {
        let scope = self.uow.begin().await?;
        tracing::debug!(username = %payload.username, "Registration transaction started");

        match self.register_within(&scope, payload).await {
            Ok(user) => {
                scope.commit().await?;
                tracing::info!(user_id = %user.id, username = %user.username, "User registered");
                Ok(user)
            }
            Err(err) => {
                if err.is_conflict() {
                    tracing::warn!("Registration rejected: {}", err);
                }
                // The original error wins over a failed rollback
                if let Err(rollback_err) = scope.rollback().await {
                    tracing::error!("Failed to rollback transaction: {}", rollback_err);
                }
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MockCredentialDeriver, PasswordCredential};
    use crate::errors::StoreFailure;
    use chrono::Utc;
    use sea_orm::DbErr;
    use std::sync::Mutex;
    use uuid::Uuid;

    #[derive(Default)]
    struct Ledger {
        begun: usize,
        committed: usize,
        rolled_back: usize,
        rows: Vec<User>,
    }

    /// In-memory store whose scopes write straight into a shared ledger.
    #[derive(Default)]
    struct FakeStore {
        ledger: Arc<Mutex<Ledger>>,
        fail_insert: bool,
        fail_commit: bool,
        fail_rollback: bool,
    }

    impl FakeStore {
        fn with_user(username: &str, email: &str) -> Self {
            let store = Self::default();
            store.ledger.lock().unwrap().rows.push(User {
                id: Uuid::new_v4(),
                username: username.to_string(),
                email: email.to_string(),
                credential: PasswordCredential::from_stored("$argon2id$stub".to_string()),
                created_at: Utc::now(),
            });
            store
        }

        fn snapshot(&self) -> (usize, usize, usize, usize) {
            let ledger = self.ledger.lock().unwrap();
            (
                ledger.begun,
                ledger.committed,
                ledger.rolled_back,
                ledger.rows.len(),
            )
        }
    }

    struct FakeScope {
        ledger: Arc<Mutex<Ledger>>,
        fail_insert: bool,
        fail_commit: bool,
        fail_rollback: bool,
    }

    #[async_trait]
    impl UnitOfWork for FakeStore {
        type Scope = FakeScope;

        async fn begin(&self) -> AppResult<FakeScope> {
            self.ledger.lock().unwrap().begun += 1;
            Ok(FakeScope {
                ledger: self.ledger.clone(),
                fail_insert: self.fail_insert,
                fail_commit: self.fail_commit,
                fail_rollback: self.fail_rollback,
            })
        }
    }

    #[async_trait]
    impl TransactionScope for FakeScope {
        async fn username_exists(&self, username: &str) -> AppResult<bool> {
            let ledger = self.ledger.lock().unwrap();
            Ok(ledger.rows.iter().any(|u| u.username == username))
        }

        async fn email_exists(&self, email: &str) -> AppResult<bool> {
            let ledger = self.ledger.lock().unwrap();
            Ok(ledger.rows.iter().any(|u| u.email == email))
        }

        async fn insert_user(&self, user: NewUser) -> AppResult<User> {
            if self.fail_insert {
                return Err(DbErr::Custom("insert refused".to_string()).into());
            }
            let user = User {
                id: Uuid::new_v4(),
                username: user.username,
                email: user.email,
                credential: user.credential,
                created_at: Utc::now(),
            };
            self.ledger.lock().unwrap().rows.push(user.clone());
            Ok(user)
        }

        async fn commit(self) -> AppResult<()> {
            if self.fail_commit {
                return Err(DbErr::Custom("commit refused".to_string()).into());
            }
            self.ledger.lock().unwrap().committed += 1;
            Ok(())
        }

        async fn rollback(self) -> AppResult<()> {
            self.ledger.lock().unwrap().rolled_back += 1;
            if self.fail_rollback {
                return Err(DbErr::Custom("rollback refused".to_string()).into());
            }
            Ok(())
        }
    }

    fn payload(username: &str, email: &str) -> RegisterUser {
        RegisterUser {
            username: username.to_string(),
            email: email.to_string(),
            password: "correct horse".to_string(),
        }
    }

    fn deriving_once() -> MockCredentialDeriver {
        let mut deriver = MockCredentialDeriver::new();
        deriver.expect_derive().times(1).returning(|plain_text: &str| {
            Ok(PasswordCredential::from_stored(format!("derived:{}", plain_text.len())))
        });
        deriver
    }

    fn never_deriving() -> MockCredentialDeriver {
        let mut deriver = MockCredentialDeriver::new();
        deriver.expect_derive().never();
        deriver
    }

    #[tokio::test]
    async fn test_register_success() {
        let store = Arc::new(FakeStore::default());
        let registrar = Registrar::new(store.clone(), deriving_once());

        let user = registrar
            .register(payload("ada", "ada@example.com"))
            .await
            .unwrap();

        assert_eq!(user.username, "ada");
        assert_eq!(user.email, "ada@example.com");
        assert_eq!(user.credential.as_str(), "derived:13");
        assert_eq!(store.snapshot(), (1, 1, 0, 1));
    }

    #[tokio::test]
    async fn test_duplicate_username() {
        let store = Arc::new(FakeStore::with_user("ada", "first@example.com"));
        let registrar = Registrar::new(store.clone(), never_deriving());

        let result = registrar.register(payload("ada", "second@example.com")).await;

        assert!(matches!(result, Err(AppError::DuplicateUsername)));
        assert_eq!(store.snapshot(), (1, 0, 1, 1));
    }

    #[tokio::test]
    async fn test_duplicate_email() {
        let store = Arc::new(FakeStore::with_user("ada", "ada@example.com"));
        let registrar = Registrar::new(store.clone(), never_deriving());

        let result = registrar.register(payload("grace", "ada@example.com")).await;

        assert!(matches!(result, Err(AppError::DuplicateEmail)));
        assert_eq!(store.snapshot(), (1, 0, 1, 1));
    }

    #[tokio::test]
    async fn test_username_checked_before_email() {
        let store = Arc::new(FakeStore::with_user("ada", "ada@example.com"));
        let registrar = Registrar::new(store.clone(), never_deriving());

        let result = registrar.register(payload("ada", "ada@example.com")).await;

        assert!(matches!(result, Err(AppError::DuplicateUsername)));
    }

    #[tokio::test]
    async fn test_insert_failure_rolls_back() {
        let store = Arc::new(FakeStore {
            fail_insert: true,
            ..FakeStore::default()
        });
        let registrar = Registrar::new(store.clone(), deriving_once());

        let result = registrar.register(payload("ada", "ada@example.com")).await;

        assert!(matches!(
            result,
            Err(AppError::StoreFailure(StoreFailure::Database(_)))
        ));
        assert_eq!(store.snapshot(), (1, 0, 1, 0));
    }

    #[tokio::test]
    async fn test_commit_failure_is_store_failure() {
        let store = Arc::new(FakeStore {
            fail_commit: true,
            ..FakeStore::default()
        });
        let registrar = Registrar::new(store.clone(), deriving_once());

        let result = registrar.register(payload("ada", "ada@example.com")).await;

        assert!(matches!(result, Err(AppError::StoreFailure(_))));
        let (begun, committed, rolled_back, _) = store.snapshot();
        assert_eq!((begun, committed, rolled_back), (1, 0, 0));
    }

    #[tokio::test]
    async fn test_rollback_failure_keeps_original_error() {
        let store = Arc::new(FakeStore {
            fail_rollback: true,
            ..FakeStore::with_user("ada", "ada@example.com")
        });
        let registrar = Registrar::new(store.clone(), never_deriving());

        let result = registrar.register(payload("ada", "other@example.com")).await;

        assert!(matches!(result, Err(AppError::DuplicateUsername)));
        assert_eq!(store.snapshot(), (1, 0, 1, 1));
    }

    #[tokio::test]
    async fn test_derivation_failure_rolls_back() {
        let store = Arc::new(FakeStore::default());
        let mut deriver = MockCredentialDeriver::new();
        deriver
            .expect_derive()
            .times(1)
            .returning(|_| Err(AppError::internal("Password hash failed")));
        let registrar = Registrar::new(store.clone(), deriver);

        let result = registrar.register(payload("ada", "ada@example.com")).await;

        assert!(matches!(result, Err(AppError::Internal(_))));
        assert_eq!(store.snapshot(), (1, 0, 1, 0));
    }

    #[tokio::test]
    async fn test_derivation_runs_off_the_async_thread() {
        let store = Arc::new(FakeStore::default());
        let async_thread = std::thread::current().id();
        let mut deriver = MockCredentialDeriver::new();
        deriver.expect_derive().times(1).returning(move |_| {
            assert_ne!(std::thread::current().id(), async_thread);
            Ok(PasswordCredential::from_stored("derived".to_string()))
        });
        let registrar = Registrar::new(store.clone(), deriver);

        let user = registrar
            .register(payload("ada", "ada@example.com"))
            .await
            .unwrap();

        assert_eq!(user.credential.as_str(), "derived");
        assert_eq!(store.snapshot(), (1, 1, 0, 1));
    }

    #[tokio::test]
    async fn test_repeated_registration_is_rejected() {
        let store = Arc::new(FakeStore::default());
        let registrar = Registrar::new(store.clone(), deriving_once());

        registrar
            .register(payload("ada", "ada@example.com"))
            .await
            .unwrap();
        let second = registrar.register(payload("ada", "ada@example.com")).await;

        assert!(matches!(second, Err(AppError::DuplicateUsername)));
        assert_eq!(store.snapshot(), (2, 1, 1, 1));
    }
}
