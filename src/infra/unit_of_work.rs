//! Unit of Work pattern implementation.
//!
//! A [`UnitOfWork`] hands out [`TransactionScope`]s. Every store operation a
//! registration performs goes through one scope, which is finished exactly
//! once by `commit` or `rollback` (both consume it). A scope dropped without
//! either, e.g. while unwinding, is rolled back by the underlying
//! `DatabaseTransaction`.
//!
//! Each store call is bounded by the configured transaction timeout; expiry
//! surfaces as a store failure.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    AccessMode, ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection,
    DatabaseTransaction, DbBackend, DbErr, EntityTrait, IsolationLevel, PaginatorTrait,
    QueryFilter, Set, TransactionTrait,
};
use uuid::Uuid;

use super::entities::user::{self, ActiveModel, Entity as UserEntity};
use crate::config::{Config, IsolationSetting};
use crate::domain::{NewUser, User};
use crate::errors::{AppError, AppResult};

/// Source of transaction scopes over the user store.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    type Scope: TransactionScope;

    /// Open a new transaction scope.
    async fn begin(&self) -> AppResult<Self::Scope>;
}

/// User store operations available inside one transaction.
#[async_trait]
pub trait TransactionScope: Send + Sync {
    /// Whether any user already has this username
    async fn username_exists(&self, username: &str) -> AppResult<bool>;

    /// Whether any user already has this email
    async fn email_exists(&self, email: &str) -> AppResult<bool>;

    /// Insert a user; visible to others only after commit
    async fn insert_user(&self, user: NewUser) -> AppResult<User>;

    async fn commit(self) -> AppResult<()>;

    async fn rollback(self) -> AppResult<()>;
}

impl From<IsolationSetting> for IsolationLevel {
    fn from(setting: IsolationSetting) -> Self {
        match setting {
            IsolationSetting::ReadCommitted => IsolationLevel::ReadCommitted,
            IsolationSetting::RepeatableRead => IsolationLevel::RepeatableRead,
            IsolationSetting::Serializable => IsolationLevel::Serializable,
        }
    }
}

/// SeaORM-backed unit of work
pub struct Persistence {
    db: DatabaseConnection,
    isolation: IsolationSetting,
    timeout: Duration,
}

impl Persistence {
    pub fn new(db: DatabaseConnection, isolation: IsolationSetting, timeout: Duration) -> Self {
        Self {
            db,
            isolation,
            timeout,
        }
    }

    pub fn from_config(db: DatabaseConnection, config: &Config) -> Self {
        Self::new(db, config.transaction_isolation, config.transaction_timeout)
    }
}

#[async_trait]
impl UnitOfWork for Persistence {
    type Scope = TxUserRepository;

    async fn begin(&self) -> AppResult<TxUserRepository> {
        // SQLite has no per-transaction isolation or access mode
        let (isolation, access) = match self.db.get_database_backend() {
            DbBackend::Sqlite => (None, None),
            _ => (Some(self.isolation.into()), Some(AccessMode::ReadWrite)),
        };

        let txn = bounded(
            "begin",
            self.timeout,
            self.db.begin_with_config(isolation, access),
        )
        .await?;

        Ok(TxUserRepository {
            txn,
            timeout: self.timeout,
        })
    }
}

/// Transaction-aware user repository.
///
/// Owns its transaction, so a scope can never outlive or be shared
/// beyond the registration that opened it.
pub struct TxUserRepository {
    txn: DatabaseTransaction,
    timeout: Duration,
}

#[async_trait]
impl TransactionScope for TxUserRepository {
    async fn username_exists(&self, username: &str) -> AppResult<bool> {
        let matches = bounded(
            "username lookup",
            self.timeout,
            UserEntity::find()
                .filter(user::Column::Username.eq(username))
                .count(&self.txn),
        )
        .await?;

        Ok(matches > 0)
    }

    async fn email_exists(&self, email: &str) -> AppResult<bool> {
        let matches = bounded(
            "email lookup",
            self.timeout,
            UserEntity::find()
                .filter(user::Column::Email.eq(email))
                .count(&self.txn),
        )
        .await?;

        Ok(matches > 0)
    }

    async fn insert_user(&self, user: NewUser) -> AppResult<User> {
        let active_model = ActiveModel {
            id: Set(Uuid::new_v4()),
            username: Set(user.username),
            email: Set(user.email),
            password_hash: Set(user.credential.into_string()),
            created_at: Set(Utc::now()),
        };

        let model = bounded("insert", self.timeout, active_model.insert(&self.txn)).await?;
        Ok(User::from(model))
    }

    async fn commit(self) -> AppResult<()> {
        bounded("commit", self.timeout, self.txn.commit()).await
    }

    async fn rollback(self) -> AppResult<()> {
        bounded("rollback", self.timeout, self.txn.rollback()).await
    }
}

/// Run a store call under a deadline.
async fn bounded<T, F>(operation: &'static str, after: Duration, fut: F) -> AppResult<T>
where
    F: Future<Output = Result<T, DbErr>>,
{
    match tokio::time::timeout(after, fut).await {
        Ok(result) => result.map_err(AppError::from),
        Err(_) => Err(AppError::timeout(operation, after)),
    }
}
