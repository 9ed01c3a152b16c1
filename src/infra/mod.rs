//! Infrastructure layer - External systems integration
//!
//! This module handles all external system concerns:
//! - Database connections and migrations
//! - Persisted entities
//! - Unit of Work for transaction management

pub mod db;
pub mod entities;
pub mod unit_of_work;

pub use db::{Database, Migrator};
pub use unit_of_work::{Persistence, TransactionScope, TxUserRepository, UnitOfWork};
