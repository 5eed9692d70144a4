//! Credential storage.
//!
//! Durable mapping from user id to password hash and profile data. The store
//! owns id uniqueness: concurrent creates of the same id resolve to exactly
//! one success, with the rest observing [`StoreError::AlreadyExists`]. That
//! guarantee comes from the store's own constraint, never from a prior
//! existence check.

pub mod memory;
pub mod postgres;

pub use self::memory::MemoryUserStore;
pub use self::postgres::PgUserStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A registered user as the store persists it.
///
/// The id is immutable and unique. The password hash is an opaque PHC string
/// and the profile is stored verbatim; neither is interpreted here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserRecord {
    pub id: String,
    pub password_hash: String,
    pub profile: serde_json::Value,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("user {0} already exists")]
    AlreadyExists(String),

    #[error("user {0} not found")]
    NotFound(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Storage contract for user credentials.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Persist a new user.
    ///
    /// Fails with [`StoreError::AlreadyExists`] when the id is taken, atomically
    /// with respect to concurrent creates of the same id.
    async fn create(&self, user: &UserRecord) -> Result<(), StoreError>;

    /// Fetch a user by id. Fails with [`StoreError::NotFound`] for unknown ids.
    async fn get(&self, id: &str) -> Result<UserRecord, StoreError>;
}
