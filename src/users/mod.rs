//! Credential store: user records behind a swappable async trait.
//!
//! [`MemoryUserStore`] keeps records in process memory and is meant for tests
//! and local runs. [`SqliteUserStore`] persists them in a `users` table.

use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, warn};

mod memory;
mod repo_types;
mod sqlite;

pub use memory::MemoryUserStore;
pub use repo_types::User;
pub use sqlite::SqliteUserStore;

/// Username of the bootstrap account.
pub const DEFAULT_ADMIN_USERNAME: &str = "admin";
/// Well-known bootstrap password. Never rely on it outside local development.
pub const DEFAULT_ADMIN_PASSWORD: &str = "password";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("username already exists")]
    AlreadyExists,
    #[error("password hashing failed: {0}")]
    Hashing(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Exact, case-sensitive lookup.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    /// Hashes `password` and inserts a new record. The uniqueness check and the
    /// insert happen atomically; a taken username yields
    /// [`StoreError::AlreadyExists`] and leaves the existing record untouched.
    async fn create_user(&self, username: &str, password: &str) -> Result<User, StoreError>;

    async fn count_users(&self) -> Result<i64, StoreError>;

    /// Creates the bootstrap `admin` account if it does not exist yet.
    /// Returns `true` when a record was created.
    async fn seed_default_account(&self) -> Result<bool, StoreError> {
        if self
            .find_by_username(DEFAULT_ADMIN_USERNAME)
            .await?
            .is_some()
        {
            info!("admin user already exists");
            return Ok(false);
        }

        match self
            .create_user(DEFAULT_ADMIN_USERNAME, DEFAULT_ADMIN_PASSWORD)
            .await
        {
            Ok(user) => {
                warn!(
                    user_id = user.id,
                    username = %user.username,
                    "seeded bootstrap account with the well-known default password"
                );
                Ok(true)
            }
            // lost a race with another seeder
            Err(StoreError::AlreadyExists) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

/// Store whose every operation fails, for exercising internal-error paths.
#[cfg(test)]
pub(crate) struct FailingUserStore;

#[cfg(test)]
#[async_trait]
impl UserStore for FailingUserStore {
    async fn find_by_username(&self, _username: &str) -> Result<Option<User>, StoreError> {
        Err(StoreError::Database(sqlx::Error::PoolClosed))
    }

    async fn create_user(&self, _username: &str, _password: &str) -> Result<User, StoreError> {
        Err(StoreError::Database(sqlx::Error::PoolClosed))
    }

    async fn count_users(&self) -> Result<i64, StoreError> {
        Err(StoreError::Database(sqlx::Error::PoolClosed))
    }
}
