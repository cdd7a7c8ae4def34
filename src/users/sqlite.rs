use anyhow::Context;
use async_trait::async_trait;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use time::OffsetDateTime;
use tracing::debug;

use super::{StoreError, User, UserStore};
use crate::auth::password::hash_password_blocking;

/// Users persisted in the `users` table. Username uniqueness is a table
/// constraint, so concurrent registrations cannot both succeed.
#[derive(Clone)]
pub struct SqliteUserStore {
    db: SqlitePool,
}

impl SqliteUserStore {
    pub async fn connect(url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let options = if is_in_memory(url) {
            // Every connection to an in-memory database is its own database,
            // so keep exactly one alive for the life of the pool.
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(max_connections)
        };
        let db = options
            .connect(url)
            .await
            .context("connect to database")?;
        Self::from_pool(db).await
    }

    /// Wraps an existing pool and brings its schema up to date.
    pub async fn from_pool(db: SqlitePool) -> anyhow::Result<Self> {
        sqlx::migrate!("./migrations")
            .run(&db)
            .await
            .context("run migrations")?;
        Ok(Self { db })
    }
}

fn is_in_memory(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

#[async_trait]
impl UserStore for SqliteUserStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, created_at
            FROM users
            WHERE username = ?
            "#,
        )
        .bind(username)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn create_user(&self, username: &str, password: &str) -> Result<User, StoreError> {
        if self.find_by_username(username).await?.is_some() {
            return Err(StoreError::AlreadyExists);
        }

        let password_hash = hash_password_blocking(password.to_owned())
            .await
            .map_err(|e| StoreError::Hashing(e.to_string()))?;

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password_hash, created_at)
            VALUES (?, ?, ?)
            RETURNING id, username, password_hash, created_at
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .bind(OffsetDateTime::now_utc())
        .fetch_one(&self.db)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                StoreError::AlreadyExists
            }
            other => StoreError::Database(other),
        })?;

        debug!(user_id = user.id, username = %user.username, "user inserted (sqlite)");
        Ok(user)
    }

    async fn count_users(&self) -> Result<i64, StoreError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.db)
            .await?;
        Ok(count)
    }
}
