use std::sync::Mutex;

use async_trait::async_trait;
use time::OffsetDateTime;
use tracing::debug;

use super::{StoreError, User, UserStore};
use crate::auth::password::hash_password_blocking;

#[derive(Default)]
struct Inner {
    users: Vec<User>,
    last_id: i64,
}

/// Users kept in process memory. Everything is lost on restart.
#[derive(Default)]
pub struct MemoryUserStore {
    inner: Mutex<Inner>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_inner<R>(&self, f: impl FnOnce(&mut Inner) -> R) -> R {
        // Inner is only ever appended to, so a poisoned lock still holds valid data.
        let mut guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut guard)
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        Ok(self.with_inner(|inner| {
            inner
                .users
                .iter()
                .find(|u| u.username == username)
                .cloned()
        }))
    }

    async fn create_user(&self, username: &str, password: &str) -> Result<User, StoreError> {
        // Cheap early exit so a duplicate does not pay for a hash.
        if self.with_inner(|inner| inner.users.iter().any(|u| u.username == username)) {
            return Err(StoreError::AlreadyExists);
        }

        let password_hash = hash_password_blocking(password.to_owned())
            .await
            .map_err(|e| StoreError::Hashing(e.to_string()))?;

        // Re-check and insert under one lock.
        self.with_inner(|inner| {
            if inner.users.iter().any(|u| u.username == username) {
                return Err(StoreError::AlreadyExists);
            }
            inner.last_id += 1;
            let user = User {
                id: inner.last_id,
                username: username.to_owned(),
                password_hash,
                created_at: OffsetDateTime::now_utc(),
            };
            inner.users.push(user.clone());
            debug!(user_id = user.id, username = %user.username, "user inserted (memory)");
            Ok(user)
        })
    }

    async fn count_users(&self) -> Result<i64, StoreError> {
        Ok(self.with_inner(|inner| inner.users.len() as i64))
    }
}
