//! In-memory user store
//!
//! Behaves like the PostgreSQL store (ascending identifiers, not-found on
//! missing rows, idempotent close) without a server. Writes can be made to
//! fail on demand so callers can check that nothing is persisted.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tracing::warn;

use crate::error::{StoreError, StoreResult};
use crate::model::{NewUser, User, UserId, UserUpdate};
use crate::store::UserStore;

#[derive(Debug)]
pub struct MemoryUserStore {
    rows: BTreeMap<UserId, User>,
    next_id: UserId,
    fail_writes: bool,
    open: bool,
    close_calls: usize,
}

impl Default for MemoryUserStore {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 1,
            fail_writes: false,
            open: true,
            close_calls: 0,
        }
    }
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store. Identifiers continue after the highest seeded one.
    pub fn with_users(users: impl IntoIterator<Item = User>) -> Self {
        let mut store = Self::default();
        for user in users {
            store.next_id = store.next_id.max(user.id + 1);
            store.rows.insert(user.id, user);
        }
        store
    }

    /// Make every subsequent create/update/delete fail without touching rows.
    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, id: UserId) -> Option<&User> {
        self.rows.get(&id)
    }

    pub fn rows(&self) -> impl Iterator<Item = &User> {
        self.rows.values()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Number of times `close()` has been called, including no-op calls.
    pub fn close_calls(&self) -> usize {
        self.close_calls
    }

    fn ensure_open(&self) -> StoreResult<()> {
        if self.open {
            Ok(())
        } else {
            Err(StoreError::Closed)
        }
    }

    fn ensure_writable(&self) -> StoreResult<()> {
        self.ensure_open()?;
        if self.fail_writes {
            return Err(StoreError::Simulated);
        }
        Ok(())
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn exists(&mut self, id: UserId) -> bool {
        if let Err(err) = self.ensure_open() {
            warn!(id, "existence check failed: {err}");
            return false;
        }
        self.rows.contains_key(&id)
    }

    async fn create(&mut self, user: &NewUser) -> StoreResult<UserId> {
        self.ensure_writable()?;
        let id = self.next_id;
        self.next_id += 1;
        self.rows.insert(id, user.clone().into_user(id));
        Ok(id)
    }

    async fn list(&mut self) -> StoreResult<Vec<User>> {
        self.ensure_open()?;
        Ok(self.rows.values().cloned().collect())
    }

    async fn get(&mut self, id: UserId) -> StoreResult<User> {
        self.ensure_open()?;
        self.rows
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(id))
    }

    async fn update(&mut self, update: &UserUpdate) -> StoreResult<()> {
        self.ensure_writable()?;
        let row = self
            .rows
            .get_mut(&update.id)
            .ok_or_else(|| StoreError::not_found(update.id))?;
        *row = update.clone().into_user();
        Ok(())
    }

    async fn delete(&mut self, id: UserId) -> StoreResult<()> {
        self.ensure_writable()?;
        self.rows
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found(id))
    }

    async fn close(&mut self) -> StoreResult<()> {
        self.close_calls += 1;
        self.open = false;
        Ok(())
    }
}
