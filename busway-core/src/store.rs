//! Storage port used by the interactive session
//!
//! The session only ever talks to this trait. `PgUserStore` is the real
//! backend; `MemoryUserStore` backs tests and `busway --in-memory`.

use async_trait::async_trait;

use crate::error::StoreResult;
use crate::model::{NewUser, User, UserId, UserUpdate};

#[async_trait]
pub trait UserStore: Send {
    /// Whether a user with this identifier exists.
    ///
    /// Never fails: lookup errors are logged and reported as `false`.
    async fn exists(&mut self, id: UserId) -> bool;

    /// Insert a user and return the identifier assigned by the store.
    async fn create(&mut self, user: &NewUser) -> StoreResult<UserId>;

    /// All users, ordered by identifier ascending.
    async fn list(&mut self) -> StoreResult<Vec<User>>;

    /// Fetch one user, `StoreError::NotFound` if absent.
    async fn get(&mut self, id: UserId) -> StoreResult<User>;

    /// Rewrite every column of an existing row.
    async fn update(&mut self, update: &UserUpdate) -> StoreResult<()>;

    async fn delete(&mut self, id: UserId) -> StoreResult<()>;

    /// Release the underlying connection. Calling it again is a no-op.
    async fn close(&mut self) -> StoreResult<()>;
}
