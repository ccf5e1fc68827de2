//! busway-core: user records and where they live
//!
//! Provides the `User` model, the `UserStore` port with its PostgreSQL and
//! in-memory implementations, and layered configuration.

pub mod config;
pub mod db;
pub mod error;
pub mod memory;
pub mod model;
pub mod store;

pub use config::{load_dotenv, BuswayConfig, DatabaseConfig};
pub use db::PgUserStore;
pub use error::{ConfigError, StoreError, StoreResult};
pub use memory::MemoryUserStore;
pub use model::{NewUser, User, UserId, UserUpdate};
pub use store::UserStore;
