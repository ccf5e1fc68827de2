//! PostgreSQL backend
//!
//! # Design Principles
//!
//! - One `PgConnection` for the whole session, no pool
//! - Each write is its own transaction: commit on success, rollback otherwise
//! - Table and column names are compile-time constants; operator input is
//!   only ever bound as `$n` parameters

pub mod connection;
pub mod users;

pub use connection::connect;
pub use users::PgUserStore;
