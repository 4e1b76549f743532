//! # coursehub-database
//!
//! PostgreSQL connection management, the store traits the services are
//! written against, and their implementations: sqlx repositories for
//! production and, behind the `memory` feature, an in-process store.

pub mod connection;
pub mod migration;
pub mod repositories;
pub mod store;

#[cfg(feature = "memory")]
pub mod memory;

pub use connection::DatabasePool;
pub use store::Stores;
