//! # atelier-database
//!
//! Store traits consumed by the notification pipeline, their PostgreSQL
//! implementations, and a process-local implementation for development
//! and tests.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use memory::MemoryStore;
pub use store::{DirectoryStore, NotificationStore};
