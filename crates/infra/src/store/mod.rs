//! Entity store boundary.
//!
//! This module defines a repository-style abstraction over the directory
//! records, with an in-memory implementation (dev/test) and a SQLite one.

pub mod in_memory;
pub mod sqlite;
pub mod r#trait;

pub use in_memory::InMemoryEntityStore;
pub use r#trait::{EntityStore, StoreError, StoreResult};
pub use sqlite::SqliteEntityStore;

#[cfg(test)]
mod contract_tests;
