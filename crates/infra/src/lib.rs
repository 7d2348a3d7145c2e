//! Infrastructure layer: entity storage backends and session storage.

pub mod session_store;
pub mod store;

pub use session_store::{InMemorySessionStore, SessionStore, SessionStoreError};
pub use store::{EntityStore, InMemoryEntityStore, SqliteEntityStore, StoreError, StoreResult};
