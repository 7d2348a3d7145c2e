//! `dreamteam-auth`: pure authentication/authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage: it hashes
//! credentials, models login sessions and decides route access.

pub mod gate;
pub mod password;
pub mod session;

pub use gate::{AccessLevel, GateDecision, RouteAccess, decide, safe_next};
pub use password::{CredentialHasher, PasswordError, PasswordHash};
pub use session::{Session, SessionError, SessionToken};
