use std::sync::Arc;

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Response},
};

use dreamteam_auth::{AccessLevel, CredentialHasher, SessionToken};
use dreamteam_directory::Employee;
use dreamteam_infra::{EntityStore, InMemoryEntityStore, InMemorySessionStore, SessionStore};

use crate::app::errors::PageError;

/// Shared application state, built once per process.
#[derive(Clone)]
pub struct AppContext {
    pub store: Arc<dyn EntityStore>,
    pub sessions: Arc<dyn SessionStore>,
    pub hasher: CredentialHasher,
    pub session_ttl: chrono::Duration,
}

impl AppContext {
    pub fn new(
        store: Arc<dyn EntityStore>,
        sessions: Arc<dyn SessionStore>,
        hasher: CredentialHasher,
        session_ttl: chrono::Duration,
    ) -> Self {
        Self {
            store,
            sessions,
            hasher,
            session_ttl,
        }
    }

    /// Fully in-memory context (tests, local runs without `DATABASE_URL`).
    pub fn in_memory(hasher: CredentialHasher, session_ttl: chrono::Duration) -> Self {
        Self::new(
            Arc::new(InMemoryEntityStore::new()),
            Arc::new(InMemorySessionStore::new()),
            hasher,
            session_ttl,
        )
    }
}

/// Who is making the request, as resolved from the session cookie.
///
/// Always present in request extensions once the session middleware ran.
#[derive(Debug, Clone, Default)]
pub enum Identity {
    #[default]
    Anonymous,
    Employee(SignedIn),
}

/// An authenticated employee and the session token it presented.
#[derive(Debug, Clone)]
pub struct SignedIn {
    pub employee: Employee,
    pub token: SessionToken,
}

impl Identity {
    pub fn access_level(&self) -> AccessLevel {
        match self {
            Identity::Anonymous => AccessLevel::Anonymous,
            Identity::Employee(signed_in) => signed_in.employee.access_level(),
        }
    }

    pub fn employee(&self) -> Option<&Employee> {
        match self {
            Identity::Anonymous => None,
            Identity::Employee(signed_in) => Some(&signed_in.employee),
        }
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<Identity>().cloned().unwrap_or_default())
    }
}

/// Extractor for handlers behind a login gate.
///
/// Reaching one of those handlers without a signed-in identity means the
/// route table is wired wrong, so it is reported as an internal fault.
#[axum::async_trait]
impl<S> FromRequestParts<S> for SignedIn
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<Identity>() {
            Some(Identity::Employee(signed_in)) => Ok(signed_in.clone()),
            _ => {
                tracing::error!(path = %parts.uri.path(), "signed-in handler reached without a session");
                Err(PageError::Internal.into_response())
            }
        }
    }
}
