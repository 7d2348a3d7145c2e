//! Server-side storage of login sessions.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use thiserror::Error;

use dreamteam_auth::{Session, SessionToken};
use dreamteam_core::EmployeeId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionStoreError {
    #[error("session store lock poisoned")]
    Poisoned,
}

/// Session storage abstraction (keyed by the opaque cookie token).
pub trait SessionStore: Send + Sync {
    /// Store a freshly issued session. A session that was not stored must
    /// never be handed out as a cookie.
    fn insert(&self, session: Session) -> Result<(), SessionStoreError>;
    fn get(&self, token: &SessionToken) -> Option<Session>;
    fn remove(&self, token: &SessionToken) -> Option<Session>;
    /// Drop every session of one employee (account deleted).
    fn remove_for_employee(&self, employee_id: EmployeeId) -> usize;
    /// Drop sessions whose validity window has closed.
    fn purge_expired(&self, now: DateTime<Utc>) -> usize;
}

impl<S> SessionStore for Arc<S>
where
    S: SessionStore + ?Sized,
{
    fn insert(&self, session: Session) -> Result<(), SessionStoreError> {
        (**self).insert(session)
    }

    fn get(&self, token: &SessionToken) -> Option<Session> {
        (**self).get(token)
    }

    fn remove(&self, token: &SessionToken) -> Option<Session> {
        (**self).remove(token)
    }

    fn remove_for_employee(&self, employee_id: EmployeeId) -> usize {
        (**self).remove_for_employee(employee_id)
    }

    fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        (**self).purge_expired(now)
    }
}

/// In-memory session store.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    inner: RwLock<HashMap<SessionToken, Session>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SessionStore for InMemorySessionStore {
    fn insert(&self, session: Session) -> Result<(), SessionStoreError> {
        let Ok(mut map) = self.inner.write() else {
            tracing::error!(employee_id = %session.employee_id, "session store lock poisoned; session not stored");
            return Err(SessionStoreError::Poisoned);
        };
        map.insert(session.token.clone(), session);
        Ok(())
    }

    fn get(&self, token: &SessionToken) -> Option<Session> {
        let map = self.inner.read().ok()?;
        map.get(token).cloned()
    }

    fn remove(&self, token: &SessionToken) -> Option<Session> {
        let mut map = self.inner.write().ok()?;
        map.remove(token)
    }

    fn remove_for_employee(&self, employee_id: EmployeeId) -> usize {
        let Ok(mut map) = self.inner.write() else {
            return 0;
        };
        let before = map.len();
        map.retain(|_, s| s.employee_id != employee_id);
        before - map.len()
    }

    fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let Ok(mut map) = self.inner.write() else {
            return 0;
        };
        let before = map.len();
        map.retain(|_, s| s.validate(now).is_ok());
        before - map.len()
    }
}
