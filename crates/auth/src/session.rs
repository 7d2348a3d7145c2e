//! Login sessions: opaque random tokens bound to an employee with an expiry.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use dreamteam_core::EmployeeId;

/// Number of random bytes in a session token (hex-encoded on the wire).
const TOKEN_BYTES: usize = 32;

/// Opaque bearer value stored in the session cookie.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    /// Draw a fresh token from the thread-local CSPRNG.
    pub fn generate() -> Self {
        let bytes: [u8; TOKEN_BYTES] = rand::random();
        Self(bytes.iter().map(|b| format!("{b:02x}")).collect())
    }

    /// Accept a cookie value only if it has the exact shape of a token.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let well_formed = raw.len() == TOKEN_BYTES * 2
            && raw.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'));
        well_formed.then(|| Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        // First 8 hex chars are enough to correlate log lines.
        write!(f, "SessionToken({}…)", &self.0[..self.0.len().min(8)])
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("session has expired")]
    Expired,

    #[error("session not yet valid (issued_at is in the future)")]
    NotYetValid,

    #[error("invalid session time window (expires_at <= issued_at)")]
    InvalidTimeWindow,
}

/// A login session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: SessionToken,
    pub employee_id: EmployeeId,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn issue(employee_id: EmployeeId, now: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            token: SessionToken::generate(),
            employee_id,
            issued_at: now,
            expires_at: now + ttl,
        }
    }

    /// Deterministically check the session's time window against `now`.
    pub fn validate(&self, now: DateTime<Utc>) -> Result<(), SessionError> {
        if self.expires_at <= self.issued_at {
            return Err(SessionError::InvalidTimeWindow);
        }
        if now < self.issued_at {
            return Err(SessionError::NotYetValid);
        }
        if now >= self.expires_at {
            return Err(SessionError::Expired);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_tokens_parse_and_differ() {
        let a = SessionToken::generate();
        let b = SessionToken::generate();
        assert_ne!(a, b);
        assert_eq!(SessionToken::parse(a.as_str()), Some(a));
    }

    #[test]
    fn parse_rejects_foreign_values() {
        assert_eq!(SessionToken::parse(""), None);
        assert_eq!(SessionToken::parse("abc"), None);
        assert_eq!(SessionToken::parse(&"G".repeat(64)), None);
        assert_eq!(SessionToken::parse(&"A".repeat(64)), None);
    }

    #[test]
    fn session_is_valid_inside_its_window_only() {
        let now = Utc::now();
        let session = Session::issue(EmployeeId::new(), now, Duration::minutes(10));

        assert_eq!(session.validate(now), Ok(()));
        assert_eq!(
            session.validate(now - Duration::seconds(1)),
            Err(SessionError::NotYetValid)
        );
        assert_eq!(
            session.validate(now + Duration::minutes(10)),
            Err(SessionError::Expired)
        );
    }

    #[test]
    fn zero_ttl_is_an_invalid_window() {
        let now = Utc::now();
        let session = Session::issue(EmployeeId::new(), now, Duration::zero());
        assert_eq!(session.validate(now), Err(SessionError::InvalidTimeWindow));
    }

    #[test]
    fn debug_does_not_print_whole_token() {
        let token = SessionToken::generate();
        let printed = format!("{token:?}");
        assert!(!printed.contains(token.as_str()));
    }
}
