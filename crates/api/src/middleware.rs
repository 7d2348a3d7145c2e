use axum::{
    extract::State,
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use dreamteam_auth::SessionToken;
use dreamteam_infra::{EntityStore, SessionStore, StoreError};

use crate::context::{AppContext, Identity, SignedIn};

pub const SESSION_COOKIE: &str = "dreamteam_session";

/// Resolve the session cookie into an [`Identity`] request extension.
///
/// A missing, unknown or expired session is simply `Anonymous`: rejecting
/// the request is the access gate's job. The employee is re-read on every
/// request so an admin flag change takes effect immediately.
pub async fn session_middleware(
    State(ctx): State<AppContext>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let identity = resolve_identity(&ctx, req.headers()).await;
    req.extensions_mut().insert(identity);
    next.run(req).await
}

async fn resolve_identity(ctx: &AppContext, headers: &HeaderMap) -> Identity {
    let Some(token) = session_token(headers) else {
        return Identity::Anonymous;
    };
    let Some(session) = ctx.sessions.get(&token) else {
        return Identity::Anonymous;
    };

    if let Err(err) = session.validate(Utc::now()) {
        tracing::debug!(employee_id = %session.employee_id, error = %err, "dropping stale session");
        ctx.sessions.remove(&token);
        return Identity::Anonymous;
    }

    match ctx.store.get_employee(session.employee_id).await {
        Ok(employee) => Identity::Employee(SignedIn { employee, token }),
        Err(StoreError::NotFound(_)) => {
            ctx.sessions.remove(&token);
            Identity::Anonymous
        }
        Err(err) => {
            tracing::warn!(error = %err, "session lookup failed; treating request as anonymous");
            Identity::Anonymous
        }
    }
}

/// The session token from the `Cookie` header(s), if well-formed.
pub fn session_token(headers: &HeaderMap) -> Option<SessionToken> {
    headers
        .get_all(axum::http::header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| SessionToken::parse(value.trim()))
}

/// `Set-Cookie` value carrying a fresh session token.
pub fn session_cookie(token: &SessionToken, ttl: chrono::Duration) -> HeaderValue {
    cookie_value(&format!(
        "{SESSION_COOKIE}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        token.as_str(),
        ttl.num_seconds().max(0)
    ))
}

/// `Set-Cookie` value that makes the browser forget the session.
pub fn cleared_session_cookie() -> HeaderValue {
    cookie_value(&format!(
        "{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0"
    ))
}

fn cookie_value(raw: &str) -> HeaderValue {
    // Tokens are hex and the attributes are fixed ASCII, so this cannot fail.
    HeaderValue::from_str(raw).unwrap_or_else(|_| HeaderValue::from_static(""))
}

#[cfg(test)]
mod tests {
    use axum::http::header::COOKIE;

    use super::*;

    #[test]
    fn finds_session_cookie_among_others() {
        let token = SessionToken::generate();
        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_static("theme=dark"));
        headers.append(
            COOKIE,
            HeaderValue::from_str(&format!("a=1; {SESSION_COOKIE}={}; b=2", token.as_str())).unwrap(),
        );

        assert_eq!(session_token(&headers), Some(token));
    }

    #[test]
    fn malformed_or_missing_cookie_is_none() {
        let mut headers = HeaderMap::new();
        assert_eq!(session_token(&headers), None);

        headers.insert(COOKIE, HeaderValue::from_static("dreamteam_session=not-a-token"));
        assert_eq!(session_token(&headers), None);
    }

    #[test]
    fn cookies_carry_required_attributes() {
        let token = SessionToken::generate();
        let set = session_cookie(&token, chrono::Duration::minutes(2));
        let set = set.to_str().unwrap();
        assert!(set.starts_with(&format!("{SESSION_COOKIE}={}", token.as_str())));
        assert!(set.contains("HttpOnly"));
        assert!(set.contains("SameSite=Lax"));
        assert!(set.contains("Path=/"));
        assert!(set.contains("Max-Age=120"));

        let cleared = cleared_session_cookie();
        assert!(cleared.to_str().unwrap().contains("Max-Age=0"));
    }
}
