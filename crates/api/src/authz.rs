//! API-side access gate.
//!
//! Every non-public route carries this middleware with its [`RouteAccess`]
//! as state. The decision itself lives in `dreamteam_auth::gate`; this
//! module only turns it into a response.

use axum::{
    extract::{OriginalUri, State},
    http::{StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use url::form_urlencoded;

use dreamteam_auth::{GateDecision, RouteAccess, decide};

use crate::app::endpoints::Endpoint;
use crate::app::errors::PageError;
use crate::context::Identity;

pub async fn gate(
    State(access): State<RouteAccess>,
    req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let level = req
        .extensions()
        .get::<Identity>()
        .map(Identity::access_level)
        .unwrap_or(dreamteam_auth::AccessLevel::Anonymous);

    match decide(level, access) {
        GateDecision::Allow => next.run(req).await,
        GateDecision::RedirectToLogin => {
            let target = original_target(&req);
            tracing::info!(%target, "anonymous request sent to login");
            found(&login_url(Some(&target)))
        }
        GateDecision::Forbidden => {
            tracing::warn!(path = %req.uri().path(), ?level, ?access, "access denied");
            PageError::Forbidden.into_response()
        }
    }
}

/// Path and query the client asked for, before any nesting rewrote it.
fn original_target(req: &axum::http::Request<axum::body::Body>) -> String {
    let uri = req
        .extensions()
        .get::<OriginalUri>()
        .map(|original| &original.0)
        .unwrap_or_else(|| req.uri());
    uri.path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string())
}

/// `/login`, optionally carrying the url-encoded `next` target.
pub fn login_url(next: Option<&str>) -> String {
    let login = Endpoint::Login.path();
    match next {
        Some(next) => {
            let query = form_urlencoded::Serializer::new(String::new())
                .append_pair("next", next)
                .finish();
            format!("{login}?{query}")
        }
        None => login.to_string(),
    }
}

/// `302 Found` to `location`.
pub fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_url_encodes_next() {
        assert_eq!(login_url(None), "/login");
        assert_eq!(login_url(Some("/logout")), "/login?next=%2Flogout");
        assert_eq!(
            login_url(Some("/admin/departments")),
            "/login?next=%2Fadmin%2Fdepartments"
        );
        assert_eq!(login_url(Some("/dashboard?a=1")), "/login?next=%2Fdashboard%3Fa%3D1");
    }

    #[test]
    fn found_sets_location() {
        let res = found("/login");
        assert_eq!(res.status(), StatusCode::FOUND);
        assert_eq!(res.headers()[header::LOCATION], "/login");
    }
}
