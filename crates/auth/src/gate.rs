//! Route access decisions.
//!
//! - No IO
//! - No panics
//! - No HTTP types (the API layer turns a [`GateDecision`] into a response)

/// Authorization state of the caller for one request.
///
/// This is the *access* level; job roles are a separate directory concept.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum AccessLevel {
    Anonymous,
    Regular,
    Admin,
}

impl AccessLevel {
    /// Level of an authenticated employee.
    pub fn from_admin_flag(is_admin: bool) -> Self {
        if is_admin { Self::Admin } else { Self::Regular }
    }

}

/// What a route demands of its caller.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum RouteAccess {
    Public,
    LoginRequired,
    AdminOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Allow,
    /// Caller must log in first; the original target travels as `next`.
    RedirectToLogin,
    /// Caller is logged in but lacks the admin level.
    Forbidden,
}

/// Decide whether `level` may reach a route guarded by `access`.
///
/// Anonymous callers are never forbidden outright: they are always sent to
/// the login page.
pub fn decide(level: AccessLevel, access: RouteAccess) -> GateDecision {
    match (access, level) {
        (RouteAccess::Public, _) => GateDecision::Allow,
        (_, AccessLevel::Anonymous) => GateDecision::RedirectToLogin,
        (RouteAccess::LoginRequired, _) => GateDecision::Allow,
        (RouteAccess::AdminOnly, AccessLevel::Admin) => GateDecision::Allow,
        (RouteAccess::AdminOnly, AccessLevel::Regular) => GateDecision::Forbidden,
    }
}

/// Filter a post-login `next` target.
///
/// Only same-site absolute paths are honoured (no scheme, no `//host`, no
/// control characters), and
/// none of the `excluded` paths (e.g. the logout route) are followed.
pub fn safe_next<'a>(next: Option<&'a str>, excluded: &[&str]) -> Option<&'a str> {
    let next = next?.trim();
    // Browsers drop tab, CR and LF inside URLs, so "/\t/host" would become "//host".
    if next.chars().any(|c| c.is_ascii_control()) {
        return None;
    }
    if !next.starts_with('/') || next.starts_with("//") || next.contains('\\') {
        return None;
    }
    let path = next.split(['?', '#']).next().unwrap_or(next);
    if excluded.contains(&path) {
        return None;
    }
    Some(next)
}
