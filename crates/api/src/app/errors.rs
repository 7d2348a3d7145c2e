//! Fault pages.
//!
//! Every 403/404/500 the app emits is an HTML page whose body names the
//! status (`403 Error`, ...). Handlers return [`PageError`]; bare statuses
//! from anywhere else are rewritten by [`render_fault_pages`].

use std::any::Any;

use axum::{
    http::StatusCode,
    middleware::Next,
    response::{Html, IntoResponse, Response},
};

use dreamteam_infra::StoreError;

use crate::app::pages;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageError {
    Forbidden,
    NotFound,
    Internal,
}

/// Response extension marking a body that is already a fault page.
#[derive(Debug, Clone, Copy)]
pub struct RenderedFaultPage;

impl PageError {
    pub fn status(self) -> StatusCode {
        match self {
            PageError::Forbidden => StatusCode::FORBIDDEN,
            PageError::NotFound => StatusCode::NOT_FOUND,
            PageError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn from_status(status: StatusCode) -> Option<Self> {
        match status {
            StatusCode::FORBIDDEN => Some(PageError::Forbidden),
            StatusCode::NOT_FOUND => Some(PageError::NotFound),
            StatusCode::INTERNAL_SERVER_ERROR => Some(PageError::Internal),
            _ => None,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            PageError::Forbidden => "You do not have sufficient permissions to access this page.",
            PageError::NotFound => "The page you're looking for doesn't exist.",
            PageError::Internal => "The server encountered an internal error. That's all we know.",
        }
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let mut res = (self.status(), Html(pages::fault_page(self))).into_response();
        res.extensions_mut().insert(RenderedFaultPage);
        res
    }
}

impl From<StoreError> for PageError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => PageError::NotFound,
            // Forms handle these before they get here.
            StoreError::Validation(msg) | StoreError::Conflict(msg) => {
                tracing::error!(%msg, "unhandled store rejection");
                PageError::Internal
            }
            StoreError::Backend(msg) => {
                tracing::error!(%msg, "storage backend failure");
                PageError::Internal
            }
        }
    }
}

/// Replace bare 403/404/500 responses with their fault page.
pub async fn render_fault_pages(req: axum::http::Request<axum::body::Body>, next: Next) -> Response {
    let res = next.run(req).await;
    if res.extensions().get::<RenderedFaultPage>().is_some() {
        return res;
    }
    match PageError::from_status(res.status()) {
        Some(page) => page.into_response(),
        None => res,
    }
}

/// Router fallback.
pub async fn not_found() -> PageError {
    PageError::NotFound
}

/// `CatchPanicLayer` handler.
pub fn panic_page(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic payload");
    tracing::error!(%detail, "handler panicked");
    PageError::Internal.into_response()
}

#[cfg(test)]
mod tests {
    use dreamteam_core::EntityKind;

    use super::*;

    #[test]
    fn status_round_trips_for_fault_classes() {
        for page in [PageError::Forbidden, PageError::NotFound, PageError::Internal] {
            assert_eq!(PageError::from_status(page.status()), Some(page));
        }
        assert_eq!(PageError::from_status(StatusCode::UNAUTHORIZED), None);
        assert_eq!(PageError::from_status(StatusCode::FOUND), None);
    }

    #[test]
    fn store_errors_map_to_pages() {
        assert_eq!(PageError::from(StoreError::NotFound(EntityKind::Role)), PageError::NotFound);
        assert_eq!(PageError::from(StoreError::Backend("io".into())), PageError::Internal);
    }

    #[test]
    fn rendered_page_is_marked() {
        let res = PageError::Forbidden.into_response();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
        assert!(res.extensions().get::<RenderedFaultPage>().is_some());
    }

    #[test]
    fn panic_page_is_internal() {
        let res = panic_page(Box::new("boom"));
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
