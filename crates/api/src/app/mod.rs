//! HTTP application wiring (Axum router + shared context).
//!
//! - `routes/`: page handlers, one file per area
//! - `endpoints.rs`: the named route table (path + access class)
//! - `pages.rs`: HTML rendering
//! - `dto.rs`: form bodies and JSON responses
//! - `errors.rs`: 403/404/500 pages

use std::sync::Arc;

use axum::{Extension, Router};
use tower::ServiceBuilder;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

use dreamteam_auth::CredentialHasher;
use dreamteam_infra::{EntityStore, InMemorySessionStore, SqliteEntityStore, StoreError, StoreResult};

use crate::config::ApiConfig;
use crate::context::AppContext;
use crate::middleware;

pub mod dto;
pub mod endpoints;
pub mod errors;
pub mod pages;
pub mod routes;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(ctx: AppContext) -> Router {
    build_app_with(ctx, Router::new())
}

/// Like [`build_app`], with `extra` routes merged in front of the fallback.
///
/// `extra` routes are public and get the same session handling and fault
/// pages as every other page.
pub fn build_app_with(ctx: AppContext, extra: Router) -> Router {
    routes::router()
        .merge(extra)
        .fallback(errors::not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CatchPanicLayer::custom(errors::panic_page))
                .layer(axum::middleware::from_fn(errors::render_fault_pages))
                .layer(Extension(ctx.clone()))
                .layer(axum::middleware::from_fn_with_state(ctx, middleware::session_middleware)),
        )
}

/// Open the configured store, prepare it and seed the bootstrap admin.
pub async fn build_context(config: &ApiConfig) -> StoreResult<AppContext> {
    let store: Arc<dyn EntityStore> = match &config.database_url {
        Some(url) => {
            tracing::info!("using sqlite entity store");
            Arc::new(SqliteEntityStore::connect(url).await?)
        }
        None => {
            tracing::warn!("DATABASE_URL not set; records are kept in memory only");
            Arc::new(dreamteam_infra::InMemoryEntityStore::new())
        }
    };
    store.create_all().await?;

    let ctx = AppContext::new(
        store,
        Arc::new(InMemorySessionStore::new()),
        CredentialHasher::new(),
        config.session_ttl,
    );

    if let Some(seed) = &config.seed_admin {
        seed_admin(&ctx, &seed.username, &seed.password).await?;
    }
    Ok(ctx)
}

/// Create an admin account unless the username already exists.
pub async fn seed_admin(ctx: &AppContext, username: &str, password: &str) -> StoreResult<()> {
    match ctx.store.find_by_username(username).await {
        Ok(existing) => {
            if !existing.is_admin {
                tracing::warn!(%username, "seed admin username belongs to a regular employee");
            }
            return Ok(());
        }
        Err(StoreError::NotFound(_)) => {}
        Err(err) => return Err(err),
    }

    let new = dreamteam_directory::NewEmployee::new(username, password, &ctx.hasher)?.admin(true);
    let admin = ctx.store.create_employee(new).await?;
    tracing::info!(employee_id = %admin.id, %username, "seeded admin account");
    Ok(())
}
