use std::time::Duration;

use anyhow::Context;
use chrono::Utc;

use dreamteam_api::{app, config::ApiConfig};
use dreamteam_infra::SessionStore;

/// How often expired sessions are swept from the session store.
const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ApiConfig::from_env().context("invalid configuration")?;
    dreamteam_observability::init(config.log_format);

    let ctx = app::build_context(&config)
        .await
        .context("failed to prepare the entity store")?;

    let sessions = ctx.sessions.clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(SESSION_SWEEP_INTERVAL);
        loop {
            ticker.tick().await;
            let purged = sessions.purge_expired(Utc::now());
            if purged > 0 {
                tracing::debug!(purged, "expired sessions removed");
            }
        }
    });

    let app = app::build_app(ctx);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
