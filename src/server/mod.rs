//! HTTP surface (axum).

pub mod error;
pub mod handlers;
pub mod router;

use std::sync::Arc;

use anyhow::Context as _;

use crate::service::CitizenService;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<CitizenService>,
}

impl AppState {
    pub fn new(service: CitizenService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

/// Bind `host` and serve until ctrl-c.
pub async fn serve(state: AppState, host: &str) -> anyhow::Result<()> {
    let app = router::create_router(state);
    let listener = tokio::net::TcpListener::bind(host)
        .await
        .with_context(|| format!("bind {host}"))?;
    tracing::info!("citizen-gen listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!(error = %e, "ctrl-c handler unavailable");
                std::future::pending::<()>().await;
            }
        })
        .await
        .context("http server")?;
    Ok(())
}
