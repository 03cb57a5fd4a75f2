//! Router assembly and the HTTP listener.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use axum::{
    routing::{get, post, put},
    Router,
};
use insightbot_agent::SessionController;
use tokio::net::TcpListener;
use tracing::{info, instrument};

use crate::health_api;
use crate::session_registry::SessionRegistry;
use crate::sessions_api;

/// Application state shared across routes.
#[derive(Clone)]
pub struct GatewayState {
    pub controller: Arc<SessionController>,
    pub sessions: SessionRegistry,
    pub started_at: Instant,
}

impl GatewayState {
    pub fn new(controller: Arc<SessionController>, idle_timeout: Duration) -> Self {
        Self {
            controller,
            sessions: SessionRegistry::new(idle_timeout),
            started_at: Instant::now(),
        }
    }
}

pub fn router(state: GatewayState) -> Router {
    Router::new()
        .route("/api/health", get(health_api::get_health))
        .route("/api/datasets", get(sessions_api::list_datasets))
        .route("/api/sessions", post(sessions_api::create_session))
        .route(
            "/api/sessions/:id",
            get(sessions_api::get_session).delete(sessions_api::delete_session),
        )
        .route("/api/sessions/:id/dataset", put(sessions_api::select_dataset))
        .route("/api/sessions/:id/messages", post(sessions_api::post_message))
        .with_state(state)
}

/// Serve `app` until Ctrl-C.
#[instrument(skip(app))]
pub async fn start_server(addr: SocketAddr, app: Router) -> Result<()> {
    let listener = TcpListener::bind(&addr).await?;
    info!("Gateway HTTP server listening on {}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
        })
        .await?;
    Ok(())
}
