//! `insightbot serve`

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use insightbot_config::AppConfig;
use insightbot_gateway::{router, start_server, GatewayState};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::runtime::Runtime;

pub async fn run(config: AppConfig, port: Option<u16>) -> Result<()> {
    let runtime = Runtime::start(config).await?;
    let server = &runtime.config.server;
    let addr: SocketAddr = format!("{}:{}", server.bind_address, port.unwrap_or(server.port))
        .parse()
        .context("server.bindAddress is not a valid IP address")?;

    info!(addr = %addr, "starting insightbot gateway");
    let idle_timeout = Duration::from_secs(runtime.config.session.idle_timeout_secs);
    let app = router(GatewayState::new(runtime.controller.clone(), idle_timeout))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());
    start_server(addr, app).await
}
