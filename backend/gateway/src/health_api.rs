//! `GET /api/health`

use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::server::GatewayState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub status: String,
    pub uptime_seconds: u64,
    pub sessions: usize,
    pub datasets: usize,
    pub timestamp: DateTime<Utc>,
}

pub async fn get_health(State(state): State<GatewayState>) -> Json<HealthReport> {
    Json(HealthReport {
        status: "ok".into(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        sessions: state.sessions.len().await,
        datasets: state.controller.datasets().keys().len(),
        timestamp: Utc::now(),
    })
}
