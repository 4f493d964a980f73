//! Gateway status handler.

use crate::models::GatewayStatus;
use crate::routes::AppState;
use axum::extract::State;
use axum::Json;
use std::sync::Arc;
use tracing::instrument;

/// Liveness summary for the gateway itself, with enabled and reachable
/// kept separate so the UI can tell "turned off" from "down".
#[instrument(skip_all, name = "streamgate.gateway.status")]
pub async fn gateway_status(State(state): State<Arc<AppState>>) -> Json<GatewayStatus> {
    Json(state.prober.gateway_status().await)
}
