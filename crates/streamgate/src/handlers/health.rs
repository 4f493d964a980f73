//! Health check handler.

use crate::models::HealthResponse;
use crate::routes::AppState;
use axum::extract::State;
use axum::Json;
use std::sync::Arc;
use tracing::instrument;

/// Service liveness plus a gateway probe summary.
///
/// Always returns 200 with a body; a dead gateway makes this service
/// degraded, not unhealthy, since camera records keep working without it.
///
/// ## Example response
///
/// ```json
/// {
///   "status": "healthy",
///   "gateway": "online"
/// }
/// ```
#[instrument(skip_all, name = "streamgate.health.check")]
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let gateway = state.prober.gateway_status().await;

    let summary = if !gateway.enabled {
        "disabled"
    } else if gateway.reachable {
        "online"
    } else {
        "offline"
    };

    Json(HealthResponse {
        status: "healthy".to_string(),
        gateway: summary.to_string(),
    })
}
