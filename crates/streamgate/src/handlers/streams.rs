//! Stream registration handlers.
//!
//! Registration outcomes are advisory, so expected failures (disabled,
//! unreachable, rejected) come back as 200 with the structured result in
//! the body. The caller's own record flow decides what to do with them;
//! interrupting it over a gateway hiccup would be wrong.

use crate::models::{RegistrationResult, SourceDescriptor, StreamStatus};
use crate::routes::AppState;
use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;
use tracing::instrument;

/// Request body carrying the ingest source URL.
#[derive(Debug, Deserialize)]
pub struct SourceBody {
    pub source: SourceDescriptor,
}

/// `GET /v1/streams/{key}` - aggregate playability status.
#[instrument(skip_all, fields(stream_key = %key), name = "streamgate.handlers.stream_status")]
pub async fn stream_status(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Json<StreamStatus> {
    Json(state.aggregator.get_status(&key).await)
}

/// `POST /v1/streams/{key}` - register the stream with the gateway.
#[instrument(skip_all, fields(stream_key = %key), name = "streamgate.handlers.register")]
pub async fn register_stream(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
    Json(body): Json<SourceBody>,
) -> Json<RegistrationResult> {
    Json(state.coordinator.register(&key, &body.source).await)
}

/// `PUT /v1/streams/{key}` - re-point the stream at a new source.
#[instrument(skip_all, fields(stream_key = %key), name = "streamgate.handlers.update")]
pub async fn update_stream(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
    Json(body): Json<SourceBody>,
) -> Json<RegistrationResult> {
    Json(state.coordinator.update(&key, &body.source).await)
}

/// `DELETE /v1/streams/{key}` - remove the stream's registration.
#[instrument(skip_all, fields(stream_key = %key), name = "streamgate.handlers.unregister")]
pub async fn unregister_stream(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Json<RegistrationResult> {
    Json(state.coordinator.unregister(&key).await)
}
