//! HTTP routes for Streamgate.
//!
//! Defines the Axum router and application state.

use crate::config::{Config, ConfigError};
use crate::handlers;
use crate::services::{
    ConnectivityProber, GatewayClient, RegistrationCoordinator, StatusAggregator, UpdatePolicy,
    UrlBuilder,
};
use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

/// Application state shared across all handlers.
pub struct AppState {
    /// Service configuration.
    pub config: Config,

    /// Register/update/unregister coordination.
    pub coordinator: RegistrationCoordinator,

    /// Per-stream status aggregation.
    pub aggregator: StatusAggregator,

    /// Gateway liveness probing.
    pub prober: ConnectivityProber,
}

impl AppState {
    /// Wire up the service graph from configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for base URLs that cannot carry path segments
    /// or an HTTP client that cannot be built. Startup-fatal.
    pub fn from_config(config: Config) -> Result<Arc<Self>, ConfigError> {
        Self::with_policy(config, UpdatePolicy::default())
    }

    /// Same as [`Self::from_config`] with an explicit update policy.
    pub fn with_policy(config: Config, policy: UpdatePolicy) -> Result<Arc<Self>, ConfigError> {
        let gateway_config = Arc::new(config.gateway.clone());
        let client: Arc<GatewayClient> = Arc::new(GatewayClient::new(&gateway_config)?);
        let urls = UrlBuilder::from_config(&gateway_config)?;

        let coordinator = RegistrationCoordinator::new(
            gateway_config.clone(),
            client.clone(),
            urls.clone(),
            policy,
        );
        let aggregator = StatusAggregator::new(gateway_config.clone(), client.clone(), urls);
        let prober = ConnectivityProber::new(gateway_config, client);

        Ok(Arc::new(Self {
            config,
            coordinator,
            aggregator,
            prober,
        }))
    }
}

/// Build the application routes.
///
/// - `/v1/health` - service liveness + gateway probe summary
/// - `/v1/gateway` - gateway status (enabled, reachable, api_url)
/// - `/v1/streams/:key` - status (GET), register (POST), update (PUT),
///   unregister (DELETE)
///
/// TraceLayer logs every request; the 30 second request timeout bounds
/// the worst case of a slow gateway behind several probes.
pub fn build_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/v1/health", get(handlers::health_check))
        .route("/v1/gateway", get(handlers::gateway_status))
        .route(
            "/v1/streams/:key",
            get(handlers::stream_status)
                .post(handlers::register_stream)
                .put(handlers::update_stream)
                .delete(handlers::unregister_stream),
        )
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
}
