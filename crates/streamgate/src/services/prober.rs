//! Gateway connectivity probing.
//!
//! Answers "is the gateway currently usable" without ever raising an
//! error. An administratively disabled gateway short-circuits to `false`
//! with no network call. The answer is advisory: liveness can change
//! between a probe and a mutating call, so the coordinator probes again
//! right before it mutates.

use crate::config::GatewayConfig;
use crate::models::GatewayStatus;
use crate::services::gateway_client::GatewayApi;
use std::sync::Arc;
use tracing::debug;

/// Wraps the client's liveness probe with the enabled/disabled gate.
#[derive(Clone)]
pub struct ConnectivityProber {
    config: Arc<GatewayConfig>,
    gateway: Arc<dyn GatewayApi>,
}

impl ConnectivityProber {
    pub fn new(config: Arc<GatewayConfig>, gateway: Arc<dyn GatewayApi>) -> Self {
        Self { config, gateway }
    }

    /// Go/no-go signal. Disabled and unreachable collapse to `false`;
    /// callers that need the distinction use [`Self::gateway_status`].
    pub async fn is_reachable(&self) -> bool {
        if !self.config.enabled() {
            debug!(target: "streamgate.prober", "Gateway disabled by configuration, skipping probe");
            return false;
        }

        self.gateway.probe_liveness().await
    }

    /// Liveness summary keeping enabled and reachable separate.
    pub async fn gateway_status(&self) -> GatewayStatus {
        let enabled = self.config.enabled();
        let reachable = if enabled {
            self.gateway.probe_liveness().await
        } else {
            false
        };

        GatewayStatus {
            enabled,
            reachable,
            api_url: self.config.api_url.clone(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::services::gateway_client::mock::MockGateway;
    use std::collections::HashMap;

    fn config(api_enabled: bool) -> Arc<GatewayConfig> {
        let mut gateway = Config::from_vars(&HashMap::new()).unwrap().gateway;
        gateway.api_enabled = api_enabled;
        Arc::new(gateway)
    }

    #[tokio::test]
    async fn test_disabled_skips_network_probe() {
        let mock = Arc::new(MockGateway::healthy());
        let prober = ConnectivityProber::new(config(false), mock.clone());

        assert!(!prober.is_reachable().await);
        assert_eq!(mock.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_enabled_and_live_is_reachable() {
        let mock = Arc::new(MockGateway::healthy());
        let prober = ConnectivityProber::new(config(true), mock.clone());

        assert!(prober.is_reachable().await);
        assert_eq!(mock.probe_calls(), 1);
    }

    #[tokio::test]
    async fn test_status_separates_enabled_from_reachable() {
        let mock = Arc::new(MockGateway::unreachable());
        let prober = ConnectivityProber::new(config(true), mock);

        let status = prober.gateway_status().await;
        assert!(status.enabled);
        assert!(!status.reachable);
        assert_eq!(status.api_url, "http://localhost:9997");
    }

    #[tokio::test]
    async fn test_status_when_disabled_reports_unreachable_without_probe() {
        let mock = Arc::new(MockGateway::healthy());
        let prober = ConnectivityProber::new(config(false), mock.clone());

        let status = prober.gateway_status().await;
        assert!(!status.enabled);
        assert!(!status.reachable);
        assert_eq!(mock.total_calls(), 0);
    }
}
