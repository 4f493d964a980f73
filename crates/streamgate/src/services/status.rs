//! Stream status aggregation.
//!
//! Composes a path lookup, an independent gateway liveness probe, and the
//! playback URLs into one `StreamStatus`. The two probes are not
//! reconciled: a stale `active` next to a fresh `reachable: false` is the
//! caller's signal to fall back to the raw source URL.

use crate::config::GatewayConfig;
use crate::errors::GatewayError;
use crate::models::{PathState, StreamStatus};
use crate::services::gateway_client::{GatewayApi, PathLookup};
use crate::services::prober::ConnectivityProber;
use crate::services::urls::UrlBuilder;
use std::sync::Arc;
use tracing::instrument;

/// Answers "is this stream playable right now, and how".
#[derive(Clone)]
pub struct StatusAggregator {
    gateway: Arc<dyn GatewayApi>,
    prober: ConnectivityProber,
    urls: UrlBuilder,
}

impl StatusAggregator {
    pub fn new(config: Arc<GatewayConfig>, gateway: Arc<dyn GatewayApi>, urls: UrlBuilder) -> Self {
        let prober = ConnectivityProber::new(config, gateway.clone());
        Self {
            gateway,
            prober,
            urls,
        }
    }

    /// Aggregate the registration state of `key` with gateway liveness.
    ///
    /// Never fails: every gateway outcome maps onto a well-formed
    /// `StreamStatus`.
    #[instrument(skip(self), fields(stream_key = %key), name = "streamgate.status.get")]
    pub async fn get_status(&self, key: &str) -> StreamStatus {
        let lookup = self.gateway.get_path(key).await;
        let gateway = self.prober.gateway_status().await;

        let (path_state, http_status, detail) = match lookup {
            Ok(PathLookup::Registered(_)) => (PathState::Active, None, None),
            Ok(PathLookup::NotRegistered) => (
                PathState::NotRegistered,
                None,
                Some("Stream is not registered with the gateway".to_string()),
            ),
            Err(GatewayError::Malformed(detail)) => (
                PathState::Unknown,
                None,
                Some(format!("Gateway answer was unparsable: {detail}")),
            ),
            Err(GatewayError::Unreachable(detail)) => (
                PathState::Unknown,
                None,
                Some(format!("Gateway unreachable: {detail}")),
            ),
            Err(GatewayError::Rejected { status, .. }) => (
                PathState::Error,
                Some(status),
                Some(format!("Gateway returned HTTP {status}")),
            ),
        };

        let (hls_url, webrtc_url) = if path_state == PathState::Active {
            (
                Some(self.urls.hls_manifest_url(key)),
                self.urls.webrtc_url(key),
            )
        } else {
            (None, None)
        };

        StreamStatus {
            gateway_enabled: gateway.enabled,
            gateway_reachable: gateway.reachable,
            path_state,
            hls_url,
            webrtc_url,
            http_status,
            detail,
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

    fn aggregator_with(
        mock: Arc<MockGateway>,
        mutate: impl FnOnce(&mut GatewayConfig),
    ) -> StatusAggregator {
        let mut gateway = Config::from_vars(&HashMap::new()).unwrap().gateway;
        mutate(&mut gateway);
        let urls = UrlBuilder::from_config(&gateway).unwrap();
        StatusAggregator::new(Arc::new(gateway), mock, urls)
    }

    #[tokio::test]
    async fn test_active_path_carries_urls() {
        let mock = Arc::new(MockGateway::healthy());
        let aggregator = aggregator_with(mock, |c| c.webrtc_enabled = true);

        let status = aggregator.get_status("abc123").await;

        assert_eq!(status.path_state, PathState::Active);
        assert!(status.gateway_enabled);
        assert!(status.gateway_reachable);
        assert_eq!(
            status.hls_url.as_deref(),
            Some("http://localhost:8888/abc123/index.m3u8")
        );
        assert_eq!(
            status.webrtc_url.as_deref(),
            Some("http://localhost:8889/abc123")
        );
    }

    #[tokio::test]
    async fn test_webrtc_url_absent_when_disabled() {
        let mock = Arc::new(MockGateway::healthy());
        let aggregator = aggregator_with(mock, |_| {});

        let status = aggregator.get_status("abc123").await;
        assert!(status.hls_url.is_some());
        assert!(status.webrtc_url.is_none());
    }

    #[tokio::test]
    async fn test_not_registered_has_no_urls() {
        let mock =
            Arc::new(MockGateway::healthy().with_get_result(Ok(PathLookup::NotRegistered)));
        let aggregator = aggregator_with(mock, |_| {});

        let status = aggregator.get_status("abc123").await;

        assert_eq!(status.path_state, PathState::NotRegistered);
        assert!(status.hls_url.is_none());
        assert!(status.webrtc_url.is_none());
    }

    #[tokio::test]
    async fn test_unreachable_gateway_yields_unknown_state() {
        let mock = Arc::new(MockGateway::unreachable());
        let aggregator = aggregator_with(mock, |_| {});

        let status = aggregator.get_status("abc123").await;

        assert_eq!(status.path_state, PathState::Unknown);
        assert!(status.gateway_enabled);
        assert!(!status.gateway_reachable);
        assert!(status.detail.is_some());
    }

    #[tokio::test]
    async fn test_rejected_lookup_yields_error_with_status() {
        let mock =
            Arc::new(
                MockGateway::healthy().with_get_result(Err(GatewayError::Rejected {
                    status: 502,
                    body: "bad gateway".to_string(),
                })),
            );
        let aggregator = aggregator_with(mock, |_| {});

        let status = aggregator.get_status("abc123").await;

        assert_eq!(status.path_state, PathState::Error);
        assert_eq!(status.http_status, Some(502));
    }

    #[tokio::test]
    async fn test_malformed_payload_yields_unknown() {
        let mock = Arc::new(
            MockGateway::healthy()
                .with_get_result(Err(GatewayError::Malformed("not json".to_string()))),
        );
        let aggregator = aggregator_with(mock, |_| {});

        let status = aggregator.get_status("abc123").await;

        assert_eq!(status.path_state, PathState::Unknown);
        assert!(status
            .detail
            .as_deref()
            .is_some_and(|d| d.contains("unparsable")));
    }
}
