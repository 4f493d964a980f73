//! Media gateway control API client.
//!
//! Speaks the gateway's HTTP configuration API: liveness probe, path
//! add/remove, and single-path lookup. One shared `reqwest::Client` is
//! built at startup from `GatewayConfig` and enforces both a connect
//! timeout and a total per-call timeout, so an unresponsive gateway can
//! never hang a request handler.
//!
//! # Response-code contract
//!
//! - probe: reachable iff 2xx; every other outcome collapses to "no"
//! - add: 2xx success, anything else `Rejected` with the code
//! - remove: 2xx or 404 success (the desired end state already holds)
//! - get: 200 registered, 404 not registered, anything else `Rejected`

use crate::config::{ConfigError, GatewayConfig};
use crate::errors::GatewayError;
use crate::models::SourceDescriptor;
use serde::Serialize;
use tracing::{debug, instrument, warn};
use url::Url;

/// On-demand startup window passed to the gateway for new paths.
const ON_DEMAND_START_TIMEOUT: &str = "10s";

/// Idle window after the last viewer detaches before teardown.
const ON_DEMAND_CLOSE_AFTER: &str = "10s";

/// Body of a path-add request.
///
/// `source_on_demand` keeps the gateway from pulling the camera
/// continuously; the upstream connection is only opened while a viewer
/// is attached.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddPathRequest {
    pub source: String,
    pub source_protocol: String,
    pub source_on_demand: bool,
    pub run_on_demand: String,
    pub run_on_demand_restart: bool,
    pub run_on_demand_start_timeout: String,
    pub run_on_demand_close_after: String,
}

impl AddPathRequest {
    fn for_source(source: &SourceDescriptor) -> Self {
        Self {
            source: source.as_str().to_string(),
            source_protocol: "automatic".to_string(),
            source_on_demand: true,
            run_on_demand: String::new(),
            run_on_demand_restart: false,
            run_on_demand_start_timeout: ON_DEMAND_START_TIMEOUT.to_string(),
            run_on_demand_close_after: ON_DEMAND_CLOSE_AFTER.to_string(),
        }
    }
}

/// Result of a single-path lookup.
#[derive(Debug, Clone)]
pub enum PathLookup {
    /// Path exists; the gateway's state payload is attached.
    Registered(serde_json::Value),
    /// Gateway answered 404 for the path. Not an error.
    NotRegistered,
}

/// Gateway control operations (enables mocking).
#[async_trait::async_trait]
pub trait GatewayApi: Send + Sync {
    /// Lightweight read against the global-config endpoint.
    /// Any network error, timeout, or non-2xx collapses to `false`.
    async fn probe_liveness(&self) -> bool;

    /// Create a path named `key` pulling from `source`, on demand.
    async fn add_path(&self, key: &str, source: &SourceDescriptor) -> Result<(), GatewayError>;

    /// Delete path `key`. Idempotent: 404 is success.
    async fn remove_path(&self, key: &str) -> Result<(), GatewayError>;

    /// Fetch the current state of path `key`.
    async fn get_path(&self, key: &str) -> Result<PathLookup, GatewayError>;
}

/// HTTP client for the gateway control API.
#[derive(Debug, Clone)]
pub struct GatewayClient {
    client: reqwest::Client,
    api_base: Url,
}

impl GatewayClient {
    /// Build the shared client from configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the control API URL cannot carry path
    /// segments or the HTTP client cannot be constructed. Both are
    /// startup-fatal configuration problems.
    pub fn new(config: &GatewayConfig) -> Result<Self, ConfigError> {
        let api_base = Url::parse(&config.api_url).map_err(|e| ConfigError::InvalidUrl {
            var: "GATEWAY_API_URL".to_string(),
            reason: e.to_string(),
        })?;

        if api_base.cannot_be_a_base() {
            return Err(ConfigError::InvalidUrl {
                var: "GATEWAY_API_URL".to_string(),
                reason: "URL cannot carry path segments".to_string(),
            });
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.timeout)
            .build()
            .map_err(|e| {
                warn!(target: "streamgate.gateway", error = %e, "Failed to build gateway HTTP client");
                ConfigError::HttpClient(e.to_string())
            })?;

        Ok(Self { client, api_base })
    }

    /// Append percent-encoded segments to the control API base URL.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.api_base.clone();
        // Cannot fail: the base was validated in new().
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty();
            for segment in segments {
                path.push(segment);
            }
        }
        url
    }
}

#[async_trait::async_trait]
impl GatewayApi for GatewayClient {
    #[instrument(skip(self), name = "streamgate.gateway.probe")]
    async fn probe_liveness(&self) -> bool {
        let url = self.endpoint(&["v3", "config", "global", "get"]);

        match self.client.get(url).send().await {
            Ok(response) => {
                let reachable = response.status().is_success();
                if !reachable {
                    debug!(
                        target: "streamgate.gateway",
                        status = %response.status(),
                        "Liveness probe returned non-success status"
                    );
                }
                reachable
            }
            Err(e) => {
                debug!(target: "streamgate.gateway", error = %e, "Liveness probe failed");
                false
            }
        }
    }

    #[instrument(skip(self, source), fields(stream_key = %key), name = "streamgate.gateway.add_path")]
    async fn add_path(&self, key: &str, source: &SourceDescriptor) -> Result<(), GatewayError> {
        let url = self.endpoint(&["v3", "config", "paths", "add", key]);
        let body = AddPathRequest::for_source(source);

        let response = self
            .client
            .post(url)
            .header("Accept", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                warn!(target: "streamgate.gateway", error = %e, stream_key = %key, "Path add request failed");
                GatewayError::Unreachable(e.to_string())
            })?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            warn!(
                target: "streamgate.gateway",
                status = %status,
                stream_key = %key,
                "Gateway rejected path add"
            );
            Err(GatewayError::Rejected {
                status: status.as_u16(),
                body,
            })
        }
    }

    #[instrument(skip(self), fields(stream_key = %key), name = "streamgate.gateway.remove_path")]
    async fn remove_path(&self, key: &str) -> Result<(), GatewayError> {
        let url = self.endpoint(&["v3", "config", "paths", "remove", key]);

        let response = self
            .client
            .post(url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| {
                warn!(target: "streamgate.gateway", error = %e, stream_key = %key, "Path remove request failed");
                GatewayError::Unreachable(e.to_string())
            })?;

        let status = response.status();
        // 404 means the path is already absent, which is the desired
        // end state of a remove.
        if status.is_success() || status.as_u16() == 404 {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            warn!(
                target: "streamgate.gateway",
                status = %status,
                stream_key = %key,
                "Gateway rejected path remove"
            );
            Err(GatewayError::Rejected {
                status: status.as_u16(),
                body,
            })
        }
    }

    #[instrument(skip(self), fields(stream_key = %key), name = "streamgate.gateway.get_path")]
    async fn get_path(&self, key: &str) -> Result<PathLookup, GatewayError> {
        let url = self.endpoint(&["v3", "paths", "get", key]);

        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| {
                debug!(target: "streamgate.gateway", error = %e, stream_key = %key, "Path lookup failed");
                GatewayError::Unreachable(e.to_string())
            })?;

        let status = response.status();
        if status.is_success() {
            let payload = response
                .json::<serde_json::Value>()
                .await
                .map_err(|e| GatewayError::Malformed(e.to_string()))?;
            Ok(PathLookup::Registered(payload))
        } else if status.as_u16() == 404 {
            Ok(PathLookup::NotRegistered)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(GatewayError::Rejected {
                status: status.as_u16(),
                body,
            })
        }
    }
}

/// Mock gateway module for testing.
///
/// Scripted in-memory implementation of [`GatewayApi`] with per-operation
/// call counters, so tests can assert that configuration gates short-circuit
/// before any network call would happen.
pub mod mock {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Scripted mock gateway.
    pub struct MockGateway {
        live: bool,
        add_result: Mutex<Result<(), GatewayError>>,
        remove_result: Mutex<Result<(), GatewayError>>,
        get_result: Mutex<Result<PathLookup, GatewayError>>,
        probe_calls: AtomicUsize,
        add_calls: AtomicUsize,
        remove_calls: AtomicUsize,
        get_calls: AtomicUsize,
    }

    impl MockGateway {
        /// A live gateway that accepts everything and reports the path
        /// as registered.
        pub fn healthy() -> Self {
            Self {
                live: true,
                add_result: Mutex::new(Ok(())),
                remove_result: Mutex::new(Ok(())),
                get_result: Mutex::new(Ok(PathLookup::Registered(serde_json::json!({
                    "ready": true
                })))),
                probe_calls: AtomicUsize::new(0),
                add_calls: AtomicUsize::new(0),
                remove_calls: AtomicUsize::new(0),
                get_calls: AtomicUsize::new(0),
            }
        }

        /// A gateway that fails every operation with a connection error.
        pub fn unreachable() -> Self {
            let err = || GatewayError::Unreachable("connection refused".to_string());
            Self {
                live: false,
                add_result: Mutex::new(Err(err())),
                remove_result: Mutex::new(Err(err())),
                get_result: Mutex::new(Err(err())),
                probe_calls: AtomicUsize::new(0),
                add_calls: AtomicUsize::new(0),
                remove_calls: AtomicUsize::new(0),
                get_calls: AtomicUsize::new(0),
            }
        }

        /// Override the add-path outcome.
        pub fn with_add_result(self, result: Result<(), GatewayError>) -> Self {
            if let Ok(mut slot) = self.add_result.lock() {
                *slot = result;
            }
            self
        }

        /// Override the remove-path outcome.
        pub fn with_remove_result(self, result: Result<(), GatewayError>) -> Self {
            if let Ok(mut slot) = self.remove_result.lock() {
                *slot = result;
            }
            self
        }

        /// Override the path-lookup outcome.
        pub fn with_get_result(self, result: Result<PathLookup, GatewayError>) -> Self {
            if let Ok(mut slot) = self.get_result.lock() {
                *slot = result;
            }
            self
        }

        pub fn probe_calls(&self) -> usize {
            self.probe_calls.load(Ordering::SeqCst)
        }

        pub fn add_calls(&self) -> usize {
            self.add_calls.load(Ordering::SeqCst)
        }

        pub fn remove_calls(&self) -> usize {
            self.remove_calls.load(Ordering::SeqCst)
        }

        pub fn get_calls(&self) -> usize {
            self.get_calls.load(Ordering::SeqCst)
        }

        /// Total calls of any kind, for "no network call happened" checks.
        pub fn total_calls(&self) -> usize {
            self.probe_calls() + self.add_calls() + self.remove_calls() + self.get_calls()
        }

        fn cloned_add(&self) -> Result<(), GatewayError> {
            match self.add_result.lock() {
                Ok(slot) => slot.clone(),
                Err(_) => Err(GatewayError::Unreachable("mock poisoned".to_string())),
            }
        }

        fn cloned_remove(&self) -> Result<(), GatewayError> {
            match self.remove_result.lock() {
                Ok(slot) => slot.clone(),
                Err(_) => Err(GatewayError::Unreachable("mock poisoned".to_string())),
            }
        }

        fn cloned_get(&self) -> Result<PathLookup, GatewayError> {
            match self.get_result.lock() {
                Ok(slot) => slot.clone(),
                Err(_) => Err(GatewayError::Unreachable("mock poisoned".to_string())),
            }
        }
    }

    #[async_trait::async_trait]
    impl GatewayApi for MockGateway {
        async fn probe_liveness(&self) -> bool {
            self.probe_calls.fetch_add(1, Ordering::SeqCst);
            self.live
        }

        async fn add_path(
            &self,
            _key: &str,
            _source: &SourceDescriptor,
        ) -> Result<(), GatewayError> {
            self.add_calls.fetch_add(1, Ordering::SeqCst);
            self.cloned_add()
        }

        async fn remove_path(&self, _key: &str) -> Result<(), GatewayError> {
            self.remove_calls.fetch_add(1, Ordering::SeqCst);
            self.cloned_remove()
        }

        async fn get_path(&self, _key: &str) -> Result<PathLookup, GatewayError> {
            self.get_calls.fetch_add(1, Ordering::SeqCst);
            self.cloned_get()
        }
    }

}
