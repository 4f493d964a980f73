//! Stream registration coordination.
//!
//! Implements create/update/delete semantics for a stream's gateway
//! registration. Stateless: the gateway's control API is the sole holder
//! of path state, and the last write wins there. Concurrent mutations of
//! the same key from different callers are not serialized here; with a
//! single admin that scenario does not arise, and the race is covered by
//! an explicit test rather than a lock.
//!
//! The coordinator never retries a failed mutating call. The configured
//! retry budget is advisory for callers; the only built-in wait is the
//! release pause inside `update`.

use crate::config::GatewayConfig;
use crate::models::{RegistrationResult, SourceDescriptor};
use crate::services::gateway_client::GatewayApi;
use crate::services::prober::ConnectivityProber;
use crate::services::urls::UrlBuilder;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};

/// Default pause between releasing a path name and claiming it again.
///
/// Gives the gateway time to finish tearing down the old path's resources
/// before the new one reuses the name.
pub const DEFAULT_RELEASE_PAUSE: Duration = Duration::from_millis(100);

/// Tunable policy for the unregister-then-register update sequence.
#[derive(Debug, Clone, Copy)]
pub struct UpdatePolicy {
    /// Wait between the remove and the add step.
    pub release_pause: Duration,
}

impl Default for UpdatePolicy {
    fn default() -> Self {
        Self {
            release_pause: DEFAULT_RELEASE_PAUSE,
        }
    }
}

/// Coordinates a stream key's registration against the gateway.
#[derive(Clone)]
pub struct RegistrationCoordinator {
    config: Arc<GatewayConfig>,
    gateway: Arc<dyn GatewayApi>,
    prober: ConnectivityProber,
    urls: UrlBuilder,
    policy: UpdatePolicy,
}

impl RegistrationCoordinator {
    pub fn new(
        config: Arc<GatewayConfig>,
        gateway: Arc<dyn GatewayApi>,
        urls: UrlBuilder,
        policy: UpdatePolicy,
    ) -> Self {
        let prober = ConnectivityProber::new(config.clone(), gateway.clone());
        Self {
            config,
            gateway,
            prober,
            urls,
            policy,
        }
    }

    /// Register `key` to pull from `source`.
    ///
    /// Config gates are checked before any network traffic; an unreachable
    /// gateway is reported, not retried. Success carries the HLS playback
    /// URL for the new path.
    #[instrument(skip(self, source), fields(stream_key = %key), name = "streamgate.registration.register")]
    pub async fn register(&self, key: &str, source: &SourceDescriptor) -> RegistrationResult {
        if !self.config.enabled() {
            return RegistrationResult::disabled("Gateway integration is disabled");
        }
        if !self.config.auto_register {
            return RegistrationResult::disabled("Auto-registration is disabled");
        }

        if !self.prober.is_reachable().await {
            return RegistrationResult::unreachable("Gateway did not answer the liveness probe");
        }

        match self.gateway.add_path(key, source).await {
            Ok(()) => {
                info!(
                    target: "streamgate.registration",
                    stream_key = %key,
                    source = %source,
                    "Stream registered with gateway"
                );
                RegistrationResult::registered(self.urls.hls_manifest_url(key))
            }
            Err(e) => {
                warn!(
                    target: "streamgate.registration",
                    stream_key = %key,
                    error = %e,
                    "Stream registration failed"
                );
                RegistrationResult::from_gateway_error(&e)
            }
        }
    }

    /// Re-point `key` at a new source.
    ///
    /// Sequenced as unregister, release pause, register. Best effort, not
    /// transactional: the gateway offers no multi-step primitive, so a
    /// failed remove does not block the add (a missing old registration
    /// must not prevent establishing the new one). The add step's outcome
    /// is returned; a failed remove step rides along in
    /// `unregister_failure` instead of being swallowed.
    #[instrument(skip(self, source), fields(stream_key = %key), name = "streamgate.registration.update")]
    pub async fn update(&self, key: &str, source: &SourceDescriptor) -> RegistrationResult {
        let removal = self.unregister(key).await;
        if !removal.success {
            warn!(
                target: "streamgate.registration",
                stream_key = %key,
                reason = ?removal.reason,
                "Unregister step of update failed, attempting registration anyway"
            );
        }

        tokio::time::sleep(self.policy.release_pause).await;

        let mut result = self.register(key, source).await;
        if !removal.success {
            result.unregister_failure = Some(Box::new(removal));
        }
        result
    }

    /// Remove `key`'s registration. Idempotent: an already absent path is
    /// success, because the desired end state holds.
    #[instrument(skip(self), fields(stream_key = %key), name = "streamgate.registration.unregister")]
    pub async fn unregister(&self, key: &str) -> RegistrationResult {
        if !self.config.enabled() {
            return RegistrationResult::disabled("Gateway integration is disabled");
        }
        if !self.config.auto_unregister {
            return RegistrationResult::disabled("Auto-unregistration is disabled");
        }

        if !self.prober.is_reachable().await {
            return RegistrationResult::unreachable("Gateway did not answer the liveness probe");
        }

        match self.gateway.remove_path(key).await {
            Ok(()) => {
                info!(
                    target: "streamgate.registration",
                    stream_key = %key,
                    "Stream unregistered from gateway"
                );
                RegistrationResult::unregistered()
            }
            Err(e) => {
                warn!(
                    target: "streamgate.registration",
                    stream_key = %key,
                    error = %e,
                    "Stream unregistration failed"
                );
                RegistrationResult::from_gateway_error(&e)
            }
        }
    }
}
