//! Streamgate configuration.
//!
//! Configuration is loaded once from environment variables at startup and
//! treated as immutable afterwards. Invalid values are the one class of
//! error that aborts the process; everything at runtime degrades gracefully.

use std::collections::HashMap;
use std::env;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Default HTTP bind address.
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";

/// Default gateway control API base URL.
pub const DEFAULT_GATEWAY_API_URL: &str = "http://localhost:9997";

/// Default gateway HLS base URL.
pub const DEFAULT_GATEWAY_HLS_URL: &str = "http://localhost:8888";

/// Default gateway WebRTC base URL.
pub const DEFAULT_GATEWAY_WEBRTC_URL: &str = "http://localhost:8889";

/// Default per-call gateway timeout in seconds.
pub const DEFAULT_GATEWAY_TIMEOUT_SECS: u64 = 5;

/// Default advisory retry budget for callers.
pub const DEFAULT_GATEWAY_RETRY_ATTEMPTS: u32 = 3;

/// Media gateway configuration.
///
/// Read-only after load; shared by every component that talks to or
/// builds URLs for the gateway.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Control API base URL (e.g. "http://localhost:9997").
    pub api_url: String,

    /// Whether the control API integration is enabled at all.
    pub api_enabled: bool,

    /// HLS base URL used to build manifest URLs.
    pub hls_url: String,

    /// Whether HLS serving is enabled.
    pub hls_enabled: bool,

    /// WebRTC base URL used to build secondary playback URLs.
    pub webrtc_url: String,

    /// Whether WebRTC playback URLs should be emitted.
    pub webrtc_enabled: bool,

    /// Per-call timeout for gateway requests (connect and total).
    pub timeout: Duration,

    /// Advisory retry budget. The coordinator never retries on its own;
    /// callers that want retries read this value.
    pub retry_attempts: u32,

    /// Register streams with the gateway when a camera is saved.
    pub auto_register: bool,

    /// Remove streams from the gateway when a camera is deleted.
    pub auto_unregister: bool,
}

impl GatewayConfig {
    /// Whether the gateway integration is usable at all.
    ///
    /// Both the control API and HLS serving must be enabled; a gateway we
    /// can configure but not play from is treated as disabled.
    pub fn enabled(&self) -> bool {
        self.api_enabled && self.hls_enabled
    }
}

/// Service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server bind address (default: "0.0.0.0:8080").
    pub bind_address: String,

    /// Media gateway configuration.
    pub gateway: GatewayConfig,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid URL in {var}: {reason}")]
    InvalidUrl { var: String, reason: String },

    #[error("Invalid boolean in {var}: got '{value}', expected true/false/1/0")]
    InvalidFlag { var: String, value: String },

    #[error("Invalid gateway timeout configuration: {0}")]
    InvalidTimeout(String),

    #[error("Invalid gateway retry configuration: {0}")]
    InvalidRetryAttempts(String),

    #[error("Failed to build gateway HTTP client: {0}")]
    HttpClient(String),
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let bind_address = vars
            .get("BIND_ADDRESS")
            .cloned()
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        let api_url = parse_base_url(vars, "GATEWAY_API_URL", DEFAULT_GATEWAY_API_URL)?;
        let hls_url = parse_base_url(vars, "GATEWAY_HLS_URL", DEFAULT_GATEWAY_HLS_URL)?;
        let webrtc_url = parse_base_url(vars, "GATEWAY_WEBRTC_URL", DEFAULT_GATEWAY_WEBRTC_URL)?;

        let api_enabled = parse_flag(vars, "GATEWAY_API_ENABLED", true)?;
        let hls_enabled = parse_flag(vars, "GATEWAY_HLS_ENABLED", true)?;
        // WebRTC playback is off by default.
        let webrtc_enabled = parse_flag(vars, "GATEWAY_WEBRTC_ENABLED", false)?;
        let auto_register = parse_flag(vars, "GATEWAY_AUTO_REGISTER", true)?;
        let auto_unregister = parse_flag(vars, "GATEWAY_AUTO_UNREGISTER", true)?;

        let timeout_secs = if let Some(value_str) = vars.get("GATEWAY_TIMEOUT_SECONDS") {
            let value: u64 = value_str.parse().map_err(|e| {
                ConfigError::InvalidTimeout(format!(
                    "GATEWAY_TIMEOUT_SECONDS must be a valid positive integer, got '{}': {}",
                    value_str, e
                ))
            })?;

            if value == 0 {
                return Err(ConfigError::InvalidTimeout(
                    "GATEWAY_TIMEOUT_SECONDS must be greater than 0".to_string(),
                ));
            }

            value
        } else {
            DEFAULT_GATEWAY_TIMEOUT_SECS
        };

        let retry_attempts = if let Some(value_str) = vars.get("GATEWAY_RETRY_ATTEMPTS") {
            value_str.parse().map_err(|e| {
                ConfigError::InvalidRetryAttempts(format!(
                    "GATEWAY_RETRY_ATTEMPTS must be a valid non-negative integer, got '{}': {}",
                    value_str, e
                ))
            })?
        } else {
            DEFAULT_GATEWAY_RETRY_ATTEMPTS
        };

        Ok(Config {
            bind_address,
            gateway: GatewayConfig {
                api_url,
                api_enabled,
                hls_url,
                hls_enabled,
                webrtc_url,
                webrtc_enabled,
                timeout: Duration::from_secs(timeout_secs),
                retry_attempts,
                auto_register,
                auto_unregister,
            },
        })
    }
}

/// Parse a base URL variable, validating that it can carry path segments.
fn parse_base_url(
    vars: &HashMap<String, String>,
    var: &str,
    default: &str,
) -> Result<String, ConfigError> {
    let raw = vars
        .get(var)
        .cloned()
        .unwrap_or_else(|| default.to_string());

    let parsed = Url::parse(&raw).map_err(|e| ConfigError::InvalidUrl {
        var: var.to_string(),
        reason: e.to_string(),
    })?;

    if parsed.cannot_be_a_base() {
        return Err(ConfigError::InvalidUrl {
            var: var.to_string(),
            reason: "URL cannot carry path segments".to_string(),
        });
    }

    // Keep the raw string; components re-parse as needed and a trailing
    // slash is normalized away by segment pushing.
    Ok(raw.trim_end_matches('/').to_string())
}

/// Parse a boolean flag variable accepting true/false/1/0.
fn parse_flag(
    vars: &HashMap<String, String>,
    var: &str,
    default: bool,
) -> Result<bool, ConfigError> {
    match vars.get(var) {
        None => Ok(default),
        Some(value) => match value.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Ok(true),
            "false" | "0" => Ok(false),
            _ => Err(ConfigError::InvalidFlag {
                var: var.to_string(),
                value: value.clone(),
            }),
        },
    }
}
