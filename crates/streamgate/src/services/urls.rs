//! Playback URL construction.
//!
//! Pure string work, no I/O. Stream keys are hex today and would survive
//! naive concatenation, but they are pushed as percent-encoded path
//! segments anyway so a future key format cannot produce a malformed URL.

use crate::config::{ConfigError, GatewayConfig};
use url::Url;

/// Manifest file name the gateway serves under each path.
const HLS_MANIFEST_FILE: &str = "index.m3u8";

/// Builds playback URLs for a stream key.
#[derive(Debug, Clone)]
pub struct UrlBuilder {
    hls_base: Url,
    webrtc_base: Option<Url>,
}

impl UrlBuilder {
    /// Validate the playback base URLs from configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidUrl` for a base URL that cannot carry
    /// path segments. Startup-fatal.
    pub fn from_config(config: &GatewayConfig) -> Result<Self, ConfigError> {
        let hls_base = parse_base(&config.hls_url, "GATEWAY_HLS_URL")?;
        let webrtc_base = if config.webrtc_enabled {
            Some(parse_base(&config.webrtc_url, "GATEWAY_WEBRTC_URL")?)
        } else {
            None
        };

        Ok(Self {
            hls_base,
            webrtc_base,
        })
    }

    /// Browser-fetchable HLS manifest URL: `{hls_base}/{key}/index.m3u8`.
    pub fn hls_manifest_url(&self, key: &str) -> String {
        let mut url = self.hls_base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty();
            path.push(key);
            path.push(HLS_MANIFEST_FILE);
        }
        url.to_string()
    }

    /// WebRTC playback URL: `{webrtc_base}/{key}`. `None` when WebRTC
    /// playback is disabled.
    pub fn webrtc_url(&self, key: &str) -> Option<String> {
        let base = self.webrtc_base.as_ref()?;
        let mut url = base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty();
            path.push(key);
        }
        Some(url.to_string())
    }
}

fn parse_base(raw: &str, var: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::InvalidUrl {
        var: var.to_string(),
        reason: e.to_string(),
    })?;

    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidUrl {
            var: var.to_string(),
            reason: "URL cannot carry path segments".to_string(),
        });
    }

    Ok(url)
}
