//! Gateway error taxonomy.
//!
//! Every failure mode of the gateway control API is a structured variant.
//! Errors stop at the service layer: coordinator and aggregator translate
//! them into `RegistrationResult`/`StreamStatus` fields, so nothing here
//! ever crosses a handler boundary as a raw error.

use thiserror::Error;

/// Failure talking to the media gateway control API.
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    /// Network failure or timeout; the gateway never answered.
    #[error("gateway unreachable: {0}")]
    Unreachable(String),

    /// The gateway answered with a non-success status code.
    #[error("gateway rejected request with status {status}")]
    Rejected {
        /// HTTP status code returned by the gateway.
        status: u16,
        /// Response body, for operator-facing messages.
        body: String,
    },

    /// The gateway answered 2xx with a body that could not be parsed.
    #[error("gateway returned an unparsable body: {0}")]
    Malformed(String),
}

impl GatewayError {
    /// HTTP status carried by this error, if the gateway produced one.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            GatewayError::Rejected { status, .. } => Some(*status),
            GatewayError::Unreachable(_) | GatewayError::Malformed(_) => None,
        }
    }
}
