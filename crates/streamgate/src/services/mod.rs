//! Service layer for Streamgate.
//!
//! Everything that talks to the media gateway lives here.
//!
//! # Components
//!
//! - `gateway_client` - HTTP client for the gateway control API
//! - `prober` - gateway liveness with the enabled/disabled gate
//! - `registration` - register/update/unregister coordination
//! - `status` - per-stream playability aggregation
//! - `urls` - pure playback URL construction

pub mod gateway_client;
pub mod prober;
pub mod registration;
pub mod status;
pub mod urls;

pub use gateway_client::{GatewayApi, GatewayClient, PathLookup};
pub use prober::ConnectivityProber;
pub use registration::{RegistrationCoordinator, UpdatePolicy, DEFAULT_RELEASE_PAUSE};
pub use status::StatusAggregator;
pub use urls::UrlBuilder;
