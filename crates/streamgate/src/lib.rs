//! Streamgate - stream registration orchestrator.
//!
//! Keeps a camera record's "this source should be playable" intent in sync
//! with an external media gateway that ingests RTSP and re-exposes it as
//! HLS (and optionally WebRTC). Stateless: the gateway holds all path
//! state; every operation here is a single request/response coordination
//! pass with typed outcomes.
//!
//! # Architecture
//!
//! ```text
//! routes/mod.rs -> handlers/*.rs -> services/*.rs -> gateway control API
//! ```
//!
//! # Modules
//!
//! - `config` - env-driven configuration, loaded once at startup
//! - `errors` - gateway failure taxonomy
//! - `handlers` - HTTP request handlers
//! - `models` - ephemeral request/response values
//! - `routes` - Axum router and state wiring
//! - `services` - gateway client, prober, coordinator, aggregator, URLs

pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
