//! HTTP request handlers.

mod gateway;
mod health;
mod streams;

pub use gateway::gateway_status;
pub use health::health_check;
pub use streams::{register_stream, stream_status, unregister_stream, update_stream};
