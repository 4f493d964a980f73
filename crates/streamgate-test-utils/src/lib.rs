//! # Streamgate Test Utilities
//!
//! Shared test utilities for the Streamgate service.
//!
//! This crate provides:
//! - Server test harness (`TestServer` for E2E tests)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use streamgate_test_utils::TestServer;
//! use wiremock::MockServer;
//!
//! #[tokio::test]
//! async fn test_example() -> Result<(), anyhow::Error> {
//!     let gateway = MockServer::start().await;
//!     let server = TestServer::spawn(&gateway.uri()).await?;
//!
//!     let response = reqwest::get(format!("{}/v1/health", server.url())).await?;
//!     assert_eq!(response.status(), 200);
//!     Ok(())
//! }
//! ```

pub mod server_harness;

// Re-export commonly used items
pub use server_harness::*;
