//! Test server harness for E2E testing.
//!
//! Provides `TestServer` for spawning real Streamgate instances in tests,
//! pointed at whatever gateway URL the test supplies (usually a wiremock
//! server, sometimes a dead port for unreachable scenarios).

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use streamgate::config::Config;
use streamgate::routes::{self, AppState};
use streamgate::services::UpdatePolicy;
use tokio::task::JoinHandle;

/// Test harness for spawning the Streamgate server in E2E tests.
pub struct TestServer {
    addr: SocketAddr,
    state: Arc<AppState>,
    _handle: JoinHandle<()>,
}

impl TestServer {
    /// Spawn a test server talking to `gateway_url`, with defaults for
    /// everything else.
    pub async fn spawn(gateway_url: &str) -> Result<Self, anyhow::Error> {
        Self::spawn_with_vars(gateway_url, HashMap::new()).await
    }

    /// Spawn a test server with extra configuration overrides on top of
    /// the gateway URL.
    ///
    /// The server binds to a random port on 127.0.0.1 and serves in the
    /// background until dropped. The update release pause is zeroed so
    /// tests don't sleep.
    pub async fn spawn_with_vars(
        gateway_url: &str,
        overrides: HashMap<String, String>,
    ) -> Result<Self, anyhow::Error> {
        let mut vars = HashMap::from([
            ("BIND_ADDRESS".to_string(), "127.0.0.1:0".to_string()),
            ("GATEWAY_API_URL".to_string(), gateway_url.to_string()),
        ]);
        vars.extend(overrides);

        let config = Config::from_vars(&vars)
            .map_err(|e| anyhow::anyhow!("Failed to create config: {}", e))?;

        let state = AppState::with_policy(
            config,
            UpdatePolicy {
                release_pause: std::time::Duration::from_millis(0),
            },
        )
        .map_err(|e| anyhow::anyhow!("Failed to build app state: {}", e))?;

        let app = routes::build_routes(state.clone());

        // Bind to random port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind test server: {}", e))?;

        let addr = listener
            .local_addr()
            .map_err(|e| anyhow::anyhow!("Failed to get local address: {}", e))?;

        // Spawn server in background
        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                eprintln!("Test server error: {}", e);
            }
        });

        Ok(Self {
            addr,
            state,
            _handle: handle,
        })
    }

    /// Base URL of the test server.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Socket address the server is bound to.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Shared application state, for asserting on configuration.
    pub fn state(&self) -> &Arc<AppState> {
        &self.state
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        // Abort the background server task so the port is released as soon
        // as the test completes.
        self._handle.abort();
    }
}
