//! Test server management.
//!
//! Runs a `ControlServer` in-process for integration testing.

use modbot::control::{BotInfo, ControlServer};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// A started control server plus an HTTP client pointed at it.
pub struct TestServer {
    server: ControlServer,
    base: String,
    pub http: reqwest::Client,
}

#[allow(dead_code)]
impl TestServer {
    /// Start a control server for `info` on an ephemeral port.
    pub async fn spawn(info: Arc<dyn BotInfo>) -> anyhow::Result<Self> {
        let server = ControlServer::new(0, info);
        let addr = server.start().await?;
        Ok(Self {
            server,
            base: format!("http://{addr}"),
            http: reqwest::Client::builder()
                .timeout(Duration::from_secs(5))
                .build()?,
        })
    }

    /// Base URL without a trailing slash.
    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    pub fn control(&self) -> &ControlServer {
        &self.server
    }

    /// Stop the server, allowing one second to drain.
    pub async fn shutdown(self) -> anyhow::Result<()> {
        self.server
            .stop(Instant::now() + Duration::from_secs(1))
            .await?;
        Ok(())
    }
}
