//! Single-request health checks.

use std::time::Duration;

use async_trait::async_trait;

/// One bounded health check against a local port.
#[async_trait]
pub trait HealthCheck: Send + Sync {
    /// `true` only for a success response within `timeout`.
    ///
    /// Transport errors, error statuses and timeouts all map to `false`.
    async fn is_healthy(&self, port: u16, timeout: Duration) -> bool;
}

/// HTTP GET against `http://<host>:<port><path>`; any 2xx is healthy.
#[derive(Debug, Clone)]
pub struct HttpHealthCheck {
    client: reqwest::Client,
    host: String,
    path: String,
}

impl HttpHealthCheck {
    pub fn new(host: impl Into<String>, path: impl Into<String>) -> Self {
        let path = path.into();
        let path = if path.starts_with('/') {
            path
        } else {
            format!("/{path}")
        };

        Self {
            client: reqwest::Client::new(),
            host: host.into(),
            path,
        }
    }

    pub fn url(&self, port: u16) -> String {
        format!("http://{}:{port}{}", self.host, self.path)
    }
}

#[async_trait]
impl HealthCheck for HttpHealthCheck {
    async fn is_healthy(&self, port: u16, timeout: Duration) -> bool {
        let url = self.url(port);
        match self.client.get(&url).timeout(timeout).send().await {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                crate::debug_event!("probe", "unhealthy", "{url} -> {}", response.status());
                false
            }
            Err(e) => {
                crate::debug_event!("probe", "unreachable", "{url}: {e}");
                false
            }
        }
    }
}
