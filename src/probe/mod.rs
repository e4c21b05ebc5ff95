//! Readiness probe for the emulated backend.
//!
//! Polls a health endpoint with bounded retries before the watcher starts or
//! before a reload is attempted. Individual failed checks are swallowed;
//! only running out of attempts (or being cancelled) reaches the caller.

mod error;
mod health;

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::config::ProbeConfig;

pub use error::ProbeError;
pub use health::{HealthCheck, HttpHealthCheck};

/// Retry policy for [`ReadinessProbe::wait_for_ready`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeOptions {
    pub max_attempts: u32,
    pub retry_delay: Duration,
    /// Timeout of each individual health check.
    pub attempt_timeout: Duration,
}

impl Default for ProbeOptions {
    fn default() -> Self {
        Self {
            max_attempts: 30,
            retry_delay: Duration::from_millis(2000),
            attempt_timeout: Duration::from_millis(5000),
        }
    }
}

impl From<&ProbeConfig> for ProbeOptions {
    fn from(config: &ProbeConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            retry_delay: Duration::from_millis(config.retry_delay_ms),
            attempt_timeout: Duration::from_millis(config.timeout_ms),
        }
    }
}

/// Bounded retry-with-delay health polling.
#[derive(Debug, Clone)]
pub struct ReadinessProbe<C> {
    check: C,
    options: ProbeOptions,
}

impl ReadinessProbe<HttpHealthCheck> {
    /// HTTP probe configured from settings.
    pub fn from_config(config: &ProbeConfig) -> Self {
        Self::new(
            HttpHealthCheck::new(config.host.clone(), config.health_path.clone()),
            ProbeOptions::from(config),
        )
    }
}

impl<C: HealthCheck> ReadinessProbe<C> {
    pub fn new(check: C, options: ProbeOptions) -> Self {
        Self { check, options }
    }

    /// One check with the configured per-attempt timeout.
    pub async fn is_healthy(&self, port: u16) -> bool {
        self.check
            .is_healthy(port, self.options.attempt_timeout)
            .await
    }

    /// Poll until healthy. Returns the number of checks it took.
    ///
    /// Returns immediately on the first healthy check. `cancel` is honoured
    /// during a check and during the delay between checks.
    pub async fn wait_for_ready(
        &self,
        port: u16,
        cancel: &CancellationToken,
    ) -> Result<u32, ProbeError> {
        let max_attempts = self.options.max_attempts;

        for attempt in 1..=max_attempts {
            if cancel.is_cancelled() {
                return Err(ProbeError::Cancelled {
                    port,
                    attempts: attempt - 1,
                });
            }

            let healthy = tokio::select! {
                healthy = self.is_healthy(port) => healthy,
                _ = cancel.cancelled() => {
                    return Err(ProbeError::Cancelled { port, attempts: attempt });
                }
            };

            if healthy {
                crate::log_event!("probe", "ready", "port {port} after {attempt} attempts");
                return Ok(attempt);
            }

            crate::debug_event!("probe", "not ready", "attempt {attempt}/{max_attempts}");

            if attempt < max_attempts {
                tokio::select! {
                    _ = tokio::time::sleep(self.options.retry_delay) => {}
                    _ = cancel.cancelled() => {
                        return Err(ProbeError::Cancelled { port, attempts: attempt });
                    }
                }
            }
        }

        tracing::warn!("[probe] port {port} not ready after {max_attempts} attempts");
        Err(ProbeError::Timeout {
            port,
            attempts: max_attempts,
        })
    }
}
