//! Probe command - wait for the emulator health endpoint.

use anyhow::Context;
use tokio_util::sync::CancellationToken;

use crate::config::ProbeConfig;
use crate::probe::ReadinessProbe;

/// Arguments for the probe command.
pub struct ProbeArgs {
    pub port: Option<u16>,
    pub attempts: Option<u32>,
    pub delay_ms: Option<u64>,
}

impl ProbeArgs {
    /// Apply CLI overrides on top of the configured probe settings.
    pub fn apply(&self, config: &ProbeConfig) -> ProbeConfig {
        let mut config = config.clone();
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(attempts) = self.attempts {
            config.max_attempts = attempts;
        }
        if let Some(delay_ms) = self.delay_ms {
            config.retry_delay_ms = delay_ms;
        }
        config
    }
}

/// Run the readiness probe, failing when the emulator never becomes healthy.
pub async fn run(config: &ProbeConfig, cancel: &CancellationToken) -> anyhow::Result<()> {
    let probe = ReadinessProbe::from_config(config);
    eprintln!(
        "Waiting for emulator on {}:{} (up to {} attempts)...",
        config.host, config.port, config.max_attempts
    );

    let attempts = probe
        .wait_for_ready(config.port, cancel)
        .await
        .context("emulator did not become ready")?;

    eprintln!("Emulator ready after {attempts} attempt(s)");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_applied() {
        let args = ProbeArgs {
            port: Some(9999),
            attempts: None,
            delay_ms: Some(10),
        };
        let config = args.apply(&ProbeConfig::default());
        assert_eq!(config.port, 9999);
        assert_eq!(config.max_attempts, 30);
        assert_eq!(config.retry_delay_ms, 10);
    }
}
