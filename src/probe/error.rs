//! Error types for the readiness probe.

use thiserror::Error;

/// Caller-visible probe failures. Individual failed checks never surface.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProbeError {
    #[error("Emulator on port {port} not ready after {attempts} attempts")]
    Timeout { port: u16, attempts: u32 },

    #[error("Readiness wait for port {port} cancelled after {attempts} attempts")]
    Cancelled { port: u16, attempts: u32 },
}

impl ProbeError {
    /// Health checks issued before giving up.
    pub fn attempts(&self) -> u32 {
        match self {
            ProbeError::Timeout { attempts, .. } | ProbeError::Cancelled { attempts, .. } => {
                *attempts
            }
        }
    }
}
