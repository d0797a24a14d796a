//! Server configuration sourced from the environment.

use std::net::SocketAddr;

use crate::error::ServerError;

const DEFAULT_ADDR: &str = "0.0.0.0:8000";
const DEFAULT_PROVIDER_TIMEOUT_MS: u64 = 10_000;

/// Runtime configuration, read once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerConfig {
    /// Listen address
    pub addr: SocketAddr,
    /// Per-call timeout for upstream provider requests
    pub provider_timeout_ms: u64,
}

impl ServerConfig {
    /// Load configuration from `TICKERSNAP_*` environment variables,
    /// falling back to defaults for anything unset.
    pub fn from_env() -> Result<Self, ServerError> {
        let addr_raw =
            std::env::var("TICKERSNAP_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_owned());
        let addr = addr_raw
            .parse()
            .map_err(|_| ServerError::InvalidBindAddr { value: addr_raw })?;

        let provider_timeout_ms = match std::env::var("TICKERSNAP_PROVIDER_TIMEOUT_MS") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| ServerError::InvalidTimeout { value: raw })?,
            Err(_) => DEFAULT_PROVIDER_TIMEOUT_MS,
        };

        Ok(Self {
            addr,
            provider_timeout_ms,
        })
    }
}
