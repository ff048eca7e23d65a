use anyhow::{Context, Result};
use std::env;

pub const DEFAULT_LONG_POLL_TIMEOUT_MS: u64 = 30_000;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// TCP port to bind the HTTP server to.
    pub port: u16,

    /// Cadence of the disconnect reaper, in seconds.
    pub reap_interval_secs: u64,

    /// Long-poll wait when the client supplies no timeout.
    pub long_poll_timeout_ms: u64,

    /// Per-subscriber event bus buffer depth.
    pub event_buffer_size: usize,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        let port = match env::var("PORT") {
            Ok(value) => value.parse().context("invalid PORT")?,
            Err(_) => 8080,
        };

        let reap_interval_secs = env::var("REAP_INTERVAL_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5);

        let long_poll_timeout_ms = env::var("LONG_POLL_TIMEOUT_MS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_LONG_POLL_TIMEOUT_MS);

        let event_buffer_size = env::var("EVENT_BUFFER_SIZE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(crate::event_bus::DEFAULT_EVENT_BUFFER);

        Ok(Self {
            port,
            reap_interval_secs,
            long_poll_timeout_ms,
            event_buffer_size,
        })
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            reap_interval_secs: 5,
            long_poll_timeout_ms: DEFAULT_LONG_POLL_TIMEOUT_MS,
            event_buffer_size: crate::event_bus::DEFAULT_EVENT_BUFFER,
        }
    }
}
