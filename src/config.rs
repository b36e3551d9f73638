//! Server configuration module
//! Handles dynamic configuration parameters for the coordination server

use crate::constants::{DEFAULT_HOST, DEFAULT_PORT, DEFAULT_TYPING_WINDOW_MS};
use crate::error::{Result, SketchRelayError};
use std::env;
use std::time::Duration;

/// Server configuration parameters
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Window after which the server emits `stop-typing` on a client's behalf
    pub typing_window: Duration,
}

impl ServerConfig {
    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Result<Self> {
        let host = env::var("SKETCH_RELAY_HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());

        let port = match env::var("SKETCH_RELAY_PORT") {
            Ok(value) => value.parse::<u16>().map_err(|e| {
                SketchRelayError::ConfigError(format!("Invalid port '{}': {}", value, e))
            })?,
            Err(_) => DEFAULT_PORT,
        };

        let typing_window_ms = match env::var("SKETCH_RELAY_TYPING_WINDOW_MS") {
            Ok(value) => value.parse::<u64>().map_err(|e| {
                SketchRelayError::ConfigError(format!("Invalid typing window '{}': {}", value, e))
            })?,
            Err(_) => DEFAULT_TYPING_WINDOW_MS,
        };

        Ok(Self {
            host,
            port,
            typing_window: Duration::from_millis(typing_window_ms),
        })
    }

    /// Create a test configuration
    #[cfg(test)]
    pub fn for_testing() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            typing_window: Duration::from_millis(50),
        }
    }
}
