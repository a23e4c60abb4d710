//! Configuration for Keyrack
//!
//! Centralized configuration with sensible defaults.

use crate::error::{KeyrackError, Result};
use crate::protocol::MAX_FRAME_SIZE;

/// Main configuration for a Keyrack server
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// TCP listen address
    pub listen_addr: String,

    /// Max concurrent sessions; connections beyond this are closed on accept
    pub max_sessions: usize,

    /// Idle timeout while waiting for the next request (milliseconds, 0 = none)
    pub idle_timeout_ms: u64,

    /// Connection write timeout (milliseconds, 0 = none)
    pub write_timeout_ms: u64,

    // -------------------------------------------------------------------------
    // Protocol Configuration
    // -------------------------------------------------------------------------
    /// Largest accepted frame (kind byte + body), in bytes
    pub max_frame_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:8765".to_string(),
            max_sessions: 1024,
            idle_timeout_ms: 0,
            write_timeout_ms: 5000,
            max_frame_size: MAX_FRAME_SIZE,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Check that the values can actually be served
    pub fn validate(&self) -> Result<()> {
        if self.listen_addr.is_empty() {
            return Err(KeyrackError::Config("listen address is empty".to_string()));
        }
        if self.max_sessions == 0 {
            return Err(KeyrackError::Config(
                "max_sessions must be at least 1".to_string(),
            ));
        }
        if self.max_frame_size < 2 || self.max_frame_size > MAX_FRAME_SIZE {
            return Err(KeyrackError::Config(format!(
                "max_frame_size must be between 2 and {} bytes, got {}",
                MAX_FRAME_SIZE, self.max_frame_size
            )));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the TCP listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Set the maximum number of concurrent sessions
    pub fn max_sessions(mut self, count: usize) -> Self {
        self.config.max_sessions = count;
        self
    }

    /// Set the idle timeout (in milliseconds)
    pub fn idle_timeout_ms(mut self, ms: u64) -> Self {
        self.config.idle_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    /// Set the maximum frame size (in bytes)
    pub fn max_frame_size(mut self, bytes: usize) -> Self {
        self.config.max_frame_size = bytes;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
