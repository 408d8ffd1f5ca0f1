//! Server configuration types
//!
//! Defines the configuration structures for the Argyle gateway.

use crate::error::ArgyleError;
use serde::{Deserialize, Serialize};

/// Default bind host
fn default_bind_host() -> String {
    "127.0.0.1".to_string()
}

/// Default bind port
fn default_bind_port() -> u16 {
    8080
}

/// Default cap on bytes read from a client while its dial is outstanding
fn default_max_pending_bytes() -> usize {
    64 * 1024
}

/// Default per-read buffer reservation
fn default_read_buffer_size() -> usize {
    4096
}

/// Root configuration structure
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// Listener configuration
    #[serde(default)]
    pub server: ServerConfig,
}

/// Listener and session configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Host to bind the SOCKS5 listener on
    #[serde(default = "default_bind_host")]
    pub bind_host: String,

    /// Port to bind the SOCKS5 listener on
    #[serde(default = "default_bind_port")]
    pub bind_port: u16,

    /// Enable debug output
    #[serde(default)]
    pub debug: bool,

    /// Bytes buffered from a client while dialing before reads pause
    #[serde(default = "default_max_pending_bytes")]
    pub max_pending_bytes: usize,

    /// Buffer space reserved for each client read
    #[serde(default = "default_read_buffer_size")]
    pub read_buffer_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_host: default_bind_host(),
            bind_port: default_bind_port(),
            debug: false,
            max_pending_bytes: default_max_pending_bytes(),
            read_buffer_size: default_read_buffer_size(),
        }
    }
}

impl ServerConfig {
    /// `host:port` string for binding
    pub fn bind_addr(&self) -> String {
        if self.bind_host.contains(':') && !self.bind_host.starts_with('[') {
            format!("[{}]:{}", self.bind_host, self.bind_port)
        } else {
            format!("{}:{}", self.bind_host, self.bind_port)
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ArgyleError> {
        if self.bind_host.trim().is_empty() {
            return Err(ArgyleError::Config("bind_host must not be empty".into()));
        }
        if self.max_pending_bytes == 0 {
            return Err(ArgyleError::Config(
                "max_pending_bytes must be greater than zero".into(),
            ));
        }
        if self.read_buffer_size == 0 {
            return Err(ArgyleError::Config(
                "read_buffer_size must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}
