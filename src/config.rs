//! Configuration for redwire connections
//!
//! Centralized configuration with sensible defaults.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::protocol::ParseLimits;

/// Main configuration for a single connection
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Endpoint Configuration
    // -------------------------------------------------------------------------
    /// Where to connect
    pub endpoint: Endpoint,

    // -------------------------------------------------------------------------
    // Timeout Configuration
    // -------------------------------------------------------------------------
    /// Connect timeout (milliseconds, 0 = block until the OS gives up)
    pub connect_timeout_ms: u64,

    /// Read timeout (milliseconds, 0 = none)
    pub read_timeout_ms: u64,

    /// Write timeout (milliseconds, 0 = none)
    pub write_timeout_ms: u64,

    // -------------------------------------------------------------------------
    // Socket Configuration
    // -------------------------------------------------------------------------
    /// Enable SO_KEEPALIVE right after connecting (TCP only)
    pub keepalive: bool,

    // -------------------------------------------------------------------------
    // Parser Configuration
    // -------------------------------------------------------------------------
    /// Limits applied to every reply read from the server
    pub parse_limits: ParseLimits,
}

/// Server address
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// TCP host and port
    Tcp { host: String, port: u16 },

    /// Unix domain socket path
    Unix(PathBuf),
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Tcp { host, port } => write!(f, "{}:{}", host, port),
            Endpoint::Unix(path) => write!(f, "unix:{}", path.display()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: Endpoint::Tcp {
                host: "127.0.0.1".to_string(),
                port: 6379,
            },
            connect_timeout_ms: 1000,
            read_timeout_ms: 5000,
            write_timeout_ms: 5000,
            keepalive: false,
            parse_limits: ParseLimits::default(),
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Convert a millisecond setting to the form socket setters expect
    pub(crate) fn duration(ms: u64) -> Option<Duration> {
        if ms > 0 {
            Some(Duration::from_millis(ms))
        } else {
            None
        }
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Connect over TCP
    pub fn tcp(mut self, host: impl Into<String>, port: u16) -> Self {
        self.config.endpoint = Endpoint::Tcp {
            host: host.into(),
            port,
        };
        self
    }

    /// Connect over a unix domain socket
    pub fn unix(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.endpoint = Endpoint::Unix(path.into());
        self
    }

    /// Set the connect timeout (in milliseconds)
    pub fn connect_timeout_ms(mut self, ms: u64) -> Self {
        self.config.connect_timeout_ms = ms;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    /// Enable TCP keepalive on connect
    pub fn keepalive(mut self, enabled: bool) -> Self {
        self.config.keepalive = enabled;
        self
    }

    /// Set the reply parser limits
    pub fn parse_limits(mut self, limits: ParseLimits) -> Self {
        self.config.parse_limits = limits;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
