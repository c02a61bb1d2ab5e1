//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `KUNDESHOP_HOST` - Bind address (default: 127.0.0.1)
//! - `KUNDESHOP_PORT` - Listen port (default: 3000)
//!
//! Shopify credentials are loaded separately by the engine crate
//! (`kundeshop_engine::ShopifyConfig::from_env`).

use std::net::{IpAddr, SocketAddr};

use kundeshop_engine::ConfigError;

/// HTTP listener configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but unparseable.
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = get_env_or_default("KUNDESHOP_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("KUNDESHOP_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("KUNDESHOP_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("KUNDESHOP_PORT".to_string(), e.to_string()))?;

        Ok(Self { host, port })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
