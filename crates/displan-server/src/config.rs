//! Server configuration from environment variables.

use std::net::{AddrParseError, SocketAddr};
use std::path::PathBuf;
use thiserror::Error;

/// Listen address when `DISPLAN_ADDR` is unset.
pub const DEFAULT_ADDR: &str = "0.0.0.0:3030";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid DISPLAN_ADDR {value:?}: {source}")]
    InvalidAddr {
        value: String,
        #[source]
        source: AddrParseError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    /// Directory for the file store. Memory storage when unset.
    pub data_dir: Option<PathBuf>,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let value = lookup("DISPLAN_ADDR").unwrap_or_else(|| DEFAULT_ADDR.to_string());
        let addr = value
            .parse()
            .map_err(|source| ConfigError::InvalidAddr { value, source })?;
        let data_dir = lookup("DISPLAN_DATA_DIR")
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from);
        Ok(Self { addr, data_dir })
    }
}
