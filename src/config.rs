//! Configuration loading and parsing for `repodesk.toml` files.
use log::*;
use reqwest::header::HeaderValue;
use serde::Deserialize;
use std::{net::IpAddr, path::Path};

use crate::{Result, error::RepodeskError, forge::config::UpstreamConfig};

/// Default configuration filename.
pub const DEFAULT_CONFIG_FILE: &str = "repodesk.toml";
/// Default session store filename.
pub const DEFAULT_SESSIONS_FILE: &str = "sessions.toml";
/// Default cap on files copied by a single sync.
pub const DEFAULT_SYNC_MAX_FILES: usize = 100;
/// Default limit on JSON request bodies (10 MiB, enough for a full upload
/// batch of base64 content).
pub const DEFAULT_JSON_BODY_LIMIT: usize = 10 * 1024 * 1024;

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8787,
        }
    }
}

/// Location of the session store.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SessionsConfig {
    pub path: String,
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self {
            path: DEFAULT_SESSIONS_FILE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Files copied per sync request; the rest are reported but skipped.
    pub sync_max_files: usize,
    /// Maximum accepted JSON body size in bytes.
    pub json_body_limit: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            sync_max_files: DEFAULT_SYNC_MAX_FILES,
            json_body_limit: DEFAULT_JSON_BODY_LIMIT,
        }
    }
}

/// Root configuration structure for `repodesk.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    /// GitHub API connection settings.
    pub github: UpstreamConfig,
    pub sessions: SessionsConfig,
    pub limits: LimitsConfig,
}

impl Config {
    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                debug!("loading configuration from {}", path.display());
                Self::from_toml(&content)
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                info!(
                    "no configuration found at {}: using defaults",
                    path.display()
                );
                Ok(Self::default())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Reject values that would only fail later at bind or request time.
    pub fn validate(&self) -> Result<()> {
        if self.server.host.parse::<IpAddr>().is_err()
            && self.server.host != "localhost"
        {
            return Err(RepodeskError::InvalidConfig(format!(
                "server.host must be an IP address or localhost: {}",
                self.server.host
            )));
        }

        if self.limits.sync_max_files == 0 {
            return Err(RepodeskError::InvalidConfig(
                "limits.sync_max_files must be greater than zero".into(),
            ));
        }

        if HeaderValue::from_str(&self.github.api_version).is_err() {
            return Err(RepodeskError::InvalidConfig(format!(
                "github.api_version is not a valid header value: {:?}",
                self.github.api_version
            )));
        }

        if self.sessions.path.trim().is_empty() {
            return Err(RepodeskError::InvalidConfig(
                "sessions.path must not be empty".into(),
            ));
        }

        Ok(())
    }

    /// Address the server binds to.
    pub fn bind_address(&self) -> (String, u16) {
        (self.server.host.clone(), self.server.port)
    }
}
