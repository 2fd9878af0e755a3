//! CLI argument parsing.
use clap::Parser;
use std::path::PathBuf;

use crate::{
    Result,
    config::{Config, DEFAULT_CONFIG_FILE},
};

/// HTTP backend for managing GitHub repositories from the browser.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    /// Path to the configuration file. Defaults apply when it is missing.
    pub config: PathBuf,

    #[arg(long)]
    /// Address to listen on. Overrides `server.host`.
    pub host: Option<String>,

    #[arg(long)]
    /// Port to listen on. Overrides `server.port`.
    pub port: Option<u16>,

    #[arg(long)]
    /// GitHub REST API base URL. Overrides `github.api_url`.
    pub github_api_url: Option<String>,

    #[arg(long)]
    /// Session store file. Overrides `sessions.path`.
    pub sessions: Option<String>,

    #[arg(long, default_value_t = false)]
    /// Enable debug logging.
    pub debug: bool,
}

impl Args {
    /// Load the configuration file and apply command line overrides.
    pub fn resolve_config(&self) -> Result<Config> {
        let config = Config::load(&self.config)?;
        let config = self.apply_overrides(config);
        config.validate()?;
        Ok(config)
    }

    fn apply_overrides(&self, mut config: Config) -> Config {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(api_url) = &self.github_api_url {
            config.github.api_url = api_url.clone();
        }
        if let Some(sessions) = &self.sessions {
            config.sessions.path = sessions.clone();
        }
        config
    }
}
