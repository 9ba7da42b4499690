//! Configuration management for ownerdash.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Directory name under the platform config dir.
const APP_DIR_NAME: &str = "ownerdash";

/// Prefix for environment variable overrides.
const ENV_PREFIX: &str = "OWNERDASH_";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `OWNERDASH_`, sections split on `__`)
/// 2. TOML config file at `~/.config/ownerdash/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server configuration.
    pub server: ServerConfig,
    /// Input and edit file locations.
    pub data: DataConfig,
    /// Presentation settings for the rendered page.
    pub dashboard: DashboardConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to listen on.
    pub host: String,
    /// TCP port to listen on.
    pub port: u16,
}

/// File locations. Relative paths resolve against the working directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Source CSV with one row per owner.
    pub dataset_path: PathBuf,
    /// JSON edit map for the `Rv_Owner` column.
    pub rv_edits_path: PathBuf,
    /// JSON edit map for the `Packer` column.
    pub packer_edits_path: PathBuf,
}

/// Presentation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Page heading and document title.
    pub title: String,
    /// File name offered by the browser's CSV export.
    pub export_file_name: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8765,
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dataset_path: PathBuf::from("top200_citrus_owners.csv"),
            rv_edits_path: PathBuf::from("rv_owner_edits.json"),
            packer_edits_path: PathBuf::from("packer_edits.json"),
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            title: "Top 200 California Citrus Owners".to_string(),
            export_file_name: "top200_citrus_owners_with_edits.csv".to_string(),
        }
    }
}

impl Config {
    /// Load configuration with an optional custom config path.
    ///
    /// A missing config file is not an error; defaults apply.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading, parsing, or validation fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(APP_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.server.host.parse::<IpAddr>().is_err() {
            return Err(Error::config_validation(format!(
                "server.host is not an IP address: {}",
                self.server.host
            )));
        }

        let paths = [
            ("data.dataset_path", &self.data.dataset_path),
            ("data.rv_edits_path", &self.data.rv_edits_path),
            ("data.packer_edits_path", &self.data.packer_edits_path),
        ];
        for (name, path) in paths {
            if path.as_os_str().is_empty() {
                return Err(Error::config_validation(format!("{name} must not be empty")));
            }
        }

        if self.data.rv_edits_path == self.data.packer_edits_path {
            return Err(Error::config_validation(format!(
                "data.rv_edits_path and data.packer_edits_path must differ (both are {})",
                self.data.rv_edits_path.display()
            )));
        }

        if self.data.dataset_path == self.data.rv_edits_path
            || self.data.dataset_path == self.data.packer_edits_path
        {
            return Err(Error::config_validation(
                "an edit file cannot be the dataset file",
            ));
        }

        if self.dashboard.title.trim().is_empty() {
            return Err(Error::config_validation("dashboard.title must not be empty"));
        }

        Ok(())
    }

    /// Apply command-line overrides for the listen address.
    #[must_use]
    pub fn with_listen_overrides(mut self, host: Option<String>, port: Option<u16>) -> Self {
        if let Some(host) = host {
            self.server.host = host;
        }
        if let Some(port) = port {
            self.server.port = port;
        }
        self
    }

    /// The socket address the server binds to.
    ///
    /// # Errors
    ///
    /// Returns an error if `server.host` is not an IP address.
    pub fn listen_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self.server.host.parse().map_err(|_| {
            Error::config_validation(format!(
                "server.host is not an IP address: {}",
                self.server.host
            ))
        })?;
        Ok(SocketAddr::new(ip, self.server.port))
    }

    /// Path to the source dataset.
    #[must_use]
    pub fn dataset_path(&self) -> &Path {
        &self.data.dataset_path
    }
}
