//! Configuration management
//!
//! This module provides YAML-based configuration management with support for:
//! - Environment variable overrides
//! - Multiple configuration file locations
//! - Default values for all settings
//! - Catalog sources (local YAML files or the tenant store)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::models::DeploymentMode;

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    /// External tenant store (optional, tenant endpoints are disabled without it)
    #[serde(default)]
    pub store: Option<StoreConfig>,
    #[serde(default)]
    pub catalogs: CatalogsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub proposal: ProposalConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_secs: None,
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5061
}

/// Tenant store connection configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    pub url: String,
    /// Timeout in seconds (supports both timeout_secs and timeout field names)
    #[serde(default = "default_timeout", alias = "timeout")]
    pub timeout_secs: u64,
}

fn default_timeout() -> u64 {
    30
}

/// Where rule, server-default and brand catalogs come from
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum CatalogSource {
    /// Local YAML files
    #[default]
    File,
    /// The tenant store's catalog endpoints
    Store,
}

/// Catalog configuration
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct CatalogsConfig {
    #[serde(default)]
    pub source: CatalogSource,
    /// Rule catalog file (searched in standard locations when unset)
    #[serde(default)]
    pub rules_path: Option<PathBuf>,
    /// Server defaults catalog file
    #[serde(default)]
    pub defaults_path: Option<PathBuf>,
    /// Brand catalog file
    #[serde(default)]
    pub brands_path: Option<PathBuf>,
}

impl CatalogsConfig {
    /// Find a catalog file in standard locations
    pub fn find_catalog_file(file_name: &str) -> Option<PathBuf> {
        let paths = [
            PathBuf::from(file_name),
            PathBuf::from("config").join(file_name),
            PathBuf::from("/etc/tenant-topology").join(file_name),
            dirs::config_dir()
                .map(|p| p.join("tenant-topology").join(file_name))
                .unwrap_or_default(),
        ];

        paths.into_iter().find(|p| p.exists())
    }

    pub fn rules_file(&self) -> Option<PathBuf> {
        self.rules_path
            .clone()
            .or_else(|| Self::find_catalog_file("rules.yaml"))
    }

    pub fn defaults_file(&self) -> Option<PathBuf> {
        self.defaults_path
            .clone()
            .or_else(|| Self::find_catalog_file("server_defaults.yaml"))
    }

    pub fn brands_file(&self) -> Option<PathBuf> {
        self.brands_path
            .clone()
            .or_else(|| Self::find_catalog_file("brands.yaml"))
    }
}

/// Proposal engine settings
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct ProposalConfig {
    /// Deployment mode of new draft tenants and of sizing previews that name none
    #[serde(default)]
    pub default_mode: DeploymentMode,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: LogFormat,
    /// Log output target (console or file)
    #[serde(default = "default_log_target")]
    pub target: LogTarget,
    /// Directory for log files (used when target is "file")
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
    /// Log file name prefix (default: "tenant-topology")
    #[serde(default = "default_log_prefix")]
    pub log_prefix: String,
    /// Enable daily log rotation (default: true for production)
    #[serde(default = "default_log_rotation")]
    pub daily_rotation: bool,
    /// Maximum number of log files to keep (0 = unlimited)
    #[serde(default = "default_max_log_files")]
    pub max_log_files: usize,
}

/// Log output target
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogTarget {
    /// Log to console (stdout/stderr) - default for development
    #[default]
    Console,
    /// Log to file with optional rotation - recommended for production
    File,
    /// Log to both console and file
    Both,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Compact,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> LogFormat {
    LogFormat::Pretty
}

fn default_log_target() -> LogTarget {
    LogTarget::Console
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("/var/log/tenant-topology")
}

fn default_log_prefix() -> String {
    "tenant-topology".to_string()
}

fn default_log_rotation() -> bool {
    true
}

fn default_max_log_files() -> usize {
    30
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            target: default_log_target(),
            log_dir: default_log_dir(),
            log_prefix: default_log_prefix(),
            daily_rotation: default_log_rotation(),
            max_log_files: default_max_log_files(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            store: None,
            catalogs: CatalogsConfig::default(),
            logging: LoggingConfig::default(),
            proposal: ProposalConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values
    /// 2. Configuration file (YAML)
    /// 3. Environment variables (prefixed with TOPOLOGY_)
    pub fn load() -> Result<Self> {
        // Try to load .env file if it exists
        let _ = dotenvy::dotenv();

        let config_path = std::env::var("TOPOLOGY_CONFIG")
            .map(PathBuf::from)
            .ok()
            .or_else(Self::find_config_file);

        let mut config = match config_path {
            Some(ref path) if path.exists() => {
                eprintln!("[CONFIG] Loading configuration from: {:?}", path);
                Self::load_from(path)?
            }
            Some(ref path) => {
                eprintln!("[CONFIG] Config file not found: {:?}", path);
                AppConfig::default()
            }
            None => {
                eprintln!("[CONFIG] No config file found, using defaults");
                AppConfig::default()
            }
        };

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Parse a configuration file without applying overrides
    pub fn load_from(path: &PathBuf) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        serde_norway::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    /// Find the configuration file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        let paths = [
            // Current directory
            PathBuf::from("config.yaml"),
            PathBuf::from("config/config.yaml"),
            // System config directory
            PathBuf::from("/etc/tenant-topology/config.yaml"),
            // User config directory
            dirs::config_dir()
                .map(|p| p.join("tenant-topology/config.yaml"))
                .unwrap_or_default(),
        ];

        paths.into_iter().find(|p| p.exists())
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("TOPOLOGY_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("TOPOLOGY_PORT") {
            if let Ok(p) = port.parse() {
                self.server.port = p;
            }
        }

        if let Ok(url) = std::env::var("TOPOLOGY_STORE_URL") {
            let store = self.store.get_or_insert_with(|| StoreConfig {
                url: url.clone(),
                timeout_secs: default_timeout(),
            });
            store.url = url;
        }

        if let Ok(mode) = std::env::var("TOPOLOGY_DEFAULT_MODE") {
            match mode.parse() {
                Ok(m) => self.proposal.default_mode = m,
                Err(e) => eprintln!("[CONFIG] Ignoring TOPOLOGY_DEFAULT_MODE: {}", e),
            }
        }

        if let Ok(level) = std::env::var("RUST_LOG") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("TOPOLOGY_LOG_FORMAT") {
            self.logging.format = match format.to_lowercase().as_str() {
                "json" => LogFormat::Json,
                "compact" => LogFormat::Compact,
                _ => LogFormat::Pretty,
            };
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            anyhow::bail!("Server port cannot be 0");
        }

        if let Some(ref store) = self.store {
            if !store.url.starts_with("http://") && !store.url.starts_with("https://") {
                anyhow::bail!("Store URL must start with http:// or https://: {}", store.url);
            }
            if store.timeout_secs == 0 {
                anyhow::bail!("Store timeout cannot be 0");
            }
        }

        if self.catalogs.source == CatalogSource::Store && self.store.is_none() {
            anyhow::bail!("Catalog source 'store' requires a store section");
        }

        if self.catalogs.source == CatalogSource::File {
            for (name, path) in [
                ("rules", &self.catalogs.rules_path),
                ("server defaults", &self.catalogs.defaults_path),
                ("brands", &self.catalogs.brands_path),
            ] {
                if let Some(path) = path {
                    if !path.exists() {
                        tracing::warn!("{} catalog file does not exist: {:?}", name, path);
                    }
                }
            }
        }

        Ok(())
    }
}
