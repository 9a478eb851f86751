//! Configuration management for json-exporter.
//!
//! This module handles loading, merging, and validating configuration from files
//! and CLI arguments. It supports YAML, JSON, and TOML formats.

use crate::cli::{Args, ConfigFormat, LogLevel};
use crate::probe::FetchSettings;
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

// Default configuration constants
pub const DEFAULT_LISTEN_ADDRESS: &str = ":9116";
pub const DEFAULT_FETCH_TIMEOUT_SECS: f64 = 10.0;
pub const DEFAULT_SCRAPE_TIMEOUT_OFFSET_SECS: f64 = 0.5;
const DEFAULT_SCRAPE_TIMEOUT_OFFSET: Duration = Duration::from_millis(500);

/// Errors raised while interpreting configuration values.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid listen_address '{0}', expected ':port' or 'ip:port'")]
    InvalidListenAddress(String),

    #[error("fetch_timeout_seconds must be a positive number, got {0}")]
    InvalidFetchTimeout(f64),

    #[error("scrape_timeout_offset_seconds must not be negative, got {0}")]
    InvalidScrapeTimeoutOffset(f64),

    #[error("{field} is too large to be used as a duration, got {value}")]
    DurationOutOfRange { field: &'static str, value: f64 },
}

/// Exporter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // Server configuration
    #[serde(alias = "listen-address")]
    pub listen_address: Option<String>,

    // Logging
    #[serde(alias = "log-level")]
    pub log_level: Option<LogLevel>,

    // Probe behaviour
    #[serde(alias = "fetch-timeout-seconds")]
    pub fetch_timeout_seconds: Option<f64>,
    /// Subtracted from the scrape timeout announced by Prometheus
    #[serde(alias = "scrape-timeout-offset-seconds")]
    pub scrape_timeout_offset_seconds: Option<f64>,
    /// Skip certificate verification of probe targets
    #[serde(alias = "insecure-skip-verify")]
    pub insecure_skip_verify: Option<bool>,
    #[serde(alias = "user-agent")]
    pub user_agent: Option<String>,

    // Feature flags
    #[serde(alias = "enable-health")]
    pub enable_health: Option<bool>,

    // TLS/SSL Configuration
    #[serde(alias = "enable-tls")]
    pub enable_tls: Option<bool>,
    #[serde(alias = "tls-cert-path")]
    pub tls_cert_path: Option<String>,
    #[serde(alias = "tls-key-path")]
    pub tls_key_path: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_address: Some(DEFAULT_LISTEN_ADDRESS.to_string()),
            log_level: Some(LogLevel::Info),
            fetch_timeout_seconds: Some(DEFAULT_FETCH_TIMEOUT_SECS),
            scrape_timeout_offset_seconds: Some(DEFAULT_SCRAPE_TIMEOUT_OFFSET_SECS),
            insecure_skip_verify: Some(true),
            user_agent: None,
            enable_health: Some(true),
            enable_tls: Some(false),
            tls_cert_path: None,
            tls_key_path: None,
        }
    }
}

impl Config {
    /// Effective socket address to bind the HTTP server to.
    pub fn listen_addr(&self) -> Result<SocketAddr, ConfigError> {
        parse_listen_address(
            self.listen_address
                .as_deref()
                .unwrap_or(DEFAULT_LISTEN_ADDRESS),
        )
    }

    /// Settings for the outbound HTTP client used by probes.
    pub fn fetch_settings(&self) -> FetchSettings {
        let defaults = FetchSettings::default();
        FetchSettings {
            insecure_skip_verify: self.insecure_skip_verify.unwrap_or(true),
            timeout: self
                .fetch_timeout_seconds
                .filter(|t| *t > 0.0)
                .and_then(|t| Duration::try_from_secs_f64(t).ok())
                .unwrap_or(defaults.timeout),
            user_agent: self.user_agent.clone().unwrap_or(defaults.user_agent),
        }
    }

    pub fn scrape_timeout_offset(&self) -> Duration {
        self.scrape_timeout_offset_seconds
            .and_then(|o| Duration::try_from_secs_f64(o).ok())
            .unwrap_or(DEFAULT_SCRAPE_TIMEOUT_OFFSET)
    }
}

/// Parses `":port"` (all interfaces) or `"ip:port"`.
pub fn parse_listen_address(addr: &str) -> Result<SocketAddr, ConfigError> {
    let invalid = || ConfigError::InvalidListenAddress(addr.to_string());

    if let Some(port) = addr.strip_prefix(':') {
        let port: u16 = port.parse().map_err(|_| invalid())?;
        return Ok(SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), port));
    }

    addr.parse().map_err(|_| invalid())
}

/// Validate effective config (used by --check-config and at startup)
pub fn validate_effective_config(cfg: &Config) -> Result<(), Box<dyn std::error::Error>> {
    cfg.listen_addr()?;

    if let Some(timeout) = cfg.fetch_timeout_seconds {
        if !timeout.is_finite() || timeout <= 0.0 {
            return Err(ConfigError::InvalidFetchTimeout(timeout).into());
        }
        check_duration("fetch_timeout_seconds", timeout)?;
    }

    if let Some(offset) = cfg.scrape_timeout_offset_seconds {
        if !offset.is_finite() || offset < 0.0 {
            return Err(ConfigError::InvalidScrapeTimeoutOffset(offset).into());
        }
        check_duration("scrape_timeout_offset_seconds", offset)?;
    }

    // TLS validation
    if cfg.enable_tls.unwrap_or(false) {
        let cert_path = cfg.tls_cert_path.as_deref();
        let key_path = cfg.tls_key_path.as_deref();

        match (cert_path, key_path) {
            (None, None) => {
                return Err(
                    "TLS is enabled but neither tls_cert_path nor tls_key_path are set".into(),
                );
            }
            (Some(_), None) => {
                return Err("TLS is enabled but tls_key_path is not set".into());
            }
            (None, Some(_)) => {
                return Err("TLS is enabled but tls_cert_path is not set".into());
            }
            (Some(cert), Some(key)) => {
                check_pem_file(cert, "TLS certificate")?;
                check_pem_file(key, "TLS private key")?;
            }
        }
    }

    Ok(())
}

fn check_duration(field: &'static str, value: f64) -> Result<(), ConfigError> {
    Duration::try_from_secs_f64(value)
        .map(|_| ())
        .map_err(|_| ConfigError::DurationOutOfRange { field, value })
}

/// Checks that a PEM file exists, is readable and not empty.
fn check_pem_file(path: &str, what: &str) -> Result<(), Box<dyn std::error::Error>> {
    let p = Path::new(path);
    if !p.exists() {
        return Err(format!("{what} file not found: {path}").into());
    }

    match fs::metadata(p) {
        Ok(meta) if meta.len() == 0 => Err(format!("{what} file is empty: {path}").into()),
        Err(e) => Err(format!("{what} file is not readable: {path} ({e})").into()),
        Ok(_) => Ok(()),
    }
}

/// Resolves configuration from CLI args, config file, and defaults.
/// This enforces precedence: CLI (if provided) > config file > default.
pub fn resolve_config(args: &Args) -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = if args.no_config {
        Config::default()
    } else {
        load_config(args.config.as_deref())?
    };

    if let Some(addr) = &args.listen_address {
        config.listen_address = Some(addr.clone());
    }
    if let Some(level) = args.log_level {
        config.log_level = Some(level);
    }
    if let Some(timeout) = args.fetch_timeout {
        config.fetch_timeout_seconds = Some(timeout);
    }
    if args.verify_certs {
        config.insecure_skip_verify = Some(false);
    }
    if args.disable_health {
        config.enable_health = Some(false);
    }

    // TLS configuration: CLI wins if provided
    if args.enable_tls {
        config.enable_tls = Some(true);
    }
    if let Some(cert_path) = &args.tls_cert {
        config.tls_cert_path = Some(cert_path.to_string_lossy().to_string());
    }
    if let Some(key_path) = &args.tls_key {
        config.tls_key_path = Some(key_path.to_string_lossy().to_string());
    }

    Ok(config)
}

/// Configuration loading with multiple format support.
///
/// Without an explicit path the default locations are tried; if none
/// exists the built-in defaults are used.
pub fn load_config(path: Option<&Path>) -> Result<Config, Box<dyn std::error::Error>> {
    let path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(format!("Config file not found: {}", p.display()).into());
            }
            p.to_path_buf()
        }
        None => {
            let defaults = [
                "/etc/json-exporter/json-exporter.yaml",
                "/etc/json-exporter/json-exporter.yml",
                "/etc/json-exporter/json-exporter.json",
                "./json-exporter.yaml",
                "./json-exporter.yml",
                "./json-exporter.json",
            ];

            match defaults.iter().find(|p| Path::new(p).exists()) {
                Some(p) => PathBuf::from(p),
                None => return Ok(Config::default()),
            }
        }
    };

    let content = fs::read_to_string(&path)?;

    match path.extension().and_then(|s| s.to_str()) {
        Some("json") => {
            let config: Config = serde_json::from_str(&content)?;
            info!("Loaded JSON configuration from: {}", path.display());
            Ok(config)
        }
        Some("toml") => {
            let config: Config = toml::from_str(&content)?;
            info!("Loaded TOML configuration from: {}", path.display());
            Ok(config)
        }
        _ => {
            // Default to YAML
            let config: Config = serde_yaml::from_str(&content)?;
            info!("Loaded YAML configuration from: {}", path.display());
            Ok(config)
        }
    }
}

/// Renders configuration in the requested format
pub fn render_config(config: &Config, format: &ConfigFormat) -> Result<String, Box<dyn std::error::Error>> {
    Ok(match format {
        ConfigFormat::Json => serde_json::to_string_pretty(config)?,
        ConfigFormat::Toml => toml::to_string_pretty(config)?,
        ConfigFormat::Yaml => serde_yaml::to_string(config)?,
    })
}

/// Shows configuration in requested format
pub fn show_config(config: &Config, format: ConfigFormat) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", render_config(config, &format)?);
    Ok(())
}
