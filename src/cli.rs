//! CLI arguments and subcommands for json-exporter.
//!
//! This module defines the command-line interface structure using the clap library,
//! including all flags, options, and subcommands.

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Log level options for CLI parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Configuration format options for output
#[derive(Debug, Clone, Default, ValueEnum)]
pub enum ConfigFormat {
    #[default]
    Yaml,
    Json,
    Toml,
}

/// Main CLI arguments structure
#[derive(Parser, Debug, Default)]
#[command(
    name = "json-exporter",
    about = "Prometheus probe exporter for values inside remote JSON documents",
    long_about = "Prometheus probe exporter for values inside remote JSON documents.\n\n\
                  Each request to /probe fetches the target URL, looks up a single value \
                  with a JSONPath expression and reports probe_success, \
                  probe_duration_seconds and value on a registry scoped to that request.",
    version,
    propagate_version = true
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// The address to listen on for HTTP requests (e.g. ":9116" or "127.0.0.1:9116")
    #[arg(long)]
    pub listen_address: Option<String>,

    /// Log level
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Config file (YAML/JSON/TOML)
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Disable all config file loading
    #[arg(long)]
    pub no_config: bool,

    /// Print effective merged config and exit
    #[arg(long)]
    pub show_config: bool,

    /// Output format for --show-config
    #[arg(long, value_enum, default_value = "yaml")]
    pub config_format: ConfigFormat,

    /// Validate config and exit (return code 1 on error)
    #[arg(long)]
    pub check_config: bool,

    /// Upper bound for fetching a probe target, in seconds
    #[arg(long)]
    pub fetch_timeout: Option<f64>,

    /// Verify TLS certificates of probe targets
    #[arg(long)]
    pub verify_certs: bool,

    /// Disable /health endpoint
    #[arg(long)]
    pub disable_health: bool,

    /// Enable TLS/SSL for HTTPS
    #[arg(long)]
    pub enable_tls: bool,

    /// Path to TLS certificate file (PEM format)
    #[arg(long)]
    pub tls_cert: Option<PathBuf>,

    /// Path to TLS private key file (PEM format)
    #[arg(long)]
    pub tls_key: Option<PathBuf>,
}

/// Subcommands for additional functionality
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a single probe and print the resulting metrics
    Probe {
        /// URL of the JSON document to fetch
        #[arg(long)]
        target: String,

        /// JSONPath expression selecting the value
        #[arg(long)]
        jsonpath: String,

        /// Username for HTTP Basic authentication
        #[arg(long, default_value = "")]
        username: String,

        /// Password for HTTP Basic authentication
        #[arg(long, default_value = "")]
        password: String,
    },

    /// Generate configuration files
    Config {
        /// Output file path ("-" for stdout)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value = "yaml")]
        format: ConfigFormat,

        /// Include comments and examples
        #[arg(long)]
        commented: bool,
    },
}
