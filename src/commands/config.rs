//! Config command implementation.
//!
//! Generates configuration files in various formats.

use std::fs;
use std::path::PathBuf;

use crate::cli::ConfigFormat;
use crate::config::{render_config, Config};

/// Generates configuration files.
pub fn command_config(
    output: Option<PathBuf>,
    format: ConfigFormat,
    commented: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::default();
    let output = match output {
        Some(path) => path,
        None => PathBuf::from("json-exporter.yaml"),
    };

    let mut content = render_config(&config, &format)?;
    if commented && matches!(format, ConfigFormat::Yaml) {
        content = add_config_comments(content);
    }

    if output.to_string_lossy() == "-" {
        print!("{}", content);
    } else {
        fs::write(&output, content)?;
        println!("✅ Configuration written to: {}", output.display());
    }

    Ok(())
}

/// Adds comments to YAML configuration.
fn add_config_comments(yaml: String) -> String {
    let comments = r#"# Json Exporter Configuration
# ============================
#
# Server Configuration
# --------------------
# listen_address: ":9116"             # ":port" for all interfaces or "ip:port"
#
# Logging
# -------
# log_level: "info"                   # off, error, warn, info, debug, trace
#
# Probe Behaviour
# ---------------
# fetch_timeout_seconds: 10.0         # Upper bound for fetching a target
# scrape_timeout_offset_seconds: 0.5  # Subtracted from X-Prometheus-Scrape-Timeout-Seconds
# insecure_skip_verify: true          # Skip TLS certificate verification of targets
# user_agent: null                    # User-Agent sent to targets (null = json-exporter/<version>)
#
# Feature Flags
# -------------
# enable_health: true                 # Enable /health endpoint
#
# TLS/SSL Configuration
# ---------------------
# enable_tls: false                   # Serve HTTPS (default: false)
# tls_cert_path: null                 # Path to TLS certificate (PEM format)
# tls_key_path: null                  # Path to TLS private key (PEM format)
"#;

    format!("{comments}\n{yaml}")
}
