//! Json Exporter Library
//!
//! A Prometheus probe exporter for values inside remote JSON documents.
//! Every call to `/probe` fetches the target, selects one value with a
//! JSONPath expression and reports it on a registry that exists only for
//! that request.
//!
//! # Features
//!
//! - **Isolated Probes**: `probe_success`, `probe_duration_seconds` and `value`
//!   live on a fresh registry per probe
//! - **JSONPath Lookup**: first match wins, booleans become `1`/`0`
//! - **Bounded Fetches**: configurable timeout, narrowed by the Prometheus scrape timeout
//! - **Self-Observability**: process-wide `/metrics` and `/health`
//!
//! # Usage
//!
//! ```no_run
//! use json_exporter::probe::{run_probe, FetchSettings, Fetcher, ProbeRequest};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let fetcher = Fetcher::new(&FetchSettings::default())?;
//! let request = ProbeRequest::new("https://example.com/status.json", "$.healthy");
//!
//! let outcome = run_probe(&fetcher, &request, None).await?;
//! let text = String::from_utf8(outcome.metrics.render()?)?;
//! println!("{text}");
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod handlers;
pub mod health_stats;
pub mod metrics;
pub mod probe;
pub mod state;

// Re-export main types for convenience
pub use config::Config;
pub use handlers::router;
pub use state::{AppState, SharedState};
