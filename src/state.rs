//! Application state management for the exporter.
//!
//! This module defines the shared application state that is passed
//! to HTTP handlers. Nothing in here belongs to a single probe.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::Config;
use crate::health_stats::HealthStats;
use crate::metrics::ExporterMetrics;
use crate::probe::{FetchError, Fetcher};

/// Type alias for shared application state.
pub type SharedState = Arc<AppState>;

/// Global application state shared across requests.
pub struct AppState {
    /// Outbound client used by every probe.
    pub fetcher: Fetcher,
    /// Process-wide exporter metrics for `/metrics`.
    pub metrics: ExporterMetrics,
    pub health_stats: HealthStats,
    pub config: Arc<Config>,
    pub scrape_timeout_offset: Duration,
    /// Server start time for uptime calculation.
    pub start_time: Instant,
}

/// Errors raised while assembling the application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("failed to register exporter metrics: {0}")]
    Metrics(#[from] prometheus::Error),

    #[error(transparent)]
    Fetcher(#[from] FetchError),
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, StateError> {
        let fetcher = Fetcher::new(&config.fetch_settings())?;
        let metrics = ExporterMetrics::new()?;

        Ok(Self {
            fetcher,
            metrics,
            health_stats: HealthStats::new(),
            scrape_timeout_offset: config.scrape_timeout_offset(),
            config: Arc::new(config),
            start_time: Instant::now(),
        })
    }

    pub fn shared(config: Config) -> Result<SharedState, StateError> {
        Ok(Arc::new(Self::new(config)?))
    }

    /// Records a finished probe in both the exporter metrics and health stats.
    pub fn record_probe(&self, outcome: &str, duration: Option<Duration>) {
        let seconds = duration.map(|d| d.as_secs_f64());
        self.metrics.record_probe(outcome, seconds);
        self.health_stats.record_probe(outcome, seconds);
    }
}
