//! Per-probe metrics registry and exposition rendering.
//!
//! A [`ProbeMetrics`] is built for exactly one probe. Its gauges are never
//! registered anywhere else, so nothing leaks between requests.

use prometheus::{Encoder, Gauge, Registry, TextEncoder};

/// Buffer capacity for encoding a probe registry.
const BUFFER_CAP: usize = 1024;

/// The three gauges reported by every probe, on their own registry.
pub struct ProbeMetrics {
    registry: Registry,
    pub probe_success: Gauge,
    pub probe_duration_seconds: Gauge,
    pub value: Gauge,
}

impl ProbeMetrics {
    /// Creates a fresh registry with all gauges at their zero value.
    pub fn new() -> Result<Self, prometheus::Error> {
        let probe_success = Gauge::new(
            "probe_success",
            "Displays whether or not the probe was a success",
        )?;
        let probe_duration_seconds = Gauge::new(
            "probe_duration_seconds",
            "Returns how long the probe took to complete in seconds",
        )?;
        let value = Gauge::new("value", "Retrieved value")?;

        let registry = Registry::new();
        registry.register(Box::new(probe_success.clone()))?;
        registry.register(Box::new(probe_duration_seconds.clone()))?;
        registry.register(Box::new(value.clone()))?;

        Ok(Self {
            registry,
            probe_success,
            probe_duration_seconds,
            value,
        })
    }

    /// Records a successful probe.
    pub fn record_success(&self, value: f64, duration_seconds: f64) {
        self.probe_success.set(1.0);
        self.value.set(value);
        self.probe_duration_seconds.set(duration_seconds);
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Renders the registry in the Prometheus text format.
    pub fn render(&self) -> Result<Vec<u8>, prometheus::Error> {
        render(&self.registry)
    }
}

/// Encodes every metric family of `registry` in the text exposition format.
pub fn render(registry: &Registry) -> Result<Vec<u8>, prometheus::Error> {
    let mut buffer = Vec::with_capacity(BUFFER_CAP);
    TextEncoder::new().encode(&registry.gather(), &mut buffer)?;
    Ok(buffer)
}

/// Content type of rendered output.
pub fn content_type() -> String {
    TextEncoder::new().format_type().to_string()
}
