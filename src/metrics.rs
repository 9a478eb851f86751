//! Exporter self-observability metrics served on `/metrics`.
//!
//! These live on a process-wide registry created once at startup. Probe
//! gauges are never registered here.

use prometheus::{
    Gauge, GaugeVec, Histogram, HistogramOpts, IntCounterVec, Opts, Registry,
};

/// Outcome labels pre-initialized so every series exists from the start.
pub const PROBE_OUTCOMES: [&str; 6] = [
    "success",
    "invalid_request",
    "fetch_error",
    "not_found",
    "coercion_error",
    "internal_error",
];

/// Process-wide exporter metrics.
#[derive(Clone)]
pub struct ExporterMetrics {
    pub registry: Registry,
    pub probes_total: IntCounterVec, // labels: outcome
    pub probe_duration_seconds: Histogram,
    pub build_info: GaugeVec, // labels: version, build_timestamp
    pub start_time_seconds: Gauge,
}

impl ExporterMetrics {
    /// Creates the exporter metrics and registers them with a new registry.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let probes_total = IntCounterVec::new(
            Opts::new(
                "json_exporter_probes_total",
                "Number of probes handled, by outcome",
            ),
            &["outcome"],
        )?;
        let probe_duration_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "json_exporter_probe_duration_seconds",
                "Wall-clock time spent executing probes",
            )
            .buckets(vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
        )?;
        let build_info = GaugeVec::new(
            Opts::new(
                "json_exporter_build_info",
                "A metric with a constant '1' value labeled by version and build timestamp",
            ),
            &["version", "build_timestamp"],
        )?;
        let start_time_seconds = Gauge::new(
            "json_exporter_start_time_seconds",
            "Start time of the exporter since unix epoch in seconds",
        )?;

        registry.register(Box::new(probes_total.clone()))?;
        registry.register(Box::new(probe_duration_seconds.clone()))?;
        registry.register(Box::new(build_info.clone()))?;
        registry.register(Box::new(start_time_seconds.clone()))?;

        for outcome in PROBE_OUTCOMES {
            probes_total.with_label_values(&[outcome]);
        }
        build_info
            .with_label_values(&[env!("CARGO_PKG_VERSION"), env!("VERGEN_BUILD_TIMESTAMP")])
            .set(1.0);
        if let Ok(now) = std::time::SystemTime::now().duration_since(std::time::UNIX_EPOCH) {
            start_time_seconds.set(now.as_secs_f64());
        }

        Ok(Self {
            registry,
            probes_total,
            probe_duration_seconds,
            build_info,
            start_time_seconds,
        })
    }

    /// Counts a finished probe.
    pub fn record_probe(&self, outcome: &str, duration_seconds: Option<f64>) {
        self.probes_total.with_label_values(&[outcome]).inc();
        if let Some(d) = duration_seconds {
            self.probe_duration_seconds.observe(d);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::render;

    #[test]
    fn test_outcomes_are_preinitialized() {
        let metrics = ExporterMetrics::new().unwrap();
        let text = String::from_utf8(render(&metrics.registry).unwrap()).unwrap();
        for outcome in PROBE_OUTCOMES {
            assert!(
                text.contains(&format!("json_exporter_probes_total{{outcome=\"{outcome}\"}} 0")),
                "missing series for {outcome}"
            );
        }
        assert!(text.contains("json_exporter_build_info{"));
    }

    #[test]
    fn test_record_probe() {
        let metrics = ExporterMetrics::new().unwrap();
        metrics.record_probe("success", Some(0.2));
        metrics.record_probe("not_found", None);

        assert_eq!(metrics.probes_total.with_label_values(&["success"]).get(), 1);
        assert_eq!(metrics.probes_total.with_label_values(&["not_found"]).get(), 1);
        assert_eq!(metrics.probe_duration_seconds.get_sample_count(), 1);
    }

    #[test]
    fn test_probe_gauges_are_not_exposed() {
        let metrics = ExporterMetrics::new().unwrap();
        let text = String::from_utf8(render(&metrics.registry).unwrap()).unwrap();
        assert!(!text.contains("probe_success"));
        assert!(!text.contains("\nvalue "));
    }
}
