//! Health statistics for the exporter.
//!
//! Tracks probe outcomes, probe durations and request rate for the
//! plain-text `/health` endpoint.

use std::collections::VecDeque;
use std::fmt::Write as FmtWrite;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Running statistics for a single metric.
#[derive(Clone, Copy, Default)]
pub struct RunningStat {
    count: u64,
    sum: f64,
    min: f64,
    max: f64,
    last: f64,
}

impl RunningStat {
    pub fn add(&mut self, value: f64) {
        if self.count == 0 {
            self.min = value;
            self.max = value;
            self.last = value;
            self.sum = value;
            self.count = 1;
            return;
        }
        self.count += 1;
        self.sum += value;
        self.last = value;
        if value < self.min {
            self.min = value;
        }
        if value > self.max {
            self.max = value;
        }
    }

    pub fn avg(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / (self.count as f64)
        }
    }
}

/// Thread-safe wrapper for running statistics.
#[derive(Default)]
pub struct Stat {
    inner: Mutex<RunningStat>,
}

impl Stat {
    pub fn add_sample(&self, value: f64) {
        if let Ok(mut s) = self.inner.lock() {
            s.add(value);
        }
    }

    /// Returns `(last, avg, max, min, count)`.
    pub fn snapshot(&self) -> (f64, f64, f64, f64, u64) {
        if let Ok(s) = self.inner.lock() {
            (s.last, s.avg(), s.max, s.min, s.count)
        } else {
            (0.0, 0.0, 0.0, 0.0, 0)
        }
    }
}

/// Thread-safe buffer of recent probe request timestamps.
pub struct RequestTimestamps {
    inner: Mutex<VecDeque<Instant>>,
}

impl Default for RequestTimestamps {
    fn default() -> Self {
        Self {
            inner: Mutex::new(VecDeque::with_capacity(1024)),
        }
    }
}

impl RequestTimestamps {
    pub fn record(&self) {
        if let Ok(mut guard) = self.inner.lock() {
            let now = Instant::now();
            guard.push_back(now);
            // Keep only the last minute
            while guard
                .front()
                .is_some_and(|&t| now.duration_since(t) > Duration::from_secs(60))
            {
                guard.pop_front();
            }
        }
    }

    pub fn count_last_minute(&self) -> u64 {
        if let Ok(guard) = self.inner.lock() {
            guard
                .iter()
                .filter(|t| t.elapsed() <= Duration::from_secs(60))
                .count() as u64
        } else {
            0
        }
    }
}

/// Probe health statistics.
pub struct HealthStats {
    pub probes_success: AtomicU64,
    pub probes_invalid_request: AtomicU64,
    pub probes_fetch_error: AtomicU64,
    pub probes_not_found: AtomicU64,
    pub probes_coercion_error: AtomicU64,
    pub probes_internal_error: AtomicU64,

    pub probe_duration_seconds: Stat,
    pub probe_request_timestamps: RequestTimestamps,

    pub start_time: Instant,
}

impl Default for HealthStats {
    fn default() -> Self {
        Self {
            probes_success: AtomicU64::new(0),
            probes_invalid_request: AtomicU64::new(0),
            probes_fetch_error: AtomicU64::new(0),
            probes_not_found: AtomicU64::new(0),
            probes_coercion_error: AtomicU64::new(0),
            probes_internal_error: AtomicU64::new(0),
            probe_duration_seconds: Stat::default(),
            probe_request_timestamps: RequestTimestamps::default(),
            start_time: Instant::now(),
        }
    }
}

impl HealthStats {
    pub fn new() -> Self {
        Default::default()
    }

    /// Records a finished probe by outcome label.
    pub fn record_probe(&self, outcome: &str, duration_seconds: Option<f64>) {
        self.probe_request_timestamps.record();
        let counter = match outcome {
            "success" => &self.probes_success,
            "invalid_request" => &self.probes_invalid_request,
            "fetch_error" => &self.probes_fetch_error,
            "not_found" => &self.probes_not_found,
            "coercion_error" => &self.probes_coercion_error,
            _ => &self.probes_internal_error,
        };
        counter.fetch_add(1, Ordering::Relaxed);
        if let Some(d) = duration_seconds {
            self.probe_duration_seconds.add_sample(d);
        }
    }

    pub fn total_probes(&self) -> u64 {
        [
            &self.probes_success,
            &self.probes_invalid_request,
            &self.probes_fetch_error,
            &self.probes_not_found,
            &self.probes_coercion_error,
            &self.probes_internal_error,
        ]
        .iter()
        .map(|c| c.load(Ordering::Relaxed))
        .sum()
    }

    /// Share of successful probes in percent, 100 when nothing ran yet.
    pub fn get_success_rate(&self) -> f64 {
        let total = self.total_probes();
        if total == 0 {
            100.0
        } else {
            (self.probes_success.load(Ordering::Relaxed) as f64 / total as f64) * 100.0
        }
    }

    pub fn get_uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    pub fn render_table(&self) -> String {
        let (pd_cur, pd_avg, pd_max, pd_min, _) = self.probe_duration_seconds.snapshot();
        let left_col = 26usize;
        let col_w = 12usize;

        let mut out = String::new();

        writeln!(out, "HEALTH ENDPOINT - EXPORTER INTERNAL STATS").ok();
        writeln!(out, "==========================================").ok();
        writeln!(out).ok();

        writeln!(out, "PROBES").ok();
        writeln!(out, "------").ok();
        for (label, counter) in [
            ("success", &self.probes_success),
            ("invalid_request", &self.probes_invalid_request),
            ("fetch_error", &self.probes_fetch_error),
            ("not_found", &self.probes_not_found),
            ("coercion_error", &self.probes_coercion_error),
            ("internal_error", &self.probes_internal_error),
        ] {
            writeln!(
                out,
                "{:left$} | {:>col$}",
                label,
                counter.load(Ordering::Relaxed),
                left = left_col,
                col = col_w
            )
            .ok();
        }
        writeln!(
            out,
            "{:left$} | {:>col$}",
            "success_rate (%)",
            format!("{:.1}", self.get_success_rate()),
            left = left_col,
            col = col_w
        )
        .ok();
        writeln!(
            out,
            "{:left$} | {:>col$}",
            "requests_last_minute",
            self.probe_request_timestamps.count_last_minute(),
            left = left_col,
            col = col_w
        )
        .ok();

        writeln!(out).ok();
        writeln!(out, "PROBE DURATION").ok();
        writeln!(out, "--------------").ok();
        writeln!(
            out,
            "{:left$} | {:^col$} | {:^col$} | {:^col$} | {:^col$}",
            "",
            "current",
            "average",
            "max",
            "min",
            left = left_col,
            col = col_w
        )
        .ok();
        writeln!(
            out,
            "{:left$} | {:^col$} | {:^col$} | {:^col$} | {:^col$}",
            "probe_duration (s)",
            format!("{:.3}", pd_cur),
            format!("{:.3}", pd_avg),
            format!("{:.3}", pd_max),
            format!("{:.3}", pd_min),
            left = left_col,
            col = col_w
        )
        .ok();

        out
    }
}
