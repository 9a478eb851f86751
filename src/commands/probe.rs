//! Probe command implementation.
//!
//! Runs a single probe with the effective configuration and prints the
//! resulting metrics in the text exposition format.

use std::io::Write;

use crate::config::Config;
use crate::probe::{run_probe, Fetcher, ProbeRequest};

/// Runs one probe and prints its registry.
///
/// Returns an error when the probe did not succeed, after printing
/// whatever the registry holds.
pub async fn command_probe(
    request: ProbeRequest,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let fetcher = Fetcher::new(&config.fetch_settings())?;
    let outcome = run_probe(&fetcher, &request, None).await?;

    let body = outcome.metrics.render()?;
    std::io::stdout().write_all(&body)?;

    match outcome.result {
        Ok(value) => {
            eprintln!(
                "✅ Probe succeeded in {:.3}s, value = {}",
                outcome.duration.as_secs_f64(),
                value
            );
            Ok(())
        }
        Err(e) => Err(format!("Probe failed: {e}").into()),
    }
}
