//! Probe execution.
//!
//! A probe fetches a remote JSON document, looks up a single value with a
//! JSONPath expression and turns it into a gauge reading. The result is
//! reported on a registry owned by that probe alone:
//!
//! ```text
//! params -> fetch -> decode -> evaluate -> coerce -> record -> render
//! ```
//!
//! Decode failures are not errors: an undecodable body becomes a `null`
//! document and the lookup then reports the path as not found.

pub mod coerce;
pub mod fetch;
pub mod path;
pub mod registry;

use serde::Deserialize;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

pub use coerce::{coerce, CoercionError, Reading};
pub use fetch::{Credentials, FetchError, FetchSettings, Fetcher};
pub use path::{decode_document, evaluate, PathError};
pub use registry::{render, ProbeMetrics};

/// Raw query parameters of a probe request.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ProbeParams {
    pub target: Option<String>,
    pub jsonpath: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Validated probe request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeRequest {
    pub target: String,
    pub jsonpath: String,
    pub credentials: Credentials,
}

impl ProbeRequest {
    pub fn new(target: impl Into<String>, jsonpath: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            jsonpath: jsonpath.into(),
            credentials: Credentials::default(),
        }
    }

    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.credentials = Credentials {
            username: username.into(),
            password: password.into(),
        };
        self
    }
}

impl TryFrom<ProbeParams> for ProbeRequest {
    type Error = ProbeError;

    /// Empty values count as missing.
    fn try_from(params: ProbeParams) -> Result<Self, Self::Error> {
        let target = non_empty(params.target).ok_or(ProbeError::MissingTarget)?;
        let jsonpath = non_empty(params.jsonpath).ok_or(ProbeError::MissingJsonPath)?;

        Ok(Self {
            target,
            jsonpath,
            credentials: Credentials {
                username: params.username.unwrap_or_default(),
                password: params.password.unwrap_or_default(),
            },
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Everything that can end a probe early.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("Target parameter is missing")]
    MissingTarget,

    #[error("The JsonPath to lookup")]
    MissingJsonPath,

    #[error("failed to create probe registry: {0}")]
    Registry(#[source] prometheus::Error),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    PathNotFound(#[from] PathError),

    #[error(transparent)]
    Coercion(#[from] CoercionError),
}

impl ProbeError {
    /// Label used when counting probe outcomes.
    pub fn outcome(&self) -> &'static str {
        match self {
            ProbeError::MissingTarget | ProbeError::MissingJsonPath => "invalid_request",
            ProbeError::Fetch(FetchError::InvalidTarget { .. }) => "invalid_request",
            ProbeError::Fetch(_) => "fetch_error",
            ProbeError::PathNotFound(_) => "not_found",
            ProbeError::Coercion(_) => "coercion_error",
            ProbeError::Registry(_) => "internal_error",
        }
    }
}

/// Result of a probe together with the registry it populated.
pub struct ProbeOutcome {
    pub metrics: ProbeMetrics,
    pub result: Result<f64, ProbeError>,
    pub duration: Duration,
}

impl ProbeOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    /// Outcome label for counting, `success` when the probe succeeded.
    pub fn outcome(&self) -> &'static str {
        match &self.result {
            Ok(_) => "success",
            Err(e) => e.outcome(),
        }
    }
}

/// Runs a single probe.
///
/// The registry is created before the fetch so that failures after that
/// point can still render it with nothing set. Gauges are only written on
/// success.
pub async fn run_probe(
    fetcher: &Fetcher,
    request: &ProbeRequest,
    deadline: Option<Duration>,
) -> Result<ProbeOutcome, ProbeError> {
    let start = Instant::now();
    let metrics = ProbeMetrics::new().map_err(ProbeError::Registry)?;

    let result = execute(fetcher, request, deadline).await;
    let duration = start.elapsed();

    match &result {
        Ok(value) => {
            metrics.record_success(*value, duration.as_secs_f64());
        }
        Err(e) => {
            warn!("Probe of {} failed: {}", request.target, e);
        }
    }

    Ok(ProbeOutcome {
        metrics,
        result,
        duration,
    })
}

async fn execute(
    fetcher: &Fetcher,
    request: &ProbeRequest,
    deadline: Option<Duration>,
) -> Result<f64, ProbeError> {
    let body = fetcher
        .fetch(&request.target, &request.credentials, deadline)
        .await?;
    debug!("Fetched {} bytes from {}", body.len(), request.target);

    let document = decode_document(&body);
    let found = evaluate(&document, &request.jsonpath)?;
    debug!("Found value {}", found);

    Ok(coerce(found)?)
}
