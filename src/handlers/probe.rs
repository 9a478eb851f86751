//! Probe endpoint handler.
//!
//! `/probe?target=<url>&jsonpath=<expr>[&username=<u>&password=<p>]` runs a
//! single probe and answers with that probe's own registry. Every failure
//! is turned into an HTTP status with a fixed body; the underlying error is
//! only logged.

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use std::time::Duration;
use tracing::{debug, error, instrument};

use crate::handlers::metrics::MetricsError;
use crate::probe::{self, FetchError, ProbeError, ProbeOutcome, ProbeParams, ProbeRequest};
use crate::state::SharedState;

/// Header Prometheus uses to announce its scrape timeout.
pub const SCRAPE_TIMEOUT_HEADER: &str = "x-prometheus-scrape-timeout-seconds";

/// Handler for the /probe endpoint.
#[instrument(skip_all)]
pub async fn probe_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Query(params): Query<ProbeParams>,
) -> Response {
    let request = match ProbeRequest::try_from(params) {
        Ok(request) => request,
        Err(e) => {
            debug!("Rejecting probe request: {}", e);
            state.record_probe(e.outcome(), None);
            return e.into_response();
        }
    };
    debug!(
        "Probing {} with JSONPath {}",
        request.target, request.jsonpath
    );

    let deadline = scrape_deadline(&headers, state.scrape_timeout_offset);
    match probe::run_probe(&state.fetcher, &request, deadline).await {
        Ok(outcome) => {
            state.record_probe(outcome.outcome(), Some(outcome.duration));
            outcome.into_response()
        }
        Err(e) => {
            error!("Probe of {} could not run: {}", request.target, e);
            state.record_probe(e.outcome(), None);
            e.into_response()
        }
    }
}

/// Derives the fetch deadline from the scrape timeout announced by Prometheus.
///
/// The offset leaves room for rendering the response; it is dropped when it
/// would consume the whole timeout.
pub fn scrape_deadline(headers: &HeaderMap, offset: Duration) -> Option<Duration> {
    let seconds: f64 = headers
        .get(SCRAPE_TIMEOUT_HEADER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()?;
    if seconds <= 0.0 {
        return None;
    }

    // Non-finite or out of range values leave the configured timeout alone.
    let timeout = Duration::try_from_secs_f64(seconds).ok()?;
    match timeout.checked_sub(offset) {
        Some(d) if !d.is_zero() => Some(d),
        _ => Some(timeout),
    }
}

/// Status for a failed fetch, shared by the error and outcome responses.
fn fetch_status(e: &FetchError) -> StatusCode {
    match e {
        FetchError::InvalidTarget { .. } => StatusCode::BAD_REQUEST,
        FetchError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        _ => StatusCode::BAD_GATEWAY,
    }
}

impl IntoResponse for ProbeError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ProbeError::MissingTarget | ProbeError::MissingJsonPath => {
                return (StatusCode::BAD_REQUEST, self.to_string()).into_response();
            }
            ProbeError::Fetch(e) => {
                let message = match e {
                    FetchError::InvalidTarget { .. } => "Target parameter is invalid",
                    FetchError::Timeout(_) => "Timed out fetching target",
                    _ => "Failed to fetch target",
                };
                (fetch_status(e), message)
            }
            ProbeError::PathNotFound(_) => (StatusCode::NOT_FOUND, "Jsonpath not found"),
            ProbeError::Coercion(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Values could not be parsed to Float64",
            ),
            ProbeError::Registry(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to create probe registry",
            ),
        };
        (status, message).into_response()
    }
}

impl IntoResponse for ProbeOutcome {
    fn into_response(self) -> Response {
        let status = match self.result {
            Ok(_) => StatusCode::OK,
            // Transport failures still answer with the (unset) registry.
            Err(ProbeError::Fetch(ref e)) if !matches!(e, FetchError::InvalidTarget { .. }) => {
                fetch_status(e)
            }
            Err(e) => return e.into_response(),
        };

        match self.metrics.render() {
            Ok(body) => (
                status,
                [(header::CONTENT_TYPE, probe::registry::content_type())],
                body,
            )
                .into_response(),
            Err(e) => {
                error!("Failed to encode probe metrics: {}", e);
                MetricsError::EncodingFailed.into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(SCRAPE_TIMEOUT_HEADER, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_scrape_deadline_applies_offset() {
        let offset = Duration::from_millis(500);
        assert_eq!(
            scrape_deadline(&headers("10"), offset),
            Some(Duration::from_millis(9500))
        );
        assert_eq!(
            scrape_deadline(&headers("0.4"), offset),
            Some(Duration::from_millis(400))
        );
    }

    #[test]
    fn test_scrape_deadline_ignores_garbage() {
        let offset = Duration::from_millis(500);
        assert_eq!(scrape_deadline(&HeaderMap::new(), offset), None);
        assert_eq!(scrape_deadline(&headers("soon"), offset), None);
        assert_eq!(scrape_deadline(&headers("-1"), offset), None);
        assert_eq!(scrape_deadline(&headers("NaN"), offset), None);
        assert_eq!(scrape_deadline(&headers("inf"), offset), None);
    }

    #[test]
    fn test_scrape_deadline_out_of_range_is_ignored() {
        let offset = Duration::from_millis(500);
        assert_eq!(scrape_deadline(&headers("1e20"), offset), None);
        assert_eq!(scrape_deadline(&headers("1e300"), offset), None);
    }

    #[test]
    fn test_fetch_status_matches_outcome_status() {
        let errors = || {
            [
                FetchError::Timeout(Duration::from_secs(1)),
                FetchError::InvalidTarget {
                    target: "x".into(),
                    source: reqwest::Client::new().get("not a url").build().unwrap_err(),
                },
            ]
        };
        let expected = [StatusCode::GATEWAY_TIMEOUT, StatusCode::BAD_REQUEST];

        for (err, status) in errors().into_iter().zip(expected) {
            assert_eq!(fetch_status(&err), status);
            assert_eq!(ProbeError::Fetch(err).into_response().status(), status);
        }

        let outcome = ProbeOutcome {
            metrics: probe::ProbeMetrics::new().unwrap(),
            result: Err(ProbeError::Fetch(FetchError::Timeout(Duration::from_secs(1)))),
            duration: Duration::ZERO,
        };
        assert_eq!(outcome.into_response().status(), StatusCode::GATEWAY_TIMEOUT);
    }

    #[test]
    fn test_error_statuses() {
        let cases = [
            (ProbeError::MissingTarget, StatusCode::BAD_REQUEST),
            (ProbeError::MissingJsonPath, StatusCode::BAD_REQUEST),
            (
                ProbeError::PathNotFound(probe::PathError::NoMatch("$.z".into())),
                StatusCode::NOT_FOUND,
            ),
            (
                ProbeError::Coercion(probe::CoercionError { kind: "string" }),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                ProbeError::Fetch(FetchError::Timeout(Duration::from_secs(1))),
                StatusCode::GATEWAY_TIMEOUT,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }
}
