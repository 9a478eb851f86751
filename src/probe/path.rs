//! JSONPath lookup against a fetched document.

use serde_json::Value;
use serde_json_path::JsonPath;
use tracing::debug;

/// Error returned when a path expression does not select a node.
#[derive(Debug, thiserror::Error)]
pub enum PathError {
    #[error("invalid JSONPath expression '{expression}': {reason}")]
    InvalidSyntax { expression: String, reason: String },

    #[error("JSONPath expression '{0}' matched no node")]
    NoMatch(String),
}

/// Evaluates `expression` against `document` and returns the first match.
///
/// Queries that select several nodes (wildcards, slices, descendants)
/// resolve to the first node in document order.
pub fn evaluate<'a>(document: &'a Value, expression: &str) -> Result<&'a Value, PathError> {
    let path = JsonPath::parse(expression).map_err(|e| PathError::InvalidSyntax {
        expression: expression.to_string(),
        reason: e.to_string(),
    })?;

    path.query(document)
        .first()
        .ok_or_else(|| PathError::NoMatch(expression.to_string()))
}

/// Decodes a response body into a JSON document.
///
/// Bodies that are not valid JSON decode to `null`, so that the subsequent
/// lookup reports the path as not found.
pub fn decode_document(body: &[u8]) -> Value {
    match serde_json::from_slice(body) {
        Ok(document) => document,
        Err(e) => {
            debug!("Response body is not valid JSON, using null document: {}", e);
            Value::Null
        }
    }
}
