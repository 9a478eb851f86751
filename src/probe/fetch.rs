//! Remote document fetching for probes.
//!
//! Every request carries an HTTP Basic `Authorization` header, even when no
//! credentials were supplied (the header then encodes `":"`). Certificate
//! verification is skipped unless the configuration asks for it.

use bytes::Bytes;
use reqwest::{Client, Request};
use std::time::Duration;
use tracing::debug;

/// Default timeout for a single fetch when nothing else is configured.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Error returned by [`Fetcher`].
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("invalid target '{target}': {source}")]
    InvalidTarget {
        target: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request to target timed out after {0:?}")]
    Timeout(Duration),

    #[error("request to target failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("failed to read response body: {0}")]
    Body(#[source] reqwest::Error),
}

/// Username and password sent as HTTP Basic credentials.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Settings for the outbound HTTP client.
#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub insecure_skip_verify: bool,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            insecure_skip_verify: true,
            timeout: DEFAULT_FETCH_TIMEOUT,
            user_agent: format!("json-exporter/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// HTTP client used to fetch probe targets.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    timeout: Duration,
}

impl Fetcher {
    pub fn new(settings: &FetchSettings) -> Result<Self, FetchError> {
        let client = Client::builder()
            .danger_accept_invalid_certs(settings.insecure_skip_verify)
            .user_agent(settings.user_agent.as_str())
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self {
            client,
            timeout: settings.timeout,
        })
    }

    /// Configured upper bound for a single fetch.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Builds the authenticated GET request for `target`.
    pub fn build_request(
        &self,
        target: &str,
        credentials: &Credentials,
        timeout: Duration,
    ) -> Result<Request, FetchError> {
        self.client
            .get(target)
            .basic_auth(&credentials.username, Some(&credentials.password))
            .timeout(timeout)
            .build()
            .map_err(|source| FetchError::InvalidTarget {
                target: target.to_string(),
                source,
            })
    }

    /// Fetches `target` and returns the full response body.
    ///
    /// `deadline` narrows the configured timeout, never widens it.
    pub async fn fetch(
        &self,
        target: &str,
        credentials: &Credentials,
        deadline: Option<Duration>,
    ) -> Result<Bytes, FetchError> {
        let timeout = deadline.map_or(self.timeout, |d| d.min(self.timeout));
        let request = self.build_request(target, credentials, timeout)?;

        let response = self.client.execute(request).await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout(timeout)
            } else {
                FetchError::Transport(e)
            }
        })?;

        debug!(
            "Target {} answered with status {}",
            target,
            response.status()
        );

        response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout(timeout)
            } else {
                FetchError::Body(e)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::AUTHORIZATION;

    fn fetcher() -> Fetcher {
        Fetcher::new(&FetchSettings::default()).unwrap()
    }

    fn auth_header(credentials: &Credentials) -> String {
        let request = fetcher()
            .build_request("http://127.0.0.1:1/data", credentials, DEFAULT_FETCH_TIMEOUT)
            .unwrap();
        request
            .headers()
            .get(AUTHORIZATION)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string()
    }

    #[test]
    fn test_basic_auth_header_encodes_credentials() {
        let credentials = Credentials {
            username: "u".into(),
            password: "p".into(),
        };
        // base64("u:p")
        assert_eq!(auth_header(&credentials), "Basic dTpw");
    }

    #[test]
    fn test_basic_auth_header_sent_without_credentials() {
        // base64(":")
        assert_eq!(auth_header(&Credentials::default()), "Basic Og==");
    }

    #[test]
    fn test_request_is_get_with_timeout() {
        let request = fetcher()
            .build_request(
                "https://example.com/status",
                &Credentials::default(),
                Duration::from_secs(3),
            )
            .unwrap();
        assert_eq!(request.method(), reqwest::Method::GET);
        assert_eq!(request.url().as_str(), "https://example.com/status");
        assert_eq!(request.timeout(), Some(&Duration::from_secs(3)));
    }

    #[test]
    fn test_invalid_target_is_rejected() {
        let err = fetcher()
            .build_request("not a url", &Credentials::default(), DEFAULT_FETCH_TIMEOUT)
            .unwrap_err();
        assert!(matches!(err, FetchError::InvalidTarget { .. }));
    }

    /// Serves a JSON body over HTTPS with a freshly generated self-signed cert.
    async fn spawn_self_signed_server() -> std::net::SocketAddr {
        let _ = rustls::crypto::ring::default_provider().install_default();

        let certified = rcgen::generate_simple_self_signed(vec!["localhost".to_string()]).unwrap();
        let tls = axum_server::tls_rustls::RustlsConfig::from_pem(
            certified.cert.pem().into_bytes(),
            certified.key_pair.serialize_pem().into_bytes(),
        )
        .await
        .unwrap();

        let app = axum::Router::new().route("/", axum::routing::get(|| async { r#"{"ok":true}"# }));
        let handle = axum_server::Handle::new();
        let server = axum_server::bind_rustls("127.0.0.1:0".parse().unwrap(), tls)
            .handle(handle.clone());
        tokio::spawn(async move {
            server.serve(app.into_make_service()).await.unwrap();
        });

        handle.listening().await.unwrap()
    }

    #[tokio::test]
    async fn test_self_signed_target_accepted_by_default() {
        let addr = spawn_self_signed_server().await;

        let body = fetcher()
            .fetch(&format!("https://{addr}/"), &Credentials::default(), None)
            .await
            .unwrap();
        assert_eq!(&body[..], br#"{"ok":true}"#);
    }

    #[tokio::test]
    async fn test_self_signed_target_rejected_when_verifying() {
        let addr = spawn_self_signed_server().await;
        let verifying = Fetcher::new(&FetchSettings {
            insecure_skip_verify: false,
            ..FetchSettings::default()
        })
        .unwrap();

        let err = verifying
            .fetch(&format!("https://{addr}/"), &Credentials::default(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Transport(_)), "got: {err:?}");
    }

    #[tokio::test]
    async fn test_unreachable_target_is_an_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = fetcher()
            .fetch(
                &format!("http://{addr}/"),
                &Credentials::default(),
                Some(Duration::from_secs(2)),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Transport(_) | FetchError::Timeout(_)));
    }
}
