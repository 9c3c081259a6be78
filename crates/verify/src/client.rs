//! HTTP verifier backed by a remote verification service.

use crate::wire::{ErrorResponse, VerifyResponse};
use crate::{RequestError, Verifier};
use async_trait::async_trait;
use modsum_types::VerificationResult;
use reqwest::{Client, Url};
use std::time::Duration;
use tracing::{debug, warn};

/// Path of the verification endpoint, relative to the service root.
pub const VERIFY_PATH: &str = "/api/verify";

/// Configuration for [`HttpVerifier`].
#[derive(Debug, Clone)]
pub struct HttpVerifierConfig {
    /// Root URL of the verification service.
    pub base_url: String,

    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for HttpVerifierConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

impl HttpVerifierConfig {
    /// Create a config pointing at the given service root.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Verifier that asks a remote service via `GET /api/verify`.
pub struct HttpVerifier {
    client: Client,
    endpoint: Url,
}

impl HttpVerifier {
    /// Create a verifier for the service described by `config`.
    ///
    /// # Errors
    ///
    /// Fails if the base URL does not parse or the HTTP client cannot be built.
    pub fn new(config: HttpVerifierConfig) -> Result<Self, RequestError> {
        let base = Url::parse(&config.base_url)
            .map_err(|e| RequestError::Transport(format!("Invalid endpoint {}: {e}", config.base_url)))?;
        let endpoint = base
            .join(VERIFY_PATH)
            .map_err(|e| RequestError::Transport(format!("Invalid endpoint {}: {e}", config.base_url)))?;

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| RequestError::Transport(e.to_string()))?;

        Ok(Self { client, endpoint })
    }

    /// The fully-qualified verification URL.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl Verifier for HttpVerifier {
    async fn verify(
        &self,
        sent_data: i64,
        key: i64,
        received_data: i64,
    ) -> Result<VerificationResult, RequestError> {
        debug!(sent_data, key, received_data, endpoint = %self.endpoint, "Requesting verification");

        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&[
                ("sentData", sent_data),
                ("key", key),
                ("receivedData", received_data),
            ])
            .send()
            .await
            .map_err(|e| RequestError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| RequestError::Transport(e.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorResponse>(&body)
                .ok()
                .and_then(|b| b.message);
            return Err(RequestError::status(status.as_u16(), message));
        }

        let parsed: VerifyResponse =
            serde_json::from_slice(&body).map_err(|e| RequestError::Decode(e.to_string()))?;

        let result = VerificationResult::new(parsed.sender_checksum, parsed.receiver_checksum);
        if result.ok != parsed.ok {
            warn!(
                sender_checksum = parsed.sender_checksum,
                receiver_checksum = parsed.receiver_checksum,
                reported_ok = parsed.ok,
                "Service verdict disagrees with its checksums, using checksum comparison"
            );
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_verify_path() {
        let verifier = HttpVerifier::new(HttpVerifierConfig::new("http://localhost:9000/")).unwrap();
        assert_eq!(verifier.endpoint().as_str(), "http://localhost:9000/api/verify");
    }

    #[test]
    fn test_invalid_base_url() {
        let err = HttpVerifier::new(HttpVerifierConfig::new("not a url")).err().unwrap();
        assert!(matches!(err, RequestError::Transport(_)));
    }

    #[tokio::test]
    async fn test_unreachable_service_is_transport_error() {
        // Port 9 (discard) on loopback is not served in test environments.
        let verifier = HttpVerifier::new(
            HttpVerifierConfig::new("http://127.0.0.1:9").with_timeout(Duration::from_secs(2)),
        )
        .unwrap();
        let err = verifier.verify(1, 2, 1).await.unwrap_err();
        assert!(matches!(err, RequestError::Transport(_)));
    }
}
