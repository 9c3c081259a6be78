//! In-process verifier.

use crate::{RequestError, Verifier};
use async_trait::async_trait;
use modsum_numeric::{checksum, NumericError};
use modsum_types::VerificationResult;

/// Verifier that computes `data mod |key|` locally.
///
/// Behaves like the verification service: a zero key is rejected with a
/// 400-style [`RequestError`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalVerifier;

impl LocalVerifier {
    pub fn new() -> Self {
        Self
    }

    /// Synchronous form of [`Verifier::verify`].
    pub fn verify_now(
        &self,
        sent_data: i64,
        key: i64,
        received_data: i64,
    ) -> Result<VerificationResult, NumericError> {
        let sender = checksum(sent_data, key)?;
        let receiver = checksum(received_data, key)?;
        Ok(VerificationResult::new(sender, receiver))
    }
}

#[async_trait]
impl Verifier for LocalVerifier {
    async fn verify(
        &self,
        sent_data: i64,
        key: i64,
        received_data: i64,
    ) -> Result<VerificationResult, RequestError> {
        self.verify_now(sent_data, key, received_data)
            .map_err(|e| RequestError::status(400, Some(e.to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_identical_data_always_matches() {
        let verifier = LocalVerifier::new();
        for (data, key) in [(0, 1), (10, 3), (-7, 5), (i64::MAX, -2), (i64::MIN, 97)] {
            let result = verifier.verify(data, key, data).await.unwrap();
            assert!(result.ok, "data={data} key={key}");
        }
    }

    #[tokio::test]
    async fn test_detects_delta() {
        let result = LocalVerifier::new().verify(10, 3, 14).await.unwrap();
        assert_eq!(result.sender_checksum, 1);
        assert_eq!(result.receiver_checksum, 2);
        assert!(!result.ok);
    }

    #[tokio::test]
    async fn test_multiple_of_key_is_undetected() {
        let result = LocalVerifier::new().verify(10, 3, 13).await.unwrap();
        assert!(result.ok);
    }

    #[tokio::test]
    async fn test_zero_key_is_rejected() {
        let err = LocalVerifier::new().verify(10, 0, 10).await.unwrap_err();
        assert_eq!(err.status_code(), Some(400));
        assert_eq!(err.message(), "Key/modulus must be non-zero");
    }
}
