//! Verification client.
//!
//! A [`Verifier`] answers one question: given `(sentData, key, receivedData)`,
//! what are the sender and receiver checksums and do they match? The
//! simulation treats whatever comes back as ground truth.
//!
//! Two implementations ship here:
//!
//! - [`HttpVerifier`]: calls `GET /api/verify` on a verification service
//! - [`LocalVerifier`]: computes the floor-mod checksums in process
//!
//! Neither retries nor caches.

mod client;
mod error;
mod local;
pub mod wire;

pub use client::{HttpVerifier, HttpVerifierConfig};
pub use error::RequestError;
pub use local::LocalVerifier;

use async_trait::async_trait;
use modsum_types::VerificationResult;

/// Computes sender/receiver checksums for a transmitted frame.
#[async_trait]
pub trait Verifier: Send + Sync {
    /// Verify `received_data` against `sent_data` under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError`] when the verification cannot be performed
    /// (transport failure, non-success status, or an unreadable response).
    async fn verify(
        &self,
        sent_data: i64,
        key: i64,
        received_data: i64,
    ) -> Result<VerificationResult, RequestError>;
}

#[async_trait]
impl<V: Verifier + ?Sized> Verifier for std::sync::Arc<V> {
    async fn verify(
        &self,
        sent_data: i64,
        key: i64,
        received_data: i64,
    ) -> Result<VerificationResult, RequestError> {
        (**self).verify(sent_data, key, received_data).await
    }
}
