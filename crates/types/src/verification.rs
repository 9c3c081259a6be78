//! Verification verdicts.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Sender and receiver checksums for one (data, key, receivedData) triple.
///
/// `ok` holds iff both checksums are equal. Construct through
/// [`VerificationResult::new`] so the flag can never disagree with the values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResult {
    pub sender_checksum: i64,
    pub receiver_checksum: i64,
    pub ok: bool,
}

impl VerificationResult {
    /// Build a result, deriving `ok` from the two checksums.
    pub fn new(sender_checksum: i64, receiver_checksum: i64) -> Self {
        Self {
            sender_checksum,
            receiver_checksum,
            ok: sender_checksum == receiver_checksum,
        }
    }

    /// Whether the receiver detected a mismatch.
    pub fn error_detected(&self) -> bool {
        !self.ok
    }
}

impl fmt::Display for VerificationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "sender={} receiver={} {}",
            self.sender_checksum,
            self.receiver_checksum,
            if self.ok { "OK" } else { "ERROR" }
        )
    }
}
