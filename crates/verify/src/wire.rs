//! JSON bodies exchanged with the verification service.

use serde::{Deserialize, Serialize};

/// Message attached to a successful verification with matching checksums.
pub const MESSAGE_NO_ERROR: &str = "No Error Detected";

/// Message attached to a successful verification with differing checksums.
pub const MESSAGE_CORRUPTED: &str = "Error Detected - Data Corrupted";

/// Response from `/api/verify`.
///
/// Only the checksums and `ok` are required; the echoed inputs and message
/// are informational.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    pub ok: bool,
    pub sender_checksum: i64,
    pub receiver_checksum: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sent_data: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub received_data: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Body of any non-success response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub ok: bool,
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: Some(message.into()),
        }
    }
}
