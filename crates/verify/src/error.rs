//! Verification request errors.

use thiserror::Error;

/// A verification call that did not produce a result.
///
/// The `Display` text is the human-readable message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    /// The service answered with a non-success status.
    #[error("{message}")]
    Status { status: u16, message: String },

    /// The request never completed (connection refused, timeout, ...).
    #[error("{0}")]
    Transport(String),

    /// The service answered successfully but the body was not a verdict.
    #[error("Invalid verification response: {0}")]
    Decode(String),
}

impl RequestError {
    /// Message for a non-success status, falling back to a generic one.
    pub fn status(status: u16, message: Option<String>) -> Self {
        let message = message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| format!("Request failed ({status})"));
        RequestError::Status { status, message }
    }

    /// The message surfaced verbatim to the UI.
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// HTTP status code, if the service answered.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            RequestError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_message_fallback() {
        let err = RequestError::status(503, None);
        assert_eq!(err.message(), "Request failed (503)");
        assert_eq!(err.status_code(), Some(503));

        let err = RequestError::status(400, Some("Key/modulus must be non-zero".into()));
        assert_eq!(err.message(), "Key/modulus must be non-zero");

        let err = RequestError::status(500, Some("  ".into()));
        assert_eq!(err.message(), "Request failed (500)");
    }

    #[test]
    fn test_transport_message_is_verbatim() {
        let err = RequestError::Transport("connection refused".into());
        assert_eq!(err.message(), "connection refused");
        assert_eq!(err.status_code(), None);
    }
}
