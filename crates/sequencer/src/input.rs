//! Parsing raw form input into a simulation request, and the per-run context.

use crate::InputError;
use modsum_numeric::parse_strict_integer;
use modsum_types::{ExecutionMode, PlayMode, VerificationResult};
use std::time::Duration;

/// Raw text fields as typed by the user.
#[derive(Debug, Clone, Default)]
pub struct SimulationInput {
    pub sent_data: String,
    pub key: String,
    /// Error injected by the channel. Empty means no error.
    pub delta: String,
}

impl SimulationInput {
    pub fn new(sent_data: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            sent_data: sent_data.into(),
            key: key.into(),
            delta: String::new(),
        }
    }

    pub fn with_delta(mut self, delta: impl Into<String>) -> Self {
        self.delta = delta.into();
        self
    }

    /// Validate and convert into a [`SimulationRequest`].
    pub fn parse(&self) -> Result<SimulationRequest, InputError> {
        let sent_data = required("sentData", &self.sent_data)?;
        let key = required("key", &self.key)?;
        if key == 0 {
            return Err(InputError::ZeroKey);
        }
        let delta = if self.delta.trim().is_empty() {
            0
        } else {
            parse_field("delta", &self.delta)?
        };
        SimulationRequest::new(sent_data, key, delta)
    }
}

pub(crate) fn required(field: &'static str, text: &str) -> Result<i64, InputError> {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed == "-" {
        return Err(InputError::Missing { field });
    }
    parse_field(field, text)
}

fn parse_field(field: &'static str, text: &str) -> Result<i64, InputError> {
    parse_strict_integer(text).ok_or_else(|| InputError::NotInteger {
        field,
        value: text.trim().to_string(),
    })
}

/// A validated simulation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationRequest {
    pub sent_data: i64,
    pub key: i64,
    pub delta: i64,
    pub received_data: i64,
}

impl SimulationRequest {
    /// Build a request, applying `delta` to produce the received data.
    pub fn new(sent_data: i64, key: i64, delta: i64) -> Result<Self, InputError> {
        if key == 0 {
            return Err(InputError::ZeroKey);
        }
        let received_data = sent_data
            .checked_add(delta)
            .ok_or(InputError::DeltaOverflow { sent_data, delta })?;
        Ok(Self {
            sent_data,
            key,
            delta,
            received_data,
        })
    }

    /// Whether the channel alters the data.
    pub fn is_error(&self) -> bool {
        self.received_data != self.sent_data
    }

    /// Human description of what the channel does.
    pub fn error_description(&self) -> String {
        if self.delta == 0 {
            "No error (delta = 0)".to_string()
        } else {
            format!("Add delta {}", self.delta)
        }
    }
}

/// Everything a run needs, fixed once the build phase completes.
#[derive(Debug, Clone)]
pub struct SimulationContext {
    pub sent_data: i64,
    pub key: i64,
    pub received_data: i64,
    pub speed: Duration,
    pub execution_mode: ExecutionMode,
    pub play_mode: PlayMode,
    pub error_description: String,
    /// Verification of the unaltered frame (`sentData` against itself).
    pub sender_result: VerificationResult,
    /// Verification of the frame as received.
    pub receiver_result: VerificationResult,
}

impl SimulationContext {
    pub fn is_error(&self) -> bool {
        self.received_data != self.sent_data
    }
}
