//! History ledger entries.

use crate::VerificationResult;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::SystemTime;

/// Where a history entry came from.
///
/// Entries store the tag as a plain string so logs written by other tools
/// (or older versions) still load; this enum names the tags we produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HistorySource {
    /// A one-off verification from the manual workflow.
    ManualVerify,
    /// An auto-mode simulation that played to the end.
    SimulationAuto,
    /// A step-mode simulation navigated to its final step.
    SimulationStep,
    /// An auto-mode simulation cancelled after its results were known.
    SimulationStopped,
}

impl HistorySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            HistorySource::ManualVerify => "manual-verify",
            HistorySource::SimulationAuto => "simulation-auto",
            HistorySource::SimulationStep => "simulation-step",
            HistorySource::SimulationStopped => "simulation-stopped",
        }
    }
}

impl fmt::Display for HistorySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recorded verification or simulation outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// ISO-8601 timestamp.
    pub time: String,
    pub sent_data: i64,
    #[serde(alias = "prime")]
    pub key: i64,
    pub received_data: i64,
    pub sender_checksum: i64,
    pub receiver_checksum: i64,
    pub ok: bool,
    #[serde(default)]
    pub source: String,
}

impl HistoryEntry {
    /// Build an entry stamped with the current time.
    pub fn record(
        sent_data: i64,
        key: i64,
        received_data: i64,
        result: &VerificationResult,
        source: HistorySource,
    ) -> Self {
        Self::at(now_iso8601(), sent_data, key, received_data, result, source)
    }

    /// Build an entry with an explicit timestamp.
    pub fn at(
        time: impl Into<String>,
        sent_data: i64,
        key: i64,
        received_data: i64,
        result: &VerificationResult,
        source: HistorySource,
    ) -> Self {
        Self {
            time: time.into(),
            sent_data,
            key,
            received_data,
            sender_checksum: result.sender_checksum,
            receiver_checksum: result.receiver_checksum,
            ok: result.ok,
            source: source.as_str().to_string(),
        }
    }
}

/// Current wall-clock time as an RFC 3339 / ISO-8601 string with millisecond precision.
pub fn now_iso8601() -> String {
    humantime::format_rfc3339_millis(SystemTime::now()).to_string()
}
