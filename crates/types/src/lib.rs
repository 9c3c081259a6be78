//! Core types for the modulo checksum simulator.
//!
//! Everything that crosses a crate boundary lives here: the verdict returned
//! by a verifier, the entries kept in the history ledger, and the small enums
//! that select how a simulation plays back.

mod history;
mod modes;
mod verification;

pub use history::{now_iso8601, HistoryEntry, HistorySource};
pub use modes::{ExecutionMode, ParseModeError, PlayMode, Theme};
pub use verification::VerificationResult;
