//! Simulation errors.

use modsum_verify::RequestError;
use thiserror::Error;

/// Invalid user input, caught before any verification call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("Enter both Data and Key/Modulus.")]
    Missing { field: &'static str },

    #[error("{field} must be an integer, got {value:?}")]
    NotInteger { field: &'static str, value: String },

    #[error("Key/modulus must be non-zero")]
    ZeroKey,

    #[error("Applying delta {delta} to {sent_data} overflows")]
    DeltaOverflow { sent_data: i64, delta: i64 },
}

/// Errors from driving a simulation.
///
/// User cancellation is not an error; it surfaces as
/// [`RunOutcome::Stopped`](crate::RunOutcome::Stopped). The `Display` text
/// of every variant is what the user sees.
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Request(#[from] RequestError),

    #[error("No simulation has been built")]
    NoActiveRun,

    #[error("Step navigation is only available in step mode")]
    NotStepMode,
}
