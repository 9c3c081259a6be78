//! Step-sequenced checksum simulation engine.
//!
//! A simulation takes a sender's data and key, injects an optional delta in the
//! "channel", verifies both frames, and replays the exchange as eight ordered
//! steps: sender data, key, sender checksum, transmitted frame, channel,
//! receiver checksum, comparison, verdict.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐  parse   ┌───────────────────┐  verify ×2  ┌──────────┐
//! │ SimulationInput │ ───────► │ SimulationRequest │ ──────────► │ Verifier │
//! └─────────────────┘          └───────────────────┘             └────┬─────┘
//!                                                                     │
//!                     ┌───────────────────┐  build_steps  ┌───────────▼───────┐
//!                     │ Vec<Step> (8)     │ ◄──────────── │ SimulationContext │
//!                     └─────────┬─────────┘               └───────────────────┘
//!                               │ auto: render + wait_controlled (pause/cancel)
//!                               │ step: render_to(index) on navigation
//!                               ▼
//!                         Renderer + HistoryLedger (one entry per run)
//! ```
//!
//! [`Session`] owns the single active [`Run`]. A [`Controller`] handle stops or
//! pauses it from input handlers; cancellation is cooperative and observed at
//! step boundaries and every poll tick.

mod config;
mod error;
mod input;
mod render;
mod session;
mod step;
mod token;

pub use config::{SimulationConfig, DEFAULT_POLL_INTERVAL, DEFAULT_SPEED};
pub use error::{InputError, SimulationError};
pub use input::{SimulationContext, SimulationInput, SimulationRequest};
pub use render::{Phase, Renderer};
pub use session::{Run, RunOutcome, SenderChecksum, Session};
pub use step::{build_steps, Block, DigitTone, Status, Step, StepKind, Tone, Verdict, STEP_COUNT};
pub use token::{wait_controlled, CancellationToken, Cancelled, Controller};
