//! Rendering seam between the engine and a presentation layer.

use crate::step::{Status, Step};

/// Lifecycle of a simulation run.
///
/// ```text
/// Idle ─► Building ─┬─► StepReady ◄─► (navigation) ─► Completed
///                   │       ▲                             │
///                   │       └──────────── back ───────────┘
///                   └─► Running ◄─► Paused
///                          │
///                          ├─► Completed
///                          └─► Stopped
/// Building / Running ─► Failed
/// ```
///
/// A step-mode run that reached `Completed` may still navigate back to
/// `StepReady`; it stays recorded and never records again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Idle,
    Building,
    /// Step mode, waiting for navigation.
    StepReady,
    Running,
    Paused,
    Completed,
    Stopped,
    Failed,
}

impl Phase {
    /// Whether the run has finished. Only a completed step-mode run can
    /// leave a terminal phase, by navigating back.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Completed | Phase::Stopped | Phase::Failed)
    }
}

/// Receives everything the engine wants shown.
///
/// Calls are synchronous and are expected to return promptly; the engine only
/// suspends between them.
pub trait Renderer: Send {
    /// Reset the timeline.
    fn clear(&mut self);

    /// Append one step to the timeline.
    fn render(&mut self, step: &Step);

    /// Append a free-standing heading that is not part of the step list
    /// (input errors, "Stopped", failures).
    fn notice(&mut self, title: &str, subtitle: Option<&str>);

    /// Update the status pill and, when present, the result card.
    fn status(&mut self, status: &Status);

    /// Observe a phase transition.
    fn phase(&mut self, _phase: Phase) {}
}
