//! Simulation configuration.

use modsum_types::{ExecutionMode, PlayMode};
use std::time::Duration;

/// Default delay between steps in auto mode.
pub const DEFAULT_SPEED: Duration = Duration::from_millis(650);

/// Granularity at which pause and cancel are observed while waiting.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(120);

/// Configuration for a simulation run.
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// Delay after each step in auto mode. Zero plays straight through.
    pub speed: Duration,

    /// How often a paused or waiting run re-checks its token.
    pub poll_interval: Duration,

    /// Whether a detected error stops the narrative.
    pub execution_mode: ExecutionMode,

    /// Auto playback or manual stepping.
    pub play_mode: PlayMode,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            speed: DEFAULT_SPEED,
            poll_interval: DEFAULT_POLL_INTERVAL,
            execution_mode: ExecutionMode::default(),
            play_mode: PlayMode::default(),
        }
    }
}

impl SimulationConfig {
    pub fn with_speed(mut self, speed: Duration) -> Self {
        self.speed = speed;
        self
    }

    /// Set the inter-step delay from a signed millisecond value, clamping
    /// negatives to zero.
    pub fn with_speed_ms(mut self, ms: i64) -> Self {
        self.speed = Duration::from_millis(ms.max(0) as u64);
        self
    }

    /// Set the poll interval. A zero interval is raised to one millisecond so
    /// paused waits still yield.
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval.max(Duration::from_millis(1));
        self
    }

    pub fn with_execution_mode(mut self, mode: ExecutionMode) -> Self {
        self.execution_mode = mode;
        self
    }

    pub fn with_play_mode(mut self, mode: PlayMode) -> Self {
        self.play_mode = mode;
        self
    }
}
