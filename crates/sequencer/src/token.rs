//! Cooperative cancellation and pause for a single run.

use crate::{Phase, Renderer};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Marker returned when a wait observes cancellation.
///
/// Distinct from any failure so the driver can route it to the "stopped"
/// path instead of the error path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cancelled;

#[derive(Debug, Default)]
struct TokenState {
    cancelled: AtomicBool,
    paused: AtomicBool,
}

/// Shared `{cancelled, paused}` flags for one run.
///
/// Clones share state. Checked by the driver at every step boundary and every
/// poll tick; never interrupts work in flight.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    state: Arc<TokenState>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.state.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.state.cancelled.load(Ordering::SeqCst)
    }

    pub fn set_paused(&self, paused: bool) {
        self.state.paused.store(paused, Ordering::SeqCst);
    }

    /// Flip the pause flag, returning the new value.
    pub fn toggle_pause(&self) -> bool {
        !self.state.paused.fetch_xor(true, Ordering::SeqCst)
    }

    pub fn is_paused(&self) -> bool {
        self.state.paused.load(Ordering::SeqCst)
    }

    /// Return `Err(Cancelled)` if the token has been cancelled.
    pub fn check(&self) -> Result<(), Cancelled> {
        if self.is_cancelled() {
            Err(Cancelled)
        } else {
            Ok(())
        }
    }

    fn same(&self, other: &CancellationToken) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }
}

/// Sleep for `duration` in `poll`-sized chunks, honouring pause and cancel.
///
/// A zero duration returns immediately. While paused the wait does not
/// progress; it re-checks every `poll` until resumed or cancelled. Pause
/// transitions are reported to `renderer` as [`Phase::Paused`] /
/// [`Phase::Running`].
pub async fn wait_controlled(
    duration: Duration,
    token: &CancellationToken,
    poll: Duration,
    renderer: &mut dyn Renderer,
) -> Result<(), Cancelled> {
    if duration.is_zero() {
        return Ok(());
    }
    let poll = poll.max(Duration::from_millis(1));

    let mut remaining = duration;
    while !remaining.is_zero() {
        token.check()?;

        if token.is_paused() {
            debug!("Run paused");
            renderer.phase(Phase::Paused);
            while token.is_paused() {
                token.check()?;
                tokio::time::sleep(poll).await;
            }
            token.check()?;
            debug!("Run resumed");
            renderer.phase(Phase::Running);
        }

        let chunk = remaining.min(poll);
        tokio::time::sleep(chunk).await;
        remaining -= chunk;
    }
    Ok(())
}

/// Handle to whichever run is currently active.
///
/// Cloneable and `Send`, so input handlers (keyboard, signals, other tasks)
/// can stop or pause the run while the session drives it. At most one token
/// is installed at a time; installing a new one cancels the previous.
#[derive(Debug, Clone, Default)]
pub struct Controller {
    active: Arc<Mutex<Option<CancellationToken>>>,
}

impl Controller {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel any existing run and install a fresh token.
    pub(crate) fn install(&self) -> CancellationToken {
        let mut active = self.active.lock();
        if let Some(previous) = active.take() {
            previous.cancel();
            previous.set_paused(false);
        }
        let token = CancellationToken::new();
        *active = Some(token.clone());
        token
    }

    /// Retire `token`: cancel it and uninstall it if it is still current.
    pub(crate) fn release(&self, token: &CancellationToken) {
        token.cancel();
        token.set_paused(false);
        let mut active = self.active.lock();
        if active.as_ref().is_some_and(|t| t.same(token)) {
            *active = None;
        }
    }

    /// Stop the active run. Returns `false` if nothing is running.
    pub fn cancel(&self) -> bool {
        match self.active.lock().as_ref() {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// Pause or resume the active run, returning the new paused state, or
    /// `None` if nothing is running.
    pub fn toggle_pause(&self) -> Option<bool> {
        self.active.lock().as_ref().map(CancellationToken::toggle_pause)
    }

    /// Whether a run is active and not cancelled.
    pub fn is_active(&self) -> bool {
        self.active
            .lock()
            .as_ref()
            .is_some_and(|t| !t.is_cancelled())
    }

    pub fn is_paused(&self) -> bool {
        self.active.lock().as_ref().is_some_and(CancellationToken::is_paused)
    }
}
