//! The run session: builds simulations, plays or steps them, records history.

use crate::input::required;
use crate::step::{build_steps, Status, Step, Tone, Verdict};
use crate::token::{wait_controlled, Cancelled, CancellationToken, Controller};
use crate::{
    InputError, Phase, Renderer, SimulationConfig, SimulationContext, SimulationError,
    SimulationInput, SimulationRequest,
};
use modsum_ledger::HistoryLedger;
use modsum_numeric::mod_explain;
use modsum_types::{HistoryEntry, HistorySource, PlayMode, VerificationResult};
use modsum_verify::Verifier;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// How a call to [`Session::simulate`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Auto mode played every step.
    Completed { verdict: Verdict },
    /// The run was cancelled. `recorded` tells whether a
    /// `simulation-stopped` entry was written.
    Stopped { recorded: bool },
    /// Step mode is ready at `index`, awaiting navigation.
    Stepping { index: usize },
}

/// Sender checksum from the manual workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SenderChecksum {
    pub checksum: i64,
    /// `mod_explain` derivation, or `"-"` if unavailable.
    pub explanation: String,
}

/// State of one built simulation.
#[derive(Debug)]
pub struct Run {
    ctx: SimulationContext,
    steps: Vec<Step>,
    index: usize,
    recorded: bool,
    phase: Phase,
}

impl Run {
    fn new(ctx: SimulationContext) -> Self {
        let steps = build_steps(&ctx);
        Self {
            ctx,
            steps,
            index: 0,
            recorded: false,
            phase: Phase::Building,
        }
    }

    pub fn context(&self) -> &SimulationContext {
        &self.ctx
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Index of the last rendered step.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Whether this run has written its history entry.
    pub fn recorded(&self) -> bool {
        self.recorded
    }

    pub fn verdict(&self) -> Verdict {
        Verdict::for_context(&self.ctx)
    }

    fn last_index(&self) -> usize {
        self.steps.len().saturating_sub(1)
    }

    fn set_phase(&mut self, phase: Phase, renderer: &mut dyn Renderer) {
        self.phase = phase;
        renderer.phase(phase);
    }

    /// Write this run's history entry unless it already has one.
    ///
    /// Returns `true` if this call recorded. A failed write still counts as
    /// recorded so a retry cannot produce a duplicate.
    fn record_once(&mut self, ledger: &HistoryLedger, source: HistorySource) -> bool {
        if self.recorded {
            return false;
        }
        self.recorded = true;

        let ctx = &self.ctx;
        let entry = HistoryEntry::record(
            ctx.sent_data,
            ctx.key,
            ctx.received_data,
            &ctx.receiver_result,
            source,
        );
        if let Err(e) = ledger.append(entry) {
            warn!(error = %e, source = %source, "Failed to persist history entry");
        } else {
            info!(source = %source, ok = ctx.receiver_result.ok, "Simulation recorded");
        }
        true
    }

    /// Clear and synchronously re-render steps `0..=index`.
    fn render_to(&mut self, index: usize, renderer: &mut dyn Renderer) {
        let index = index.min(self.last_index());
        renderer.clear();
        for step in &self.steps[..=index] {
            show(step, renderer);
        }
        self.index = index;
    }
}

fn show(step: &Step, renderer: &mut dyn Renderer) {
    renderer.render(step);
    if let Some(status) = &step.status {
        renderer.status(status);
    }
}

/// Owns the active run and everything needed to build the next one.
///
/// Only one run exists at a time: building a new simulation cancels and
/// replaces the previous run.
pub struct Session {
    verifier: Arc<dyn Verifier>,
    ledger: HistoryLedger,
    config: SimulationConfig,
    controller: Controller,
    run: Option<Run>,
}

impl Session {
    pub fn new(verifier: Arc<dyn Verifier>, ledger: HistoryLedger, config: SimulationConfig) -> Self {
        Self {
            verifier,
            ledger,
            config,
            controller: Controller::new(),
            run: None,
        }
    }

    /// Use an externally created controller (e.g. one already wired to input handlers).
    pub fn with_controller(mut self, controller: Controller) -> Self {
        self.controller = controller;
        self
    }

    /// Handle for stopping or pausing the active run from elsewhere.
    pub fn controller(&self) -> Controller {
        self.controller.clone()
    }

    pub fn ledger(&self) -> &HistoryLedger {
        &self.ledger
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Settings for runs built after this call.
    pub fn set_config(&mut self, config: SimulationConfig) {
        self.config = config;
    }

    /// The most recently built run, if any.
    pub fn run(&self) -> Option<&Run> {
        self.run.as_ref()
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Simulation
    // ═══════════════════════════════════════════════════════════════════════

    /// Build a simulation from raw input and start it.
    ///
    /// In auto mode this plays to the end (or until cancelled) and records
    /// once. In step mode it renders step 0 and returns; drive it with
    /// [`step_forward`](Self::step_forward) / [`step_backward`](Self::step_backward).
    ///
    /// # Errors
    ///
    /// - [`SimulationError::Input`] for invalid input; nothing is verified or recorded.
    /// - [`SimulationError::Request`] if verification fails; nothing is recorded.
    pub async fn simulate(
        &mut self,
        input: &SimulationInput,
        renderer: &mut dyn Renderer,
    ) -> Result<RunOutcome, SimulationError> {
        let token = self.controller.install();
        self.run = None;

        let result = self.simulate_with(input, &token, renderer).await;
        self.controller.release(&token);
        result
    }

    async fn simulate_with(
        &mut self,
        input: &SimulationInput,
        token: &CancellationToken,
        renderer: &mut dyn Renderer,
    ) -> Result<RunOutcome, SimulationError> {
        renderer.clear();
        renderer.phase(Phase::Building);
        renderer.status(
            &Status::pill(Tone::Info, "Preparing simulation...")
                .with_result("Simulation", "Building steps..."),
        );

        let request = match input.parse() {
            Ok(request) => request,
            Err(e) => {
                render_input_error(&e, renderer);
                return Err(e.into());
            }
        };

        let ctx = match self.build_context(&request, token).await {
            Ok(Some(ctx)) => ctx,
            Ok(None) => {
                info!("Simulation cancelled while building");
                render_stopped(renderer);
                renderer.phase(Phase::Stopped);
                return Ok(RunOutcome::Stopped { recorded: false });
            }
            Err(e) => {
                let message = e.to_string();
                warn!(error = %message, "Simulation failed");
                renderer.status(
                    &Status::pill(Tone::Bad, message.clone())
                        .with_result("Simulation failed", message.clone()),
                );
                renderer.notice("Simulation Error", Some(&message));
                renderer.phase(Phase::Failed);
                return Err(e);
            }
        };

        info!(
            sent_data = ctx.sent_data,
            key = ctx.key,
            received_data = ctx.received_data,
            play_mode = %ctx.play_mode,
            "Simulation built"
        );

        let mut run = Run::new(ctx);
        let outcome = match run.ctx.play_mode {
            PlayMode::Step => {
                run.render_to(0, renderer);
                renderer.status(&Status::pill(Tone::Info, "Step mode: use Next/Back"));
                run.set_phase(Phase::StepReady, renderer);
                RunOutcome::Stepping { index: 0 }
            }
            PlayMode::Auto => {
                run.set_phase(Phase::Running, renderer);
                renderer.status(&Status::pill(Tone::Info, "Running step-by-step workflow..."));
                match self.play(&mut run, token, renderer).await {
                    Ok(()) => {
                        run.record_once(&self.ledger, HistorySource::SimulationAuto);
                        run.set_phase(Phase::Completed, renderer);
                        RunOutcome::Completed {
                            verdict: run.verdict(),
                        }
                    }
                    Err(Cancelled) => {
                        info!(index = run.index, "Simulation stopped by user");
                        render_stopped(renderer);
                        let recorded =
                            run.record_once(&self.ledger, HistorySource::SimulationStopped);
                        run.set_phase(Phase::Stopped, renderer);
                        RunOutcome::Stopped { recorded }
                    }
                }
            }
        };

        self.run = Some(run);
        Ok(outcome)
    }

    /// Verify both frames. `Ok(None)` means the run was cancelled meanwhile.
    async fn build_context(
        &self,
        request: &SimulationRequest,
        token: &CancellationToken,
    ) -> Result<Option<SimulationContext>, SimulationError> {
        let sender_result = self
            .verifier
            .verify(request.sent_data, request.key, request.sent_data)
            .await?;
        if token.is_cancelled() {
            return Ok(None);
        }

        let receiver_result = self
            .verifier
            .verify(request.sent_data, request.key, request.received_data)
            .await?;
        if token.is_cancelled() {
            return Ok(None);
        }

        Ok(Some(SimulationContext {
            sent_data: request.sent_data,
            key: request.key,
            received_data: request.received_data,
            speed: self.config.speed,
            execution_mode: self.config.execution_mode,
            play_mode: self.config.play_mode,
            error_description: request.error_description(),
            sender_result,
            receiver_result,
        }))
    }

    /// Auto playback: render each step, then wait the configured delay.
    async fn play(
        &self,
        run: &mut Run,
        token: &CancellationToken,
        renderer: &mut dyn Renderer,
    ) -> Result<(), Cancelled> {
        renderer.clear();
        for i in 0..run.steps.len() {
            token.check()?;
            show(&run.steps[i], renderer);
            run.index = i;
            debug!(step = i + 1, "Step rendered");
            wait_controlled(run.ctx.speed, token, self.config.poll_interval, renderer).await?;
        }
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Step navigation
    // ═══════════════════════════════════════════════════════════════════════

    /// Advance one step in step mode, re-rendering from the start.
    ///
    /// Reaching the last step records the run once.
    pub fn step_forward(&mut self, renderer: &mut dyn Renderer) -> Result<usize, SimulationError> {
        let run = step_run(&mut self.run)?;
        let target = (run.index + 1).min(run.last_index());
        run.render_to(target, renderer);

        if run.index == run.last_index() {
            run.record_once(&self.ledger, HistorySource::SimulationStep);
            run.set_phase(Phase::Completed, renderer);
        } else {
            run.set_phase(Phase::StepReady, renderer);
        }
        Ok(run.index)
    }

    /// Go back one step in step mode, re-rendering from the start.
    pub fn step_backward(&mut self, renderer: &mut dyn Renderer) -> Result<usize, SimulationError> {
        let run = step_run(&mut self.run)?;
        let target = run.index.saturating_sub(1);
        run.render_to(target, renderer);
        run.set_phase(Phase::StepReady, renderer);
        Ok(run.index)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Manual workflow
    // ═══════════════════════════════════════════════════════════════════════

    /// Compute the sender checksum by verifying `sent_data` against itself.
    /// Nothing is recorded.
    pub async fn compute_sender(
        &self,
        sent_data: &str,
        key: &str,
    ) -> Result<SenderChecksum, SimulationError> {
        let request = SimulationInput::new(sent_data, key).parse()?;
        let result = self
            .verifier
            .verify(request.sent_data, request.key, request.sent_data)
            .await?;
        Ok(SenderChecksum {
            checksum: result.sender_checksum,
            explanation: mod_explain(request.sent_data, request.key, result.sender_checksum),
        })
    }

    /// Verify a received frame and record it as `manual-verify`.
    pub async fn verify_frame(
        &self,
        sent_data: &str,
        key: &str,
        received_data: &str,
    ) -> Result<VerificationResult, SimulationError> {
        let request = SimulationInput::new(sent_data, key).parse()?;
        let received = required("receivedData", received_data)?;

        let result = self
            .verifier
            .verify(request.sent_data, request.key, received)
            .await?;

        let entry = HistoryEntry::record(
            request.sent_data,
            request.key,
            received,
            &result,
            HistorySource::ManualVerify,
        );
        if let Err(e) = self.ledger.append(entry) {
            warn!(error = %e, "Failed to persist history entry");
        }
        info!(
            sent_data = request.sent_data,
            key = request.key,
            received_data = received,
            ok = result.ok,
            "Frame verified"
        );
        Ok(result)
    }
}

fn step_run(run: &mut Option<Run>) -> Result<&mut Run, SimulationError> {
    let run = run.as_mut().ok_or(SimulationError::NoActiveRun)?;
    if run.ctx.play_mode != PlayMode::Step {
        return Err(SimulationError::NotStepMode);
    }
    Ok(run)
}

fn render_input_error(error: &InputError, renderer: &mut dyn Renderer) {
    debug!(error = %error, "Rejected simulation input");
    renderer.status(
        &Status::pill(Tone::Bad, "Enter data + key/modulus")
            .with_result("Input error", error.to_string()),
    );
    renderer.notice("Input Error", Some(&error.to_string()));
    renderer.phase(Phase::Failed);
}

fn render_stopped(renderer: &mut dyn Renderer) {
    renderer.status(&Status::pill(Tone::Bad, "Simulation stopped"));
    renderer.notice("Stopped", Some("Simulation cancelled by user"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Block, StepKind};
    use async_trait::async_trait;
    use modsum_ledger::{KeyValueStore, LedgerConfig, MemoryStore, StoreError};
    use modsum_types::ExecutionMode;
    use modsum_verify::{LocalVerifier, RequestError};
    use std::time::Duration;
    use tokio::time::Instant;
    use tracing_test::traced_test;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Event {
        Clear,
        Render(usize),
        Notice(String),
        Pill(String),
        Phase(Phase),
    }

    /// Records everything; optionally pauses or cancels when a given step renders.
    #[derive(Default)]
    struct RecordingRenderer {
        events: Vec<Event>,
        controller: Option<Controller>,
        pause_at: Option<usize>,
        cancel_at: Option<usize>,
    }

    impl RecordingRenderer {
        fn controlling(controller: Controller) -> Self {
            Self {
                controller: Some(controller),
                ..Default::default()
            }
        }

        fn rendered(&self) -> Vec<usize> {
            self.events
                .iter()
                .filter_map(|e| match e {
                    Event::Render(i) => Some(*i),
                    _ => None,
                })
                .collect()
        }

        /// Steps rendered since the last clear.
        fn visible(&self) -> Vec<usize> {
            let start = self
                .events
                .iter()
                .rposition(|e| *e == Event::Clear)
                .map_or(0, |i| i + 1);
            self.events[start..]
                .iter()
                .filter_map(|e| match e {
                    Event::Render(i) => Some(*i),
                    _ => None,
                })
                .collect()
        }

        fn phases(&self) -> Vec<Phase> {
            self.events
                .iter()
                .filter_map(|e| match e {
                    Event::Phase(p) => Some(*p),
                    _ => None,
                })
                .collect()
        }

        fn last_pill(&self) -> Option<&str> {
            self.events.iter().rev().find_map(|e| match e {
                Event::Pill(p) => Some(p.as_str()),
                _ => None,
            })
        }
    }

    impl Renderer for RecordingRenderer {
        fn clear(&mut self) {
            self.events.push(Event::Clear);
        }

        fn render(&mut self, step: &Step) {
            self.events.push(Event::Render(step.index));
            if let Some(controller) = &self.controller {
                if self.pause_at == Some(step.index) {
                    controller.toggle_pause();
                }
                if self.cancel_at == Some(step.index) {
                    controller.cancel();
                }
            }
        }

        fn notice(&mut self, title: &str, _subtitle: Option<&str>) {
            self.events.push(Event::Notice(title.to_string()));
        }

        fn status(&mut self, status: &Status) {
            self.events.push(Event::Pill(status.pill.clone()));
        }

        fn phase(&mut self, phase: Phase) {
            self.events.push(Event::Phase(phase));
        }
    }

    struct FailingVerifier;

    #[async_trait]
    impl Verifier for FailingVerifier {
        async fn verify(&self, _: i64, _: i64, _: i64) -> Result<VerificationResult, RequestError> {
            Err(RequestError::status(503, None))
        }
    }

    /// Cancels the active run the first time it is asked to verify.
    struct CancellingVerifier(Controller);

    #[async_trait]
    impl Verifier for CancellingVerifier {
        async fn verify(
            &self,
            sent_data: i64,
            key: i64,
            received_data: i64,
        ) -> Result<VerificationResult, RequestError> {
            self.0.cancel();
            LocalVerifier::new().verify(sent_data, key, received_data).await
        }
    }

    /// Reports checksums shifted by a whole modulus, as a service using a
    /// different remainder range would.
    struct ShiftedVerifier;

    #[async_trait]
    impl Verifier for ShiftedVerifier {
        async fn verify(
            &self,
            sent_data: i64,
            key: i64,
            received_data: i64,
        ) -> Result<VerificationResult, RequestError> {
            let local = LocalVerifier::new().verify(sent_data, key, received_data).await?;
            let m = key.abs();
            Ok(VerificationResult::new(
                local.sender_checksum + m,
                local.receiver_checksum + m,
            ))
        }
    }

    struct ReadOnlyStore;

    impl KeyValueStore for ReadOnlyStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Ok(None)
        }

        fn set(&self, key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::InvalidKey(key.to_string()))
        }
    }

    fn memory_ledger() -> HistoryLedger {
        HistoryLedger::new(Arc::new(MemoryStore::new()), LedgerConfig::default())
    }

    fn session(config: SimulationConfig) -> Session {
        Session::new(Arc::new(LocalVerifier::new()), memory_ledger(), config)
    }

    fn step_config() -> SimulationConfig {
        SimulationConfig::default().with_play_mode(PlayMode::Step)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Auto mode
    // ═══════════════════════════════════════════════════════════════════════

    #[tokio::test(start_paused = true)]
    async fn test_auto_run_detects_delta() {
        let mut session = session(SimulationConfig::default());
        let mut renderer = RecordingRenderer::default();

        let start = Instant::now();
        let outcome = session
            .simulate(&SimulationInput::new("10", "3").with_delta("4"), &mut renderer)
            .await
            .unwrap();

        assert_eq!(
            outcome,
            RunOutcome::Completed {
                verdict: Verdict::StoppedOnError
            }
        );
        assert_eq!(renderer.rendered(), (0..8).collect::<Vec<_>>());
        assert_eq!(renderer.last_pill(), Some("Error Detected (execution stopped)"));

        // Delay follows every step, including the last.
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(8 * 650), "{elapsed:?}");
        assert!(elapsed < Duration::from_millis(8 * 650 + 100), "{elapsed:?}");

        let entries = session.ledger().entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].source, "simulation-auto");
        assert_eq!(entries[0].sent_data, 10);
        assert_eq!(entries[0].received_data, 14);
        assert_eq!(entries[0].sender_checksum, 1);
        assert_eq!(entries[0].receiver_checksum, 2);
        assert!(!entries[0].ok);

        let run = session.run().unwrap();
        assert!(run.recorded());
        assert_eq!(run.phase(), Phase::Completed);
        assert!(!session.controller().is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_run_without_error_is_accepted() {
        let mut session = session(SimulationConfig::default().with_speed_ms(0));
        let mut renderer = RecordingRenderer::default();

        let outcome = session
            .simulate(&SimulationInput::new("10", "3"), &mut renderer)
            .await
            .unwrap();

        assert_eq!(
            outcome,
            RunOutcome::Completed {
                verdict: Verdict::Accepted
            }
        );
        let entries = session.ledger().entries();
        assert_eq!(entries[0].receiver_checksum, 1);
        assert!(entries[0].ok);
    }

    #[tokio::test(start_paused = true)]
    async fn test_continue_mode_rejects_frame() {
        let config = SimulationConfig::default()
            .with_speed_ms(0)
            .with_execution_mode(ExecutionMode::Continue);
        let mut session = session(config);
        let mut renderer = RecordingRenderer::default();

        let outcome = session
            .simulate(&SimulationInput::new("10", "3").with_delta("4"), &mut renderer)
            .await
            .unwrap();

        assert_eq!(
            outcome,
            RunOutcome::Completed {
                verdict: Verdict::Rejected
            }
        );
        assert_eq!(renderer.last_pill(), Some("Error Detected"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_undetectable_delta_is_accepted() {
        let mut session = session(SimulationConfig::default().with_speed_ms(0));
        let outcome = session
            .simulate(
                &SimulationInput::new("10", "3").with_delta("3"),
                &mut RecordingRenderer::default(),
            )
            .await
            .unwrap();

        assert_eq!(
            outcome,
            RunOutcome::Completed {
                verdict: Verdict::Accepted
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_mid_run_records_stopped_once() {
        let mut session = session(SimulationConfig::default());
        let mut renderer = RecordingRenderer {
            cancel_at: Some(3),
            ..RecordingRenderer::controlling(session.controller())
        };

        let outcome = session
            .simulate(&SimulationInput::new("10", "3").with_delta("4"), &mut renderer)
            .await
            .unwrap();

        assert_eq!(outcome, RunOutcome::Stopped { recorded: true });
        assert_eq!(renderer.rendered(), vec![0, 1, 2, 3]);
        assert!(renderer
            .events
            .contains(&Event::Notice("Stopped".to_string())));
        assert_eq!(renderer.last_pill(), Some("Simulation stopped"));

        let entries = session.ledger().entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].source, "simulation-stopped");
        assert_eq!(session.run().unwrap().phase(), Phase::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_build_records_nothing() {
        let controller = Controller::new();
        let mut session = Session::new(
            Arc::new(CancellingVerifier(controller.clone())),
            memory_ledger(),
            SimulationConfig::default(),
        )
        .with_controller(controller);
        let mut renderer = RecordingRenderer::default();

        let outcome = session
            .simulate(&SimulationInput::new("10", "3").with_delta("4"), &mut renderer)
            .await
            .unwrap();

        assert_eq!(outcome, RunOutcome::Stopped { recorded: false });
        assert!(renderer.rendered().is_empty());
        assert!(session.ledger().is_empty());
        assert!(session.run().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_then_resume_completes_once() {
        let mut session = session(SimulationConfig::default());
        let controller = session.controller();
        let mut renderer = RecordingRenderer {
            pause_at: Some(2),
            ..RecordingRenderer::controlling(controller.clone())
        };

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(3)).await;
            assert_eq!(controller.toggle_pause(), Some(false));
        });

        let start = Instant::now();
        let outcome = session
            .simulate(&SimulationInput::new("10", "3").with_delta("4"), &mut renderer)
            .await
            .unwrap();

        assert!(matches!(outcome, RunOutcome::Completed { .. }));
        assert!(start.elapsed() >= Duration::from_millis(6800));

        let phases = renderer.phases();
        let paused = phases.iter().position(|p| *p == Phase::Paused).unwrap();
        assert_eq!(phases[paused + 1], Phase::Running);
        assert_eq!(session.ledger().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_run_cancels_previous_token() {
        let mut session = session(SimulationConfig::default().with_speed_ms(0));
        let stale = session.controller().install();

        session
            .simulate(&SimulationInput::new("10", "3"), &mut RecordingRenderer::default())
            .await
            .unwrap();

        assert!(stale.is_cancelled());
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Failures
    // ═══════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn test_input_error_aborts_before_verification() {
        let mut session = Session::new(
            Arc::new(FailingVerifier),
            memory_ledger(),
            SimulationConfig::default(),
        );
        let mut renderer = RecordingRenderer::default();

        let err = session
            .simulate(&SimulationInput::new("", "3"), &mut renderer)
            .await
            .unwrap_err();

        // FailingVerifier would have produced a Request error.
        assert!(matches!(err, SimulationError::Input(InputError::Missing { .. })));
        assert_eq!(renderer.last_pill(), Some("Enter data + key/modulus"));
        assert!(session.ledger().is_empty());
    }

    #[tokio::test]
    async fn test_request_failure_is_surfaced() {
        let mut session = Session::new(
            Arc::new(FailingVerifier),
            memory_ledger(),
            SimulationConfig::default(),
        );
        let mut renderer = RecordingRenderer::default();

        let err = session
            .simulate(&SimulationInput::new("10", "3"), &mut renderer)
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Request failed (503)");
        assert_eq!(renderer.last_pill(), Some("Request failed (503)"));
        assert!(renderer
            .events
            .contains(&Event::Notice("Simulation Error".to_string())));
        assert_eq!(renderer.phases().last(), Some(&Phase::Failed));
        assert!(session.ledger().is_empty());
        assert!(!session.controller().is_active());
    }

    #[tokio::test(start_paused = true)]
    #[traced_test]
    async fn test_persistence_failure_does_not_fail_run() {
        let ledger = HistoryLedger::new(Arc::new(ReadOnlyStore), LedgerConfig::default());
        let mut session = Session::new(
            Arc::new(LocalVerifier::new()),
            ledger,
            SimulationConfig::default().with_speed_ms(0),
        );

        let outcome = session
            .simulate(&SimulationInput::new("10", "3"), &mut RecordingRenderer::default())
            .await
            .unwrap();

        assert!(matches!(outcome, RunOutcome::Completed { .. }));
        assert!(session.run().unwrap().recorded());
        assert!(logs_contain("Failed to persist history entry"));
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Step mode
    // ═══════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn test_step_mode_records_once_at_end() {
        let mut session = session(step_config());
        let mut renderer = RecordingRenderer::default();

        let outcome = session
            .simulate(&SimulationInput::new("10", "3").with_delta("4"), &mut renderer)
            .await
            .unwrap();
        assert_eq!(outcome, RunOutcome::Stepping { index: 0 });
        assert_eq!(renderer.visible(), vec![0]);
        assert!(!session.controller().is_active());

        for expected in 1..=6 {
            assert_eq!(session.step_forward(&mut renderer).unwrap(), expected);
            assert!(session.ledger().is_empty());
        }

        assert_eq!(session.step_forward(&mut renderer).unwrap(), 7);
        assert_eq!(renderer.visible(), (0..8).collect::<Vec<_>>());
        assert_eq!(session.run().unwrap().phase(), Phase::Completed);

        // Navigating around the end never records again.
        assert_eq!(session.step_forward(&mut renderer).unwrap(), 7);
        assert_eq!(session.step_backward(&mut renderer).unwrap(), 6);
        assert_eq!(renderer.visible(), (0..7).collect::<Vec<_>>());
        assert_eq!(session.run().unwrap().phase(), Phase::StepReady);
        assert!(session.run().unwrap().recorded());
        assert_eq!(session.step_forward(&mut renderer).unwrap(), 7);
        assert_eq!(session.run().unwrap().phase(), Phase::Completed);

        let entries = session.ledger().entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].source, "simulation-step");
    }

    #[tokio::test]
    async fn test_step_backward_stops_at_zero() {
        let mut session = session(step_config());
        let mut renderer = RecordingRenderer::default();
        session
            .simulate(&SimulationInput::new("10", "3"), &mut renderer)
            .await
            .unwrap();

        assert_eq!(session.step_backward(&mut renderer).unwrap(), 0);
        assert_eq!(renderer.visible(), vec![0]);
        assert_eq!(session.run().unwrap().phase(), Phase::StepReady);
    }

    #[tokio::test]
    async fn test_step_navigation_requires_step_run() {
        let mut session = session(SimulationConfig::default().with_speed_ms(0));
        let mut renderer = RecordingRenderer::default();

        assert!(matches!(
            session.step_forward(&mut renderer),
            Err(SimulationError::NoActiveRun)
        ));

        session
            .simulate(&SimulationInput::new("10", "3"), &mut renderer)
            .await
            .unwrap();
        assert!(matches!(
            session.step_backward(&mut renderer),
            Err(SimulationError::NotStepMode)
        ));
    }

    #[tokio::test]
    async fn test_rebuild_resets_recorded_flag() {
        let mut session = session(step_config());
        let mut renderer = RecordingRenderer::default();
        let input = SimulationInput::new("10", "3");

        session.simulate(&input, &mut renderer).await.unwrap();
        for _ in 0..7 {
            session.step_forward(&mut renderer).unwrap();
        }
        assert!(session.run().unwrap().recorded());

        session.simulate(&input, &mut renderer).await.unwrap();
        assert!(!session.run().unwrap().recorded());
        for _ in 0..7 {
            session.step_forward(&mut renderer).unwrap();
        }
        assert_eq!(session.ledger().len(), 2);
    }

    #[tokio::test]
    async fn test_step_run_exposes_verdict_step() {
        let mut session = session(step_config());
        session
            .simulate(
                &SimulationInput::new("10", "3").with_delta("4"),
                &mut RecordingRenderer::default(),
            )
            .await
            .unwrap();

        let run = session.run().unwrap();
        assert_eq!(run.steps().len(), 8);
        assert_eq!(
            run.steps()[7].kind,
            StepKind::Verdict(Verdict::StoppedOnError)
        );
        assert_eq!(run.context().error_description, "Add delta 4");
    }

    #[tokio::test]
    async fn test_disagreeing_checksum_is_not_explained() {
        let mut session = Session::new(Arc::new(ShiftedVerifier), memory_ledger(), step_config());
        session
            .simulate(&SimulationInput::new("13", "5"), &mut RecordingRenderer::default())
            .await
            .unwrap();

        let steps = session.run().unwrap().steps();
        for index in [2, 5] {
            let Block::KeyValues(items) = &steps[index].blocks[0] else {
                panic!("step {index} has no key/value row");
            };
            assert_eq!(items[2], "checksum = 8");
            assert_eq!(items[3], "-");
        }

        let sender = session.compute_sender("13", "5").await.unwrap();
        assert_eq!(sender.checksum, 8);
        assert_eq!(sender.explanation, "-");
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Manual workflow
    // ═══════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn test_compute_sender_does_not_record() {
        let session = session(SimulationConfig::default());
        let sender = session.compute_sender("-7", "5").await.unwrap();

        assert_eq!(sender.checksum, 3);
        assert_eq!(sender.explanation, "-7 mod 5 = 3  (because -7 = -2×5 + 3)");
        assert!(session.ledger().is_empty());
    }

    #[tokio::test]
    async fn test_verify_frame_records_manual_entry() {
        let session = session(SimulationConfig::default());
        let result = session.verify_frame("10", "3", "14").await.unwrap();

        assert_eq!(result, VerificationResult::new(1, 2));
        let entries = session.ledger().entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].source, "manual-verify");
        assert_eq!(entries[0].received_data, 14);
    }

    #[tokio::test]
    async fn test_verify_frame_requires_received_data() {
        let session = session(SimulationConfig::default());
        let err = session.verify_frame("10", "3", " ").await.unwrap_err();
        assert!(matches!(
            err,
            SimulationError::Input(InputError::Missing {
                field: "receivedData"
            })
        ));
        assert!(session.ledger().is_empty());
    }
}
