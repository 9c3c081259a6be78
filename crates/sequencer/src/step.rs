//! The eight visualization steps of a simulation run.
//!
//! Steps are plain data built once per run from a [`SimulationContext`]; a
//! [`Renderer`](crate::Renderer) turns them into output. Replaying a step is
//! therefore free of side effects other than rendering.

use crate::SimulationContext;
use modsum_numeric::mod_explain;
use modsum_types::ExecutionMode;

/// Number of steps in every run.
pub const STEP_COUNT: usize = 8;

/// Visual tone of a status pill or result card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tone {
    Neutral,
    Info,
    Ok,
    Bad,
}

/// Pill text plus an optional result card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub tone: Tone,
    pub pill: String,
    pub title: Option<String>,
    pub body: Option<String>,
}

impl Status {
    pub fn pill(tone: Tone, pill: impl Into<String>) -> Self {
        Self {
            tone,
            pill: pill.into(),
            title: None,
            body: None,
        }
    }

    /// Attach a result card.
    pub fn with_result(mut self, title: impl Into<String>, body: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self.body = Some(body.into());
        self
    }
}

/// How a digit row is highlighted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DigitTone {
    Data,
    Generator,
    Remainder,
    /// Received data that differs from what was sent.
    Flipped,
    /// Received data identical to what was sent.
    Clean,
}

/// One piece of step content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// A value shown digit by digit.
    Digits { value: String, tone: DigitTone },
    /// A row of `name = value` pills.
    KeyValues(Vec<String>),
}

impl Block {
    fn digits(value: i64, tone: DigitTone) -> Self {
        Block::Digits {
            value: value.to_string(),
            tone,
        }
    }

    fn key_values<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Block::KeyValues(items.into_iter().map(Into::into).collect())
    }
}

/// Outcome shown by the final step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verdict {
    /// Checksums match, frame accepted.
    Accepted,
    /// Checksums differ, frame rejected.
    Rejected,
    /// Checksums differ and the run halts on error.
    StoppedOnError,
}

impl Verdict {
    pub fn for_context(ctx: &SimulationContext) -> Self {
        match (ctx.receiver_result.ok, ctx.execution_mode) {
            (true, _) => Verdict::Accepted,
            (false, ExecutionMode::Stop) => Verdict::StoppedOnError,
            (false, ExecutionMode::Continue) => Verdict::Rejected,
        }
    }

    pub fn error_detected(&self) -> bool {
        !matches!(self, Verdict::Accepted)
    }
}

/// What a step shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepKind {
    SenderData,
    Key,
    SenderChecksum,
    Frame,
    Channel,
    ReceiverChecksum,
    Compare,
    Verdict(Verdict),
}

/// One rendered unit of the timeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub index: usize,
    pub kind: StepKind,
    pub title: String,
    pub subtitle: Option<String>,
    pub blocks: Vec<Block>,
    /// Status update applied when the step renders.
    pub status: Option<Status>,
}

impl Step {
    fn new(index: usize, kind: StepKind, title: impl Into<String>, subtitle: impl Into<String>) -> Self {
        Self {
            index,
            kind,
            title: title.into(),
            subtitle: Some(subtitle.into()),
            blocks: Vec::new(),
            status: None,
        }
    }

    fn block(mut self, block: Block) -> Self {
        self.blocks.push(block);
        self
    }

    fn with_status(mut self, status: Status) -> Self {
        self.status = Some(status);
        self
    }
}

/// Build the fixed step list for a run.
pub fn build_steps(ctx: &SimulationContext) -> Vec<Step> {
    let sent = ctx.sent_data;
    let key = ctx.key;
    let received = ctx.received_data;
    let sender_checksum = ctx.sender_result.sender_checksum;
    let receiver = &ctx.receiver_result;

    let frame = || {
        Block::key_values([
            format!("transmitted.frame.data = {sent}"),
            format!("transmitted.frame.checksum = {sender_checksum}"),
        ])
    };

    let channel_subtitle = if ctx.is_error() {
        format!("Error injected: {}", ctx.error_description)
    } else {
        "No error introduced".to_string()
    };

    let verdict = Verdict::for_context(ctx);
    let final_step = match verdict {
        Verdict::StoppedOnError => Step::new(
            7,
            StepKind::Verdict(verdict),
            "Execution Stopped",
            "Error detected - flow terminated by setting",
        )
        .with_status(
            Status::pill(Tone::Bad, "Error Detected (execution stopped)").with_result(
                "Error Detected",
                "Checksums differ. Flow stopped because 'Stop on error' is selected.",
            ),
        ),
        Verdict::Accepted => Step::new(
            7,
            StepKind::Verdict(verdict),
            "Final Result",
            "No Error Detected (frame accepted)",
        )
        .with_status(
            Status::pill(Tone::Ok, "No Error Detected")
                .with_result("No Error Detected", "Checksums match. Data is not corrupted."),
        ),
        Verdict::Rejected => Step::new(
            7,
            StepKind::Verdict(verdict),
            "Final Result",
            "Error Detected - Frame rejected",
        )
        .with_status(
            Status::pill(Tone::Bad, "Error Detected")
                .with_result("Error Detected", "Checksums differ. Data is corrupted."),
        ),
    }
    .block(frame());

    vec![
        Step::new(0, StepKind::SenderData, "Step 1: Sender Data", "User input at sender side")
            .block(Block::digits(sent, DigitTone::Data)),
        Step::new(
            1,
            StepKind::Key,
            "Step 2: Key/Modulus",
            "Key for checksum (any non-zero integer)",
        )
        .block(Block::digits(key, DigitTone::Generator)),
        Step::new(
            2,
            StepKind::SenderChecksum,
            "Step 3: Sender Checksum",
            "senderChecksum = sentData mod key/modulus",
        )
        .block(Block::key_values([
            format!("sentData = {sent}"),
            format!("key/modulus = {key}"),
            format!("checksum = {sender_checksum}"),
            mod_explain(sent, key, sender_checksum),
        ]))
        .block(Block::digits(sender_checksum, DigitTone::Remainder)),
        Step::new(
            3,
            StepKind::Frame,
            "Step 4: Transmitted Frame",
            "Frame contains the data and checksum",
        )
        .block(Block::key_values([
            format!("frame.data = {sent}"),
            format!("frame.checksum = {sender_checksum}"),
        ])),
        Step::new(4, StepKind::Channel, "Step 5: Channel", channel_subtitle)
            .block(Block::key_values([format!("receivedData = {received}")]))
            .block(Block::digits(
                received,
                if ctx.is_error() {
                    DigitTone::Flipped
                } else {
                    DigitTone::Clean
                },
            )),
        Step::new(
            5,
            StepKind::ReceiverChecksum,
            "Step 6: Receiver Checksum",
            "receiverChecksum = receivedData mod key/modulus",
        )
        .block(Block::key_values([
            format!("receivedData = {received}"),
            format!("key/modulus = {key}"),
            format!("checksum = {}", receiver.receiver_checksum),
            mod_explain(received, key, receiver.receiver_checksum),
        ]))
        .block(Block::digits(receiver.receiver_checksum, DigitTone::Remainder)),
        Step::new(
            6,
            StepKind::Compare,
            "Step 7: Compare Checksums",
            "If checksums match, data is accepted",
        )
        .block(Block::key_values([
            format!("senderChecksum = {}", receiver.sender_checksum),
            format!("receiverChecksum = {}", receiver.receiver_checksum),
        ])),
        final_step,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use modsum_types::{PlayMode, VerificationResult};
    use std::time::Duration;

    fn context(sent: i64, key: i64, received: i64, mode: ExecutionMode) -> SimulationContext {
        let m = key.abs();
        SimulationContext {
            sent_data: sent,
            key,
            received_data: received,
            speed: Duration::ZERO,
            execution_mode: mode,
            play_mode: PlayMode::Auto,
            error_description: format!("Add delta {}", received - sent),
            sender_result: VerificationResult::new(sent.rem_euclid(m), sent.rem_euclid(m)),
            receiver_result: VerificationResult::new(sent.rem_euclid(m), received.rem_euclid(m)),
        }
    }

    #[test]
    fn test_always_eight_ordered_steps() {
        let steps = build_steps(&context(10, 3, 14, ExecutionMode::Stop));
        assert_eq!(steps.len(), STEP_COUNT);
        for (i, step) in steps.iter().enumerate() {
            assert_eq!(step.index, i);
        }
        assert_eq!(steps[0].title, "Step 1: Sender Data");
        assert_eq!(steps[6].title, "Step 7: Compare Checksums");
    }

    #[test]
    fn test_sender_checksum_step_explains_modulo() {
        let steps = build_steps(&context(10, 3, 14, ExecutionMode::Stop));
        assert_eq!(
            steps[2].blocks[0],
            Block::KeyValues(vec![
                "sentData = 10".into(),
                "key/modulus = 3".into(),
                "checksum = 1".into(),
                "10 mod 3 = 1  (because 10 = 3×3 + 1)".into(),
            ])
        );
    }

    #[test]
    fn test_channel_step_marks_injected_error() {
        let steps = build_steps(&context(10, 3, 14, ExecutionMode::Stop));
        assert_eq!(steps[4].subtitle.as_deref(), Some("Error injected: Add delta 4"));
        assert_eq!(
            steps[4].blocks[1],
            Block::Digits {
                value: "14".into(),
                tone: DigitTone::Flipped
            }
        );

        let clean = build_steps(&context(10, 3, 10, ExecutionMode::Stop));
        assert_eq!(clean[4].subtitle.as_deref(), Some("No error introduced"));
    }

    #[test]
    fn test_verdict_stop_mode_mismatch() {
        let steps = build_steps(&context(10, 3, 14, ExecutionMode::Stop));
        let last = &steps[7];
        assert_eq!(last.kind, StepKind::Verdict(Verdict::StoppedOnError));
        assert_eq!(last.title, "Execution Stopped");
        assert_eq!(
            last.status.as_ref().unwrap().pill,
            "Error Detected (execution stopped)"
        );
    }

    #[test]
    fn test_verdict_continue_mode_mismatch() {
        let steps = build_steps(&context(10, 3, 14, ExecutionMode::Continue));
        let last = &steps[7];
        assert_eq!(last.kind, StepKind::Verdict(Verdict::Rejected));
        assert_eq!(last.subtitle.as_deref(), Some("Error Detected - Frame rejected"));
    }

    #[test]
    fn test_verdict_match_is_accepted_in_either_mode() {
        for mode in [ExecutionMode::Stop, ExecutionMode::Continue] {
            let steps = build_steps(&context(10, 3, 13, mode));
            assert_eq!(steps[7].kind, StepKind::Verdict(Verdict::Accepted));
            assert_eq!(steps[7].status.as_ref().unwrap().tone, Tone::Ok);
        }
    }
}
