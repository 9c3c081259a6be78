//! Plain-text renderer for the simulation timeline.

use modsum_sequencer::{Block, DigitTone, Phase, Renderer, Status, Step, Tone};
use std::io::Write;
use tracing::{debug, warn};

/// Writes the timeline as indented text.
///
/// ```text
/// ── Step 3: Sender Checksum
///    senderChecksum = sentData mod key/modulus
///    [sentData = 10] [key/modulus = 3] [checksum = 1]
///    1   (remainder)
///    ● Running step-by-step workflow...
/// ```
pub struct TerminalRenderer<W> {
    out: W,
}

impl TerminalRenderer<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, text: &str) {
        if let Err(e) = self.out.write_all(text.as_bytes()).and_then(|()| self.out.flush()) {
            warn!(error = %e, "Failed to write to terminal");
        }
    }
}

fn tone_marker(tone: Tone) -> &'static str {
    match tone {
        Tone::Neutral => "·",
        Tone::Info => "●",
        Tone::Ok => "✓",
        Tone::Bad => "✗",
    }
}

fn digit_label(tone: DigitTone) -> &'static str {
    match tone {
        DigitTone::Data => "data",
        DigitTone::Generator => "key",
        DigitTone::Remainder => "remainder",
        DigitTone::Flipped => "changed",
        DigitTone::Clean => "unchanged",
    }
}

/// Format one step, without its status.
pub fn format_step(step: &Step) -> String {
    let mut text = format!("── {}\n", step.title);
    if let Some(subtitle) = &step.subtitle {
        text.push_str(&format!("   {subtitle}\n"));
    }
    for block in &step.blocks {
        match block {
            Block::Digits { value, tone } => {
                let digits: Vec<String> = value.chars().map(String::from).collect();
                text.push_str(&format!("   {}   ({})\n", digits.join(" "), digit_label(*tone)));
            }
            Block::KeyValues(items) => {
                let pills: Vec<String> = items.iter().map(|item| format!("[{item}]")).collect();
                text.push_str(&format!("   {}\n", pills.join(" ")));
            }
        }
    }
    text
}

/// Format a status pill and its result card, if any.
pub fn format_status(status: &Status) -> String {
    let mut text = format!("   {} {}\n", tone_marker(status.tone), status.pill);
    match (&status.title, &status.body) {
        (Some(title), Some(body)) => text.push_str(&format!("   {title}: {body}\n")),
        (Some(title), None) => text.push_str(&format!("   {title}\n")),
        (None, Some(body)) => text.push_str(&format!("   {body}\n")),
        (None, None) => {}
    }
    text
}

impl<W: Write + Send> Renderer for TerminalRenderer<W> {
    fn clear(&mut self) {
        self.emit("\n");
    }

    fn render(&mut self, step: &Step) {
        let text = format_step(step);
        self.emit(&text);
    }

    fn notice(&mut self, title: &str, subtitle: Option<&str>) {
        let text = match subtitle {
            Some(subtitle) => format!("!! {title}: {subtitle}\n"),
            None => format!("!! {title}\n"),
        };
        self.emit(&text);
    }

    fn status(&mut self, status: &Status) {
        let text = format_status(status);
        self.emit(&text);
    }

    fn phase(&mut self, phase: Phase) {
        debug!(?phase, "Phase");
        match phase {
            Phase::Paused => self.emit("   ‖ Paused (p to resume)\n"),
            Phase::StepReady => self.emit("   [n]ext  [b]ack  [q]uit\n"),
            _ => {}
        }
    }
}
