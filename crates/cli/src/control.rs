//! Keyboard control of a running simulation.
//!
//! Lines typed on stdin are forwarded over a channel. In auto mode they
//! pause, resume and stop the run through its [`Controller`]; in step mode
//! they drive navigation.

use modsum_sequencer::{Controller, Renderer, Session, SimulationError};
use std::io::BufRead;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// A command typed by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    TogglePause,
    Stop,
    Next,
    Back,
    Quit,
}

impl Command {
    /// Parse one input line. An empty line means [`Command::Next`].
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim().to_lowercase().as_str() {
            "p" | "pause" => Some(Command::TogglePause),
            "s" | "stop" | "\u{1b}" => Some(Command::Stop),
            "" | "n" | "next" => Some(Command::Next),
            "b" | "back" => Some(Command::Back),
            "q" | "quit" => Some(Command::Quit),
            _ => None,
        }
    }
}

/// Forward stdin lines to a channel from a background thread.
///
/// A plain thread is used so a pending read never holds the runtime open
/// at exit. The channel closes at end of input.
pub fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(16);
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if tx.blocking_send(line).is_err() {
                break;
            }
        }
    });
    rx
}

/// Apply auto-mode commands to `controller` until the input closes.
pub async fn drive_auto(controller: Controller, mut lines: mpsc::Receiver<String>) {
    while let Some(line) = lines.recv().await {
        match Command::parse(&line) {
            Some(Command::TogglePause) => {
                if let Some(paused) = controller.toggle_pause() {
                    info!(paused, "Pause toggled");
                }
            }
            Some(Command::Stop | Command::Quit) => {
                if controller.cancel() {
                    info!("Stop requested");
                }
            }
            other => debug!(?other, "Ignored input during auto run"),
        }
    }
}

/// Navigate a step-mode run until the user quits or the input closes.
///
/// Returns the index the run was left at.
pub async fn drive_steps(
    session: &mut Session,
    renderer: &mut dyn Renderer,
    mut lines: mpsc::Receiver<String>,
) -> Result<usize, SimulationError> {
    let mut index = session.run().map_or(0, |run| run.index());
    while let Some(line) = lines.recv().await {
        match Command::parse(&line) {
            Some(Command::Next) => index = session.step_forward(renderer)?,
            Some(Command::Back) => index = session.step_backward(renderer)?,
            Some(Command::Quit | Command::Stop) => break,
            other => debug!(?other, "Ignored input during step mode"),
        }
    }
    Ok(index)
}
