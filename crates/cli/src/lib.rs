//! Building blocks for the `modsum` command-line tool.
//!
//! - [`config`]: TOML configuration file
//! - [`render`]: text renderer for simulation timelines
//! - [`control`]: stdin commands for pausing, stopping and stepping a run

pub mod config;
pub mod control;
pub mod render;

pub use config::CliConfig;
pub use control::{drive_auto, drive_steps, spawn_stdin_reader, Command};
pub use render::TerminalRenderer;
