//! Modulo checksum error-detection simulator.
//!
//! ```text
//! modsum serve                                    run the verification service
//! modsum verify --sent-data 10 --key 3 --received-data 14
//! modsum simulate --sent-data 10 --key 3 --delta 4 [--play-mode step]
//! modsum convert bin-to-dec 1011
//! modsum history [show|clear|export --out FILE]
//! modsum theme [show|light|dark|toggle]
//! ```

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use modsum_cli::{drive_auto, drive_steps, spawn_stdin_reader, CliConfig, TerminalRenderer};
use modsum_ledger::{FileStore, HistoryLedger, KeyValueStore, Preferences, CSV_FILENAME};
use modsum_numeric::{explain_binary_to_decimal, explain_decimal_to_binary};
use modsum_sequencer::{RunOutcome, Session, SimulationInput};
use modsum_server::VerifyServer;
use modsum_types::{ExecutionMode, PlayMode, Theme};
use modsum_verify::wire::{MESSAGE_CORRUPTED, MESSAGE_NO_ERROR};
use modsum_verify::{HttpVerifier, LocalVerifier, Verifier};
use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "modsum")]
#[command(about = "Modulo checksum error-detection simulator")]
#[command(version)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Directory for history and preferences (overrides config)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Verification service base URL (overrides config)
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Compute checksums in process instead of calling the service
    #[arg(long, global = true)]
    offline: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the verification HTTP service
    Serve {
        /// Address to listen on (overrides config)
        #[arg(long)]
        host: Option<IpAddr>,

        /// Port to listen on (overrides config)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Compute the sender checksum, or verify a received frame
    Verify {
        #[arg(long, allow_hyphen_values = true)]
        sent_data: String,

        /// Key/modulus (any non-zero integer)
        #[arg(long, allow_hyphen_values = true)]
        key: String,

        /// Received data; omit to only compute the sender checksum
        #[arg(long, allow_hyphen_values = true)]
        received_data: Option<String>,
    },

    /// Play the eight-step simulation
    ///
    /// Auto mode: `p` + Enter pauses or resumes, `s` + Enter or Ctrl-C stops.
    /// Step mode: Enter or `n` advances, `b` goes back, `q` quits.
    Simulate {
        #[arg(long, allow_hyphen_values = true)]
        sent_data: String,

        /// Key/modulus (any non-zero integer)
        #[arg(long, allow_hyphen_values = true)]
        key: String,

        /// Error added to the data in the channel
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        delta: String,

        /// Delay between steps in auto mode (e.g., "650ms", "1s")
        #[arg(long)]
        speed: Option<humantime::Duration>,

        /// What happens on a mismatch (stop, continue)
        #[arg(long)]
        exec_mode: Option<ExecutionMode>,

        /// How steps advance (auto, step)
        #[arg(long)]
        play_mode: Option<PlayMode>,
    },

    /// Convert between binary and decimal, showing the working
    Convert {
        #[command(subcommand)]
        direction: ConvertCommand,
    },

    /// Show, clear or export the verification history
    History {
        #[command(subcommand)]
        action: Option<HistoryCommand>,
    },

    /// Show or change the display theme
    Theme {
        #[command(subcommand)]
        action: Option<ThemeCommand>,
    },
}

#[derive(Subcommand, Debug)]
enum ConvertCommand {
    /// Binary to decimal, e.g. 1011
    BinToDec {
        #[arg(allow_hyphen_values = true)]
        value: String,
    },
    /// Decimal to binary, e.g. -6
    DecToBin {
        #[arg(allow_hyphen_values = true)]
        value: String,
    },
}

#[derive(Subcommand, Debug, Default)]
enum HistoryCommand {
    /// List entries, newest first
    #[default]
    Show,
    /// Delete every entry
    Clear,
    /// Write entries as CSV
    Export {
        /// Output file
        #[arg(short, long, default_value = CSV_FILENAME)]
        out: PathBuf,
    },
}

#[derive(Subcommand, Debug, Default)]
enum ThemeCommand {
    #[default]
    Show,
    Light,
    Dark,
    Toggle,
}

/// Apply global CLI flags on top of the file configuration.
fn apply_overrides(config: &mut CliConfig, cli: &Cli) {
    if let Some(dir) = &cli.data_dir {
        config.storage.data_dir = dir.clone();
    }
    if let Some(endpoint) = &cli.endpoint {
        config.client.endpoint = endpoint.clone();
    }
    if cli.offline {
        config.client.offline = true;
    }
}

fn open_store(config: &CliConfig) -> Arc<dyn KeyValueStore> {
    Arc::new(FileStore::new(config.storage.data_dir.clone()))
}

fn build_verifier(config: &CliConfig) -> Result<Arc<dyn Verifier>> {
    if config.client.offline {
        info!("Offline mode, computing checksums locally");
        return Ok(Arc::new(LocalVerifier::new()));
    }
    let verifier = HttpVerifier::new(config.verifier_config())
        .with_context(|| format!("Invalid endpoint: {}", config.client.endpoint))?;
    info!(endpoint = %verifier.endpoint(), "Using verification service");
    Ok(Arc::new(verifier))
}

fn build_session(config: &CliConfig) -> Result<Session> {
    let ledger = HistoryLedger::new(open_store(config), config.ledger_config());
    Ok(Session::new(
        build_verifier(config)?,
        ledger,
        config.simulation_config(),
    ))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = CliConfig::load_or_default(cli.config.as_deref())?;
    apply_overrides(&mut config, &cli);

    match cli.command {
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            VerifyServer::new(config.server_config())
                .serve_until(async {
                    let _ = signal::ctrl_c().await;
                    info!("Received shutdown signal");
                })
                .await?;
        }

        Commands::Verify {
            sent_data,
            key,
            received_data,
        } => {
            let session = build_session(&config)?;
            match received_data {
                None => {
                    let sender = session.compute_sender(&sent_data, &key).await?;
                    println!("senderChecksum = {}", sender.checksum);
                    println!("{}", sender.explanation);
                }
                Some(received_data) => {
                    let result = session
                        .verify_frame(&sent_data, &key, &received_data)
                        .await?;
                    println!("senderChecksum = {}", result.sender_checksum);
                    println!("receiverChecksum = {}", result.receiver_checksum);
                    println!(
                        "{}",
                        if result.ok {
                            MESSAGE_NO_ERROR
                        } else {
                            MESSAGE_CORRUPTED
                        }
                    );
                }
            }
        }

        Commands::Simulate {
            sent_data,
            key,
            delta,
            speed,
            exec_mode,
            play_mode,
        } => {
            if let Some(speed) = speed {
                config.simulation.speed_ms = i64::try_from(speed.as_millis()).unwrap_or(i64::MAX);
            }
            if let Some(mode) = exec_mode {
                config.simulation.execution_mode = mode;
            }
            if let Some(mode) = play_mode {
                config.simulation.play_mode = mode;
            }
            let input = SimulationInput::new(sent_data, key).with_delta(delta);
            simulate(&config, &input).await?;
        }

        Commands::Convert { direction } => {
            let explanation = match &direction {
                ConvertCommand::BinToDec { value } => explain_binary_to_decimal(value),
                ConvertCommand::DecToBin { value } => explain_decimal_to_binary(value),
            };
            match (explanation, direction) {
                (Some(text), _) => println!("{text}"),
                (None, ConvertCommand::BinToDec { value }) => {
                    bail!("Invalid binary number: {value}")
                }
                (None, ConvertCommand::DecToBin { value }) => {
                    bail!("Invalid decimal integer: {value}")
                }
            }
        }

        Commands::History { action } => {
            let ledger = HistoryLedger::new(open_store(&config), config.ledger_config());
            match action.unwrap_or_default() {
                HistoryCommand::Show => print_history(&ledger),
                HistoryCommand::Clear => {
                    ledger.clear()?;
                    println!("History cleared");
                }
                HistoryCommand::Export { out } => {
                    let count = ledger.len();
                    ledger.write_csv(&out)?;
                    println!("Exported {count} entries to {}", out.display());
                }
            }
        }

        Commands::Theme { action } => {
            let prefs = Preferences::new(open_store(&config), &config.ledger_config());
            let theme = match action.unwrap_or_default() {
                ThemeCommand::Show => prefs.theme(),
                ThemeCommand::Light => {
                    prefs.set_theme(Theme::Light)?;
                    Theme::Light
                }
                ThemeCommand::Dark => {
                    prefs.set_theme(Theme::Dark)?;
                    Theme::Dark
                }
                ThemeCommand::Toggle => prefs.toggle_theme()?,
            };
            println!("{theme}");
        }
    }

    Ok(())
}

async fn simulate(config: &CliConfig, input: &SimulationInput) -> Result<()> {
    let mut session = build_session(config)?;
    let mut renderer = TerminalRenderer::stdout();
    let lines = spawn_stdin_reader();

    match session.config().play_mode {
        PlayMode::Auto => {
            let controller = session.controller();
            let interrupt = tokio::spawn({
                let controller = controller.clone();
                async move {
                    if signal::ctrl_c().await.is_ok() {
                        controller.cancel();
                    }
                }
            });
            let keys = tokio::spawn(drive_auto(controller, lines));

            let outcome = session.simulate(input, &mut renderer).await;
            interrupt.abort();
            keys.abort();

            let outcome = outcome?;
            info!(?outcome, "Simulation finished");
        }
        PlayMode::Step => {
            if let RunOutcome::Stepping { .. } = session.simulate(input, &mut renderer).await? {
                let index = drive_steps(&mut session, &mut renderer, lines).await?;
                info!(step = index + 1, "Left step mode");
            }
        }
    }
    Ok(())
}

fn print_history(ledger: &HistoryLedger) {
    let entries = ledger.entries();
    if entries.is_empty() {
        println!("No history yet.");
        return;
    }
    println!(
        "{:<26} {:>12} {:>8} {:>12} {:>8} {:>8} {:<6} source",
        "time", "sentData", "key", "receivedData", "sender", "receiver", "ok"
    );
    for entry in entries {
        println!(
            "{:<26} {:>12} {:>8} {:>12} {:>8} {:>8} {:<6} {}",
            entry.time,
            entry.sent_data,
            entry.key,
            entry.received_data,
            entry.sender_checksum,
            entry.receiver_checksum,
            entry.ok,
            entry.source
        );
    }
}
