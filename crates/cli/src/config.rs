//! TOML configuration for the `modsum` binary.
//!
//! Every table and field is optional. Example:
//!
//! ```toml
//! [simulation]
//! speed_ms = 650
//! poll_interval_ms = 120
//! execution_mode = "stop"
//! play_mode = "auto"
//!
//! [client]
//! endpoint = "http://127.0.0.1:8080"
//! timeout_ms = 10000
//! offline = false
//!
//! [storage]
//! data_dir = ".modsum"
//! history_capacity = 60
//!
//! [server]
//! host = "127.0.0.1"
//! port = 8080
//! ```

use anyhow::{Context, Result};
use modsum_ledger::{LedgerConfig, DEFAULT_CAPACITY};
use modsum_sequencer::{SimulationConfig, DEFAULT_POLL_INTERVAL, DEFAULT_SPEED};
use modsum_server::ServerConfig;
use modsum_types::{ExecutionMode, PlayMode};
use modsum_verify::HttpVerifierConfig;
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Top-level CLI configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CliConfig {
    #[serde(default)]
    pub simulation: SimulationSection,

    #[serde(default)]
    pub client: ClientSection,

    #[serde(default)]
    pub storage: StorageSection,

    #[serde(default)]
    pub server: ServerSection,
}

/// `[simulation]` table.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimulationSection {
    /// Delay after each step in auto mode; negatives clamp to zero.
    #[serde(default = "default_speed_ms")]
    pub speed_ms: i64,

    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    #[serde(default)]
    pub execution_mode: ExecutionMode,

    #[serde(default)]
    pub play_mode: PlayMode,
}

fn default_speed_ms() -> i64 {
    DEFAULT_SPEED.as_millis() as i64
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL.as_millis() as u64
}

impl Default for SimulationSection {
    fn default() -> Self {
        Self {
            speed_ms: default_speed_ms(),
            poll_interval_ms: default_poll_interval_ms(),
            execution_mode: ExecutionMode::default(),
            play_mode: PlayMode::default(),
        }
    }
}

/// `[client]` table.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientSection {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Compute checksums in process instead of calling the service.
    #[serde(default)]
    pub offline: bool,
}

fn default_endpoint() -> String {
    HttpVerifierConfig::default().base_url
}

fn default_timeout_ms() -> u64 {
    HttpVerifierConfig::default().timeout.as_millis() as u64
}

impl Default for ClientSection {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_ms: default_timeout_ms(),
            offline: false,
        }
    }
}

/// `[storage]` table.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StorageSection {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Lowers the history cap; values above 60 are clamped.
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(".modsum")
}

fn default_history_capacity() -> usize {
    DEFAULT_CAPACITY
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            history_capacity: default_history_capacity(),
        }
    }
}

/// `[server]` table.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_host")]
    pub host: IpAddr,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::LOCALHOST)
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl CliConfig {
    /// Load from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn parse(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Load `path` if given, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        path.map_or_else(|| Ok(Self::default()), Self::load)
    }

    pub fn simulation_config(&self) -> SimulationConfig {
        SimulationConfig::default()
            .with_speed_ms(self.simulation.speed_ms)
            .with_poll_interval(Duration::from_millis(self.simulation.poll_interval_ms))
            .with_execution_mode(self.simulation.execution_mode)
            .with_play_mode(self.simulation.play_mode)
    }

    /// History capacity from the file, never above [`DEFAULT_CAPACITY`].
    pub fn ledger_config(&self) -> LedgerConfig {
        LedgerConfig::default().with_capacity(self.storage.history_capacity.min(DEFAULT_CAPACITY))
    }

    pub fn verifier_config(&self) -> HttpVerifierConfig {
        HttpVerifierConfig::new(self.client.endpoint.clone())
            .with_timeout(Duration::from_millis(self.client.timeout_ms))
    }

    pub fn server_config(&self) -> ServerConfig {
        ServerConfig::default()
            .with_host(self.server.host)
            .with_port(self.server.port)
    }
}
