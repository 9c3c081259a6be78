//! History ledger.
//!
//! An append-only, newest-first log of verification and simulation outcomes,
//! capped at [`DEFAULT_CAPACITY`] entries and persisted as a JSON array under a
//! fixed key in a [`KeyValueStore`]. Storage is the source of truth: every
//! operation reloads, mutates and saves, and anything unreadable in storage
//! loads as an empty log.
//!
//! # Components
//!
//! - [`HistoryLedger`] - append / clear / export over a store
//! - [`KeyValueStore`] - durable string storage ([`FileStore`], [`MemoryStore`])
//! - [`Preferences`] - the persisted light/dark theme
//! - [`csv`] - RFC 4180 export of the log

mod config;
pub mod csv;
mod ledger;
mod prefs;
mod store;

pub use config::{LedgerConfig, DEFAULT_CAPACITY, HISTORY_KEY, THEME_KEY};
pub use csv::{CSV_FILENAME, CSV_HEADER};
pub use ledger::{HistoryLedger, LedgerError};
pub use prefs::Preferences;
pub use store::{FileStore, KeyValueStore, MemoryStore, StoreError};
