//! The capped, newest-first history log.

use crate::csv;
use crate::{KeyValueStore, LedgerConfig, StoreError};
use modsum_types::HistoryEntry;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors from mutating the ledger.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Failed to serialize history: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to write {path}: {source}")]
    Export {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// History log persisted as a JSON array in a [`KeyValueStore`].
///
/// Entries are kept newest first and never exceed the configured capacity.
/// Reads never fail: missing, unreadable or malformed storage is an empty log.
#[derive(Clone)]
pub struct HistoryLedger {
    store: Arc<dyn KeyValueStore>,
    config: LedgerConfig,
}

impl HistoryLedger {
    pub fn new(store: Arc<dyn KeyValueStore>, config: LedgerConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Current entries, newest first.
    pub fn entries(&self) -> Vec<HistoryEntry> {
        let raw = match self.store.get(&self.config.history_key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!(error = %e, "Failed to read history, treating as empty");
                return Vec::new();
            }
        };

        let values: Vec<serde_json::Value> = match serde_json::from_str(&raw) {
            Ok(values) => values,
            Err(e) => {
                warn!(error = %e, "Stored history is not a JSON array, treating as empty");
                return Vec::new();
            }
        };

        // Skip individual malformed elements rather than discarding the log.
        let total = values.len();
        let mut entries: Vec<HistoryEntry> = values
            .into_iter()
            .filter_map(|v| serde_json::from_value(v).ok())
            .collect();
        if entries.len() != total {
            warn!(
                skipped = total - entries.len(),
                "Dropped malformed history entries"
            );
        }
        entries.truncate(self.config.capacity);
        entries
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    /// Prepend `entry`, evict beyond capacity and persist.
    pub fn append(&self, entry: HistoryEntry) -> Result<(), LedgerError> {
        let mut entries = self.entries();
        entries.insert(0, entry);
        entries.truncate(self.config.capacity);
        self.save(&entries)?;
        debug!(len = entries.len(), "History entry appended");
        Ok(())
    }

    /// Empty the log and persist.
    pub fn clear(&self) -> Result<(), LedgerError> {
        self.save(&[])?;
        debug!("History cleared");
        Ok(())
    }

    /// The full log as CSV.
    pub fn export_csv(&self) -> String {
        csv::to_csv(&self.entries())
    }

    /// Write [`export_csv`](Self::export_csv) to `path`.
    pub fn write_csv(&self, path: &Path) -> Result<(), LedgerError> {
        std::fs::write(path, self.export_csv()).map_err(|source| LedgerError::Export {
            path: path.display().to_string(),
            source,
        })
    }

    fn save(&self, entries: &[HistoryEntry]) -> Result<(), LedgerError> {
        let json = serde_json::to_string(entries)?;
        self.store.set(&self.config.history_key, &json)?;
        Ok(())
    }
}
