//! Ledger configuration.

/// Maximum number of entries kept in the history log.
pub const DEFAULT_CAPACITY: usize = 60;

/// Storage key of the history log.
pub const HISTORY_KEY: &str = "modsum.history";

/// Storage key of the theme preference.
pub const THEME_KEY: &str = "modsum.theme";

/// Configuration for the history ledger and preferences.
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    /// Entries kept before the oldest are evicted.
    pub capacity: usize,

    /// Storage key of the history log.
    pub history_key: String,

    /// Storage key of the theme preference.
    pub theme_key: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            history_key: HISTORY_KEY.to_string(),
            theme_key: THEME_KEY.to_string(),
        }
    }
}

impl LedgerConfig {
    /// Set the capacity (at least one entry is always kept).
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }

    /// Set the history storage key.
    pub fn with_history_key(mut self, key: impl Into<String>) -> Self {
        self.history_key = key.into();
        self
    }
}
