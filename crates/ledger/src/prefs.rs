//! Persisted user preferences.

use crate::{KeyValueStore, LedgerConfig, LedgerError};
use modsum_types::Theme;
use std::sync::Arc;
use tracing::warn;

/// Theme preference stored as a bare string (`"light"` / `"dark"`).
#[derive(Clone)]
pub struct Preferences {
    store: Arc<dyn KeyValueStore>,
    theme_key: String,
}

impl Preferences {
    pub fn new(store: Arc<dyn KeyValueStore>, config: &LedgerConfig) -> Self {
        Self {
            store,
            theme_key: config.theme_key.clone(),
        }
    }

    /// The stored theme, or [`Theme::Dark`] if unset or unrecognized.
    pub fn theme(&self) -> Theme {
        match self.store.get(&self.theme_key) {
            Ok(Some(raw)) => raw.parse().unwrap_or_default(),
            Ok(None) => Theme::default(),
            Err(e) => {
                warn!(error = %e, "Failed to read theme preference");
                Theme::default()
            }
        }
    }

    pub fn set_theme(&self, theme: Theme) -> Result<(), LedgerError> {
        self.store.set(&self.theme_key, theme.as_str())?;
        Ok(())
    }

    /// Flip between light and dark, returning the new theme.
    pub fn toggle_theme(&self) -> Result<Theme, LedgerError> {
        let next = self.theme().toggled();
        self.set_theme(next)?;
        Ok(next)
    }
}
