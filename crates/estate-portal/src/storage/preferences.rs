use serde::{Deserialize, Serialize};

use super::kv::{KeyValueStore, StoreError};

pub const PREFERENCES_KEY: &str = "ui_preferences";

/// Persisted UI state that survives restarts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UiPreferences {
    pub sidebar_collapsed: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum PreferenceError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("preferences could not be encoded: {0}")]
    Encode(#[from] serde_json::Error),
}

pub struct PreferenceStore<S> {
    store: S,
}

impl<S: KeyValueStore> PreferenceStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Stored preferences, or defaults when nothing usable is stored.
    pub fn load(&self) -> UiPreferences {
        match self.store.get(PREFERENCES_KEY) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|err| {
                tracing::warn!(error = %err, "ignoring unreadable ui preferences");
                UiPreferences::default()
            }),
            Ok(None) => UiPreferences::default(),
            Err(err) => {
                tracing::warn!(error = %err, "ui preferences unavailable");
                UiPreferences::default()
            }
        }
    }

    pub fn save(&self, preferences: &UiPreferences) -> Result<(), PreferenceError> {
        let encoded = serde_json::to_string(preferences)?;
        self.store.set(PREFERENCES_KEY, &encoded)?;
        Ok(())
    }

    /// Flip the sidebar flag and persist it. Returns the new value.
    pub fn toggle_sidebar(&self) -> Result<bool, PreferenceError> {
        let mut preferences = self.load();
        preferences.sidebar_collapsed = !preferences.sidebar_collapsed;
        self.save(&preferences)?;
        Ok(preferences.sidebar_collapsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryKv;

    #[test]
    fn toggle_persists_between_store_instances() {
        let kv = MemoryKv::new();
        let first = PreferenceStore::new(kv.clone());
        assert!(!first.load().sidebar_collapsed);
        assert!(first.toggle_sidebar().expect("toggle"));

        let second = PreferenceStore::new(kv.clone());
        assert!(second.load().sidebar_collapsed);
        assert_eq!(
            kv.get(PREFERENCES_KEY).expect("get").as_deref(),
            Some(r#"{"sidebarCollapsed":true}"#)
        );
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let kv = MemoryKv::new();
        kv.set(PREFERENCES_KEY, "{}").expect("seed");
        assert_eq!(PreferenceStore::new(kv).load(), UiPreferences::default());
    }
}
