//! `localStorage`-backed settings.
//!
//! The whole `Settings` struct is stored as one JSON value. Missing or
//! unreadable entries fall back to defaults; fields added later fill in
//! from `#[serde(default)]`.

use std::cell::RefCell;

use async_trait::async_trait;
use gloo_storage::{LocalStorage, Storage};

use proofmark_browser::{SettingKey, SettingValue, Settings, SettingsError, SettingsStore};

/// Storage key for the settings blob.
pub const SETTINGS_KEY: &str = "proofmark:settings";

#[derive(Debug)]
pub struct LocalStorageSettingsStore {
    key: String,
    settings: RefCell<Settings>,
}

impl LocalStorageSettingsStore {
    /// Load from [`SETTINGS_KEY`].
    pub fn load() -> Self {
        Self::load_from(SETTINGS_KEY)
    }

    pub fn load_from(key: impl Into<String>) -> Self {
        let key = key.into();
        let settings = match LocalStorage::get::<Settings>(&key) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::debug!(target: "proofmark::storage", key, error = %e, "using default settings");
                Settings::default()
            }
        };
        Self {
            key,
            settings: RefCell::new(settings),
        }
    }

    /// Re-read the stored copy, picking up changes made by another page.
    pub fn reload(&self) {
        if let Ok(settings) = LocalStorage::get::<Settings>(&self.key) {
            *self.settings.borrow_mut() = settings;
        }
    }

    fn persist(&self) -> Result<(), SettingsError> {
        let settings = self.settings.borrow().clone();
        LocalStorage::set(&self.key, &settings).map_err(|e| SettingsError::Persist(e.to_string()))
    }
}

#[async_trait(?Send)]
impl SettingsStore for LocalStorageSettingsStore {
    fn get_all_settings(&self) -> Settings {
        self.settings.borrow().clone()
    }

    async fn update_setting(
        &self,
        key: SettingKey,
        value: SettingValue,
    ) -> Result<(), SettingsError> {
        self.settings.borrow_mut().set(key, value)?;
        self.persist()
    }

    async fn add_to_custom_dictionary(&self, word: &str) -> Result<bool, SettingsError> {
        let added = self.settings.borrow_mut().add_word(word)?;
        if added {
            self.persist()?;
        }
        Ok(added)
    }

    async fn remove_from_custom_dictionary(&self, word: &str) -> Result<bool, SettingsError> {
        let removed = self.settings.borrow_mut().remove_word(word);
        if removed {
            self.persist()?;
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    fn fresh(key: &str) -> LocalStorageSettingsStore {
        LocalStorage::delete(key);
        LocalStorageSettingsStore::load_from(key)
    }

    #[wasm_bindgen_test]
    fn test_missing_entry_loads_defaults() {
        let store = fresh("proofmark:test:missing");
        assert_eq!(store.get_all_settings(), Settings::default());
    }

    #[wasm_bindgen_test]
    fn test_unreadable_entry_loads_defaults() {
        let key = "proofmark:test:garbage";
        LocalStorage::set(key, "not a settings object").unwrap();
        let store = LocalStorageSettingsStore::load_from(key);
        assert_eq!(store.get_all_settings(), Settings::default());
    }

    #[wasm_bindgen_test]
    async fn test_updates_survive_reload() {
        let key = "proofmark:test:update";
        let store = fresh(key);
        store
            .update_setting(SettingKey::IconsVisible, SettingValue::Bool(false))
            .await
            .unwrap();
        assert!(store.add_to_custom_dictionary("Proofmark").await.unwrap());
        assert!(!store.add_to_custom_dictionary("proofmark").await.unwrap());

        let again = LocalStorageSettingsStore::load_from(key);
        let settings = again.get_all_settings();
        assert!(!settings.icons_visible);
        assert_eq!(settings.custom_dictionary, vec!["proofmark".to_string()]);

        assert!(again.remove_from_custom_dictionary("PROOFMARK").await.unwrap());
        store.reload();
        assert!(store.get_all_settings().custom_dictionary.is_empty());
    }
}
