//! Feature toggles and the custom dictionary.
//!
//! `Settings` is the serialized form (camelCase keys, missing keys take their
//! defaults). The store trait is the contract the live checker reads a
//! snapshot from at the start of each check cycle; writes are async because
//! real backends persist them.

use std::cell::RefCell;
use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::service::AnalysisOptions;
use crate::types::Category;

/// Errors from reading or writing settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("unknown setting key: {0}")]
    UnknownKey(String),

    #[error("setting {key} expects a {expected} value")]
    TypeMismatch {
        key: SettingKey,
        expected: &'static str,
    },

    #[error("dictionary word is empty")]
    InvalidWord,

    #[error("failed to persist settings: {0}")]
    Persist(String),
}

/// User-facing settings snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Master switch for everything.
    pub enabled: bool,
    /// Show the per-field trigger icon.
    pub icons_visible: bool,
    /// Check while typing (as opposed to on demand only).
    pub live_checking_enabled: bool,
    pub check_spelling: bool,
    pub check_grammar: bool,
    pub check_style: bool,
    /// Reserved for silently fixing common typos. Stored, not acted on.
    pub auto_correct_common: bool,
    /// Skip spelling issues on words written entirely in capitals.
    pub ignore_uppercase: bool,
    /// Lowercased words never reported as misspelled.
    pub custom_dictionary: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enabled: true,
            icons_visible: true,
            live_checking_enabled: true,
            check_spelling: true,
            check_grammar: true,
            check_style: true,
            auto_correct_common: false,
            ignore_uppercase: true,
            custom_dictionary: Vec::new(),
        }
    }
}

impl Settings {
    pub fn category_enabled(&self, category: Category) -> bool {
        match category {
            Category::Spelling => self.check_spelling,
            Category::Grammar => self.check_grammar,
            Category::Style => self.check_style,
        }
    }

    pub fn any_category_enabled(&self) -> bool {
        Category::ALL.into_iter().any(|c| self.category_enabled(c))
    }

    /// Whether typing in a region should schedule a check at all.
    pub fn live_checks_enabled(&self) -> bool {
        self.enabled && self.live_checking_enabled && self.any_category_enabled()
    }

    /// Whether `word` is in the custom dictionary (case-insensitive).
    pub fn is_known_word(&self, word: &str) -> bool {
        let word = normalize_word(word);
        self.custom_dictionary.iter().any(|w| *w == word)
    }

    /// Options sent alongside the text to the analysis service.
    pub fn analysis_options(&self) -> AnalysisOptions {
        AnalysisOptions {
            check_spelling: self.check_spelling,
            check_grammar: self.check_grammar,
            check_style: self.check_style,
            ignore_uppercase: self.ignore_uppercase,
            custom_dictionary: self.custom_dictionary.clone(),
        }
    }

    pub fn get(&self, key: SettingKey) -> SettingValue {
        use SettingKey::*;
        match key {
            Enabled => SettingValue::Bool(self.enabled),
            IconsVisible => SettingValue::Bool(self.icons_visible),
            LiveCheckingEnabled => SettingValue::Bool(self.live_checking_enabled),
            CheckSpelling => SettingValue::Bool(self.check_spelling),
            CheckGrammar => SettingValue::Bool(self.check_grammar),
            CheckStyle => SettingValue::Bool(self.check_style),
            AutoCorrectCommon => SettingValue::Bool(self.auto_correct_common),
            IgnoreUppercase => SettingValue::Bool(self.ignore_uppercase),
            CustomDictionary => SettingValue::Words(self.custom_dictionary.clone()),
        }
    }

    /// Set one key. The value's shape must match the key.
    pub fn set(&mut self, key: SettingKey, value: SettingValue) -> Result<(), SettingsError> {
        use SettingKey::*;
        match value {
            SettingValue::Words(words) => {
                if key != CustomDictionary {
                    return Err(SettingsError::TypeMismatch {
                        key,
                        expected: "boolean",
                    });
                }
                let mut normalized: Vec<String> = Vec::with_capacity(words.len());
                for word in words.iter().map(|w| normalize_word(w)) {
                    if !word.is_empty() && !normalized.contains(&word) {
                        normalized.push(word);
                    }
                }
                self.custom_dictionary = normalized;
            }
            SettingValue::Bool(b) => {
                let flag = match key {
                    Enabled => &mut self.enabled,
                    IconsVisible => &mut self.icons_visible,
                    LiveCheckingEnabled => &mut self.live_checking_enabled,
                    CheckSpelling => &mut self.check_spelling,
                    CheckGrammar => &mut self.check_grammar,
                    CheckStyle => &mut self.check_style,
                    AutoCorrectCommon => &mut self.auto_correct_common,
                    IgnoreUppercase => &mut self.ignore_uppercase,
                    CustomDictionary => {
                        return Err(SettingsError::TypeMismatch {
                            key,
                            expected: "word list",
                        });
                    }
                };
                *flag = b;
            }
        }
        Ok(())
    }

    /// Add a word to the dictionary. Returns `Ok(false)` if already present.
    pub fn add_word(&mut self, word: &str) -> Result<bool, SettingsError> {
        let word = normalize_word(word);
        if word.is_empty() {
            return Err(SettingsError::InvalidWord);
        }
        if self.custom_dictionary.contains(&word) {
            return Ok(false);
        }
        self.custom_dictionary.push(word);
        Ok(true)
    }

    /// Remove a word from the dictionary. Returns whether it was present.
    pub fn remove_word(&mut self, word: &str) -> bool {
        let word = normalize_word(word);
        let before = self.custom_dictionary.len();
        self.custom_dictionary.retain(|w| *w != word);
        self.custom_dictionary.len() != before
    }
}

fn normalize_word(word: &str) -> String {
    word.trim().to_lowercase()
}

/// Name of one setting, as used in storage and at the JS boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKey {
    Enabled,
    IconsVisible,
    LiveCheckingEnabled,
    CheckSpelling,
    CheckGrammar,
    CheckStyle,
    AutoCorrectCommon,
    IgnoreUppercase,
    CustomDictionary,
}

impl SettingKey {
    pub const ALL: [SettingKey; 9] = [
        SettingKey::Enabled,
        SettingKey::IconsVisible,
        SettingKey::LiveCheckingEnabled,
        SettingKey::CheckSpelling,
        SettingKey::CheckGrammar,
        SettingKey::CheckStyle,
        SettingKey::AutoCorrectCommon,
        SettingKey::IgnoreUppercase,
        SettingKey::CustomDictionary,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SettingKey::Enabled => "enabled",
            SettingKey::IconsVisible => "iconsVisible",
            SettingKey::LiveCheckingEnabled => "liveCheckingEnabled",
            SettingKey::CheckSpelling => "checkSpelling",
            SettingKey::CheckGrammar => "checkGrammar",
            SettingKey::CheckStyle => "checkStyle",
            SettingKey::AutoCorrectCommon => "autoCorrectCommon",
            SettingKey::IgnoreUppercase => "ignoreUppercase",
            SettingKey::CustomDictionary => "customDictionary",
        }
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SettingKey {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SettingKey::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| SettingsError::UnknownKey(s.to_string()))
    }
}

/// Value of one setting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Bool(bool),
    Words(Vec<String>),
}

impl SettingValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            SettingValue::Bool(b) => Some(*b),
            SettingValue::Words(_) => None,
        }
    }
}

impl From<bool> for SettingValue {
    fn from(b: bool) -> Self {
        SettingValue::Bool(b)
    }
}

/// Read/write access to the persisted settings.
///
/// Reads are synchronous against an in-memory copy; writes update that copy
/// and then persist.
#[async_trait(?Send)]
pub trait SettingsStore {
    fn get_setting(&self, key: SettingKey) -> SettingValue {
        self.get_all_settings().get(key)
    }

    fn get_all_settings(&self) -> Settings;

    async fn update_setting(&self, key: SettingKey, value: SettingValue)
    -> Result<(), SettingsError>;

    /// Returns `Ok(false)` when the word was already present.
    async fn add_to_custom_dictionary(&self, word: &str) -> Result<bool, SettingsError>;

    async fn remove_from_custom_dictionary(&self, word: &str) -> Result<bool, SettingsError>;
}

/// Settings held in memory only. Used in tests and as a fallback when no
/// persistent backend is available.
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    settings: RefCell<Settings>,
}

impl MemorySettingsStore {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings: RefCell::new(settings),
        }
    }
}

#[async_trait(?Send)]
impl SettingsStore for MemorySettingsStore {
    fn get_all_settings(&self) -> Settings {
        self.settings.borrow().clone()
    }

    async fn update_setting(
        &self,
        key: SettingKey,
        value: SettingValue,
    ) -> Result<(), SettingsError> {
        self.settings.borrow_mut().set(key, value)
    }

    async fn add_to_custom_dictionary(&self, word: &str) -> Result<bool, SettingsError> {
        self.settings.borrow_mut().add_word(word)
    }

    async fn remove_from_custom_dictionary(&self, word: &str) -> Result<bool, SettingsError> {
        Ok(self.settings.borrow_mut().remove_word(word))
    }
}
