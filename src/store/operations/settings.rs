use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_DAILY_WORDS;
use crate::models::Category;
use crate::store::keys;
use crate::store::{Store, StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Default number of words in a daily session.
    pub word_count: usize,
    pub goal: Category,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            word_count: DEFAULT_DAILY_WORDS,
            goal: Category::General,
        }
    }
}

impl Store {
    pub fn get_settings(&self) -> Result<Settings, StoreError> {
        match Self::get_json(&self.settings, keys::SETTINGS_KEY) {
            Ok(Some(settings)) => Ok(settings),
            Ok(None) => Ok(Settings::default()),
            Err(error) => {
                tracing::error!(error = %error, "Failed to read settings");
                Err(error)
            }
        }
    }

    pub fn save_settings(&self, settings: &Settings) -> Result<(), StoreError> {
        if settings.word_count == 0 {
            return Err(StoreError::Validation("wordCount must be at least 1".into()));
        }
        Self::put_json(&self.settings, keys::SETTINGS_KEY, settings)
    }
}
