//! Which translation columns the user wants shown. At least two languages
//! are required for flip-cards to make sense; an invalid or short stored
//! selection falls back to the full set on read.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::store::StorageBackend;

const SELECTED_LANGUAGES_KEY: &str = "selected_languages";
const MIN_SELECTED: usize = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    Ru,
    En,
    Ko,
}

pub const ALL_LANGS: [Lang; 3] = [Lang::Ru, Lang::En, Lang::Ko];

impl Lang {
    pub fn code(&self) -> &'static str {
        match self {
            Lang::Ru => "ru",
            Lang::En => "en",
            Lang::Ko => "ko",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "ru" => Some(Lang::Ru),
            "en" => Some(Lang::En),
            "ko" => Some(Lang::Ko),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
#[error("at least two display languages are required")]
pub struct TooFewLanguages;

pub struct LanguageSettings {
    backend: Arc<dyn StorageBackend>,
}

impl LanguageSettings {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    pub fn selected(&self) -> Vec<Lang> {
        match self.backend.get(SELECTED_LANGUAGES_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<Lang>>(&raw) {
                Ok(langs) if langs.len() >= MIN_SELECTED => langs,
                Ok(_) => ALL_LANGS.to_vec(),
                Err(e) => {
                    log::warn!("unreadable language selection: {e}");
                    ALL_LANGS.to_vec()
                }
            },
            Ok(None) => ALL_LANGS.to_vec(),
            Err(e) => {
                log::warn!("failed to read language selection: {e}");
                ALL_LANGS.to_vec()
            }
        }
    }

    pub fn save(&self, languages: &[Lang]) -> Result<(), TooFewLanguages> {
        if languages.len() < MIN_SELECTED {
            return Err(TooFewLanguages);
        }
        match serde_json::to_string(languages) {
            Ok(raw) => {
                if let Err(e) = self.backend.set(SELECTED_LANGUAGES_KEY, &raw) {
                    log::warn!("failed to save language selection: {e}");
                }
            }
            Err(e) => log::warn!("failed to serialize language selection: {e}"),
        }
        Ok(())
    }
}
