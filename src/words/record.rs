use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Prefix marking a locally created word that no remote backend has
/// confirmed yet. The sync reconciler swaps these for their server-assigned
/// counterparts once they appear remotely.
pub const TEMP_ID_PREFIX: &str = "temp_";

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Translations {
    #[serde(default)]
    pub ru: String,
    #[serde(default)]
    pub en: String,
    #[serde(default)]
    pub ko: String,
}

/// A single vocabulary entry. The flat `ru`/`en`/`ko` fields carry the
/// translations; `translations` is a redundant mirror kept in sync by every
/// writer (some historical exports only populated one of the two). Wire
/// names are camelCase to stay compatible with existing JSON exports.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordRecord {
    pub id: String,
    #[serde(default)]
    pub ru: String,
    #[serde(default)]
    pub en: String,
    #[serde(default)]
    pub ko: String,
    #[serde(default)]
    pub translations: Translations,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl WordRecord {
    pub fn is_temp(&self) -> bool {
        self.id.starts_with(TEMP_ID_PREFIX)
    }

    /// Number of non-blank translation slots.
    pub fn filled_fields(&self) -> usize {
        [&self.ru, &self.en, &self.ko]
            .iter()
            .filter(|f| !f.trim().is_empty())
            .count()
    }

    /// Rebuild the mirror from the flat fields. Called by every writer.
    pub fn sync_mirror(&mut self) {
        self.translations = Translations {
            ru: self.ru.clone(),
            en: self.en.clone(),
            ko: self.ko.clone(),
        };
    }
}

/// Fields for a new word. Ids, timestamps and ownership are assigned by the
/// words API, never by the caller.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WordDraft {
    #[serde(default)]
    pub ru: String,
    #[serde(default)]
    pub en: String,
    #[serde(default)]
    pub ko: String,
}

impl WordDraft {
    pub fn filled_fields(&self) -> usize {
        [&self.ru, &self.en, &self.ko]
            .iter()
            .filter(|f| !f.trim().is_empty())
            .count()
    }
}

/// Explicit optional-field update. A `Some` field replaces both the flat
/// slot and its mirror entry; `None` leaves the slot untouched.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WordPatch {
    pub ru: Option<String>,
    pub en: Option<String>,
    pub ko: Option<String>,
}

impl WordPatch {
    pub fn is_empty(&self) -> bool {
        self.ru.is_none() && self.en.is_none() && self.ko.is_none()
    }

    pub fn apply_to(&self, record: &mut WordRecord) {
        if let Some(ru) = &self.ru {
            record.ru = ru.clone();
        }
        if let Some(en) = &self.en {
            record.en = en.clone();
        }
        if let Some(ko) = &self.ko {
            record.ko = ko.clone();
        }
        record.sync_mirror();
    }
}
