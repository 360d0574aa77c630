//! JSON import/export of a word collection.
//!
//! Import is tolerant of sparse entries (missing fields, mirror-only
//! records): the batch is deduplicated against the stored collection and
//! against itself first, then each surviving entry goes through the normal
//! add path.

use anyhow::{Result, bail};
use serde::Deserialize;

use crate::words::api::WordsApi;
use crate::words::normalize::{NormalizedWord, normalize, normalize_parts};
use crate::words::record::{WordDraft, WordRecord};

#[derive(Clone, Debug, Default, Deserialize)]
struct RawTranslations {
    #[serde(default)]
    ru: String,
    #[serde(default)]
    en: String,
    #[serde(default)]
    ko: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
struct RawWord {
    #[serde(default)]
    ru: String,
    #[serde(default)]
    en: String,
    #[serde(default)]
    ko: String,
    #[serde(default)]
    translations: RawTranslations,
}

impl RawWord {
    fn normalized(&self) -> NormalizedWord {
        normalize_parts(
            if self.ru.is_empty() { &self.translations.ru } else { &self.ru },
            if self.en.is_empty() { &self.translations.en } else { &self.en },
            if self.ko.is_empty() { &self.translations.ko } else { &self.ko },
        )
    }

    fn draft(&self) -> WordDraft {
        WordDraft {
            ru: self.ru.clone(),
            en: self.en.clone(),
            ko: self.ko.clone(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub added: usize,
    pub duplicates: usize,
    pub errors: usize,
}

pub fn export_json(words: &[WordRecord]) -> Result<String> {
    Ok(serde_json::to_string_pretty(words)?)
}

pub fn import_words(api: &WordsApi, json: &str) -> Result<ImportSummary> {
    let batch: Vec<RawWord> = match serde_json::from_str(json) {
        Ok(batch) => batch,
        Err(_) => bail!("invalid file format: expected a JSON array of words"),
    };

    let existing: Vec<NormalizedWord> = api.list()?.iter().map(normalize).collect();

    let total = batch.len();
    let unique =
        crate::words::normalize::filter_duplicates(batch, &existing, RawWord::normalized);
    let duplicates = total - unique.len();

    let mut added = 0;
    let mut errors = 0;
    for raw in unique {
        let draft = raw.draft();
        if draft.filled_fields() < 2 {
            errors += 1;
            continue;
        }
        match api.add(draft) {
            Ok(_) => added += 1,
            Err(e) => {
                log::warn!("failed to import word: {e}");
                errors += 1;
            }
        }
    }

    Ok(ImportSummary {
        added,
        duplicates,
        errors,
    })
}
