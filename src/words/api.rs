//! CRUD over the cached word collection. Every operation resolves the
//! current identity first; storage failures are logged and degrade to
//! "no data" on read / dropped write, so the UI layer never blocks on them.

use std::sync::Arc;

use chrono::Utc;
use rand::Rng;

use crate::auth::IdentityProvider;
use crate::error::WordsError;
use crate::words::cache::WordsCache;
use crate::words::cleanup::dedupe_by_id;
use crate::words::normalize::{normalize, words_are_equal};
use crate::words::record::{WordDraft, WordPatch, WordRecord};

const ID_SUFFIX_LEN: usize = 9;
const ID_SUFFIX_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

pub struct WordsApi {
    cache: WordsCache,
    identity: Arc<dyn IdentityProvider>,
}

impl WordsApi {
    pub fn new(cache: WordsCache, identity: Arc<dyn IdentityProvider>) -> Self {
        Self { cache, identity }
    }

    pub fn cache(&self) -> &WordsCache {
        &self.cache
    }

    fn require_user(&self) -> Result<String, WordsError> {
        self.identity
            .current_user_id()
            .ok_or(WordsError::Unauthenticated)
    }

    fn words_or_empty(&self, user_id: &str) -> Vec<WordRecord> {
        match self.cache.load(user_id) {
            Ok(words) => words.unwrap_or_default(),
            Err(e) => {
                log::warn!("failed to load words for {user_id}: {e}");
                Vec::new()
            }
        }
    }

    fn persist(&self, user_id: &str, words: &[WordRecord]) {
        if let Err(e) = self.cache.save(user_id, words) {
            log::warn!("failed to save words for {user_id}: {e}");
        }
    }

    /// Current collection, newest-first. Collapses accidental id duplicates
    /// (last write wins) and re-persists when any were found.
    pub fn list(&self) -> Result<Vec<WordRecord>, WordsError> {
        let user_id = self.require_user()?;
        let words = self.words_or_empty(&user_id);
        let deduped = dedupe_by_id(&words);
        if deduped.len() != words.len() {
            log::info!(
                "removed {} duplicate ids for {user_id}",
                words.len() - deduped.len()
            );
            self.persist(&user_id, &deduped);
        }
        Ok(deduped)
    }

    pub fn add(&self, draft: WordDraft) -> Result<WordRecord, WordsError> {
        let user_id = self.require_user()?;

        if draft.filled_fields() < 2 {
            return Err(WordsError::IncompleteWord);
        }

        let words = self.words_or_empty(&user_id);

        let mut candidate = WordRecord {
            id: String::new(),
            ru: draft.ru,
            en: draft.en,
            ko: draft.ko,
            translations: Default::default(),
            user_id: Some(user_id.clone()),
            created_at: Some(Utc::now()),
        };
        candidate.sync_mirror();

        let normalized = normalize(&candidate);
        if words
            .iter()
            .any(|w| words_are_equal(&normalized, &normalize(w)))
        {
            return Err(WordsError::DuplicateWord);
        }

        candidate.id = fresh_word_id(&words);

        let mut updated = words;
        updated.insert(0, candidate.clone());
        self.persist(&user_id, &updated);
        Ok(candidate)
    }

    pub fn update(&self, id: &str, patch: WordPatch) -> Result<WordRecord, WordsError> {
        let user_id = self.require_user()?;
        let mut words = self.words_or_empty(&user_id);

        let word = words
            .iter_mut()
            .find(|w| w.id == id)
            .ok_or_else(|| WordsError::NotFound(id.to_string()))?;
        patch.apply_to(word);
        let updated = word.clone();

        self.persist(&user_id, &words);
        Ok(updated)
    }

    /// Idempotent: deleting an absent id succeeds.
    pub fn delete(&self, id: &str) -> Result<(), WordsError> {
        let user_id = self.require_user()?;
        let mut words = self.words_or_empty(&user_id);
        words.retain(|w| w.id != id);
        self.persist(&user_id, &words);
        Ok(())
    }
}

/// Generate an id that is not already taken; regenerate on collision.
fn fresh_word_id(existing: &[WordRecord]) -> String {
    let mut rng = rand::thread_rng();
    loop {
        let suffix: String = (0..ID_SUFFIX_LEN)
            .map(|_| ID_SUFFIX_CHARS[rng.gen_range(0..ID_SUFFIX_CHARS.len())] as char)
            .collect();
        let id = format!("word_{}_{}", Utc::now().timestamp_millis(), suffix);
        if !existing.iter().any(|w| w.id == id) {
            return id;
        }
    }
}
