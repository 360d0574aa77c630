//! Per-user persisted word collection plus a last-write timestamp.
//!
//! Methods return `Result` so each caller makes the availability tradeoff
//! explicitly: the words API and the sync engine both log failures and keep
//! going with whatever local state they have.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use crate::store::{StorageBackend, StorageError};
use crate::words::record::{WordPatch, WordRecord};

const CACHE_KEY_PREFIX: &str = "words_cache_";
const CACHE_TIMESTAMP_KEY_PREFIX: &str = "words_cache_timestamp_";

#[derive(Clone)]
pub struct WordsCache {
    backend: Arc<dyn StorageBackend>,
}

fn words_key(user_id: &str) -> String {
    format!("{CACHE_KEY_PREFIX}{user_id}")
}

fn timestamp_key(user_id: &str) -> String {
    format!("{CACHE_TIMESTAMP_KEY_PREFIX}{user_id}")
}

impl WordsCache {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    /// `Ok(None)` means no collection has been saved for this user yet.
    pub fn load(&self, user_id: &str) -> Result<Option<Vec<WordRecord>>, StorageError> {
        match self.backend.get(&words_key(user_id))? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Overwrites the stored collection and stamps the write time.
    pub fn save(&self, user_id: &str, words: &[WordRecord]) -> Result<(), StorageError> {
        let raw = serde_json::to_string(words)?;
        self.backend.set(&words_key(user_id), &raw)?;
        self.backend
            .set(&timestamp_key(user_id), &Utc::now().timestamp_millis().to_string())?;
        Ok(())
    }

    /// Prepend: the collection is kept newest-first.
    pub fn append(&self, user_id: &str, word: WordRecord) -> Result<(), StorageError> {
        let mut words = self.load(user_id)?.unwrap_or_default();
        words.insert(0, word);
        self.save(user_id, &words)
    }

    /// No-op if the id is absent.
    pub fn replace(&self, user_id: &str, id: &str, patch: &WordPatch) -> Result<(), StorageError> {
        let mut words = self.load(user_id)?.unwrap_or_default();
        if let Some(word) = words.iter_mut().find(|w| w.id == id) {
            patch.apply_to(word);
            self.save(user_id, &words)?;
        }
        Ok(())
    }

    pub fn remove(&self, user_id: &str, id: &str) -> Result<(), StorageError> {
        let mut words = self.load(user_id)?.unwrap_or_default();
        words.retain(|w| w.id != id);
        self.save(user_id, &words)
    }

    pub fn clear(&self, user_id: &str) -> Result<(), StorageError> {
        self.backend.remove(&words_key(user_id))?;
        self.backend.remove(&timestamp_key(user_id))?;
        Ok(())
    }

    /// Epoch milliseconds of the last save, if any.
    pub fn last_saved_at(&self, user_id: &str) -> Result<Option<i64>, StorageError> {
        match self.backend.get(&timestamp_key(user_id))? {
            Some(raw) => Ok(raw.parse::<i64>().ok()),
            None => Ok(None),
        }
    }

    /// True when no timestamp exists, the timestamp is unreadable, or the
    /// cache is older than `max_age`. Read errors count as stale.
    pub fn is_stale(&self, user_id: &str, max_age: Duration) -> bool {
        match self.last_saved_at(user_id) {
            Ok(Some(saved_at)) => {
                let age = Utc::now().timestamp_millis().saturating_sub(saved_at);
                age > max_age.as_millis() as i64
            }
            Ok(None) => true,
            Err(e) => {
                log::warn!("failed to read cache timestamp for {user_id}: {e}");
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::json_store::JsonStore;
    use crate::words::record::Translations;
    use tempfile::TempDir;

    fn make_cache() -> (TempDir, WordsCache) {
        let dir = TempDir::new().unwrap();
        let store = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
        (dir, WordsCache::new(Arc::new(store)))
    }

    fn word(id: &str, ru: &str, en: &str) -> WordRecord {
        let mut w = WordRecord {
            id: id.to_string(),
            ru: ru.to_string(),
            en: en.to_string(),
            ko: String::new(),
            translations: Translations::default(),
            user_id: None,
            created_at: None,
        };
        w.sync_mirror();
        w
    }

    #[test]
    fn test_load_without_save_is_none() {
        let (_dir, cache) = make_cache();
        assert!(cache.load("u1").unwrap().is_none());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let (_dir, cache) = make_cache();
        let words = vec![word("w1", "кот", "cat")];
        cache.save("u1", &words).unwrap();
        assert_eq!(cache.load("u1").unwrap().unwrap(), words);
        assert!(cache.last_saved_at("u1").unwrap().is_some());
    }

    #[test]
    fn test_collections_are_partitioned_by_user() {
        let (_dir, cache) = make_cache();
        cache.save("u1", &[word("w1", "кот", "cat")]).unwrap();
        assert!(cache.load("u2").unwrap().is_none());
    }

    #[test]
    fn test_append_prepends() {
        let (_dir, cache) = make_cache();
        cache.append("u1", word("w1", "кот", "cat")).unwrap();
        cache.append("u1", word("w2", "пёс", "dog")).unwrap();
        let words = cache.load("u1").unwrap().unwrap();
        assert_eq!(words[0].id, "w2");
        assert_eq!(words[1].id, "w1");
    }

    #[test]
    fn test_replace_missing_id_is_noop() {
        let (_dir, cache) = make_cache();
        cache.save("u1", &[word("w1", "кот", "cat")]).unwrap();
        let before = cache.load("u1").unwrap().unwrap();
        let patch = WordPatch {
            en: Some("kitty".to_string()),
            ..WordPatch::default()
        };
        cache.replace("u1", "missing", &patch).unwrap();
        assert_eq!(cache.load("u1").unwrap().unwrap(), before);
    }

    #[test]
    fn test_replace_updates_flat_and_mirror() {
        let (_dir, cache) = make_cache();
        cache.save("u1", &[word("w1", "кот", "cat")]).unwrap();
        let patch = WordPatch {
            en: Some("kitty".to_string()),
            ..WordPatch::default()
        };
        cache.replace("u1", "w1", &patch).unwrap();
        let words = cache.load("u1").unwrap().unwrap();
        assert_eq!(words[0].en, "kitty");
        assert_eq!(words[0].translations.en, "kitty");
    }

    #[test]
    fn test_clear_removes_words_and_timestamp() {
        let (_dir, cache) = make_cache();
        cache.save("u1", &[word("w1", "кот", "cat")]).unwrap();
        cache.clear("u1").unwrap();
        assert!(cache.load("u1").unwrap().is_none());
        assert!(cache.last_saved_at("u1").unwrap().is_none());
    }

    #[test]
    fn test_staleness() {
        let (_dir, cache) = make_cache();
        // Nothing saved yet: stale.
        assert!(cache.is_stale("u1", Duration::from_secs(300)));

        cache.save("u1", &[]).unwrap();
        assert!(!cache.is_stale("u1", Duration::from_secs(300)));
        // A zero threshold makes any existing write stale immediately...
        // except within the same millisecond, so use a tiny sleep.
        std::thread::sleep(Duration::from_millis(5));
        assert!(cache.is_stale("u1", Duration::from_millis(1)));
    }
}
