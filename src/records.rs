//! Historical results of timed drills, bucketed by duration.
//!
//! Each user keeps at most five records per duration bucket, newest-first;
//! the oldest record is evicted on write. Storage failures are logged and
//! degrade to an empty history.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::store::StorageBackend;

pub const MAX_RECORDS_PER_DURATION: usize = 5;

const RECORDS_KEY_PREFIX: &str = "timer_records_";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerRecord {
    pub minutes: u32,
    pub words_completed: u32,
    /// Epoch milliseconds.
    pub date: i64,
}

pub struct TimerRecordStore {
    backend: Arc<dyn StorageBackend>,
}

fn records_key(user_id: &str) -> String {
    format!("{RECORDS_KEY_PREFIX}{user_id}")
}

fn sort_and_cap(records: &mut Vec<TimerRecord>) {
    records.sort_by(|a, b| b.date.cmp(&a.date));
    records.truncate(MAX_RECORDS_PER_DURATION);
}

impl TimerRecordStore {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    /// All records for a user, keyed by duration bucket. Each bucket comes
    /// back sorted newest-first and capped, even if the stored data predates
    /// the cap.
    pub fn load(&self, user_id: &str) -> HashMap<u32, Vec<TimerRecord>> {
        let raw = match self.backend.get(&records_key(user_id)) {
            Ok(Some(raw)) => raw,
            Ok(None) => return HashMap::new(),
            Err(e) => {
                log::warn!("failed to load timer records for {user_id}: {e}");
                return HashMap::new();
            }
        };
        match serde_json::from_str::<HashMap<u32, Vec<TimerRecord>>>(&raw) {
            Ok(mut all) => {
                for records in all.values_mut() {
                    sort_and_cap(records);
                }
                all
            }
            Err(e) => {
                log::warn!("unreadable timer records for {user_id}: {e}");
                HashMap::new()
            }
        }
    }

    /// Record a finished timed drill. Dropped (with a log line) if the
    /// write fails.
    pub fn save_record(&self, user_id: &str, minutes: u32, words_completed: u32) {
        let mut all = self.load(user_id);
        let bucket = all.entry(minutes).or_default();
        bucket.push(TimerRecord {
            minutes,
            words_completed,
            date: Utc::now().timestamp_millis(),
        });
        sort_and_cap(bucket);

        let raw = match serde_json::to_string(&all) {
            Ok(raw) => raw,
            Err(e) => {
                log::warn!("failed to serialize timer records for {user_id}: {e}");
                return;
            }
        };
        if let Err(e) = self.backend.set(&records_key(user_id), &raw) {
            log::warn!("failed to save timer records for {user_id}: {e}");
        }
    }

    pub fn clear(&self, user_id: &str) {
        if let Err(e) = self.backend.remove(&records_key(user_id)) {
            log::warn!("failed to clear timer records for {user_id}: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::json_store::JsonStore;
    use tempfile::TempDir;

    fn make_store() -> (TempDir, TimerRecordStore) {
        let dir = TempDir::new().unwrap();
        let store = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
        (dir, TimerRecordStore::new(Arc::new(store)))
    }

    #[test]
    fn test_empty_history() {
        let (_dir, store) = make_store();
        assert!(store.load("u1").is_empty());
    }

    #[test]
    fn test_records_bucketed_by_duration() {
        let (_dir, store) = make_store();
        store.save_record("u1", 1, 10);
        store.save_record("u1", 5, 40);
        let all = store.load("u1");
        assert_eq!(all.len(), 2);
        assert_eq!(all[&1][0].words_completed, 10);
        assert_eq!(all[&5][0].words_completed, 40);
    }

    #[test]
    fn test_sixth_record_evicts_oldest() {
        let (_dir, store) = make_store();
        for i in 0..6u32 {
            store.save_record("u1", 3, i);
            // Distinct millisecond timestamps keep the ordering observable.
            std::thread::sleep(std::time::Duration::from_millis(3));
        }
        let bucket = &store.load("u1")[&3];
        assert_eq!(bucket.len(), MAX_RECORDS_PER_DURATION);
        // Newest first; the first write (words_completed == 0) is gone.
        assert_eq!(bucket[0].words_completed, 5);
        assert!(bucket.iter().all(|r| r.words_completed != 0));
        assert!(bucket.windows(2).all(|w| w[0].date >= w[1].date));
    }

    #[test]
    fn test_histories_are_per_user() {
        let (_dir, store) = make_store();
        store.save_record("u1", 1, 10);
        assert!(store.load("u2").is_empty());
    }

    #[test]
    fn test_clear_removes_history() {
        let (_dir, store) = make_store();
        store.save_record("u1", 1, 10);
        store.clear("u1");
        assert!(store.load("u1").is_empty());
    }

    #[test]
    fn test_load_caps_oversized_stored_buckets() {
        let (_dir, store) = make_store();
        let oversized: Vec<TimerRecord> = (0..8)
            .map(|i| TimerRecord {
                minutes: 2,
                words_completed: i,
                date: i as i64,
            })
            .collect();
        let mut all = HashMap::new();
        all.insert(2u32, oversized);
        store
            .backend
            .set(&records_key("u1"), &serde_json::to_string(&all).unwrap())
            .unwrap();

        let bucket = &store.load("u1")[&2];
        assert_eq!(bucket.len(), MAX_RECORDS_PER_DURATION);
        assert_eq!(bucket[0].date, 7);
    }
}
