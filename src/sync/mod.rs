//! Reconciliation of optimistic local state with a remote word collection.
//!
//! Locally created words carry a `temp_` id until the remote backend
//! confirms them; a sync pass swaps each temp word for its exact-field
//! remote twin (adopting the server id), appends the remaining remote
//! words, and republishes the merged list newest-first. Failures leave the
//! cached state untouched and visible.

pub mod remote;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::auth::IdentityProvider;
use crate::error::WordsError;
use crate::sync::remote::RemoteWords;
use crate::words::cache::WordsCache;
use crate::words::record::WordRecord;

pub const DEFAULT_SYNC_INTERVAL: Duration = Duration::from_secs(60);
pub const DEFAULT_CACHE_MAX_AGE: Duration = Duration::from_secs(300);

/// Merge the locally cached collection with the authoritative remote one.
///
/// Temp words match remotes field-for-field (exact, not normalized): a
/// match means the server confirmed the optimistic create, so the server
/// record with its assigned id supersedes the temp one. Unmatched temp
/// words stay pending; every other remote word is taken as-is. The result
/// is sorted by creation time descending, with missing timestamps last.
pub fn merge_remote(local: Vec<WordRecord>, remote: Vec<WordRecord>) -> Vec<WordRecord> {
    let mut remote = remote;
    let mut merged: Vec<WordRecord> = Vec::with_capacity(remote.len());

    for word in local.into_iter().filter(WordRecord::is_temp) {
        let confirmed = remote
            .iter()
            .position(|r| r.ru == word.ru && r.en == word.en && r.ko == word.ko);
        match confirmed {
            Some(pos) => merged.push(remote.remove(pos)),
            None => merged.push(word),
        }
    }

    merged.extend(remote);

    merged.sort_by(|a, b| {
        let ts = |w: &WordRecord| w.created_at.map(|d| d.timestamp_millis()).unwrap_or(0);
        ts(b).cmp(&ts(a))
    });
    merged
}

pub struct SyncEngine {
    cache: WordsCache,
    identity: Arc<dyn IdentityProvider>,
    remote: Arc<dyn RemoteWords>,
    max_age: Duration,
}

impl SyncEngine {
    pub fn new(
        cache: WordsCache,
        identity: Arc<dyn IdentityProvider>,
        remote: Arc<dyn RemoteWords>,
        max_age: Duration,
    ) -> Self {
        Self {
            cache,
            identity,
            remote,
            max_age,
        }
    }

    /// True when the cached collection is old enough to warrant a refetch.
    pub fn is_stale(&self, user_id: &str) -> bool {
        self.cache.is_stale(user_id, self.max_age)
    }

    fn try_sync(&self, user_id: &str) -> Result<Vec<WordRecord>, WordsError> {
        // The session may have changed since this sync was scheduled.
        if self.identity.current_user_id().as_deref() != Some(user_id) {
            return Err(WordsError::Unauthenticated);
        }

        let remote = self
            .remote
            .fetch_words(user_id)
            .map_err(|e| WordsError::RemoteSync(e.to_string()))?;

        // Re-read local state after the fetch so edits made while the fetch
        // was in flight are part of the merge input.
        let local = match self.cache.load(user_id) {
            Ok(words) => words.unwrap_or_default(),
            Err(e) => {
                log::warn!("sync falling back to empty local state for {user_id}: {e}");
                Vec::new()
            }
        };

        let merged = merge_remote(local, remote);
        if let Err(e) = self.cache.save(user_id, &merged) {
            // Keep the merged result for the caller; the cache simply lags.
            log::warn!("failed to persist merged words for {user_id}: {e}");
        }
        Ok(merged)
    }

    /// One reconciliation pass. Any failure is logged and flattened to
    /// `None`; the previously cached state remains authoritative.
    pub fn sync_now(&self, user_id: &str) -> Option<Vec<WordRecord>> {
        match self.try_sync(user_id) {
            Ok(merged) => Some(merged),
            Err(e) => {
                log::warn!("word sync skipped for {user_id}: {e}");
                None
            }
        }
    }
}

type SyncCallback = Box<dyn Fn(&[WordRecord]) + Send>;

/// Teardown handle for the background sync worker. Dropping it (or calling
/// `stop`) shuts the worker down and joins it; a pass already in flight
/// finishes and persists before the join returns.
pub struct SyncHandle {
    shutdown: Arc<AtomicBool>,
    syncing: Arc<AtomicBool>,
    wake: mpsc::Sender<()>,
    worker: Option<JoinHandle<()>>,
}

impl SyncHandle {
    /// Wake the worker outside its periodic schedule, e.g. when the
    /// application regains focus. Dropped (not queued) while a pass is in
    /// flight; otherwise still gated by the staleness check.
    pub fn notify_active(&self) {
        if self.syncing.load(Ordering::SeqCst) {
            return;
        }
        let _ = self.wake.send(());
    }

    pub fn stop(self) {
        // Drop impl does the work.
    }
}

impl Drop for SyncHandle {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::SeqCst);
        let _ = self.wake.send(());
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

/// Start periodic reconciliation for `user_id`. Runs an immediate pass if
/// the cache is stale, then one per `interval` tick or `notify_active`
/// wakeup, each gated by staleness. `on_sync` receives every merged result.
pub fn start_sync(
    engine: Arc<SyncEngine>,
    user_id: String,
    interval: Duration,
    on_sync: SyncCallback,
) -> SyncHandle {
    let shutdown = Arc::new(AtomicBool::new(false));
    let syncing = Arc::new(AtomicBool::new(false));
    let (wake, ticks) = mpsc::channel::<()>();

    let worker_shutdown = shutdown.clone();
    let worker_syncing = syncing.clone();
    let worker = std::thread::spawn(move || {
        let run_pass = || {
            if worker_syncing.swap(true, Ordering::SeqCst) {
                return;
            }
            if let Some(words) = engine.sync_now(&user_id) {
                on_sync(&words);
            }
            worker_syncing.store(false, Ordering::SeqCst);
        };

        if engine.is_stale(&user_id) {
            run_pass();
        }

        loop {
            match ticks.recv_timeout(interval) {
                Ok(()) | Err(RecvTimeoutError::Timeout) => {
                    if worker_shutdown.load(Ordering::SeqCst) {
                        return;
                    }
                    if engine.is_stale(&user_id) {
                        run_pass();
                    }
                }
                Err(RecvTimeoutError::Disconnected) => return,
            }
        }
    });

    SyncHandle {
        shutdown,
        syncing,
        wake,
        worker: Some(worker),
    }
}
