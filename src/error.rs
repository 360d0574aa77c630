use thiserror::Error;

use crate::store::StorageError;

/// Failures surfaced by the word operations. Business failures
/// (`Unauthenticated`, `DuplicateWord`, `IncompleteWord`, `NotFound`) are
/// meant to block the specific action and reach the user; `Storage` and
/// `RemoteSync` are recovered close to where they occur and logged, keeping
/// the last-known-good local state visible.
#[derive(Debug, Error)]
pub enum WordsError {
    #[error("not signed in")]
    Unauthenticated,
    #[error("an identical word already exists")]
    DuplicateWord,
    #[error("a word needs at least two filled translations")]
    IncompleteWord,
    #[error("word not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("sync failed: {0}")]
    RemoteSync(String),
}
