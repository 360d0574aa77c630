pub mod json_store;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage io: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage serialization: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Key-value persistence boundary. Every persisted collection (words, timer
/// records, sessions, settings) goes through this trait, so the failure
/// policy stays explicit at each call site: callers decide whether a failed
/// read means "no data" and whether a failed write is dropped.
pub trait StorageBackend: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}
