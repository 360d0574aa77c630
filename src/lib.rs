//! Core of a three-language vocabulary trainer: a per-user word store over
//! pluggable key-value persistence, optimistic-write reconciliation against
//! a remote backend, and the repeat-until-mastered drill state machine.
//! The binary in `main.rs` is a thin driver; any UI layer is expected to
//! consume these modules directly.

pub mod auth;
pub mod config;
pub mod drill;
pub mod error;
pub mod languages;
pub mod pagination;
pub mod records;
pub mod store;
pub mod sync;
pub mod words;

pub use error::WordsError;
