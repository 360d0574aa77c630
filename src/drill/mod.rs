pub mod repeat;

pub use repeat::{RepeatState, word_set_fingerprint};
