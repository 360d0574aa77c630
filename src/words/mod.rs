pub mod api;
pub mod cache;
pub mod cleanup;
pub mod import;
pub mod normalize;
pub mod record;

pub use api::WordsApi;
pub use cache::WordsCache;
pub use record::{WordDraft, WordPatch, WordRecord};
