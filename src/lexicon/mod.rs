//! Loaded lexicons and their per-lexicon state.

pub mod cache;
pub mod entry;
pub mod registry;

pub use cache::WordInfoCache;
pub use entry::LexiconEntry;
pub use registry::{ImportOptions, LexiconRegistry};
