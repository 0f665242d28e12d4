use crate::attributes::WordInfo;
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;

/// Memo of attribute rows for the most recent search's words.
///
/// Lookups never populate it; the orchestrator refreshes it explicitly
/// after each search. Interior mutability keeps it usable from `&self`.
pub struct WordInfoCache {
    entries: Mutex<LruCache<String, WordInfo>>,
}

impl WordInfoCache {
    /// `None` (or zero) keeps every entry
    pub fn new(capacity: Option<usize>) -> Self {
        let cache = match capacity.and_then(NonZeroUsize::new) {
            Some(cap) => LruCache::new(cap),
            None => LruCache::unbounded(),
        };
        Self {
            entries: Mutex::new(cache),
        }
    }

    pub fn get(&self, word: &str) -> Option<WordInfo> {
        self.entries.lock().get(&word.to_ascii_uppercase()).cloned()
    }

    /// Add entries, keyed by their upper-cased word. Invalid infos are skipped.
    pub fn extend<I: IntoIterator<Item = WordInfo>>(&self, infos: I) {
        let mut entries = self.entries.lock();
        for info in infos.into_iter().filter(WordInfo::is_valid) {
            entries.put(info.word.to_ascii_uppercase(), info);
        }
    }

    /// Replace the whole cache with `infos`
    pub fn refresh<I: IntoIterator<Item = WordInfo>>(&self, infos: I) {
        self.entries.lock().clear();
        self.extend(infos);
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for WordInfoCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WordInfoCache").field("len", &self.len()).finish()
    }
}
