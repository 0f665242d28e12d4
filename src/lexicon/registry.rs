use super::entry::LexiconEntry;
use crate::attributes::{AttributeStore, WordInfo};
use crate::config::tables;
use crate::error::{LexiconError, Result};
use crate::query::executor::{alphagrams, SearchExecutor};
use crate::query::spec::{SearchSet, SearchSpec};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};

/// Options for [`LexiconRegistry::import_text`]
#[derive(Debug, Clone, Copy, Default)]
pub struct ImportOptions {
    /// Keep the text after each word as its definition
    pub load_definitions: bool,
    /// Derive the attribute table once the words are in
    pub build_attributes: bool,
}

/// Every loaded lexicon, by name.
///
/// Entries are created by the first import into a name and live until
/// [`LexiconRegistry::unload`]. Lookups against an unknown name return
/// empty or default values.
#[derive(Default)]
pub struct LexiconRegistry {
    lexicons: BTreeMap<String, LexiconEntry>,
}

impl LexiconRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entry(&self, lexicon: &str) -> Option<&LexiconEntry> {
        self.lexicons.get(lexicon)
    }

    fn entry_or_create(&mut self, lexicon: &str) -> &mut LexiconEntry {
        self.lexicons.entry(lexicon.to_string()).or_default()
    }

    fn entry_mut(&mut self, lexicon: &str) -> Result<&mut LexiconEntry> {
        self.lexicons
            .get_mut(lexicon)
            .ok_or_else(|| LexiconError::UnknownLexicon(lexicon.to_string()))
    }

    /// Import a word list file. Returns the number of lines imported.
    pub fn import_text(&mut self, lexicon: &str, path: &Path, options: ImportOptions) -> Result<usize> {
        let file = File::open(path).map_err(|e| LexiconError::file_access(path, e))?;
        let start = Instant::now();
        let imported = self
            .import_text_from(lexicon, BufReader::new(file), options)
            .map_err(|e| match e {
                LexiconError::FileAccess { source, .. } => LexiconError::file_access(path, source),
                other => other,
            })?;
        info!(lexicon, path = %path.display(), imported, elapsed = ?start.elapsed(), "imported word list");
        Ok(imported)
    }

    /// Import a word list from any reader
    pub fn import_text_from<R: BufRead>(&mut self, lexicon: &str, reader: R, options: ImportOptions) -> Result<usize> {
        let created = !self.lexicons.contains_key(lexicon);
        let entry = self.entry_or_create(lexicon);
        let imported = match entry.import_lines(reader, options.load_definitions) {
            Ok(imported) => imported,
            Err(e) => {
                if created {
                    self.lexicons.remove(lexicon);
                }
                return Err(LexiconError::file_access("<reader>", e));
            }
        };
        let entry = self.entry_or_create(lexicon);
        if options.build_attributes {
            entry.build_attributes();
        }
        Ok(imported)
    }

    /// Import a binary graph. A checksum mismatch or malformed file leaves
    /// the lexicon untouched.
    pub fn import_binary(
        &mut self,
        lexicon: &str,
        path: &Path,
        reversed: bool,
        expected_checksum: Option<u32>,
    ) -> Result<usize> {
        let max_len = tables().max_word_length;
        let result = self
            .entry_or_create(lexicon)
            .graph_mut()
            .import_binary(path, reversed, expected_checksum, max_len);
        if let Err(e) = &result {
            warn!(lexicon, path = %path.display(), error = %e, "binary graph import failed");
        }
        result
    }

    /// Import a stem file into an already loaded lexicon. Returns 0 when the
    /// lexicon is unknown.
    pub fn import_stems(&mut self, lexicon: &str, path: &Path) -> Result<usize> {
        let Some(entry) = self.lexicons.get_mut(lexicon) else {
            return Ok(0);
        };
        let file = File::open(path).map_err(|e| LexiconError::file_access(path, e))?;
        let imported = entry
            .import_stem_lines(BufReader::new(file))
            .map_err(|e| LexiconError::file_access(path, e))?;
        info!(lexicon, path = %path.display(), imported, "imported stems");
        Ok(imported)
    }

    /// Derive the attribute table from the lexicon's graph
    pub fn build_attributes(&mut self, lexicon: &str) -> Result<usize> {
        let start = Instant::now();
        let rows = self.entry_mut(lexicon)?.build_attributes();
        info!(lexicon, rows, elapsed = ?start.elapsed(), "built attribute table");
        Ok(rows)
    }

    /// Attach an attribute table saved earlier. Returns its row count.
    pub fn connect_attributes(&mut self, lexicon: &str, path: &Path) -> Result<usize> {
        let store = AttributeStore::open(path)?;
        let rows = store.num_words();
        self.entry_mut(lexicon)?.set_attributes(Some(store));
        Ok(rows)
    }

    /// Drop the attribute table. Returns false if none was connected.
    pub fn disconnect_attributes(&mut self, lexicon: &str) -> bool {
        self.lexicons
            .get_mut(lexicon)
            .and_then(|entry| entry.set_attributes(None))
            .is_some()
    }

    pub fn attributes_connected(&self, lexicon: &str) -> bool {
        self.entry(lexicon).is_some_and(|e| e.attributes().is_some())
    }

    pub fn save_attributes(&self, lexicon: &str, path: &Path) -> Result<()> {
        let entry = self
            .entry(lexicon)
            .ok_or_else(|| LexiconError::UnknownLexicon(lexicon.to_string()))?;
        let store = entry
            .attributes()
            .ok_or_else(|| LexiconError::BackendUnavailable(lexicon.to_string()))?;
        store.save(path)
    }

    /// Run a search. `all_caps` upper-cases every result.
    pub fn search(&self, lexicon: &str, spec: &SearchSpec, all_caps: bool) -> Vec<String> {
        match self.entry(lexicon) {
            Some(entry) => SearchExecutor::new(entry).execute(spec, all_caps),
            None => Vec::new(),
        }
    }

    pub fn word_info(&self, lexicon: &str, word: &str) -> WordInfo {
        self.entry(lexicon)
            .map(|e| e.word_info(word))
            .unwrap_or_default()
    }

    /// Warm the word cache with `words`
    pub fn prefetch<S: AsRef<str>>(&self, lexicon: &str, words: &[S]) {
        if let Some(entry) = self.entry(lexicon) {
            entry.prefetch(words);
        }
    }

    pub fn definition(&self, lexicon: &str, word: &str, resolve: bool) -> String {
        self.entry(lexicon)
            .map(|e| e.definition(word, resolve))
            .unwrap_or_default()
    }

    pub fn is_acceptable(&self, lexicon: &str, word: &str) -> bool {
        self.entry(lexicon)
            .is_some_and(|e| e.graph().contains_word(word))
    }

    pub fn num_words(&self, lexicon: &str) -> usize {
        self.entry(lexicon).map_or(0, |e| e.num_words())
    }

    pub fn front_hook_letters(&self, lexicon: &str, word: &str) -> String {
        self.entry(lexicon)
            .map(|e| e.front_hook_letters(word))
            .unwrap_or_default()
    }

    pub fn back_hook_letters(&self, lexicon: &str, word: &str) -> String {
        self.entry(lexicon)
            .map(|e| e.back_hook_letters(word))
            .unwrap_or_default()
    }

    pub fn probability_order(&self, lexicon: &str, word: &str) -> u32 {
        self.word_info(lexicon, word).probability_order
    }

    pub fn min_probability_order(&self, lexicon: &str, word: &str) -> u32 {
        self.word_info(lexicon, word).min_probability_order
    }

    pub fn max_probability_order(&self, lexicon: &str, word: &str) -> u32 {
        self.word_info(lexicon, word).max_probability_order
    }

    /// Computed from the word itself when there is no row, even for an
    /// unknown lexicon
    pub fn num_vowels(&self, lexicon: &str, word: &str) -> u32 {
        match self.entry(lexicon) {
            Some(e) => e.num_vowels(word),
            None => crate::utils::letters::num_vowels(word),
        }
    }

    pub fn num_unique_letters(&self, lexicon: &str, word: &str) -> u32 {
        match self.entry(lexicon) {
            Some(e) => e.num_unique_letters(word),
            None => crate::utils::letters::num_unique_letters(word),
        }
    }

    pub fn point_value(&self, lexicon: &str, word: &str) -> u32 {
        self.entry(lexicon).map_or(0, |e| e.point_value(word))
    }

    pub fn num_anagrams(&self, lexicon: &str, word: &str) -> u32 {
        self.entry(lexicon).map_or(0, |e| e.num_anagrams(word))
    }

    pub fn is_front_hook(&self, lexicon: &str, word: &str) -> bool {
        self.entry(lexicon).is_some_and(|e| e.is_front_hook(word))
    }

    pub fn is_back_hook(&self, lexicon: &str, word: &str) -> bool {
        self.entry(lexicon).is_some_and(|e| e.is_back_hook(word))
    }

    pub fn lexicon_symbols(&self, lexicon: &str, word: &str) -> String {
        self.word_info(lexicon, word).lexicon_symbols
    }

    /// Set membership of a word assumed to be acceptable
    pub fn is_set_member(&self, lexicon: &str, word: &str, set: SearchSet) -> bool {
        self.entry(lexicon).is_some_and(|e| e.is_set_member(word, set))
    }

    /// Deduplicated alphagrams of a word list
    pub fn alphagrams<S: AsRef<str>>(words: &[S]) -> Vec<String> {
        alphagrams(words)
    }

    pub fn clear_cache(&self, lexicon: &str) {
        if let Some(entry) = self.entry(lexicon) {
            entry.cache().clear();
        }
    }

    pub fn lexicon_names(&self) -> Vec<String> {
        self.lexicons.keys().cloned().collect()
    }

    pub fn is_loaded(&self, lexicon: &str) -> bool {
        self.lexicons.contains_key(lexicon)
    }

    /// Tear down a lexicon, releasing its attribute table before its graph
    pub fn unload(&mut self, lexicon: &str) -> bool {
        match self.lexicons.remove(lexicon) {
            Some(mut entry) => {
                drop(entry.set_attributes(None));
                info!(lexicon, "unloaded lexicon");
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_unknown_lexicon_is_falsy() {
        let registry = LexiconRegistry::new();
        let spec = SearchSpec::all_of(vec![crate::query::spec::Condition::pattern("???")]);
        assert!(registry.search("NONE", &spec, false).is_empty());
        assert!(!registry.is_acceptable("NONE", "CAT"));
        assert!(!registry.word_info("NONE", "CAT").is_valid());
        assert_eq!(registry.num_words("NONE"), 0);
        assert_eq!(registry.num_vowels("NONE", "AEIOU"), 5);
        assert!(registry.lexicon_names().is_empty());
    }

    #[test]
    fn test_import_stems_requires_loaded_lexicon() {
        let mut registry = LexiconRegistry::new();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stems.txt");
        std::fs::write(&path, "SATIRE\n").unwrap();
        assert_eq!(registry.import_stems("TWL", &path).unwrap(), 0);

        registry
            .import_text_from("TWL", Cursor::new("CAT\n"), ImportOptions::default())
            .unwrap();
        assert_eq!(registry.import_stems("TWL", &path).unwrap(), 1);
        assert!(matches!(
            registry.import_stems("TWL", &dir.path().join("missing.txt")),
            Err(LexiconError::FileAccess { .. })
        ));
    }

    #[test]
    fn test_attribute_lifecycle() {
        let mut registry = LexiconRegistry::new();
        let options = ImportOptions {
            load_definitions: false,
            build_attributes: true,
        };
        registry
            .import_text_from("TWL", Cursor::new("CAT\nDOG\n"), options)
            .unwrap();
        assert!(registry.attributes_connected("TWL"));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("twl.json");
        registry.save_attributes("TWL", &path).unwrap();

        assert!(registry.disconnect_attributes("TWL"));
        assert!(!registry.disconnect_attributes("TWL"));
        assert!(matches!(
            registry.save_attributes("TWL", &path),
            Err(LexiconError::BackendUnavailable(_))
        ));

        assert_eq!(registry.connect_attributes("TWL", &path).unwrap(), 2);
        assert_eq!(registry.probability_order("TWL", "CAT"), registry.max_probability_order("TWL", "CAT"));

        assert!(registry.unload("TWL"));
        assert!(!registry.is_loaded("TWL"));
        assert!(!registry.unload("TWL"));
    }
}
