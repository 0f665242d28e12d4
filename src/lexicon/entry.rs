use super::cache::WordInfoCache;
use crate::attributes::{AttributeRow, AttributeStore, WordInfo};
use crate::classify::{SetClassifier, StemAlphagrams};
use crate::config::tables;
use crate::graph::WordGraph;
use crate::query::spec::SearchSet;
use crate::utils::letters::{alphagram, num_unique_letters, num_vowels};
use ahash::AHashMap;
use rayon::prelude::*;
use regex::Regex;
use std::collections::BTreeMap;
use std::io::{self, BufRead};
use std::sync::OnceLock;
use tracing::warn;

/// Definitions of one word keyed by part of speech
pub type Definitions = BTreeMap<String, Vec<String>>;

static POS_REGEX: OnceLock<Option<Regex>> = OnceLock::new();

fn part_of_speech(definition: &str) -> String {
    let regex = POS_REGEX.get_or_init(|| Regex::new(r"\[(\w+)").ok());
    regex
        .as_ref()
        .and_then(|re| re.captures(definition))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

/// Every line of `reader` without its terminator. Bytes that are not UTF-8
/// are replaced rather than failing the read.
fn read_lines<R: BufRead>(mut reader: R) -> io::Result<Vec<String>> {
    let mut lines = Vec::new();
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            return Ok(lines);
        }
        while matches!(buf.last(), Some(b'\n' | b'\r')) {
            buf.pop();
        }
        lines.push(String::from_utf8_lossy(&buf).into_owned());
    }
}

/// Everything known about one loaded lexicon
pub struct LexiconEntry {
    // Declared first so it is released before the graph
    attributes: Option<AttributeStore>,
    graph: WordGraph,
    cache: WordInfoCache,
    anagram_counts: AHashMap<String, u32>,
    stems: AHashMap<usize, Vec<String>>,
    stem_alphagrams: StemAlphagrams,
    definitions: AHashMap<String, Definitions>,
}

impl LexiconEntry {
    pub fn new() -> Self {
        Self {
            attributes: None,
            graph: WordGraph::new(),
            cache: WordInfoCache::new(tables().cache_capacity),
            anagram_counts: AHashMap::new(),
            stems: AHashMap::new(),
            stem_alphagrams: StemAlphagrams::default(),
            definitions: AHashMap::new(),
        }
    }

    pub fn graph(&self) -> &WordGraph {
        &self.graph
    }

    pub(crate) fn graph_mut(&mut self) -> &mut WordGraph {
        &mut self.graph
    }

    pub fn attributes(&self) -> Option<&AttributeStore> {
        self.attributes.as_ref()
    }

    pub fn stem_alphagrams(&self) -> &StemAlphagrams {
        &self.stem_alphagrams
    }

    pub fn stems(&self, length: usize) -> &[String] {
        self.stems.get(&length).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn cache(&self) -> &WordInfoCache {
        &self.cache
    }

    /// Add a word, counting it toward its alphagram only if it is new
    pub fn add_word(&mut self, word: &str) -> bool {
        let upper = word.to_ascii_uppercase();
        if upper.is_empty() || self.graph.contains_word(&upper) {
            return false;
        }
        *self.anagram_counts.entry(alphagram(&upper)).or_default() += 1;
        self.graph.add_word(&upper)
    }

    /// Read a word list: one word per line, optional trailing definition.
    /// Blank lines and `#` comments are skipped.
    ///
    /// The whole input is read before the lexicon changes, so a read error
    /// imports nothing.
    pub fn import_lines<R: BufRead>(&mut self, reader: R, load_definitions: bool) -> io::Result<usize> {
        let lines = read_lines(reader)?;
        let mut imported = 0;
        for line in &lines {
            let mut tokens = line.split_whitespace();
            let Some(first) = tokens.next() else {
                continue;
            };
            if first.starts_with('#') {
                continue;
            }

            let word = first.to_ascii_uppercase();
            self.add_word(&word);
            if load_definitions {
                let definition = tokens.collect::<Vec<_>>().join(" ");
                self.add_definition(&word, &definition);
            }
            imported += 1;
        }
        Ok(imported)
    }

    /// Read stems of one length. The first stem fixes the length; lines of
    /// any other length are dropped.
    pub fn import_stem_lines<R: BufRead>(&mut self, reader: R) -> io::Result<usize> {
        let lines = read_lines(reader)?;
        let mut words = Vec::new();
        let mut length = 0;
        let mut discarded = 0;

        for line in &lines {
            let Some(stem) = line.split_whitespace().next() else {
                continue;
            };
            if stem.starts_with('#') {
                continue;
            }
            if length == 0 {
                length = stem.len();
            }
            if stem.len() != length {
                discarded += 1;
                continue;
            }
            words.push(stem.to_ascii_uppercase());
        }

        if discarded > 0 {
            warn!(length, discarded, "discarded stems of other lengths");
        }

        let imported = words.len();
        if imported > 0 {
            let alphagrams = self.stem_alphagrams.entry(length).or_default();
            alphagrams.extend(words.iter().map(|w| alphagram(w)));
            self.stems.entry(length).or_default().extend(words);
        }
        Ok(imported)
    }

    /// Split `a / b` definitions and file them by part of speech
    pub fn add_definition(&mut self, word: &str, definition: &str) {
        if word.is_empty() || definition.is_empty() {
            return;
        }
        let mut by_pos = Definitions::new();
        for part in definition.split(" / ") {
            by_pos
                .entry(part_of_speech(part))
                .or_default()
                .push(part.to_string());
        }
        self.definitions.insert(word.to_ascii_uppercase(), by_pos);
    }

    fn joined_definitions(&self, word: &str, separator: &str) -> String {
        self.definitions
            .get(&word.to_ascii_uppercase())
            .map(|by_pos| {
                by_pos
                    .values()
                    .flatten()
                    .map(String::as_str)
                    .collect::<Vec<_>>()
                    .join(separator)
            })
            .unwrap_or_default()
    }

    /// Derive the attribute table from the graph. Returns the row count.
    pub fn build_attributes(&mut self) -> usize {
        let tables = tables();
        let words = self.graph.words();

        let mut counts: AHashMap<String, u32> = AHashMap::new();
        for word in &words {
            *counts.entry(alphagram(word)).or_default() += 1;
        }

        let rows: Vec<AttributeRow> = words
            .par_iter()
            .map(|word| {
                let anagrams = counts.get(&alphagram(word)).copied().unwrap_or(1);
                let definition = self.joined_definitions(word, " / ");
                AttributeRow::derive(word, &self.graph, anagrams, definition, tables)
            })
            .collect();

        let store = AttributeStore::build(rows);
        let rows = store.num_words();
        self.set_attributes(Some(store));
        rows
    }

    /// Swap the attribute store, returning the previous one. The cache is
    /// dropped since it mirrors the old store.
    pub fn set_attributes(&mut self, store: Option<AttributeStore>) -> Option<AttributeStore> {
        self.cache.clear();
        std::mem::replace(&mut self.attributes, store)
    }

    /// Attributes from the cache or the store; default when neither has a row
    pub fn word_info(&self, word: &str) -> WordInfo {
        if word.is_empty() {
            return WordInfo::default();
        }
        if let Some(info) = self.cache.get(word) {
            return info;
        }
        self.attributes
            .as_ref()
            .map(|store| store.fetch(word))
            .unwrap_or_default()
    }

    /// Load rows for `words` into the cache
    pub fn prefetch<S: AsRef<str>>(&self, words: &[S]) {
        if let Some(store) = &self.attributes {
            self.cache.extend(store.fetch_many(words));
        }
    }

    /// Clear the cache and repopulate it with exactly `words`
    pub fn refresh_cache<S: AsRef<str>>(&self, words: &[S]) {
        match &self.attributes {
            Some(store) => self.cache.refresh(store.fetch_many(words)),
            None => self.cache.clear(),
        }
    }

    pub fn num_words(&self) -> usize {
        match &self.attributes {
            Some(store) => store.num_words(),
            None => self.graph.num_words(),
        }
    }

    pub fn definition(&self, word: &str, resolve: bool) -> String {
        let info = self.word_info(word);
        if info.is_valid() {
            return if resolve {
                info.definition.split(" / ").collect::<Vec<_>>().join("\n")
            } else {
                info.definition
            };
        }
        self.joined_definitions(word, if resolve { "\n" } else { " / " })
    }

    pub fn front_hook_letters(&self, word: &str) -> String {
        let info = self.word_info(word);
        if info.is_valid() {
            info.front_hooks
        } else {
            self.graph.front_hook_letters(word)
        }
    }

    pub fn back_hook_letters(&self, word: &str) -> String {
        let info = self.word_info(word);
        if info.is_valid() {
            info.back_hooks
        } else {
            self.graph.back_hook_letters(word)
        }
    }

    pub fn num_vowels(&self, word: &str) -> u32 {
        let info = self.word_info(word);
        if info.is_valid() {
            info.num_vowels
        } else {
            num_vowels(word)
        }
    }

    pub fn num_unique_letters(&self, word: &str) -> u32 {
        let info = self.word_info(word);
        if info.is_valid() {
            info.num_unique_letters
        } else {
            num_unique_letters(word)
        }
    }

    pub fn point_value(&self, word: &str) -> u32 {
        let info = self.word_info(word);
        if info.is_valid() {
            info.point_value
        } else {
            tables().point_value(word)
        }
    }

    pub fn num_anagrams(&self, word: &str) -> u32 {
        let info = self.word_info(word);
        if info.is_valid() {
            info.num_anagrams
        } else {
            let key = alphagram(&word.to_ascii_uppercase());
            self.anagram_counts.get(&key).copied().unwrap_or(0)
        }
    }

    pub fn is_front_hook(&self, word: &str) -> bool {
        let info = self.word_info(word);
        if info.is_valid() {
            info.is_front_hook
        } else {
            self.graph.is_front_hook(word)
        }
    }

    pub fn is_back_hook(&self, word: &str) -> bool {
        let info = self.word_info(word);
        if info.is_valid() {
            info.is_back_hook
        } else {
            self.graph.is_back_hook(word)
        }
    }

    pub fn is_set_member(&self, word: &str, set: SearchSet) -> bool {
        SetClassifier::new(&self.graph, &self.stem_alphagrams, tables()).is_member(word, set)
    }
}

impl Default for LexiconEntry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufReader, Cursor, Read};

    #[test]
    fn test_import_lines_skips_comments_and_counts_anagrams() {
        let mut entry = LexiconEntry::new();
        let text = "# header\n\ncat\nACT\nCAT\n  tac  extra words\n";
        let imported = entry.import_lines(Cursor::new(text), false).unwrap();
        assert_eq!(imported, 4);
        assert_eq!(entry.graph().num_words(), 3);
        // CAT seen twice counts once
        assert_eq!(entry.num_anagrams("cat"), 3);
    }

    #[test]
    fn test_import_lines_survives_invalid_utf8() {
        let mut entry = LexiconEntry::new();
        let text: &[u8] = b"CAT a feline\r\nCAFE caf\xe9\nDOG\nEMU\n";
        let imported = entry.import_lines(Cursor::new(text), true).unwrap();
        assert_eq!(imported, 4);
        assert!(entry.graph().contains_word("CAFE"));
        assert!(entry.graph().contains_word("DOG"));
        assert!(entry.graph().contains_word("EMU"));
        assert_eq!(entry.definition("CAT", false), "a feline");
        assert_eq!(entry.definition("CAFE", false), "caf\u{fffd}");
    }

    /// Yields `data`, then fails
    struct FailingReader {
        data: Cursor<&'static [u8]>,
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.data.read(buf)? {
                0 => Err(io::Error::other("disk gone")),
                n => Ok(n),
            }
        }
    }

    #[test]
    fn test_read_error_imports_nothing() {
        let mut entry = LexiconEntry::new();
        entry.import_lines(Cursor::new("ZAX\n"), false).unwrap();

        let reader = BufReader::new(FailingReader {
            data: Cursor::new(b"CAT\nDOG\n"),
        });
        assert!(entry.import_lines(reader, false).is_err());
        assert_eq!(entry.graph().num_words(), 1);
        assert!(!entry.graph().contains_word("CAT"));

        let reader = BufReader::new(FailingReader {
            data: Cursor::new(b"SATIRE\n"),
        });
        assert!(entry.import_stem_lines(reader).is_err());
        assert!(entry.stems(6).is_empty());
    }

    #[test]
    fn test_definitions_by_part_of_speech() {
        let mut entry = LexiconEntry::new();
        let text = "CAT a feline [n CATS] / to vomit [v CATTED, CATTING, CATS]\n";
        entry.import_lines(Cursor::new(text), true).unwrap();

        assert_eq!(
            entry.definition("cat", false),
            "a feline [n CATS] / to vomit [v CATTED, CATTING, CATS]"
        );
        assert_eq!(
            entry.definition("CAT", true),
            "a feline [n CATS]\nto vomit [v CATTED, CATTING, CATS]"
        );
        assert_eq!(entry.definition("DOG", true), "");
    }

    #[test]
    fn test_stem_length_fixed_by_first_stem() {
        let mut entry = LexiconEntry::new();
        let imported = entry
            .import_stem_lines(Cursor::new("SATIRE\nRETAINS\nretain\n"))
            .unwrap();
        assert_eq!(imported, 2);
        assert_eq!(entry.stems(6), ["SATIRE".to_string(), "RETAIN".to_string()]);
        assert!(entry.stem_alphagrams()[&6].contains("AEIRST"));
        assert!(entry.stems(7).is_empty());

        // A second file of the same length accumulates
        entry.import_stem_lines(Cursor::new("ORIENT\n")).unwrap();
        assert_eq!(entry.stems(6).len(), 3);
    }

    #[test]
    fn test_lookups_fall_back_without_attributes() {
        let mut entry = LexiconEntry::new();
        entry.import_lines(Cursor::new("AT\nCAT\nCATS\nSCAT\n"), false).unwrap();

        assert!(!entry.word_info("CAT").is_valid());
        assert_eq!(entry.front_hook_letters("CAT"), "s");
        assert_eq!(entry.back_hook_letters("CAT"), "s");
        assert_eq!(entry.num_vowels("QUEUE"), 4);
        assert_eq!(entry.point_value("CAT"), 5);
        assert!(entry.is_front_hook("CAT"));
    }

    #[test]
    fn test_build_attributes_and_cache_refresh() {
        let mut entry = LexiconEntry::new();
        entry.import_lines(Cursor::new("CAT\nACT\nDOG\n"), false).unwrap();
        assert_eq!(entry.build_attributes(), 3);

        let info = entry.word_info("act");
        assert!(info.is_valid());
        assert_eq!(info.num_anagrams, 2);
        assert_eq!(entry.cache().len(), 0);

        entry.refresh_cache(&["CAT", "DOG"]);
        assert_eq!(entry.cache().len(), 2);
        entry.refresh_cache(&["ACT"]);
        assert_eq!(entry.cache().len(), 1);
    }
}
