//! Word graph: membership, insertion, binary import and structural search.
//!
//! ## Modules
//!
//! - [`trie`] - Arena trie and the traversal-based matchers
//! - [`pattern`] - Wildcard tokens (`?`, `*`, `[..]`) and anagram racks
//! - [`binary`] - Compact on-disk DAWG format with trailing CRC-32
//!
//! Words are kept twice: front-to-back and back-to-front. Patterns anchored
//! only at the end (`*ING`) walk the reverse trie, so the fixed suffix prunes
//! the search instead of the leading wildcard.

pub mod binary;
pub mod pattern;
pub mod trie;

use crate::error::Result;
use crate::query::spec::{Condition, ConditionKind};
use pattern::{tokenize, LetterSet, Rack, Token};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{debug, info};
pub use trie::LengthBounds;
use trie::Trie;

/// Forward and reverse tries over one lexicon
#[derive(Debug, Clone, Default)]
pub struct WordGraph {
    forward: Trie,
    reverse: Trie,
}

impl WordGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn num_words(&self) -> usize {
        self.forward.len()
    }

    /// Case-insensitive membership test
    pub fn contains_word(&self, word: &str) -> bool {
        self.forward.contains(word.bytes().map(|b| b.to_ascii_uppercase()))
    }

    /// Add a word. Returns true if it was new.
    pub fn add_word(&mut self, word: &str) -> bool {
        let upper: Vec<u8> = word.bytes().map(|b| b.to_ascii_uppercase()).collect();
        if upper.is_empty() || !self.forward.insert(upper.iter().copied()) {
            return false;
        }
        self.reverse.insert(upper.iter().rev().copied());
        true
    }

    /// Import a binary graph file. Nothing is inserted unless the whole file
    /// decodes and its checksum verifies. Returns the number of new words.
    pub fn import_binary(
        &mut self,
        path: &Path,
        reversed: bool,
        expected_checksum: Option<u32>,
        max_len: usize,
    ) -> Result<usize> {
        let words = binary::read_graph_file(path, expected_checksum, max_len)?;
        let decoded = words.len();

        let mut added = 0;
        for word in words {
            let added_now = if reversed {
                let forward: String = word.chars().rev().collect();
                self.add_word(&forward)
            } else {
                self.add_word(&word)
            };
            added += added_now as usize;
        }

        info!(path = %path.display(), reversed, decoded, added, "imported binary graph");
        Ok(added)
    }

    /// Write the graph (or its reversal) in binary form, returning the checksum
    pub fn export_binary(&self, path: &Path, reversed: bool) -> Result<u32> {
        let trie = if reversed { &self.reverse } else { &self.forward };
        binary::write_graph_file(path, trie)
    }

    /// Letters that form a word when placed in front, lower case and sorted
    pub fn front_hook_letters(&self, word: &str) -> String {
        let upper = word.to_ascii_uppercase();
        (b'A'..=b'Z')
            .filter(|&l| {
                self.forward
                    .contains(std::iter::once(l).chain(upper.bytes()))
            })
            .map(|l| l.to_ascii_lowercase() as char)
            .collect()
    }

    /// Letters that form a word when placed behind, lower case and sorted
    pub fn back_hook_letters(&self, word: &str) -> String {
        let upper = word.to_ascii_uppercase();
        (b'A'..=b'Z')
            .filter(|&l| {
                self.forward
                    .contains(upper.bytes().chain(std::iter::once(l)))
            })
            .map(|l| l.to_ascii_lowercase() as char)
            .collect()
    }

    /// The word minus its first letter is itself a word
    pub fn is_front_hook(&self, word: &str) -> bool {
        word.len() > 1 && word.get(1..).is_some_and(|rest| self.contains_word(rest))
    }

    /// The word minus its last letter is itself a word
    pub fn is_back_hook(&self, word: &str) -> bool {
        word.len() > 1 && word.get(..word.len() - 1).is_some_and(|rest| self.contains_word(rest))
    }

    /// Every word in lexical order
    pub fn words(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.forward.collect_all(LengthBounds::new(1, usize::MAX), &mut out);
        into_strings(out)
    }

    /// Evaluate graph-phase conditions. Conditions of other kinds are ignored.
    ///
    /// With no graph-phase condition at all every word within `bounds` is
    /// returned. Conjunctions intersect, disjunctions union.
    pub fn search(&self, conditions: &[&Condition], conjunction: bool, bounds: LengthBounds) -> Vec<String> {
        let graph_conditions: Vec<&Condition> = conditions
            .iter()
            .copied()
            .filter(|c| is_graph_kind(&c.kind))
            .collect();

        if graph_conditions.is_empty() {
            let mut out = Vec::new();
            self.forward.collect_all(bounds, &mut out);
            return into_strings(out);
        }

        let mut universe: Option<BTreeSet<Vec<u8>>> = None;
        let mut result: Option<BTreeSet<Vec<u8>>> = None;

        for condition in graph_conditions {
            let mut matched = self.matching(&condition.kind, bounds);
            if condition.negated {
                let all = universe.get_or_insert_with(|| {
                    let mut out = Vec::new();
                    self.forward.collect_all(bounds, &mut out);
                    out.into_iter().collect()
                });
                matched = all.difference(&matched).cloned().collect();
            }

            result = Some(match result {
                None => matched,
                Some(acc) if conjunction => acc.intersection(&matched).cloned().collect(),
                Some(mut acc) => {
                    acc.extend(matched);
                    acc
                }
            });

            if conjunction && result.as_ref().is_some_and(|r| r.is_empty()) {
                break;
            }
        }

        result
            .unwrap_or_default()
            .into_iter()
            .map(|w| String::from_utf8_lossy(&w).into_owned())
            .collect()
    }

    fn matching(&self, kind: &ConditionKind, bounds: LengthBounds) -> BTreeSet<Vec<u8>> {
        let mut out = Vec::new();
        match kind {
            ConditionKind::PatternMatch(pattern) => {
                let tokens = tokenize(pattern);
                if use_reverse(&tokens) {
                    let reversed: Vec<Token> = tokens.iter().rev().copied().collect();
                    debug!(pattern, "pattern search on reverse graph");
                    self.reverse.collect_pattern(&reversed, bounds, &mut out);
                    for word in &mut out {
                        word.reverse();
                    }
                } else {
                    self.forward.collect_pattern(&tokens, bounds, &mut out);
                }
            }
            ConditionKind::AnagramMatch(letters) => {
                let rack = Rack::from_tokens(&tokenize(letters));
                self.forward.collect_anagrams(&rack, true, bounds, &mut out);
            }
            ConditionKind::SubanagramMatch(letters) => {
                let rack = Rack::from_tokens(&tokenize(letters));
                self.forward.collect_anagrams(&rack, false, bounds, &mut out);
            }
            ConditionKind::ConsistOf { letters, percent } => {
                self.forward.collect_consisting_of(
                    LetterSet::from_letters(letters),
                    percent.min,
                    percent.max,
                    bounds,
                    &mut out,
                );
            }
            _ => {}
        }
        out.into_iter().collect()
    }
}

fn is_graph_kind(kind: &ConditionKind) -> bool {
    matches!(
        kind,
        ConditionKind::PatternMatch(_)
            | ConditionKind::AnagramMatch(_)
            | ConditionKind::SubanagramMatch(_)
            | ConditionKind::ConsistOf { .. }
    )
}

/// Leading `*` with a literal tail: walk from the end instead
fn use_reverse(tokens: &[Token]) -> bool {
    tokens.first() == Some(&Token::Star) && tokens.last().is_some_and(|t| *t != Token::Star)
}

fn into_strings(mut out: Vec<Vec<u8>>) -> Vec<String> {
    out.sort();
    out.dedup();
    out.into_iter()
        .map(|w| String::from_utf8_lossy(&w).into_owned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::spec::Range;

    const ANY: LengthBounds = LengthBounds { min: 1, max: 64 };

    fn graph(words: &[&str]) -> WordGraph {
        let mut g = WordGraph::new();
        for w in words {
            g.add_word(w);
        }
        g
    }

    fn search(g: &WordGraph, conditions: &[Condition], conjunction: bool) -> Vec<String> {
        let refs: Vec<&Condition> = conditions.iter().collect();
        g.search(&refs, conjunction, ANY)
    }

    #[test]
    fn test_add_word_is_idempotent() {
        let mut g = graph(&["cat"]);
        assert!(g.contains_word("CAT"));
        assert!(g.contains_word("cat"));
        assert!(!g.add_word("CAT"));
        assert_eq!(g.num_words(), 1);
        assert!(!g.add_word(""));
    }

    #[test]
    fn test_suffix_pattern_uses_reverse_graph() {
        let g = graph(&["RING", "SING", "SINGS", "SINGER", "GIN"]);
        let words = search(&g, &[Condition::pattern("*ING")], true);
        assert_eq!(words, vec!["RING", "SING"]);
    }

    #[test]
    fn test_conjunction_and_disjunction() {
        let g = graph(&["CAT", "COT", "DOG", "ACT"]);
        let both = search(&g, &[Condition::pattern("C?T"), Condition::anagram("TAC")], true);
        assert_eq!(both, vec!["CAT"]);

        let either = search(&g, &[Condition::pattern("D*"), Condition::anagram("TAC")], false);
        assert_eq!(either, vec!["ACT", "CAT", "DOG"]);
    }

    #[test]
    fn test_negated_condition_complements_within_bounds() {
        let g = graph(&["CAT", "COT", "DOG"]);
        let words = search(&g, &[Condition::pattern("C??").negate()], true);
        assert_eq!(words, vec!["DOG"]);
    }

    #[test]
    fn test_consist_of_window() {
        let g = graph(&["AE", "AT", "TT"]);
        let half = Condition::new(ConditionKind::ConsistOf {
            letters: "AEIOU".to_string(),
            percent: Range::new(50, 50),
        });
        assert_eq!(search(&g, &[half], true), vec!["AT"]);
    }

    #[test]
    fn test_no_graph_conditions_lists_bounded_words() {
        let g = graph(&["A", "AB", "ABC"]);
        let refs: Vec<&Condition> = Vec::new();
        assert_eq!(g.search(&refs, true, LengthBounds::new(2, 3)), vec!["AB", "ABC"]);
    }

    #[test]
    fn test_binary_round_trip_reversed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rev.dwg");
        let g = graph(&["CAT", "CATS", "DOG"]);
        let checksum = g.export_binary(&path, true).unwrap();

        let mut loaded = WordGraph::new();
        let added = loaded.import_binary(&path, true, Some(checksum), 64).unwrap();
        assert_eq!(added, 3);
        assert_eq!(loaded.words(), vec!["CAT", "CATS", "DOG"]);
    }

    #[test]
    fn test_bad_checksum_leaves_graph_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("words.dwg");
        let checksum = graph(&["CAT"]).export_binary(&path, false).unwrap();

        let mut loaded = graph(&["DOG"]);
        assert!(loaded.import_binary(&path, false, Some(checksum.wrapping_add(1)), 64).is_err());
        assert_eq!(loaded.words(), vec!["DOG"]);
    }
}
