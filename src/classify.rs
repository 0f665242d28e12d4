//! Classification of a single acceptable word into game-specific sets.
//!
//! The stem-derived tiers are exclusive by construction: Type II excludes
//! Type I, Type III excludes both.

use crate::config::LetterTables;
use crate::graph::WordGraph;
use crate::query::spec::SearchSet;
use crate::utils::letters::alphagram;
use ahash::{AHashMap, AHashSet};

/// Stem alphagrams keyed by stem length
pub type StemAlphagrams = AHashMap<usize, AHashSet<String>>;

pub struct SetClassifier<'a> {
    graph: &'a WordGraph,
    stems: &'a StemAlphagrams,
    tables: &'a LetterTables,
}

impl<'a> SetClassifier<'a> {
    pub fn new(graph: &'a WordGraph, stems: &'a StemAlphagrams, tables: &'a LetterTables) -> Self {
        Self {
            graph,
            stems,
            tables,
        }
    }

    /// Whether an already-verified word belongs to `set`
    pub fn is_member(&self, word: &str, set: SearchSet) -> bool {
        let word = word.to_ascii_uppercase();
        let len = word.len();

        match set {
            SearchSet::HookWords => self.graph.is_front_hook(&word) || self.graph.is_back_hook(&word),
            SearchSet::FrontHooks => self.graph.is_front_hook(&word),
            SearchSet::BackHooks => self.graph.is_back_hook(&word),
            SearchSet::HighFives => self.is_high_five(&word),
            SearchSet::TypeOneSevens => len == 7 && self.drops_one_to_stem(&word, 6),
            SearchSet::TypeOneEights => len == 8 && self.drops_two_to_stem(&word),
            SearchSet::TypeTwoSevens => {
                len == 7
                    && self.within_type_two_pool(&word)
                    && !self.is_member(&word, SearchSet::TypeOneSevens)
            }
            SearchSet::TypeTwoEights => {
                len == 8
                    && self.within_type_two_pool(&word)
                    && !self.is_member(&word, SearchSet::TypeOneEights)
            }
            SearchSet::TypeThreeSevens => {
                len == 7
                    && self.tables.bag.num_combinations(&word) >= self.tables.type_three_seven_combos
                    && !self.is_member(&word, SearchSet::TypeOneSevens)
                    && !self.is_member(&word, SearchSet::TypeTwoSevens)
            }
            SearchSet::TypeThreeEights => {
                len == 8
                    && self.tables.bag.num_combinations(&word) >= self.tables.type_three_eight_combos
                    && !self.is_member(&word, SearchSet::TypeOneEights)
                    && !self.is_member(&word, SearchSet::TypeTwoEights)
            }
            SearchSet::EightsFromSevenLetterStems => len == 8 && self.drops_one_to_stem(&word, 7),
        }
    }

    /// Five letters, none worth more than 5, an end letter worth 4 or 5
    fn is_high_five(&self, word: &str) -> bool {
        let bytes = word.as_bytes();
        if bytes.len() != 5 {
            return false;
        }
        let values: Vec<u32> = bytes.iter().map(|&b| self.tables.letter_value(b)).collect();
        if values.iter().any(|&v| v > 5) {
            return false;
        }
        [values[0], values[4]].iter().any(|&v| v == 4 || v == 5)
    }

    /// Removing one letter leaves the alphagram of a stem of `stem_len`
    fn drops_one_to_stem(&self, word: &str, stem_len: usize) -> bool {
        let Some(stems) = self.stems.get(&stem_len) else {
            return false;
        };
        let agram = alphagram(word);
        (0..agram.len()).any(|i| {
            let mut reduced = agram.clone();
            reduced.remove(i);
            stems.contains(&reduced)
        })
    }

    /// Some six-letter stem alphagram is contained in the word's letters
    fn drops_two_to_stem(&self, word: &str) -> bool {
        let Some(stems) = self.stems.get(&(word.len() - 2)) else {
            return false;
        };
        let agram = alphagram(word);
        stems
            .iter()
            .any(|stem| is_sorted_subsequence(stem.as_bytes(), agram.as_bytes()))
    }

    /// The alphagram can be drawn from the Type II pool in one sorted pass
    fn within_type_two_pool(&self, word: &str) -> bool {
        is_sorted_subsequence(alphagram(word).as_bytes(), &self.tables.type_two_letters)
    }
}

/// Every letter of `needle` consumed in order from `haystack`
fn is_sorted_subsequence(needle: &[u8], haystack: &[u8]) -> bool {
    let mut letters = haystack.iter();
    needle
        .iter()
        .all(|&wanted| letters.any(|&have| have == wanted))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;

    fn add_stems(stems: &mut StemAlphagrams, words: &[&str]) {
        for word in words {
            stems.entry(word.len()).or_default().insert(alphagram(word));
        }
    }

    fn graph(words: &[&str]) -> WordGraph {
        let mut g = WordGraph::new();
        for w in words {
            g.add_word(w);
        }
        g
    }

    #[test]
    fn test_hooks() {
        let g = graph(&["AT", "CAT", "CATS"]);
        let s = StemAlphagrams::default();
        let tables = LetterTables::from_config(&EngineConfig::default());
        let c = SetClassifier::new(&g, &s, &tables);

        assert!(c.is_member("CAT", SearchSet::FrontHooks));
        assert!(!c.is_member("CAT", SearchSet::BackHooks));
        assert!(c.is_member("cats", SearchSet::BackHooks));
        assert!(c.is_member("CATS", SearchSet::HookWords));
        assert!(!c.is_member("AT", SearchSet::HookWords));
    }

    #[test]
    fn test_high_fives() {
        let g = WordGraph::new();
        let s = StemAlphagrams::default();
        let tables = LetterTables::from_config(&EngineConfig::default());
        let c = SetClassifier::new(&g, &s, &tables);

        // H=4 at the front
        assert!(c.is_member("HOUSE", SearchSet::HighFives));
        // K=5 at the end
        assert!(c.is_member("BLEAK", SearchSet::HighFives));
        // Z=10
        assert!(!c.is_member("ZEBRA", SearchSet::HighFives));
        // no 4 or 5 on either end
        assert!(!c.is_member("STONE", SearchSet::HighFives));
        assert!(!c.is_member("HOUSES", SearchSet::HighFives));
    }

    #[test]
    fn test_type_one_stems() {
        let g = WordGraph::new();
        let mut s = StemAlphagrams::default();
        add_stems(&mut s, &["SATIRE", "SATIRED"]);
        let tables = LetterTables::from_config(&EngineConfig::default());
        let c = SetClassifier::new(&g, &s, &tables);

        assert!(!c.is_member("SATIRE", SearchSet::TypeOneSevens));
        assert!(c.is_member("SATIRES", SearchSet::TypeOneSevens));
        assert!(c.is_member("ARTISTES", SearchSet::TypeOneEights));
        assert!(!c.is_member("ZZZZZZZZ", SearchSet::TypeOneEights));
        assert!(c.is_member("SATIREDS", SearchSet::EightsFromSevenLetterStems));
    }

    #[test]
    fn test_tiers_are_exclusive() {
        let g = WordGraph::new();
        let mut s = StemAlphagrams::default();
        add_stems(&mut s, &["SATIRE", "RETAIN"]);
        let tables = LetterTables::from_config(&EngineConfig::default());
        let c = SetClassifier::new(&g, &s, &tables);

        for word in ["SATIRES", "RETAINS", "TOENAIL", "ORATING", "HUNTERS", "JUKEBOX"] {
            let tiers = [
                SearchSet::TypeOneSevens,
                SearchSet::TypeTwoSevens,
                SearchSet::TypeThreeSevens,
            ];
            let hits = tiers.iter().filter(|&&t| c.is_member(word, t)).count();
            assert!(hits <= 1, "{} is in {} tiers", word, hits);
        }

        // In the pool and not Type I
        assert!(c.is_member("TOENAIL", SearchSet::TypeTwoSevens));
        // In the pool but already Type I
        assert!(!c.is_member("SATIRES", SearchSet::TypeTwoSevens));
        assert!(c.is_member("HUNTERS", SearchSet::TypeThreeSevens));
        assert!(!c.is_member("JUKEBOX", SearchSet::TypeThreeSevens));
    }

    #[test]
    fn test_sorted_subsequence() {
        assert!(is_sorted_subsequence(b"AEI", b"AAEEII"));
        assert!(!is_sorted_subsequence(b"AAAA", b"AAADE"));
        assert!(is_sorted_subsequence(b"", b"ABC"));
    }
}
