use crate::config::LetterTables;
use crate::graph::WordGraph;
use crate::utils::letters::{num_unique_letters, num_vowels};
use serde::{Deserialize, Serialize};

/// Display attributes of one word.
///
/// Either fully populated from one attribute row or entirely default. An
/// empty `word` marks the default (invalid) value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordInfo {
    pub word: String,
    pub probability_order: u32,
    pub min_probability_order: u32,
    pub max_probability_order: u32,
    pub num_vowels: u32,
    pub num_unique_letters: u32,
    pub num_anagrams: u32,
    pub point_value: u32,
    pub front_hooks: String,
    pub back_hooks: String,
    pub is_front_hook: bool,
    pub is_back_hook: bool,
    pub lexicon_symbols: String,
    pub definition: String,
}

impl WordInfo {
    pub fn is_valid(&self) -> bool {
        !self.word.is_empty()
    }
}

/// One stored row: the display attributes plus the search-only columns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeRow {
    #[serde(flatten)]
    pub info: WordInfo,
    pub length: u32,
    pub combinations: f64,
}

impl AttributeRow {
    /// Build a row from graph facts. Probability order is left at 0; the
    /// store assigns it once every row of the same length is known.
    pub fn derive(
        word: &str,
        graph: &WordGraph,
        num_anagrams: u32,
        definition: String,
        tables: &LetterTables,
    ) -> Self {
        let word = word.to_ascii_uppercase();
        let info = WordInfo {
            probability_order: 0,
            min_probability_order: 0,
            max_probability_order: 0,
            num_vowels: num_vowels(&word),
            num_unique_letters: num_unique_letters(&word),
            num_anagrams,
            point_value: tables.point_value(&word),
            front_hooks: graph.front_hook_letters(&word),
            back_hooks: graph.back_hook_letters(&word),
            is_front_hook: graph.is_front_hook(&word),
            is_back_hook: graph.is_back_hook(&word),
            lexicon_symbols: String::new(),
            definition,
            word: word.clone(),
        };

        Self {
            length: word.len() as u32,
            combinations: tables.bag.num_combinations(&word),
            info,
        }
    }

    pub fn word(&self) -> &str {
        &self.info.word
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;

    #[test]
    fn test_derive_from_graph() {
        let mut graph = WordGraph::new();
        for w in ["AT", "CAT", "CATS", "SCAT", "AT"] {
            graph.add_word(w);
        }
        let tables = LetterTables::from_config(&EngineConfig::default());
        let row = AttributeRow::derive("cat", &graph, 1, "a feline".into(), &tables);

        assert_eq!(row.word(), "CAT");
        assert_eq!(row.length, 3);
        assert_eq!(row.info.num_vowels, 1);
        assert_eq!(row.info.point_value, 5);
        assert_eq!(row.info.front_hooks, "s");
        assert_eq!(row.info.back_hooks, "s");
        assert!(row.info.is_front_hook);
        assert!(!row.info.is_back_hook);
        assert!(row.combinations > 0.0);
        assert!(row.info.is_valid());
        assert!(!WordInfo::default().is_valid());
    }

    #[test]
    fn test_row_json_is_flat() {
        let mut graph = WordGraph::new();
        graph.add_word("QI");
        let tables = LetterTables::from_config(&EngineConfig::default());
        let row = AttributeRow::derive("QI", &graph, 1, String::new(), &tables);
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["word"], "QI");
        assert_eq!(json["length"], 2);
        let back: AttributeRow = serde_json::from_value(json).unwrap();
        assert_eq!(back, row);
    }
}
