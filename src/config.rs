//! Engine configuration and the process-wide letter tables derived from it.
//!
//! The tables are built once per process: either explicitly through
//! [`init`] at startup or lazily from [`EngineConfig::default`] on first use.

use crate::utils::letters::{parse_letter_table, LetterBag, ALPHABET_SIZE};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

const APP_NAME: &str = "lexsearch";
const CONFIG_FILE: &str = "config.json";

/// Words deeper than this cannot be addressed by the graph decoders
const MAX_GRAPH_WORD_LENGTH: usize = 255;

/// Engine configuration stored in the user config directory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Tile distribution, `_` is the blank
    #[serde(default = "default_letter_distribution")]
    pub letter_distribution: String,

    /// Point value of each letter
    #[serde(default = "default_letter_values")]
    pub letter_values: String,

    /// Alphabetised letter pool for Type II sevens/eights
    #[serde(default = "default_type_two_letters")]
    pub type_two_letters: String,

    /// Words at or above this combinatorial count are Type III sevens
    #[serde(default = "default_type_three_seven_reference")]
    pub type_three_seven_reference: String,

    /// Words at or above this combinatorial count are Type III eights
    #[serde(default = "default_type_three_eight_reference")]
    pub type_three_eight_reference: String,

    /// Longest word accepted by the graph decoders
    #[serde(default = "default_max_word_length")]
    pub max_word_length: usize,

    /// Word info cache capacity per lexicon, `None` keeps every entry
    #[serde(default)]
    pub cache_capacity: Option<usize>,
}

fn default_letter_distribution() -> String {
    "A:9 B:2 C:2 D:4 E:12 F:2 G:3 H:2 I:9 J:1 K:1 L:4 M:2 N:6 O:8 P:2 Q:1 R:6 S:4 T:6 \
     U:4 V:2 W:2 X:1 Y:2 Z:1 _:2"
        .to_string()
}

fn default_letter_values() -> String {
    "A:1 B:3 C:3 D:2 E:1 F:4 G:2 H:4 I:1 J:8 K:5 L:1 M:3 N:1 O:1 P:3 Q:10 R:1 S:1 T:1 \
     U:1 V:4 W:4 X:8 Y:4 Z:10 _:0"
        .to_string()
}

fn default_type_two_letters() -> String {
    "AAADEEEEGIIILNNOORRSSTTU".to_string()
}

fn default_type_three_seven_reference() -> String {
    "HUNTERS".to_string()
}

fn default_type_three_eight_reference() -> String {
    "NOTIFIED".to_string()
}

fn default_max_word_length() -> usize {
    64
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            letter_distribution: default_letter_distribution(),
            letter_values: default_letter_values(),
            type_two_letters: default_type_two_letters(),
            type_three_seven_reference: default_type_three_seven_reference(),
            type_three_eight_reference: default_type_three_eight_reference(),
            max_word_length: default_max_word_length(),
            cache_capacity: None,
        }
    }
}

impl EngineConfig {
    /// Settings from `config.json` in the user config directory. A missing
    /// file means defaults.
    pub fn load() -> Result<Self> {
        Self::load_from(&get_config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", path.display()));
            }
        };
        let mut config: EngineConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        config.normalize()?;
        Ok(config)
    }

    /// Upper-case the letter settings and reject tables the engine cannot use
    fn normalize(&mut self) -> Result<()> {
        let (counts, _) = parse_letter_table(&self.letter_distribution);
        if counts.iter().all(|&c| c == 0) {
            bail!("letter_distribution names no letters");
        }
        if !self.type_two_letters.bytes().all(|b| b.is_ascii_alphabetic()) {
            bail!("type_two_letters must be letters only");
        }
        if !(1..=MAX_GRAPH_WORD_LENGTH).contains(&self.max_word_length) {
            bail!(
                "max_word_length must be between 1 and {}",
                MAX_GRAPH_WORD_LENGTH
            );
        }

        self.type_two_letters.make_ascii_uppercase();
        self.type_three_seven_reference.make_ascii_uppercase();
        self.type_three_eight_reference.make_ascii_uppercase();
        if self.cache_capacity == Some(0) {
            self.cache_capacity = None;
        }
        Ok(())
    }
}

/// Get the path to the config file
pub fn get_config_path() -> Result<PathBuf> {
    let base = dirs::config_dir().context("Could not determine config directory")?;
    Ok(base.join(APP_NAME).join(CONFIG_FILE))
}

/// Immutable lookup tables derived from an [`EngineConfig`]
#[derive(Debug)]
pub struct LetterTables {
    pub bag: LetterBag,
    pub values: [u32; ALPHABET_SIZE],
    pub type_two_letters: Vec<u8>,
    pub type_three_seven_combos: f64,
    pub type_three_eight_combos: f64,
    pub max_word_length: usize,
    pub cache_capacity: Option<usize>,
}

impl LetterTables {
    pub fn from_config(config: &EngineConfig) -> Self {
        let bag = LetterBag::from_distribution(&config.letter_distribution);
        let (values, _) = parse_letter_table(&config.letter_values);

        let mut type_two_letters: Vec<u8> = config
            .type_two_letters
            .bytes()
            .map(|b| b.to_ascii_uppercase())
            .collect();
        type_two_letters.sort_unstable();

        let type_three_seven_combos = bag.num_combinations(&config.type_three_seven_reference);
        let type_three_eight_combos = bag.num_combinations(&config.type_three_eight_reference);

        Self {
            bag,
            values,
            type_two_letters,
            type_three_seven_combos,
            type_three_eight_combos,
            max_word_length: config.max_word_length,
            cache_capacity: config.cache_capacity,
        }
    }

    /// Point value of a single letter (0 for anything outside A-Z)
    pub fn letter_value(&self, letter: u8) -> u32 {
        crate::utils::letters::letter_index(letter)
            .map(|i| self.values[i])
            .unwrap_or(0)
    }

    /// Sum of letter values
    pub fn point_value(&self, word: &str) -> u32 {
        word.bytes().map(|b| self.letter_value(b)).sum()
    }
}

static TABLES: OnceLock<LetterTables> = OnceLock::new();

/// Install the process-wide tables. Returns false if they were already built.
pub fn init(config: &EngineConfig) -> bool {
    TABLES.set(LetterTables::from_config(config)).is_ok()
}

/// Process-wide letter tables, built from defaults if [`init`] was never called
pub fn tables() -> &'static LetterTables {
    TABLES.get_or_init(|| LetterTables::from_config(&EngineConfig::default()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_config_empty_json() {
        // Empty object should use all defaults
        let config: EngineConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.type_three_seven_reference, "HUNTERS");
        assert_eq!(config.type_three_eight_reference, "NOTIFIED");
        assert_eq!(config.cache_capacity, None);
    }

    #[test]
    fn test_engine_config_partial_json() {
        let json = r#"{"cache_capacity": 500, "max_word_length": 15}"#;
        let config: EngineConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.cache_capacity, Some(500));
        assert_eq!(config.max_word_length, 15);
        assert_eq!(config.type_two_letters, default_type_two_letters());
    }

    #[test]
    fn test_load_from_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = EngineConfig::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config.max_word_length, default_max_word_length());
    }

    #[test]
    fn test_load_from_normalizes_letters() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{"type_two_letters": "aeiRST", "type_three_seven_reference": "hunters", "cache_capacity": 0}"#,
        )
        .unwrap();
        let config = EngineConfig::load_from(&path).unwrap();
        assert_eq!(config.type_two_letters, "AEIRST");
        assert_eq!(config.type_three_seven_reference, "HUNTERS");
        assert_eq!(config.cache_capacity, None);
    }

    #[test]
    fn test_load_from_rejects_unusable_tables() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        fs::write(&path, r#"{"letter_distribution": "_:2"}"#).unwrap();
        assert!(EngineConfig::load_from(&path).is_err());

        fs::write(&path, r#"{"max_word_length": 0}"#).unwrap();
        assert!(EngineConfig::load_from(&path).is_err());

        fs::write(&path, r#"{"type_two_letters": "AB1"}"#).unwrap();
        assert!(EngineConfig::load_from(&path).is_err());

        fs::write(&path, "{not json").unwrap();
        let err = EngineConfig::load_from(&path).unwrap_err();
        assert!(err.to_string().starts_with("Failed to parse"));
    }

    #[test]
    fn test_tables_from_default_config() {
        let tables = LetterTables::from_config(&EngineConfig::default());
        assert_eq!(tables.letter_value(b'Q'), 10);
        assert_eq!(tables.letter_value(b'e'), 1);
        assert_eq!(tables.point_value("CAT"), 5);
        assert!(tables.type_three_seven_combos > 0.0);
        assert!(tables.type_three_eight_combos > 0.0);
        assert!(tables.type_two_letters.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_tables_initialised_once() {
        let first = tables() as *const LetterTables;
        assert!(!init(&EngineConfig::default()));
        assert_eq!(first, tables() as *const LetterTables);
    }
}
