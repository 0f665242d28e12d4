//! # lexsearch - Lexicon Search Engine
//!
//! lexsearch answers word-game study queries (patterns, anagrams, numeric
//! attributes, probability ranks, word sets) over fixed word lists.
//!
//! ## Architecture
//!
//! - [`graph`] - Forward and reverse word tries, binary graph files
//! - [`attributes`] - Per-word attribute table and its filters
//! - [`classify`] - Game-specific set membership (hooks, stems, types)
//! - [`query`] - Search specifications, planning, and execution
//! - [`lexicon`] - Loaded lexicons, definitions, and the word cache
//! - [`config`] - Letter distribution, values, and limits
//!
//! ## Quick Start
//!
//! ```no_run
//! use lexsearch::lexicon::{ImportOptions, LexiconRegistry};
//! use lexsearch::query::parse_spec;
//! use std::path::Path;
//!
//! let mut registry = LexiconRegistry::new();
//! let options = ImportOptions { load_definitions: true, build_attributes: true };
//! registry.import_text("TWL", Path::new("twl.txt"), options).unwrap();
//!
//! let spec = parse_spec("pattern:C?T* -suffix:S").unwrap();
//! for word in registry.search("TWL", &spec, true) {
//!     println!("{}", word);
//! }
//! ```
//!
//! ## Search phases
//!
//! Every search runs up to three phases, each narrowing the previous one:
//!
//! 1. **Graph** - pattern, anagram, and letter-composition walks of the trie
//! 2. **Attribute** - numeric and flag filters over the attribute table
//! 3. **Post** - prefix, suffix, set membership, and probability windows

pub mod attributes;
pub mod classify;
pub mod config;
pub mod error;
pub mod graph;
pub mod lexicon;
pub mod query;
pub mod utils;

pub use error::{LexiconError, Result};
