//! Utility functions shared across the crate.
//!
//! - [`letters`] - Alphagrams, letter counts, and tile-bag combinatorics
//! - [`encoding`] - Little-endian integer helpers for the graph file

pub mod encoding;
pub mod letters;

pub use encoding::*;
pub use letters::*;
