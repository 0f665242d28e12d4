//! Post-phase evaluation: per-word legality checks and the probability
//! window with tie expansion.

use crate::classify::{SetClassifier, StemAlphagrams};
use crate::config::LetterTables;
use crate::graph::WordGraph;
use crate::query::spec::{Condition, ConditionKind};
use crate::utils::letters::alphagram;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::debug;

/// Sort key for probability ordering: more draws first, then alphagram
/// (omitted for legacy ordering), then the word itself.
#[derive(Debug, Clone)]
pub struct ProbabilityKey {
    pub combinations: f64,
    pub alphagram: Option<String>,
    pub word: String,
}

impl ProbabilityKey {
    pub fn new(word: &str, combinations: f64, legacy: bool) -> Self {
        let word = word.to_ascii_uppercase();
        Self {
            combinations,
            alphagram: (!legacy).then(|| alphagram(&word)),
            word,
        }
    }

    /// Same combinatorial count, so the same probability tier
    pub fn same_tier(&self, other: &Self) -> bool {
        self.combinations == other.combinations
    }
}

impl Ord for ProbabilityKey {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .combinations
            .total_cmp(&self.combinations)
            .then_with(|| self.alphagram.cmp(&other.alphagram))
            .then_with(|| self.word.cmp(&other.word))
    }
}

impl PartialOrd for ProbabilityKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ProbabilityKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ProbabilityKey {}

const UNBOUNDED_RANK: u32 = 999_999;

/// Merged "limit by probability order" windows, 1-based and inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbabilityWindow {
    pub min: u32,
    pub max: u32,
    pub min_lax: u32,
    pub max_lax: u32,
    pub legacy: bool,
}

impl ProbabilityWindow {
    /// Merge every limit condition, or `None` when there are none
    pub fn from_conditions(conditions: &[&Condition]) -> Option<Self> {
        let mut window: Option<Self> = None;
        for condition in conditions {
            let ConditionKind::LimitByProbabilityOrder { range, lax, legacy } = condition.kind else {
                continue;
            };
            let w = window.get_or_insert(Self {
                min: 0,
                max: UNBOUNDED_RANK,
                min_lax: 0,
                max_lax: UNBOUNDED_RANK,
                legacy: false,
            });
            if lax {
                w.min_lax = w.min_lax.max(range.min);
                w.max_lax = w.max_lax.min(range.max);
            } else {
                w.min = w.min.max(range.min);
                w.max = w.max.min(range.max);
            }
            w.legacy |= legacy;
        }
        window
    }

    /// Sort by probability and keep the window, widened so that no tie
    /// group is split. The strict bounds are never crossed.
    pub fn apply(&self, words: Vec<String>, tables: &LetterTables) -> Vec<String> {
        let n = words.len() as i64;
        if self.min as i64 > n || self.min_lax as i64 > n {
            return Vec::new();
        }

        let strict_min = (self.min as i64 - 1).max(0);
        let strict_max = (self.max as i64 - 1).min(n - 1);
        let lax_min = (self.min_lax as i64 - 1).max(0);
        let lax_max = (self.max_lax as i64 - 1).min(n - 1);

        let mut sorted: BTreeMap<ProbabilityKey, String> = BTreeMap::new();
        for word in words {
            let upper = word.to_ascii_uppercase();
            let key = ProbabilityKey::new(&upper, tables.bag.num_combinations(&upper), self.legacy);
            sorted.insert(key, word);
        }
        let (keys, words): (Vec<ProbabilityKey>, Vec<String>) = sorted.into_iter().unzip();

        let last = keys.len() as i64 - 1;
        let strict_max = strict_max.min(last);
        let mut lo = strict_min.max(lax_min);
        let mut hi = strict_max.min(lax_max).min(last);
        if lo > hi {
            return Vec::new();
        }

        while lo > 0 && lo > strict_min && keys[lo as usize - 1].same_tier(&keys[lo as usize]) {
            lo -= 1;
        }
        while hi < last && hi < strict_max && keys[hi as usize + 1].same_tier(&keys[hi as usize]) {
            hi += 1;
        }

        debug!(lo, hi, total = keys.len(), legacy = self.legacy, "probability window");
        words[lo as usize..=hi as usize].to_vec()
    }
}

/// Evaluates post-phase conditions over a candidate list
pub struct PostFilter<'a> {
    graph: &'a WordGraph,
    classifier: SetClassifier<'a>,
    tables: &'a LetterTables,
}

impl<'a> PostFilter<'a> {
    pub fn new(graph: &'a WordGraph, stems: &'a StemAlphagrams, tables: &'a LetterTables) -> Self {
        Self {
            graph,
            classifier: SetClassifier::new(graph, stems, tables),
            tables,
        }
    }

    /// Per-word post conditions. The probability window is not checked here.
    pub fn matches(&self, word: &str, conditions: &[&Condition], conjunction: bool) -> bool {
        let upper = word.to_ascii_uppercase();
        let mut outcomes = conditions.iter().filter_map(|condition| {
            let hit = match &condition.kind {
                ConditionKind::Prefix(prefix) => {
                    self.graph.contains_word(&format!("{}{}", prefix, upper))
                }
                ConditionKind::Suffix(suffix) => {
                    self.graph.contains_word(&format!("{}{}", upper, suffix))
                }
                ConditionKind::BelongToGroup(set) => self.classifier.is_member(&upper, *set),
                _ => return None,
            };
            Some(hit ^ condition.negated)
        });

        if conjunction {
            outcomes.all(|ok| ok)
        } else {
            // A disjunction with no per-word condition keeps everything
            let mut any_seen = false;
            for ok in outcomes {
                if ok {
                    return true;
                }
                any_seen = true;
            }
            !any_seen
        }
    }

    /// Filter `words` by the per-word conditions, then apply the window
    pub fn apply(&self, words: Vec<String>, conditions: &[&Condition], conjunction: bool) -> Vec<String> {
        let kept: Vec<String> = words
            .into_iter()
            .filter(|w| self.matches(w, conditions, conjunction))
            .collect();

        match ProbabilityWindow::from_conditions(conditions) {
            Some(window) => window.apply(kept, self.tables),
            None => kept,
        }
    }
}
