use super::filter::compile_all;
use super::row::{AttributeRow, WordInfo};
use crate::error::{LexiconError, Result};
use crate::query::post::ProbabilityKey;
use crate::query::spec::{Condition, ConditionKind};
use ahash::AHashMap;
use rayon::prelude::*;
use roaring::RoaringBitmap;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;
use tracing::{debug, info};

const TABLE_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct StoredTable<'a> {
    version: u32,
    rows: Cow<'a, [AttributeRow]>,
}

/// Relational table of per-word attributes, one row per word
#[derive(Debug, Default)]
pub struct AttributeStore {
    /// Sorted by word
    rows: Vec<AttributeRow>,
    index: AHashMap<String, u32>,
    searches: AtomicUsize,
}

impl AttributeStore {
    /// Build from derived rows, assigning probability orders per word length
    pub fn build(mut rows: Vec<AttributeRow>) -> Self {
        let start = Instant::now();
        assign_probability_orders(&mut rows);
        rows.par_sort_unstable_by(|a, b| a.info.word.cmp(&b.info.word));
        rows.dedup_by(|a, b| a.info.word == b.info.word);
        let store = Self::from_rows(rows);
        debug!(rows = store.rows.len(), elapsed = ?start.elapsed(), "built attribute table");
        store
    }

    fn from_rows(rows: Vec<AttributeRow>) -> Self {
        let index = rows
            .iter()
            .enumerate()
            .map(|(i, row)| (row.info.word.clone(), i as u32))
            .collect();
        Self {
            rows,
            index,
            searches: AtomicUsize::new(0),
        }
    }

    /// Reopen a table written by [`AttributeStore::save`]
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| LexiconError::file_access(path, e))?;
        let table: StoredTable = serde_json::from_reader(BufReader::new(file))?;
        if table.version != TABLE_VERSION {
            return Err(LexiconError::Integrity(format!(
                "unsupported attribute table version {}",
                table.version
            )));
        }
        let mut rows = table.rows.into_owned();
        rows.sort_unstable_by(|a, b| a.info.word.cmp(&b.info.word));
        let store = Self::from_rows(rows);
        info!(path = %path.display(), rows = store.rows.len(), "opened attribute table");
        Ok(store)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path).map_err(|e| LexiconError::file_access(path, e))?;
        let mut writer = BufWriter::new(file);
        let table = StoredTable {
            version: TABLE_VERSION,
            rows: Cow::Borrowed(&self.rows),
        };
        serde_json::to_writer(&mut writer, &table)?;
        writer
            .flush()
            .map_err(|e| LexiconError::file_access(path, e))?;
        Ok(())
    }

    pub fn num_words(&self) -> usize {
        self.rows.len()
    }

    /// Number of searches served since the table was built or opened
    pub fn searches_run(&self) -> usize {
        self.searches.load(Ordering::Relaxed)
    }

    pub fn row(&self, word: &str) -> Option<&AttributeRow> {
        let id = *self.index.get(&word.to_ascii_uppercase())?;
        self.rows.get(id as usize)
    }

    /// Full attributes of a word, or the invalid default
    pub fn fetch(&self, word: &str) -> WordInfo {
        self.row(word).map(|row| row.info.clone()).unwrap_or_default()
    }

    /// Attributes of every listed word that has a row
    pub fn fetch_many<S: AsRef<str>>(&self, words: &[S]) -> Vec<WordInfo> {
        words
            .iter()
            .filter_map(|w| self.row(w.as_ref()))
            .map(|row| row.info.clone())
            .collect()
    }

    /// Words whose rows satisfy the attribute-phase conditions.
    ///
    /// `restrict` narrows the candidate rows before any condition runs. Its
    /// words are matched upper-cased and returned in the caller's casing.
    pub fn search(
        &self,
        conditions: &[&Condition],
        conjunction: bool,
        restrict: Option<&[String]>,
    ) -> Vec<String> {
        self.searches.fetch_add(1, Ordering::Relaxed);

        let casing = caller_casing(conditions, restrict);
        let candidates: RoaringBitmap = match restrict {
            Some(words) => words
                .iter()
                .filter_map(|word| self.index.get(&word.to_ascii_uppercase()).copied())
                .collect(),
            None => (0..self.rows.len() as u32).collect(),
        };

        let matched = match compile_all(conditions, conjunction) {
            Some(filter) => {
                debug!(filter = %filter, candidates = candidates.len(), "attribute search");
                filter.evaluate(&self.rows, &candidates)
            }
            None => candidates,
        };

        matched
            .iter()
            .filter_map(|id| self.rows.get(id as usize))
            .map(|row| match casing.get(row.word()) {
                Some(original) => (*original).to_string(),
                None => row.info.word.clone(),
            })
            .collect()
    }
}

/// Upper-cased word to the casing the caller gave it, from the restrict list
/// and from word-list conditions. A word-list spelling wins over a restrict
/// spelling, and among several spellings the last one wins.
pub(crate) fn caller_casing<'c>(
    conditions: &[&'c Condition],
    restrict: Option<&'c [String]>,
) -> AHashMap<String, &'c str> {
    let listed = conditions.iter().filter(|c| !c.negated).filter_map(|c| match &c.kind {
        ConditionKind::InWordList(words) => Some(words),
        _ => None,
    });

    restrict
        .into_iter()
        .chain(listed.map(Vec::as_slice))
        .flatten()
        .map(|word| (word.to_ascii_uppercase(), word.as_str()))
        .collect()
}

/// Rank words of each length by probability, 1 = most likely draw. Ties in
/// the combinatorial count share a min/max rank range.
fn assign_probability_orders(rows: &mut [AttributeRow]) {
    let mut keyed: Vec<(u32, ProbabilityKey, usize)> = rows
        .par_iter()
        .enumerate()
        .map(|(i, row)| {
            (
                row.length,
                ProbabilityKey::new(row.word(), row.combinations, false),
                i,
            )
        })
        .collect();
    keyed.par_sort_unstable_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));

    let mut start = 0;
    while start < keyed.len() {
        let length = keyed[start].0;
        let end = start + keyed[start..].iter().take_while(|k| k.0 == length).count();

        let mut tie_start = start;
        while tie_start < end {
            let combos = keyed[tie_start].1.combinations;
            let tie_end = tie_start
                + keyed[tie_start..end]
                    .iter()
                    .take_while(|k| k.1.combinations == combos)
                    .count();
            let min = (tie_start - start + 1) as u32;
            let max = (tie_end - start) as u32;
            for (offset, entry) in keyed[tie_start..tie_end].iter().enumerate() {
                let info = &mut rows[entry.2].info;
                info.probability_order = min + offset as u32;
                info.min_probability_order = min;
                info.max_probability_order = max;
            }
            tie_start = tie_end;
        }
        start = end;
    }
}
