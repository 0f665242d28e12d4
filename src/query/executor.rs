use crate::attributes::store::caller_casing;
use crate::attributes::{compile_all, AttributeRow};
use crate::config::tables;
use crate::lexicon::LexiconEntry;
use crate::query::planner::QueryPlan;
use crate::query::post::PostFilter;
use crate::query::spec::{Condition, SearchSpec};
use crate::utils::letters::alphagram;
use std::time::Instant;
use tracing::{debug, warn};

/// Runs a search specification against one lexicon.
///
/// Phases run in order (graph, attribute, post), each restricted to the
/// previous phase's words. An empty phase result ends the search.
pub struct SearchExecutor<'a> {
    entry: &'a LexiconEntry,
}

impl<'a> SearchExecutor<'a> {
    pub fn new(entry: &'a LexiconEntry) -> Self {
        Self { entry }
    }

    /// Execute a search and return matching words
    pub fn execute(&self, spec: &SearchSpec, all_caps: bool) -> Vec<String> {
        let start = Instant::now();
        let plan = QueryPlan::from_spec(spec, tables().max_word_length);

        let mut results = self.execute_plan(&plan);

        if all_caps {
            for word in &mut results {
                word.make_ascii_uppercase();
            }
        }

        // The cache tracks the latest result set
        if !results.is_empty() {
            self.entry.refresh_cache(&results);
        }

        debug!(results = results.len(), elapsed = ?start.elapsed(), "search complete");
        results
    }

    fn execute_plan(&self, plan: &QueryPlan) -> Vec<String> {
        let mut candidates: Option<Vec<String>> = None;

        if plan.runs_graph() {
            let conditions: Vec<&Condition> = plan.graph.iter().collect();
            let words = self
                .entry
                .graph()
                .search(&conditions, plan.conjunction, plan.bounds);
            debug!(words = words.len(), "graph phase");
            if words.is_empty() {
                return words;
            }
            candidates = Some(words);
        }

        if plan.runs_attribute() {
            let conditions: Vec<&Condition> = plan.attribute.iter().collect();
            let words = self.attribute_phase(&conditions, plan.conjunction, candidates.as_deref());
            debug!(words = words.len(), "attribute phase");
            if words.is_empty() {
                return words;
            }
            candidates = Some(words);
        }

        let mut words = candidates.unwrap_or_default();

        if plan.runs_post() {
            let conditions: Vec<&Condition> = plan.post.iter().collect();
            let post = PostFilter::new(self.entry.graph(), self.entry.stem_alphagrams(), tables());
            words = post.apply(words, &conditions, plan.conjunction);
            debug!(words = words.len(), "post phase");
        }

        words
    }

    fn attribute_phase(&self, conditions: &[&Condition], conjunction: bool, restrict: Option<&[String]>) -> Vec<String> {
        if let Some(store) = self.entry.attributes() {
            return store.search(conditions, conjunction, restrict);
        }

        warn!("attribute store not connected, deriving attributes from the graph");
        let graph = self.entry.graph();
        let casing = caller_casing(conditions, restrict);
        let words = match restrict {
            Some(words) => words.to_vec(),
            None => graph.words(),
        };
        let filter = compile_all(conditions, conjunction);

        let tables = tables();
        words
            .into_iter()
            .filter(|word| {
                let Some(filter) = &filter else {
                    return true;
                };
                if !graph.contains_word(word) {
                    return false;
                }
                let anagrams = self.entry.num_anagrams(word).max(1);
                let row = AttributeRow::derive(word, graph, anagrams, String::new(), tables);
                filter.matches(&row)
            })
            .map(|word| match casing.get(&word.to_ascii_uppercase()) {
                Some(original) => (*original).to_string(),
                None => word,
            })
            .collect()
    }
}

/// Alphagrams of `words`, deduplicated and sorted
pub fn alphagrams<S: AsRef<str>>(words: &[S]) -> Vec<String> {
    let mut out: Vec<String> = words
        .iter()
        .map(|w| alphagram(&w.as_ref().to_ascii_uppercase()))
        .collect();
    out.sort();
    out.dedup();
    out
}
