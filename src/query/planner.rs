use crate::graph::pattern::{min_length, tokenize, Token};
use crate::graph::LengthBounds;
use crate::query::spec::{Condition, ConditionKind, Range, SearchSpec};
use tracing::debug;

/// Execution phase of a condition, in the order the phases run
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    /// Answered by walking the word graph
    Graph,
    /// Answered by the attribute table
    Attribute,
    /// Answered per word (or over the whole list) after the other phases
    Post,
}

/// Route a condition to the phase that answers it most cheaply
pub fn classify(condition: &Condition) -> Phase {
    match &condition.kind {
        ConditionKind::AnagramMatch(_)
        | ConditionKind::SubanagramMatch(_)
        | ConditionKind::ConsistOf { .. } => Phase::Graph,

        // Substring-style patterns are cheaper as a LIKE over the table
        ConditionKind::PatternMatch(pattern) => {
            if pattern.starts_with('*') && pattern.ends_with('*') && !pattern.contains('[') {
                Phase::Attribute
            } else {
                Phase::Graph
            }
        }

        ConditionKind::Length(_)
        | ConditionKind::InWordList(_)
        | ConditionKind::NumVowels(_)
        | ConditionKind::IncludeLetters(_)
        | ConditionKind::ProbabilityOrder { .. }
        | ConditionKind::NumUniqueLetters(_)
        | ConditionKind::PointValue(_)
        | ConditionKind::NumAnagrams(_) => Phase::Attribute,

        ConditionKind::BelongToGroup(set) if set.is_hook_set() => Phase::Attribute,

        ConditionKind::Prefix(_)
        | ConditionKind::Suffix(_)
        | ConditionKind::LimitByProbabilityOrder { .. }
        | ConditionKind::BelongToGroup(_) => Phase::Post,
    }
}

/// Query execution plan
#[derive(Debug, Clone)]
pub struct QueryPlan {
    pub conjunction: bool,
    pub graph: Vec<Condition>,
    pub attribute: Vec<Condition>,
    pub post: Vec<Condition>,
    /// Word lengths the graph walk may produce
    pub bounds: LengthBounds,
}

impl QueryPlan {
    /// Optimize the search specification and split it by phase
    pub fn from_spec(spec: &SearchSpec, max_word_length: usize) -> Self {
        let conditions = optimize(spec, max_word_length);

        let mut plan = QueryPlan {
            conjunction: spec.conjunction,
            graph: Vec::new(),
            attribute: Vec::new(),
            post: Vec::new(),
            bounds: LengthBounds::new(1, max_word_length),
        };

        let has_graph = conditions.iter().any(|c| classify(c) == Phase::Graph);
        let lengths = conditions
            .iter()
            .filter(|c| matches!(c.kind, ConditionKind::Length(_)))
            .count();
        let attribute_count = conditions
            .iter()
            .filter(|c| classify(c) == Phase::Attribute)
            .count();

        // Length conditions only bounding the graph walk need no table query
        let lengths_to_graph = spec.conjunction && has_graph && lengths > 0 && lengths == attribute_count;

        for condition in conditions {
            if lengths_to_graph {
                if let ConditionKind::Length(range) = condition.kind {
                    if !condition.negated {
                        plan.narrow(range);
                        continue;
                    }
                }
            }
            match classify(&condition) {
                Phase::Graph => plan.graph.push(condition),
                Phase::Attribute => plan.attribute.push(condition),
                Phase::Post => plan.post.push(condition),
            }
        }

        debug!(
            graph = plan.graph.len(),
            attribute = plan.attribute.len(),
            post = plan.post.len(),
            min_len = plan.bounds.min,
            max_len = plan.bounds.max,
            "planned search"
        );
        plan
    }

    fn narrow(&mut self, range: Range) {
        self.bounds = LengthBounds::new(
            self.bounds.min.max(range.min as usize),
            self.bounds.max.min(range.max as usize),
        );
    }

    /// Graph phase runs when it has conditions or nothing else can produce candidates
    pub fn runs_graph(&self) -> bool {
        !self.graph.is_empty() || self.attribute.is_empty()
    }

    pub fn runs_attribute(&self) -> bool {
        !self.attribute.is_empty()
    }

    pub fn runs_post(&self) -> bool {
        !self.post.is_empty()
    }
}

/// Add the implicit Length conditions implied by graph-phase conditions.
/// Only conjunctions are rewritten; the original conditions keep their order.
pub fn optimize(spec: &SearchSpec, max_word_length: usize) -> Vec<Condition> {
    let mut conditions = spec.conditions.clone();
    if !spec.conjunction {
        return conditions;
    }

    let mut implied = Vec::new();
    for condition in &spec.conditions {
        if condition.negated || classify(condition) != Phase::Graph {
            continue;
        }
        let range = match &condition.kind {
            ConditionKind::PatternMatch(letters) | ConditionKind::AnagramMatch(letters) => {
                let tokens = tokenize(letters);
                let min = min_length(&tokens) as u32;
                if tokens.contains(&Token::Star) {
                    Range::new(min, max_word_length as u32)
                } else {
                    Range::exactly(min)
                }
            }
            ConditionKind::SubanagramMatch(letters) => {
                let tokens = tokenize(letters);
                if tokens.contains(&Token::Star) {
                    continue;
                }
                Range::new(1, min_length(&tokens) as u32)
            }
            _ => continue,
        };
        implied.push(Condition::new(ConditionKind::Length(range)));
    }

    conditions.extend(implied);
    conditions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::spec::SearchSet;

    #[test]
    fn test_classify_phases() {
        assert_eq!(classify(&Condition::anagram("ABC")), Phase::Graph);
        assert_eq!(classify(&Condition::pattern("C?T")), Phase::Graph);
        assert_eq!(classify(&Condition::pattern("*AT*")), Phase::Attribute);
        assert_eq!(classify(&Condition::pattern("*[AE]T*")), Phase::Graph);
        assert_eq!(classify(&Condition::length(2, 3)), Phase::Attribute);
        assert_eq!(classify(&Condition::belong_to(SearchSet::FrontHooks)), Phase::Attribute);
        assert_eq!(classify(&Condition::belong_to(SearchSet::HighFives)), Phase::Post);
        assert_eq!(classify(&Condition::prefix("UN")), Phase::Post);
        assert_eq!(classify(&Condition::probability_limit(1, 10, false)), Phase::Post);
    }

    #[test]
    fn test_anagram_only_skips_attribute_phase() {
        let spec = SearchSpec::all_of(vec![Condition::anagram("TAC")]);
        let plan = QueryPlan::from_spec(&spec, 15);
        assert!(plan.runs_graph());
        assert!(!plan.runs_attribute());
        assert_eq!(plan.bounds, LengthBounds::new(3, 3));
    }

    #[test]
    fn test_real_attribute_condition_keeps_lengths() {
        let spec = SearchSpec::all_of(vec![
            Condition::pattern("C*"),
            Condition::new(ConditionKind::NumVowels(Range::exactly(1))),
        ]);
        let plan = QueryPlan::from_spec(&spec, 15);
        assert!(plan.runs_attribute());
        // NumVowels plus the implied Length(1, 15)
        assert_eq!(plan.attribute.len(), 2);
        assert_eq!(plan.bounds, LengthBounds::new(1, 15));
    }

    #[test]
    fn test_explicit_length_with_graph_condition_bounds_walk() {
        let spec = SearchSpec::all_of(vec![Condition::subanagram("AERST"), Condition::length(4, 9)]);
        let plan = QueryPlan::from_spec(&spec, 15);
        assert!(!plan.runs_attribute());
        assert_eq!(plan.bounds, LengthBounds::new(4, 5));
    }

    #[test]
    fn test_disjunction_is_not_rewritten() {
        let spec = SearchSpec::any_of(vec![Condition::anagram("TAC"), Condition::length(5, 5)]);
        assert_eq!(optimize(&spec, 15).len(), 2);
        let plan = QueryPlan::from_spec(&spec, 15);
        assert_eq!(plan.attribute.len(), 1);
        assert_eq!(plan.bounds, LengthBounds::new(1, 15));
    }

    #[test]
    fn test_length_only_spec_uses_attribute_phase() {
        let spec = SearchSpec::all_of(vec![Condition::length(2, 2)]);
        let plan = QueryPlan::from_spec(&spec, 15);
        assert!(!plan.runs_graph());
        assert!(plan.runs_attribute());
    }
}
