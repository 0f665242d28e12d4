//! Search specifications: a conjunction/disjunction of typed conditions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Inclusive numeric window. Constructors keep `min <= max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    pub min: u32,
    pub max: u32,
}

impl Range {
    pub fn new(min: u32, max: u32) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    pub fn exactly(value: u32) -> Self {
        Self {
            min: value,
            max: value,
        }
    }

    pub fn contains(&self, value: u32) -> bool {
        value >= self.min && value <= self.max
    }

    pub fn is_exact(&self) -> bool {
        self.min == self.max
    }
}

/// Game-specific word sets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SearchSet {
    HookWords,
    FrontHooks,
    BackHooks,
    HighFives,
    TypeOneSevens,
    TypeOneEights,
    TypeTwoSevens,
    TypeTwoEights,
    TypeThreeSevens,
    TypeThreeEights,
    EightsFromSevenLetterStems,
}

impl SearchSet {
    pub const ALL: [SearchSet; 11] = [
        SearchSet::HookWords,
        SearchSet::FrontHooks,
        SearchSet::BackHooks,
        SearchSet::HighFives,
        SearchSet::TypeOneSevens,
        SearchSet::TypeOneEights,
        SearchSet::TypeTwoSevens,
        SearchSet::TypeTwoEights,
        SearchSet::TypeThreeSevens,
        SearchSet::TypeThreeEights,
        SearchSet::EightsFromSevenLetterStems,
    ];

    /// Sets answerable from the precomputed hook flags
    pub fn is_hook_set(self) -> bool {
        matches!(
            self,
            SearchSet::HookWords | SearchSet::FrontHooks | SearchSet::BackHooks
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            SearchSet::HookWords => "Hook Words",
            SearchSet::FrontHooks => "Front Hooks",
            SearchSet::BackHooks => "Back Hooks",
            SearchSet::HighFives => "High Fives",
            SearchSet::TypeOneSevens => "Type I Sevens",
            SearchSet::TypeOneEights => "Type I Eights",
            SearchSet::TypeTwoSevens => "Type II Sevens",
            SearchSet::TypeTwoEights => "Type II Eights",
            SearchSet::TypeThreeSevens => "Type III Sevens",
            SearchSet::TypeThreeEights => "Type III Eights",
            SearchSet::EightsFromSevenLetterStems => "Eights From Seven-Letter Stems",
        }
    }

    fn alias(self) -> &'static str {
        match self {
            SearchSet::HookWords => "hooks",
            SearchSet::FrontHooks => "front-hooks",
            SearchSet::BackHooks => "back-hooks",
            SearchSet::HighFives => "high-fives",
            SearchSet::TypeOneSevens => "type1-sevens",
            SearchSet::TypeOneEights => "type1-eights",
            SearchSet::TypeTwoSevens => "type2-sevens",
            SearchSet::TypeTwoEights => "type2-eights",
            SearchSet::TypeThreeSevens => "type3-sevens",
            SearchSet::TypeThreeEights => "type3-eights",
            SearchSet::EightsFromSevenLetterStems => "eights-from-stems",
        }
    }
}

impl fmt::Display for SearchSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SearchSet {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SearchSet::ALL
            .into_iter()
            .find(|set| set.name().eq_ignore_ascii_case(s) || set.alias().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown search set '{}'", s))
    }
}

/// The closed set of predicate kinds, each carrying its own payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ConditionKind {
    PatternMatch(String),
    AnagramMatch(String),
    SubanagramMatch(String),
    /// Share of the word's letters drawn from `letters`, in percent
    ConsistOf {
        letters: String,
        percent: Range,
    },
    Prefix(String),
    Suffix(String),
    IncludeLetters(String),
    Length(Range),
    NumVowels(Range),
    NumUniqueLetters(Range),
    PointValue(Range),
    NumAnagrams(Range),
    /// `lax` matches when the word's own tie range overlaps the window
    ProbabilityOrder {
        range: Range,
        lax: bool,
    },
    /// Rank window over the result set; `legacy` drops the alphagram tie-break
    LimitByProbabilityOrder {
        range: Range,
        lax: bool,
        legacy: bool,
    },
    BelongToGroup(SearchSet),
    InWordList(Vec<String>),
}

/// A single predicate in a search specification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub kind: ConditionKind,
    #[serde(default)]
    pub negated: bool,
}

impl Condition {
    pub fn new(kind: ConditionKind) -> Self {
        Self {
            kind,
            negated: false,
        }
    }

    pub fn negate(mut self) -> Self {
        self.negated = !self.negated;
        self
    }

    pub fn pattern(pattern: &str) -> Self {
        Self::new(ConditionKind::PatternMatch(pattern.to_ascii_uppercase()))
    }

    pub fn anagram(letters: &str) -> Self {
        Self::new(ConditionKind::AnagramMatch(letters.to_ascii_uppercase()))
    }

    pub fn subanagram(letters: &str) -> Self {
        Self::new(ConditionKind::SubanagramMatch(letters.to_ascii_uppercase()))
    }

    pub fn consist_of(letters: &str) -> Self {
        Self::new(ConditionKind::ConsistOf {
            letters: letters.to_ascii_uppercase(),
            percent: Range::exactly(100),
        })
    }

    pub fn prefix(prefix: &str) -> Self {
        Self::new(ConditionKind::Prefix(prefix.to_ascii_uppercase()))
    }

    pub fn suffix(suffix: &str) -> Self {
        Self::new(ConditionKind::Suffix(suffix.to_ascii_uppercase()))
    }

    pub fn include_letters(letters: &str) -> Self {
        Self::new(ConditionKind::IncludeLetters(letters.to_ascii_uppercase()))
    }

    pub fn length(min: u32, max: u32) -> Self {
        Self::new(ConditionKind::Length(Range::new(min, max)))
    }

    pub fn probability_limit(min: u32, max: u32, lax: bool) -> Self {
        Self::new(ConditionKind::LimitByProbabilityOrder {
            range: Range::new(min, max),
            lax,
            legacy: false,
        })
    }

    pub fn belong_to(set: SearchSet) -> Self {
        Self::new(ConditionKind::BelongToGroup(set))
    }

    pub fn in_word_list<S: AsRef<str>>(words: &[S]) -> Self {
        Self::new(ConditionKind::InWordList(
            words.iter().map(|w| w.as_ref().to_string()).collect(),
        ))
    }
}

/// Ordered list of conditions joined by AND (`conjunction`) or OR
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchSpec {
    #[serde(default = "default_conjunction")]
    pub conjunction: bool,
    pub conditions: Vec<Condition>,
}

fn default_conjunction() -> bool {
    true
}

impl Default for SearchSpec {
    fn default() -> Self {
        Self {
            conjunction: true,
            conditions: Vec::new(),
        }
    }
}

impl SearchSpec {
    pub fn all_of(conditions: Vec<Condition>) -> Self {
        Self {
            conjunction: true,
            conditions,
        }
    }

    pub fn any_of(conditions: Vec<Condition>) -> Self {
        Self {
            conjunction: false,
            conditions,
        }
    }

    pub fn with(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }
}
