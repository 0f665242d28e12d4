//! Attribute filters: an expression tree compiled from search conditions.
//!
//! A [`Filter`] renders to a SQL-like `WHERE` clause for logging and is
//! evaluated directly against [`AttributeRow`]s, narrowing a roaring bitmap
//! of row ids one node at a time.

use super::row::AttributeRow;
use crate::graph::pattern::{tokenize, Token};
use crate::query::spec::{Condition, ConditionKind, Range, SearchSet};
use roaring::RoaringBitmap;
use std::collections::BTreeMap;
use std::fmt;

/// Numeric columns of an attribute row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Length,
    NumVowels,
    NumUniqueLetters,
    PointValue,
    NumAnagrams,
    ProbabilityOrder,
    MinProbabilityOrder,
    MaxProbabilityOrder,
}

impl Column {
    pub fn name(self) -> &'static str {
        match self {
            Column::Length => "length",
            Column::NumVowels => "num_vowels",
            Column::NumUniqueLetters => "num_unique_letters",
            Column::PointValue => "point_value",
            Column::NumAnagrams => "num_anagrams",
            Column::ProbabilityOrder => "probability_order",
            Column::MinProbabilityOrder => "min_probability_order",
            Column::MaxProbabilityOrder => "max_probability_order",
        }
    }

    fn value(self, row: &AttributeRow) -> u32 {
        match self {
            Column::Length => row.length,
            Column::NumVowels => row.info.num_vowels,
            Column::NumUniqueLetters => row.info.num_unique_letters,
            Column::PointValue => row.info.point_value,
            Column::NumAnagrams => row.info.num_anagrams,
            Column::ProbabilityOrder => row.info.probability_order,
            Column::MinProbabilityOrder => row.info.min_probability_order,
            Column::MaxProbabilityOrder => row.info.max_probability_order,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ge,
    Le,
}

impl CompareOp {
    fn symbol(self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Ge => ">=",
            CompareOp::Le => "<=",
        }
    }

    fn apply(self, lhs: u32, rhs: u32) -> bool {
        match self {
            CompareOp::Eq => lhs == rhs,
            CompareOp::Ge => lhs >= rhs,
            CompareOp::Le => lhs <= rhs,
        }
    }
}

/// Hook flag columns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flag {
    FrontHook,
    BackHook,
}

impl Flag {
    fn name(self) -> &'static str {
        match self {
            Flag::FrontHook => "is_front_hook",
            Flag::BackHook => "is_back_hook",
        }
    }

    fn value(self, row: &AttributeRow) -> bool {
        match self {
            Flag::FrontHook => row.info.is_front_hook,
            Flag::BackHook => row.info.is_back_hook,
        }
    }
}

/// A `LIKE` pattern: `_` one character, `%` any run
#[derive(Debug, Clone, PartialEq)]
pub struct LikePattern {
    tokens: Vec<Token>,
}

impl LikePattern {
    /// Build from search-pattern syntax (`?` and `*`)
    pub fn from_pattern(pattern: &str) -> Self {
        Self {
            tokens: tokenize(pattern),
        }
    }

    /// Word containing `letter` at least `count` times
    pub fn with_letter(letter: u8, count: u32) -> Self {
        let mut tokens = vec![Token::Star];
        for _ in 0..count {
            tokens.push(Token::Letter(letter));
            tokens.push(Token::Star);
        }
        Self { tokens }
    }

    pub fn matches(&self, word: &str) -> bool {
        let text = word.as_bytes();
        let (mut t, mut p) = (0usize, 0usize);
        let mut backtrack: Option<(usize, usize)> = None;

        while t < text.len() {
            match self.tokens.get(p) {
                Some(Token::Star) => {
                    backtrack = Some((p, t));
                    p += 1;
                }
                Some(token) if token.matches(text[t].to_ascii_uppercase()) => {
                    p += 1;
                    t += 1;
                }
                _ => match backtrack {
                    Some((star_p, star_t)) => {
                        p = star_p + 1;
                        t = star_t + 1;
                        backtrack = Some((star_p, star_t + 1));
                    }
                    None => return false,
                },
            }
        }

        self.tokens[p..].iter().all(|token| *token == Token::Star)
    }
}

impl fmt::Display for LikePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for token in &self.tokens {
            match token {
                Token::Letter(l) => write!(f, "{}", *l as char)?,
                Token::Any => f.write_str("_")?,
                Token::Star => f.write_str("%")?,
                Token::Class(_) => f.write_str("[..]")?,
            }
        }
        Ok(())
    }
}

/// Filter expression over attribute rows
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Compare {
        column: Column,
        op: CompareOp,
        value: u32,
    },
    Like(LikePattern),
    Flag {
        flag: Flag,
        value: bool,
    },
    /// Word is one of these upper-cased, sorted words
    InSet(Vec<String>),
    And(Vec<Filter>),
    Or(Vec<Filter>),
    Not(Box<Filter>),
}

impl Filter {
    /// `column = n` when the range is a point, `column BETWEEN` otherwise
    pub fn range(column: Column, range: Range) -> Self {
        if range.is_exact() {
            Filter::Compare {
                column,
                op: CompareOp::Eq,
                value: range.min,
            }
        } else {
            Filter::And(vec![
                Filter::Compare {
                    column,
                    op: CompareOp::Ge,
                    value: range.min,
                },
                Filter::Compare {
                    column,
                    op: CompareOp::Le,
                    value: range.max,
                },
            ])
        }
    }

    pub fn in_set<S: AsRef<str>>(words: &[S]) -> Self {
        let mut upper: Vec<String> = words
            .iter()
            .map(|w| w.as_ref().to_ascii_uppercase())
            .collect();
        upper.sort();
        upper.dedup();
        Filter::InSet(upper)
    }

    pub fn matches(&self, row: &AttributeRow) -> bool {
        match self {
            Filter::Compare { column, op, value } => op.apply(column.value(row), *value),
            Filter::Like(pattern) => pattern.matches(row.word()),
            Filter::Flag { flag, value } => flag.value(row) == *value,
            Filter::InSet(words) => words.binary_search_by(|w| w.as_str().cmp(row.word())).is_ok(),
            Filter::And(parts) => parts.iter().all(|p| p.matches(row)),
            Filter::Or(parts) => parts.iter().any(|p| p.matches(row)),
            Filter::Not(inner) => !inner.matches(row),
        }
    }

    /// Subset of `candidates` whose rows satisfy the filter
    pub fn evaluate(&self, rows: &[AttributeRow], candidates: &RoaringBitmap) -> RoaringBitmap {
        match self {
            Filter::And(parts) => {
                let mut current = candidates.clone();
                for part in parts {
                    if current.is_empty() {
                        break;
                    }
                    current = part.evaluate(rows, &current);
                }
                current
            }
            Filter::Or(parts) => {
                let mut out = RoaringBitmap::new();
                for part in parts {
                    let remaining = candidates - &out;
                    out |= part.evaluate(rows, &remaining);
                }
                out
            }
            Filter::Not(inner) => candidates - inner.evaluate(rows, candidates),
            leaf => candidates
                .iter()
                .filter(|&id| rows.get(id as usize).is_some_and(|row| leaf.matches(row)))
                .collect(),
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::Compare { column, op, value } => {
                write!(f, "{}{}{}", column.name(), op.symbol(), value)
            }
            Filter::Like(pattern) => write!(f, "word LIKE '{}'", pattern),
            Filter::Flag { flag, value } => write!(f, "{}={}", flag.name(), *value as u8),
            Filter::InSet(words) => {
                f.write_str("word IN (")?;
                for (i, word) in words.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "'{}'", word)?;
                }
                f.write_str(")")
            }
            Filter::And(parts) => join(f, parts, " AND "),
            Filter::Or(parts) => join(f, parts, " OR "),
            Filter::Not(inner) => write!(f, "NOT ({})", inner),
        }
    }
}

fn join(f: &mut fmt::Formatter<'_>, parts: &[Filter], sep: &str) -> fmt::Result {
    f.write_str("(")?;
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{}", part)?;
    }
    f.write_str(")")
}

/// Compile every answerable condition and join them. `None` when nothing
/// compiled.
pub fn compile_all(conditions: &[&Condition], conjunction: bool) -> Option<Filter> {
    let parts: Vec<Filter> = conditions.iter().filter_map(|c| compile(c)).collect();
    if parts.is_empty() {
        None
    } else if conjunction {
        Some(Filter::And(parts))
    } else {
        Some(Filter::Or(parts))
    }
}

/// Translate one attribute-phase condition. Returns `None` for kinds the
/// attribute store does not answer.
pub fn compile(condition: &Condition) -> Option<Filter> {
    let filter = match &condition.kind {
        ConditionKind::PatternMatch(pattern) => Filter::Like(LikePattern::from_pattern(pattern)),
        ConditionKind::Length(range) => Filter::range(Column::Length, *range),
        ConditionKind::NumVowels(range) => Filter::range(Column::NumVowels, *range),
        ConditionKind::NumUniqueLetters(range) => Filter::range(Column::NumUniqueLetters, *range),
        ConditionKind::PointValue(range) => Filter::range(Column::PointValue, *range),
        ConditionKind::NumAnagrams(range) => Filter::range(Column::NumAnagrams, *range),
        ConditionKind::ProbabilityOrder { range, lax: true } => Filter::And(vec![
            Filter::Compare {
                column: Column::MaxProbabilityOrder,
                op: CompareOp::Ge,
                value: range.min,
            },
            Filter::Compare {
                column: Column::MinProbabilityOrder,
                op: CompareOp::Le,
                value: range.max,
            },
        ]),
        ConditionKind::ProbabilityOrder { range, lax: false } => {
            Filter::range(Column::ProbabilityOrder, *range)
        }
        // Negation means the letter is absent, not "fewer than N"
        ConditionKind::IncludeLetters(letters) => {
            let mut counts: BTreeMap<u8, u32> = BTreeMap::new();
            for b in letters.bytes() {
                *counts.entry(b.to_ascii_uppercase()).or_default() += 1;
            }
            let parts = counts
                .into_iter()
                .map(|(letter, count)| {
                    if condition.negated {
                        Filter::Not(Box::new(Filter::Like(LikePattern::with_letter(letter, 1))))
                    } else {
                        Filter::Like(LikePattern::with_letter(letter, count))
                    }
                })
                .collect();
            return Some(Filter::And(parts));
        }
        ConditionKind::BelongToGroup(set) => {
            let target = !condition.negated;
            let filter = match set {
                SearchSet::FrontHooks => Filter::Flag {
                    flag: Flag::FrontHook,
                    value: target,
                },
                SearchSet::BackHooks => Filter::Flag {
                    flag: Flag::BackHook,
                    value: target,
                },
                SearchSet::HookWords if target => Filter::Or(vec![
                    Filter::Flag {
                        flag: Flag::FrontHook,
                        value: true,
                    },
                    Filter::Flag {
                        flag: Flag::BackHook,
                        value: true,
                    },
                ]),
                SearchSet::HookWords => Filter::And(vec![
                    Filter::Flag {
                        flag: Flag::FrontHook,
                        value: false,
                    },
                    Filter::Flag {
                        flag: Flag::BackHook,
                        value: false,
                    },
                ]),
                _ => return None,
            };
            return Some(filter);
        }
        ConditionKind::InWordList(words) => Filter::in_set(words),
        _ => return None,
    };

    if condition.negated {
        Some(Filter::Not(Box::new(filter)))
    } else {
        Some(filter)
    }
}
