//! Query-string syntax for search specifications.
//!
//! Whitespace-separated terms form a conjunction, terms separated by `|` a
//! disjunction. A leading `-` negates a term. Terms are `field:value`; a bare
//! term is a pattern. Values may be double-quoted to include spaces.
//!
//! ```text
//! pattern:C?T* -suffix:S length:3-5
//! anagram:AEINRST | anagram:AEINRST?
//! set:"Type I Sevens" limitlax:1-100
//! ```

use super::spec::{Condition, ConditionKind, Range, SearchSet, SearchSpec};
use thiserror::Error;

/// Errors from [`parse_spec`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("empty query")]
    Empty,
    #[error("cannot mix '|' with whitespace-joined terms")]
    MixedOperators,
    #[error("unknown field '{0}'")]
    UnknownField(String),
    #[error("missing value for '{0}'")]
    MissingValue(String),
    #[error("invalid range '{0}'")]
    InvalidRange(String),
    #[error("{0}")]
    UnknownSet(String),
}

/// Parse a query string into a search specification
pub fn parse_spec(input: &str) -> Result<SearchSpec, ParseError> {
    QueryParser::new(input).parse()
}

struct QueryParser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> QueryParser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn parse(&mut self) -> Result<SearchSpec, ParseError> {
        let mut conditions = Vec::new();
        let mut saw_and = false;
        let mut saw_or = false;

        loop {
            let gap_start = self.pos;
            self.skip_whitespace();
            if self.is_eof() {
                break;
            }

            if !conditions.is_empty() {
                if self.consume_char('|') {
                    saw_or = true;
                    self.skip_whitespace();
                } else if self.pos > gap_start {
                    saw_and = true;
                }
            }
            if saw_and && saw_or {
                return Err(ParseError::MixedOperators);
            }
            if self.is_eof() {
                break;
            }

            conditions.push(self.parse_term()?);
        }

        if conditions.is_empty() {
            return Err(ParseError::Empty);
        }

        Ok(SearchSpec {
            conjunction: !saw_or,
            conditions,
        })
    }

    fn parse_term(&mut self) -> Result<Condition, ParseError> {
        let negated = self.consume_char('-');
        let start = self.pos;

        while let Some(ch) = self.peek_char() {
            if ch.is_ascii_alphabetic() {
                self.advance();
            } else {
                break;
            }
        }

        let condition = if self.consume_char(':') {
            let field = self.input[start..self.pos - 1].to_ascii_lowercase();
            let value = self.read_value();
            if value.is_empty() {
                return Err(ParseError::MissingValue(field));
            }
            parse_field(&field, &value)?
        } else {
            self.pos = start;
            let value = self.read_value();
            if value.is_empty() {
                return Err(ParseError::MissingValue("pattern".to_string()));
            }
            Condition::pattern(&value)
        };

        Ok(if negated { condition.negate() } else { condition })
    }

    fn read_value(&mut self) -> String {
        if self.consume_char('"') {
            let start = self.pos;
            while !self.is_eof() && self.peek_char() != Some('"') {
                self.advance();
            }
            let value = self.input[start..self.pos].to_string();
            self.consume_char('"');
            return value;
        }

        let start = self.pos;
        while let Some(ch) = self.peek_char() {
            if ch.is_whitespace() || ch == '|' {
                break;
            }
            self.advance();
        }
        self.input[start..self.pos].to_string()
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek_char() {
            if !ch.is_whitespace() {
                break;
            }
            self.advance();
        }
    }

    fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn consume_char(&mut self, expected: char) -> bool {
        if self.peek_char() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn advance(&mut self) {
        if let Some(ch) = self.peek_char() {
            self.pos += ch.len_utf8();
        }
    }
}

fn parse_field(field: &str, value: &str) -> Result<Condition, ParseError> {
    let kind = match field {
        "pattern" => return Ok(Condition::pattern(value)),
        "anagram" => return Ok(Condition::anagram(value)),
        "subanagram" => return Ok(Condition::subanagram(value)),
        "consist" => {
            let (letters, percent) = match value.split_once('@') {
                Some((letters, window)) => (letters, parse_range(window)?),
                None => (value, Range::exactly(100)),
            };
            ConditionKind::ConsistOf {
                letters: letters.to_ascii_uppercase(),
                percent,
            }
        }
        "prefix" => return Ok(Condition::prefix(value)),
        "suffix" => return Ok(Condition::suffix(value)),
        "include" => return Ok(Condition::include_letters(value)),
        "length" => ConditionKind::Length(parse_range(value)?),
        "vowels" => ConditionKind::NumVowels(parse_range(value)?),
        "unique" => ConditionKind::NumUniqueLetters(parse_range(value)?),
        "points" => ConditionKind::PointValue(parse_range(value)?),
        "anagrams" => ConditionKind::NumAnagrams(parse_range(value)?),
        "prob" | "problax" => ConditionKind::ProbabilityOrder {
            range: parse_range(value)?,
            lax: field == "problax",
        },
        "limit" | "limitlax" | "limitlegacy" => ConditionKind::LimitByProbabilityOrder {
            range: parse_range(value)?,
            lax: field == "limitlax",
            legacy: field == "limitlegacy",
        },
        "set" => ConditionKind::BelongToGroup(value.parse::<SearchSet>().map_err(ParseError::UnknownSet)?),
        "words" => ConditionKind::InWordList(
            value
                .split(',')
                .filter(|w| !w.is_empty())
                .map(str::to_string)
                .collect(),
        ),
        _ => return Err(ParseError::UnknownField(field.to_string())),
    };
    Ok(Condition::new(kind))
}

/// `N` or `N-M`
fn parse_range(value: &str) -> Result<Range, ParseError> {
    let invalid = || ParseError::InvalidRange(value.to_string());
    match value.split_once('-') {
        Some((min, max)) => {
            let min = min.trim().parse().map_err(|_| invalid())?;
            let max = max.trim().parse().map_err(|_| invalid())?;
            Ok(Range::new(min, max))
        }
        None => value.trim().parse().map(Range::exactly).map_err(|_| invalid()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_term_is_pattern() {
        let spec = parse_spec("c?t").unwrap();
        assert!(spec.conjunction);
        assert_eq!(spec.conditions, vec![Condition::pattern("C?T")]);
    }

    #[test]
    fn test_conjunction_with_negation() {
        let spec = parse_spec("pattern:C* -suffix:s length:3-5").unwrap();
        assert!(spec.conjunction);
        assert_eq!(
            spec.conditions,
            vec![
                Condition::pattern("C*"),
                Condition::suffix("S").negate(),
                Condition::length(3, 5),
            ]
        );
    }

    #[test]
    fn test_disjunction() {
        let spec = parse_spec("anagram:CAT | anagram:DOG|prefix:Z").unwrap();
        assert!(!spec.conjunction);
        assert_eq!(spec.conditions.len(), 3);
        assert_eq!(spec.conditions[2], Condition::prefix("Z"));
    }

    #[test]
    fn test_mixed_operators_rejected() {
        assert_eq!(parse_spec("C* D* | E*"), Err(ParseError::MixedOperators));
        assert_eq!(parse_spec("C* | D* E*"), Err(ParseError::MixedOperators));
    }

    #[test]
    fn test_ranges_and_probability_variants() {
        let spec = parse_spec("vowels:2 limitlax:1-10 limitlegacy:5-3 problax:1-4").unwrap();
        assert_eq!(spec.conditions[0].kind, ConditionKind::NumVowels(Range::exactly(2)));
        assert_eq!(
            spec.conditions[1].kind,
            ConditionKind::LimitByProbabilityOrder {
                range: Range::new(1, 10),
                lax: true,
                legacy: false
            }
        );
        assert_eq!(
            spec.conditions[2].kind,
            ConditionKind::LimitByProbabilityOrder {
                range: Range::new(3, 5),
                lax: false,
                legacy: true
            }
        );
        assert_eq!(
            spec.conditions[3].kind,
            ConditionKind::ProbabilityOrder {
                range: Range::new(1, 4),
                lax: true
            }
        );
    }

    #[test]
    fn test_consist_percent_window() {
        let spec = parse_spec("consist:aeiou@50-100").unwrap();
        assert_eq!(
            spec.conditions[0].kind,
            ConditionKind::ConsistOf {
                letters: "AEIOU".to_string(),
                percent: Range::new(50, 100)
            }
        );
        let spec = parse_spec("consist:AB").unwrap();
        assert!(matches!(
            spec.conditions[0].kind,
            ConditionKind::ConsistOf { percent, .. } if percent == Range::exactly(100)
        ));
    }

    #[test]
    fn test_sets_and_word_lists() {
        let spec = parse_spec("set:\"Type I Sevens\" set:hooks words:cat,Dog").unwrap();
        assert_eq!(spec.conditions[0], Condition::belong_to(SearchSet::TypeOneSevens));
        assert_eq!(spec.conditions[1], Condition::belong_to(SearchSet::HookWords));
        assert_eq!(spec.conditions[2], Condition::in_word_list(&["cat", "Dog"]));
    }

    #[test]
    fn test_errors() {
        assert_eq!(parse_spec("   "), Err(ParseError::Empty));
        assert_eq!(parse_spec("colour:red"), Err(ParseError::UnknownField("colour".to_string())));
        assert_eq!(parse_spec("length:x-3"), Err(ParseError::InvalidRange("x-3".to_string())));
        assert_eq!(parse_spec("prefix:"), Err(ParseError::MissingValue("prefix".to_string())));
        assert!(matches!(parse_spec("set:nothing"), Err(ParseError::UnknownSet(_))));
    }

    #[test]
    fn test_class_patterns_survive() {
        let spec = parse_spec("[^AEIOU]?T -[AB]*").unwrap();
        assert_eq!(spec.conditions[0], Condition::pattern("[^AEIOU]?T"));
        assert_eq!(spec.conditions[1], Condition::pattern("[AB]*").negate());
    }
}
