//! Wildcard tokens shared by pattern, anagram and subanagram searches.

use crate::utils::letters::{letter_index, ALPHABET_SIZE};

/// Bitmask over A-Z
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LetterSet(u32);

impl LetterSet {
    pub const FULL: LetterSet = LetterSet((1 << ALPHABET_SIZE) - 1);

    pub fn from_letters(letters: &str) -> Self {
        let mut mask = 0u32;
        for b in letters.bytes() {
            if let Some(i) = letter_index(b) {
                mask |= 1 << i;
            }
        }
        LetterSet(mask)
    }

    pub fn complement(self) -> Self {
        LetterSet(!self.0 & Self::FULL.0)
    }

    #[inline]
    pub fn contains(self, letter: u8) -> bool {
        letter_index(letter).is_some_and(|i| self.0 & (1 << i) != 0)
    }
}

/// One position of a search pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    Letter(u8),
    /// `?`
    Any,
    /// `[ABC]` or `[^ABC]`
    Class(LetterSet),
    /// `*`, zero or more letters
    Star,
}

impl Token {
    #[inline]
    pub fn matches(self, letter: u8) -> bool {
        match self {
            Token::Letter(l) => l == letter,
            Token::Any | Token::Star => true,
            Token::Class(set) => set.contains(letter),
        }
    }
}

/// Split a pattern into tokens. Runs of `*` collapse into one.
pub fn tokenize(pattern: &str) -> Vec<Token> {
    let bytes = pattern.as_bytes();
    let mut tokens = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'?' => tokens.push(Token::Any),
            b'*' => {
                if tokens.last() != Some(&Token::Star) {
                    tokens.push(Token::Star);
                }
            }
            b'[' => {
                let start = i + 1;
                let end = bytes[start..]
                    .iter()
                    .position(|&b| b == b']')
                    .map(|p| start + p)
                    .unwrap_or(bytes.len());
                let body = &pattern[start..end];
                let set = match body.strip_prefix('^') {
                    Some(rest) => LetterSet::from_letters(rest).complement(),
                    None => LetterSet::from_letters(body),
                };
                tokens.push(Token::Class(set));
                i = end;
            }
            b if b.is_ascii_alphabetic() => tokens.push(Token::Letter(b.to_ascii_uppercase())),
            _ => {}
        }
        i += 1;
    }

    tokens
}

/// Number of letters a pattern pins down; `None` when it contains `*`
pub fn fixed_length(tokens: &[Token]) -> Option<usize> {
    if tokens.contains(&Token::Star) {
        None
    } else {
        Some(tokens.len())
    }
}

/// Minimum number of letters any match must have
pub fn min_length(tokens: &[Token]) -> usize {
    tokens.iter().filter(|t| **t != Token::Star).count()
}

/// Tiles available to an anagram search
#[derive(Debug, Clone)]
pub struct Rack {
    pub counts: [u32; ALPHABET_SIZE],
    pub blanks: u32,
    pub classes: Vec<LetterSet>,
    pub star: bool,
}

impl Rack {
    pub fn from_tokens(tokens: &[Token]) -> Self {
        let mut rack = Rack {
            counts: [0; ALPHABET_SIZE],
            blanks: 0,
            classes: Vec::new(),
            star: false,
        };
        for token in tokens {
            match *token {
                Token::Letter(l) => {
                    if let Some(i) = letter_index(l) {
                        rack.counts[i] += 1;
                    }
                }
                Token::Any => rack.blanks += 1,
                Token::Class(set) => rack.classes.push(set),
                Token::Star => rack.star = true,
            }
        }
        rack
    }

    /// Tiles left, not counting the `*` allowance
    pub fn remaining(&self) -> usize {
        self.counts.iter().sum::<u32>() as usize + self.blanks as usize + self.classes.len()
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }
}
