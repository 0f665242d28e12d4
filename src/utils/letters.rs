//! Letter arithmetic: alphagrams, vowel counts, tile bags and the
//! combinatorial counts used for probability ordering.

use tracing::warn;

/// Number of distinct letters tracked by a [`LetterBag`]
pub const ALPHABET_SIZE: usize = 26;

/// Map an ASCII letter (either case) to 0..26
#[inline]
pub fn letter_index(b: u8) -> Option<usize> {
    let upper = b.to_ascii_uppercase();
    if upper.is_ascii_uppercase() {
        Some((upper - b'A') as usize)
    } else {
        None
    }
}

/// Letters of a word sorted into canonical order
pub fn alphagram(word: &str) -> String {
    let mut bytes: Vec<u8> = word.bytes().collect();
    bytes.sort_unstable();
    String::from_utf8(bytes).unwrap_or_default()
}

/// Count of A, E, I, O, U
pub fn num_vowels(word: &str) -> u32 {
    word.bytes()
        .filter(|b| matches!(b.to_ascii_uppercase(), b'A' | b'E' | b'I' | b'O' | b'U'))
        .count() as u32
}

/// Count of distinct characters
pub fn num_unique_letters(word: &str) -> u32 {
    let mut seen = [false; 256];
    let mut count = 0;
    for b in word.bytes() {
        let slot = &mut seen[b.to_ascii_uppercase() as usize];
        if !*slot {
            *slot = true;
            count += 1;
        }
    }
    count
}

/// Per-letter multiplicities of a word, plus characters outside A-Z
pub fn letter_counts(word: &str) -> ([u32; ALPHABET_SIZE], u32) {
    let mut counts = [0u32; ALPHABET_SIZE];
    let mut other = 0;
    for b in word.bytes() {
        match letter_index(b) {
            Some(i) => counts[i] += 1,
            None => other += 1,
        }
    }
    (counts, other)
}

/// Parse a `"A:9 B:2 ... _:2"` style table. `_` is the blank.
/// Returns per-letter values and the blank value.
pub fn parse_letter_table(spec: &str) -> ([u32; ALPHABET_SIZE], u32) {
    let mut values = [0u32; ALPHABET_SIZE];
    let mut blanks = 0;

    for entry in spec.split_whitespace() {
        let Some((letter, value)) = entry.split_once(':') else {
            warn!(entry, "ignoring malformed letter table entry");
            continue;
        };
        let Ok(value) = value.parse::<u32>() else {
            warn!(entry, "ignoring letter table entry with bad count");
            continue;
        };
        match letter.as_bytes() {
            [b'_'] => blanks = value,
            [b] => match letter_index(*b) {
                Some(i) => values[i] = value,
                None => warn!(entry, "ignoring letter table entry with bad letter"),
            },
            _ => warn!(entry, "ignoring letter table entry with bad letter"),
        }
    }

    (values, blanks)
}

/// A bag of tiles with a fixed letter distribution
#[derive(Debug, Clone, PartialEq)]
pub struct LetterBag {
    counts: [u32; ALPHABET_SIZE],
    blanks: u32,
}

impl LetterBag {
    pub fn from_distribution(spec: &str) -> Self {
        let (counts, blanks) = parse_letter_table(spec);
        Self { counts, blanks }
    }

    pub fn count(&self, letter: u8) -> u32 {
        letter_index(letter).map(|i| self.counts[i]).unwrap_or(0)
    }

    pub fn blanks(&self) -> u32 {
        self.blanks
    }

    /// Number of distinct tile draws that spell the word, with blanks
    /// standing in for any letter.
    ///
    /// Sums over every way of assigning `k` blanks to the word's letters:
    /// `C(blanks, k) * prod C(bag[c], need[c] - used[c])`.
    pub fn num_combinations(&self, word: &str) -> f64 {
        let (need, other) = letter_counts(word);

        // poly[k] = ways to draw the real tiles when k letters are covered by blanks
        let mut poly = vec![0.0f64; other as usize + 1];
        poly[other as usize] = 1.0;

        for (i, &n) in need.iter().enumerate() {
            if n == 0 {
                continue;
            }
            let mut next = vec![0.0f64; poly.len() + n as usize];
            for (k, &ways) in poly.iter().enumerate() {
                if ways == 0.0 {
                    continue;
                }
                for used in 0..=n {
                    let real = choose(self.counts[i], n - used);
                    if real > 0.0 {
                        next[k + used as usize] += ways * real;
                    }
                }
            }
            poly = next;
        }

        poly.iter()
            .enumerate()
            .filter(|&(k, _)| k as u32 <= self.blanks)
            .map(|(k, &ways)| ways * choose(self.blanks, k as u32))
            .sum()
    }
}

/// Binomial coefficient as f64 (0 when r > n)
pub fn choose(n: u32, r: u32) -> f64 {
    if r > n {
        return 0.0;
    }
    let r = r.min(n - r);
    let mut result = 1.0f64;
    for i in 0..r {
        result = result * (n - i) as f64 / (i + 1) as f64;
    }
    result.round()
}

#[cfg(test)]
mod tests {
    use super::*;

    const STANDARD: &str = "A:9 B:2 C:2 D:4 E:12 F:2 G:3 H:2 I:9 J:1 K:1 L:4 M:2 \
                            N:6 O:8 P:2 Q:1 R:6 S:4 T:6 U:4 V:2 W:2 X:1 Y:2 Z:1 _:2";

    #[test]
    fn test_alphagram() {
        assert_eq!(alphagram("CAT"), "ACT");
        assert_eq!(alphagram("STATS"), "ASSTT");
        assert_eq!(alphagram(""), "");
    }

    #[test]
    fn test_vowels_and_unique_letters() {
        assert_eq!(num_vowels("QUEUE"), 4);
        assert_eq!(num_vowels("RHYTHM"), 0);
        assert_eq!(num_unique_letters("BANANA"), 3);
        assert_eq!(num_unique_letters("banana"), 3);
    }

    #[test]
    fn test_choose() {
        assert_eq!(choose(9, 0), 1.0);
        assert_eq!(choose(9, 2), 36.0);
        assert_eq!(choose(2, 3), 0.0);
    }

    #[test]
    fn test_combinations_without_blanks() {
        let bag = LetterBag::from_distribution("A:9 C:2 T:6");
        // 9 * 2 * 6
        assert_eq!(bag.num_combinations("CAT"), 108.0);
        // C(9,2) * 6
        assert_eq!(bag.num_combinations("AAT"), 216.0);
    }

    #[test]
    fn test_combinations_with_blanks() {
        let bag = LetterBag::from_distribution("A:1 B:1 _:1");
        // AB: real A+B, or blank for A, or blank for B
        assert_eq!(bag.num_combinations("AB"), 3.0);
        // AA: one real A plus the blank
        assert_eq!(bag.num_combinations("AA"), 1.0);
        // AAA cannot be drawn
        assert_eq!(bag.num_combinations("AAA"), 0.0);
    }

    #[test]
    fn test_standard_bag_orders_common_words_first() {
        let bag = LetterBag::from_distribution(STANDARD);
        assert_eq!(bag.blanks(), 2);
        assert_eq!(bag.count(b'E'), 12);
        assert!(bag.num_combinations("AEIOU") > bag.num_combinations("JINXY"));
        assert!(bag.num_combinations("QI") > 0.0);
    }

    #[test]
    fn test_parse_letter_table_skips_garbage() {
        let (values, blanks) = parse_letter_table("A:1 B:x ?:3 _:2 Q10");
        assert_eq!(values[0], 1);
        assert_eq!(values[1], 0);
        assert_eq!(blanks, 2);
    }
}
