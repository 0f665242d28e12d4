//! Arena-allocated letter trie and the walks that answer graph-phase queries.
//!
//! Every walk prunes on [`LengthBounds`] and collects raw upper-case bytes;
//! callers turn them into words and deduplicate.

use crate::graph::pattern::{fixed_length, LetterSet, Rack, Token};

/// Node identifier inside a [`Trie`] arena
pub type NodeId = u32;

pub const ROOT: NodeId = 0;

#[derive(Debug, Clone, Default)]
pub struct Node {
    /// Sorted by letter
    pub children: Vec<(u8, NodeId)>,
    pub terminal: bool,
}

/// Inclusive word-length window applied while walking the graph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LengthBounds {
    pub min: usize,
    pub max: usize,
}

impl LengthBounds {
    pub fn new(min: usize, max: usize) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, len: usize) -> bool {
        len >= self.min && len <= self.max
    }
}

/// Arena-allocated letter trie over upper-case ASCII words
#[derive(Debug, Clone)]
pub struct Trie {
    nodes: Vec<Node>,
    words: usize,
}

impl Default for Trie {
    fn default() -> Self {
        Self::new()
    }
}

impl Trie {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::default()],
            words: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.words
    }

    pub fn is_empty(&self) -> bool {
        self.words == 0
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id as usize]
    }

    #[inline]
    pub fn child(&self, id: NodeId, letter: u8) -> Option<NodeId> {
        let children = &self.nodes[id as usize].children;
        children
            .binary_search_by_key(&letter, |&(l, _)| l)
            .ok()
            .map(|i| children[i].1)
    }

    /// Insert a word. Returns true if it was not already present.
    pub fn insert<I: IntoIterator<Item = u8>>(&mut self, letters: I) -> bool {
        let mut node = ROOT;
        let mut depth = 0;
        for letter in letters {
            depth += 1;
            let found = self.nodes[node as usize]
                .children
                .binary_search_by_key(&letter, |&(l, _)| l);
            node = match found {
                Ok(i) => self.nodes[node as usize].children[i].1,
                Err(i) => {
                    let id = self.nodes.len() as NodeId;
                    self.nodes.push(Node::default());
                    self.nodes[node as usize].children.insert(i, (letter, id));
                    id
                }
            };
        }

        let target = &mut self.nodes[node as usize];
        if depth == 0 || target.terminal {
            return false;
        }
        target.terminal = true;
        self.words += 1;
        true
    }

    pub fn contains<I: IntoIterator<Item = u8>>(&self, letters: I) -> bool {
        let mut node = ROOT;
        let mut depth = 0;
        for letter in letters {
            depth += 1;
            match self.child(node, letter) {
                Some(next) => node = next,
                None => return false,
            }
        }
        depth > 0 && self.nodes[node as usize].terminal
    }

    /// Every word within the bounds, in lexical order
    pub fn collect_all(&self, bounds: LengthBounds, out: &mut Vec<Vec<u8>>) {
        let mut prefix = Vec::new();
        self.walk_all(ROOT, bounds, &mut prefix, out);
    }

    fn walk_all(&self, node: NodeId, bounds: LengthBounds, prefix: &mut Vec<u8>, out: &mut Vec<Vec<u8>>) {
        let n = self.node(node);
        if n.terminal && bounds.contains(prefix.len()) {
            out.push(prefix.clone());
        }
        if prefix.len() >= bounds.max {
            return;
        }
        for &(letter, child) in &n.children {
            prefix.push(letter);
            self.walk_all(child, bounds, prefix, out);
            prefix.pop();
        }
    }

    /// Words matching a wildcard pattern
    pub fn collect_pattern(&self, tokens: &[Token], bounds: LengthBounds, out: &mut Vec<Vec<u8>>) {
        let bounds = match fixed_length(tokens) {
            Some(len) => LengthBounds::new(bounds.min.max(len), bounds.max.min(len)),
            None => bounds,
        };
        let mut prefix = Vec::new();
        self.walk_pattern(ROOT, tokens, 0, bounds, &mut prefix, out);
    }

    fn walk_pattern(
        &self,
        node: NodeId,
        tokens: &[Token],
        ti: usize,
        bounds: LengthBounds,
        prefix: &mut Vec<u8>,
        out: &mut Vec<Vec<u8>>,
    ) {
        let n = self.node(node);
        if ti == tokens.len() {
            if n.terminal && bounds.contains(prefix.len()) {
                out.push(prefix.clone());
            }
            return;
        }

        let token = tokens[ti];
        if token == Token::Star {
            // Empty run first, then extend the run by one letter
            self.walk_pattern(node, tokens, ti + 1, bounds, prefix, out);
            if prefix.len() >= bounds.max {
                return;
            }
            for &(letter, child) in &n.children {
                prefix.push(letter);
                self.walk_pattern(child, tokens, ti, bounds, prefix, out);
                prefix.pop();
            }
            return;
        }

        if prefix.len() >= bounds.max {
            return;
        }
        for &(letter, child) in &n.children {
            if token.matches(letter) {
                prefix.push(letter);
                self.walk_pattern(child, tokens, ti + 1, bounds, prefix, out);
                prefix.pop();
            }
        }
    }

    /// Words that use the rack's tiles: all of them when `exact`, a subset otherwise
    pub fn collect_anagrams(&self, rack: &Rack, exact: bool, bounds: LengthBounds, out: &mut Vec<Vec<u8>>) {
        let mut rack = rack.clone();
        let mut prefix = Vec::new();
        self.walk_anagram(ROOT, &mut rack, exact, bounds, &mut prefix, out);
    }

    fn walk_anagram(
        &self,
        node: NodeId,
        rack: &mut Rack,
        exact: bool,
        bounds: LengthBounds,
        prefix: &mut Vec<u8>,
        out: &mut Vec<Vec<u8>>,
    ) {
        let n = self.node(node);
        if n.terminal && bounds.contains(prefix.len()) && (!exact || rack.is_exhausted()) {
            out.push(prefix.clone());
        }
        if prefix.len() >= bounds.max || (!rack.star && rack.is_exhausted()) {
            return;
        }

        for &(letter, child) in &n.children {
            prefix.push(letter);

            let mut matched = false;
            if let Some(i) = crate::utils::letters::letter_index(letter) {
                if rack.counts[i] > 0 {
                    matched = true;
                    rack.counts[i] -= 1;
                    self.walk_anagram(child, rack, exact, bounds, prefix, out);
                    rack.counts[i] += 1;
                }
            }

            let mut tried: Vec<LetterSet> = Vec::new();
            for ci in 0..rack.classes.len() {
                let class = rack.classes[ci];
                if !class.contains(letter) || tried.contains(&class) {
                    continue;
                }
                tried.push(class);
                matched = true;
                let removed = rack.classes.remove(ci);
                self.walk_anagram(child, rack, exact, bounds, prefix, out);
                rack.classes.insert(ci, removed);
            }

            // A tile that fits this letter covers every word a blank or the
            // star would find here
            if !matched && rack.blanks > 0 {
                rack.blanks -= 1;
                self.walk_anagram(child, rack, exact, bounds, prefix, out);
                rack.blanks += 1;
            }

            if !matched && rack.star {
                self.walk_anagram(child, rack, exact, bounds, prefix, out);
            }

            prefix.pop();
        }
    }

    /// Words whose share of letters from `letters` lies within the percent window
    pub fn collect_consisting_of(
        &self,
        letters: LetterSet,
        min_percent: u32,
        max_percent: u32,
        bounds: LengthBounds,
        out: &mut Vec<Vec<u8>>,
    ) {
        let mut prefix = Vec::new();
        self.walk_consist(ROOT, letters, min_percent, max_percent, 0, bounds, &mut prefix, out);
    }

    #[allow(clippy::too_many_arguments)]
    fn walk_consist(
        &self,
        node: NodeId,
        letters: LetterSet,
        min_percent: u32,
        max_percent: u32,
        inside: usize,
        bounds: LengthBounds,
        prefix: &mut Vec<u8>,
        out: &mut Vec<Vec<u8>>,
    ) {
        let n = self.node(node);
        let len = prefix.len();
        if n.terminal && bounds.contains(len) {
            let share = inside * 100;
            if share >= min_percent as usize * len && share <= max_percent as usize * len {
                out.push(prefix.clone());
            }
        }
        if len >= bounds.max {
            return;
        }
        for &(letter, child) in &n.children {
            let hit = letters.contains(letter);
            if !hit && min_percent >= 100 {
                continue;
            }
            prefix.push(letter);
            self.walk_consist(
                child,
                letters,
                min_percent,
                max_percent,
                inside + hit as usize,
                bounds,
                prefix,
                out,
            );
            prefix.pop();
        }
    }
}
