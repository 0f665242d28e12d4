//! Compact binary DAWG format.
//!
//! Layout (little-endian): `u32` edge count `N`, `N` packed `u32` edges, then
//! an optional `u32` CRC-32 of everything before it. Edge 0 is a null edge;
//! the root's edge list starts at index 1.
//!
//! ```text
//!  31      24 23  22  21                    0
//! +----------+---+---+-----------------------+
//! |  letter  |EOW|EON|  child edge index     |
//! +----------+---+---+-----------------------+
//! ```

use crate::error::{LexiconError, Result};
use crate::graph::trie::{NodeId, Trie, ROOT};
use crate::utils::encoding::{read_u32_le, write_u32_le};
use memmap2::Mmap;
use rustc_hash::FxHashMap;
use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

const CHILD_MASK: u32 = 0x003f_ffff;
const END_OF_NODE: u32 = 1 << 22;
const END_OF_WORD: u32 = 1 << 23;
const LETTER_SHIFT: u32 = 24;

/// Most edges a decode may visit. Shared sub-graphs are expanded on decode,
/// so a small corrupt file can otherwise describe an exponential word set.
const MAX_DECODED_EDGES: usize = 1 << 23;

/// Decoded contents of a graph file
#[derive(Debug)]
pub struct DecodedGraph {
    pub words: Vec<String>,
    /// Checksum stored in the file, if any
    pub stored_checksum: Option<u32>,
    /// CRC-32 over the header and edges
    pub computed_checksum: u32,
}

/// Map and decode a graph file, verifying checksums before returning any words
pub fn read_graph_file(path: &Path, expected_checksum: Option<u32>, max_len: usize) -> Result<Vec<String>> {
    let file = File::open(path).map_err(|e| LexiconError::file_access(path, e))?;
    let len = file
        .metadata()
        .map_err(|e| LexiconError::file_access(path, e))?
        .len();
    if len == 0 {
        return Err(LexiconError::Integrity(format!("{} is empty", path.display())));
    }
    let mmap = unsafe { Mmap::map(&file).map_err(|e| LexiconError::file_access(path, e))? };

    let decoded = decode(&mmap, max_len)?;
    verify_checksum(&decoded, expected_checksum)?;
    Ok(decoded.words)
}

pub fn verify_checksum(decoded: &DecodedGraph, expected: Option<u32>) -> Result<()> {
    if let Some(stored) = decoded.stored_checksum {
        if stored != decoded.computed_checksum {
            return Err(LexiconError::Integrity(format!(
                "stored checksum {:#010x} does not match contents {:#010x}",
                stored, decoded.computed_checksum
            )));
        }
    }
    if let Some(expected) = expected {
        match decoded.stored_checksum {
            None => {
                return Err(LexiconError::Integrity(format!(
                    "expected checksum {:#010x} but file carries none",
                    expected
                )));
            }
            Some(stored) if stored != expected => {
                return Err(LexiconError::Integrity(format!(
                    "checksum {:#010x} does not match expected {:#010x}",
                    stored, expected
                )));
            }
            Some(_) => {}
        }
    }
    Ok(())
}

/// Decode raw bytes into the word list they encode
pub fn decode(bytes: &[u8], max_len: usize) -> Result<DecodedGraph> {
    decode_within(bytes, max_len, MAX_DECODED_EDGES)
}

fn decode_within(bytes: &[u8], max_len: usize, max_edges: usize) -> Result<DecodedGraph> {
    let mut cursor = bytes;
    let count = read_u32_le(&mut cursor)
        .map_err(|_| LexiconError::Integrity("truncated header".to_string()))? as usize;

    let body_len = count
        .checked_mul(4)
        .and_then(|n| n.checked_add(4))
        .ok_or_else(|| LexiconError::Integrity("edge count overflows".to_string()))?;

    let stored_checksum = if bytes.len() == body_len {
        None
    } else if bytes.len() == body_len + 4 {
        let mut tail = &bytes[body_len..];
        Some(read_u32_le(&mut tail).map_err(|_| LexiconError::Integrity("truncated checksum".to_string()))?)
    } else {
        return Err(LexiconError::Integrity(format!(
            "file holds {} bytes but {} edges need {}",
            bytes.len(),
            count,
            body_len
        )));
    };

    let computed_checksum = crc32fast::hash(&bytes[..body_len]);

    let edges: Vec<u32> = bytes[4..body_len]
        .chunks_exact(4)
        .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect();

    let mut words = Vec::new();
    if edges.len() > 1 {
        let mut prefix = Vec::new();
        let mut budget = max_edges;
        decode_node(&edges, 1, max_len, &mut budget, &mut prefix, &mut words)?;
    }

    Ok(DecodedGraph {
        words,
        stored_checksum,
        computed_checksum,
    })
}

fn decode_node(
    edges: &[u32],
    start: usize,
    max_len: usize,
    budget: &mut usize,
    prefix: &mut Vec<u8>,
    words: &mut Vec<String>,
) -> Result<()> {
    if prefix.len() >= max_len {
        return Err(LexiconError::Integrity(format!(
            "word longer than {} letters (cyclic graph?)",
            max_len
        )));
    }

    let mut index = start;
    loop {
        *budget = budget.checked_sub(1).ok_or_else(|| {
            LexiconError::Integrity("graph expands past the decode limit".to_string())
        })?;

        let edge = *edges
            .get(index)
            .ok_or_else(|| LexiconError::Integrity(format!("edge index {} out of range", index)))?;

        let letter = (edge >> LETTER_SHIFT) as u8;
        if !letter.is_ascii_alphabetic() {
            return Err(LexiconError::Integrity(format!(
                "edge {} carries non-letter byte {:#04x}",
                index, letter
            )));
        }

        prefix.push(letter.to_ascii_uppercase());
        if edge & END_OF_WORD != 0 {
            words.push(String::from_utf8_lossy(prefix).into_owned());
        }
        let child = (edge & CHILD_MASK) as usize;
        if child != 0 {
            decode_node(edges, child, max_len, budget, prefix, words)?;
        }
        prefix.pop();

        if edge & END_OF_NODE != 0 {
            return Ok(());
        }
        index += 1;
    }
}

/// Edge-list signature: (letter, child is a word, child's list)
type ListKey = Vec<(u8, bool, Option<usize>)>;

/// Encode a trie in minimised form. Identical sub-graphs are emitted once.
pub fn encode(trie: &Trie) -> Result<Vec<u8>> {
    let mut lists: Vec<ListKey> = Vec::new();
    let mut interned: FxHashMap<ListKey, usize> = FxHashMap::default();
    let root = intern(trie, ROOT, &mut lists, &mut interned);

    // Lay lists out breadth-first so the root lands at edge 1
    let mut offsets: Vec<Option<u32>> = vec![None; lists.len()];
    let mut order = Vec::new();
    let mut next = 1u32;
    let mut queue = VecDeque::new();
    if let Some(root) = root {
        offsets[root] = Some(next);
        next += lists[root].len() as u32;
        queue.push_back(root);
    }
    while let Some(list) = queue.pop_front() {
        order.push(list);
        for &(_, _, child) in &lists[list] {
            if let Some(child) = child {
                if offsets[child].is_none() {
                    offsets[child] = Some(next);
                    next += lists[child].len() as u32;
                    queue.push_back(child);
                }
            }
        }
    }

    if next > CHILD_MASK {
        return Err(LexiconError::Integrity(format!(
            "{} edges exceed the format limit of {}",
            next, CHILD_MASK
        )));
    }

    let mut buf = Vec::with_capacity(8 + next as usize * 4);
    write_u32_le(&mut buf, next).map_err(|e| LexiconError::Integrity(e.to_string()))?;
    write_u32_le(&mut buf, 0).map_err(|e| LexiconError::Integrity(e.to_string()))?;
    for list in order {
        let entries = &lists[list];
        for (i, &(letter, is_word, child)) in entries.iter().enumerate() {
            let mut edge = (letter as u32) << LETTER_SHIFT;
            if is_word {
                edge |= END_OF_WORD;
            }
            if i + 1 == entries.len() {
                edge |= END_OF_NODE;
            }
            if let Some(child) = child.and_then(|c| offsets[c]) {
                edge |= child;
            }
            buf.extend_from_slice(&edge.to_le_bytes());
        }
    }

    let checksum = crc32fast::hash(&buf);
    buf.extend_from_slice(&checksum.to_le_bytes());
    Ok(buf)
}

fn intern(
    trie: &Trie,
    node: NodeId,
    lists: &mut Vec<ListKey>,
    interned: &mut FxHashMap<ListKey, usize>,
) -> Option<usize> {
    let children = &trie.node(node).children;
    if children.is_empty() {
        return None;
    }
    let key: ListKey = children
        .iter()
        .map(|&(letter, child)| {
            let sub = intern(trie, child, lists, interned);
            (letter, trie.node(child).terminal, sub)
        })
        .collect();

    if let Some(&id) = interned.get(&key) {
        return Some(id);
    }
    let id = lists.len();
    lists.push(key.clone());
    interned.insert(key, id);
    Some(id)
}

/// Write a trie to disk, returning the embedded checksum
pub fn write_graph_file(path: &Path, trie: &Trie) -> Result<u32> {
    let bytes = encode(trie)?;
    let file = File::create(path).map_err(|e| LexiconError::file_access(path, e))?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(&bytes)
        .and_then(|_| writer.flush())
        .map_err(|e| LexiconError::file_access(path, e))?;

    let tail: [u8; 4] = [
        bytes[bytes.len() - 4],
        bytes[bytes.len() - 3],
        bytes[bytes.len() - 2],
        bytes[bytes.len() - 1],
    ];
    Ok(u32::from_le_bytes(tail))
}
