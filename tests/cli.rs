//! Command-line behavior of the lexsearch binary.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

fn lexsearch(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_lexsearch"))
        .args(args)
        .current_dir(dir)
        .env("RUST_LOG", "off")
        .output()
        .expect("Failed to run lexsearch")
}

fn stdout_lines(output: &Output) -> Vec<String> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::to_string)
        .collect()
}

fn word_list(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("words.txt");
    fs::write(&path, "CAT a feline [n]\nCATS\nDOG a canine [n]\nACT\n").unwrap();
    path
}

#[test]
fn test_search_prints_one_word_per_line() {
    let dir = TempDir::new().unwrap();
    let words = word_list(&dir);
    let output = lexsearch(dir.path(), &["--words", words.to_str().unwrap(), "search", "C*", "-suffix:S"]);
    assert!(output.status.success());
    assert_eq!(stdout_lines(&output), vec!["CAT"]);
}

#[test]
fn test_search_json() {
    let dir = TempDir::new().unwrap();
    let words = word_list(&dir);
    let output = lexsearch(
        dir.path(),
        &["--words", words.to_str().unwrap(), "search", "--json", "anagram:TAC"],
    );
    assert!(output.status.success());
    let results: Vec<String> = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(results, vec!["ACT", "CAT"]);
}

#[test]
fn test_invalid_query_fails() {
    let dir = TempDir::new().unwrap();
    let words = word_list(&dir);
    let output = lexsearch(dir.path(), &["--words", words.to_str().unwrap(), "search", "colour:red"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown field"));
}

#[test]
fn test_define_and_info() {
    let dir = TempDir::new().unwrap();
    let words = word_list(&dir);
    let words = words.to_str().unwrap();

    let output = lexsearch(dir.path(), &["--words", words, "--definitions", "define", "dog"]);
    assert_eq!(stdout_lines(&output), vec!["a canine [n]"]);

    let output = lexsearch(dir.path(), &["--words", words, "info", "cat"]);
    assert!(output.status.success());
    let info: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(info["word"], "CAT");
    assert_eq!(info["back_hooks"], "s");
    assert_eq!(info["num_anagrams"], 2);
}

#[test]
fn test_compiled_graph_loads_back() {
    let dir = TempDir::new().unwrap();
    let words = word_list(&dir);
    let graph = dir.path().join("words.dawg");
    let graph = graph.to_str().unwrap();

    let output = lexsearch(dir.path(), &["--words", words.to_str().unwrap(), "compile", graph]);
    assert!(output.status.success());

    let output = lexsearch(dir.path(), &["--graph", graph, "search", "*S"]);
    assert!(output.status.success());
    assert_eq!(stdout_lines(&output), vec!["CATS"]);
}

#[test]
fn test_missing_lexicon_source() {
    let dir = TempDir::new().unwrap();
    let output = lexsearch(dir.path(), &["search", "C*"]);
    assert!(!output.status.success());
}
