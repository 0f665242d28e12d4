//! Search benchmarks over a generated lexicon
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use lexsearch::lexicon::{ImportOptions, LexiconRegistry};
use lexsearch::graph::LengthBounds;
use lexsearch::query::{parse_spec, Condition};
use std::io::Cursor;

/// Every 2-5 letter word over a small alphabet, enough to make walks non-trivial
fn generate_words() -> String {
    const LETTERS: &[u8] = b"AEINRST";
    let mut words = Vec::new();
    let mut frontier = vec![String::new()];
    for _ in 0..5 {
        let mut next = Vec::new();
        for prefix in &frontier {
            for &letter in LETTERS {
                let mut word = prefix.clone();
                word.push(letter as char);
                next.push(word);
            }
        }
        words.extend(next.iter().filter(|w| w.len() >= 2).cloned());
        frontier = next;
    }
    words.join("\n")
}

fn create_registry() -> LexiconRegistry {
    let mut registry = LexiconRegistry::new();
    let options = ImportOptions {
        load_definitions: false,
        build_attributes: true,
    };
    registry
        .import_text_from("BENCH", Cursor::new(generate_words()), options)
        .expect("Failed to import word list");
    registry
}

fn bench_query_parsing(c: &mut Criterion) {
    let queries = vec![
        "C?T",
        "pattern:C* -suffix:S length:3-5",
        "anagram:AEINRST | anagram:AEINRST?",
        "set:\"Type I Sevens\" limitlax:1-100",
    ];

    let mut group = c.benchmark_group("query_parsing");
    for query in queries {
        group.bench_with_input(BenchmarkId::from_parameter(query), &query, |b, &q| {
            b.iter(|| parse_spec(black_box(q)))
        });
    }
    group.finish();
}

fn bench_search(c: &mut Criterion) {
    let registry = create_registry();

    let queries = [
        ("pattern", "S?A*"),
        ("reverse_pattern", "*TE"),
        ("anagram", "anagram:RATES"),
        ("subanagram", "subanagram:SATIRE"),
        ("attribute", "vowels:2 points:5-7"),
        ("post", "pattern:S* suffix:E"),
        ("probability", "length:5 limit:1-50"),
    ];

    let mut group = c.benchmark_group("search");
    for (name, query) in queries {
        let spec = parse_spec(query).expect("Invalid query");
        group.bench_function(name, |b| {
            b.iter(|| registry.search("BENCH", black_box(&spec), false))
        });
    }
    group.finish();
}

fn bench_graph_search(c: &mut Criterion) {
    let registry = create_registry();
    let graph = registry.entry("BENCH").expect("Lexicon not loaded").graph();
    let bounds = LengthBounds::new(1, 15);

    let conditions = [
        ("pattern", Condition::pattern("S?A*")),
        ("reverse_pattern", Condition::pattern("*TE")),
        ("anagram", Condition::anagram("RATES")),
        ("subanagram", Condition::subanagram("SATIRE")),
        ("consist_of", Condition::consist_of("AEI")),
    ];

    let mut group = c.benchmark_group("graph_search");
    for (name, condition) in &conditions {
        group.bench_function(*name, |b| {
            b.iter(|| graph.search(black_box(&[condition]), true, bounds))
        });
    }
    group.finish();
}

fn bench_import(c: &mut Criterion) {
    let words = generate_words();

    c.bench_function("import_text", |b| {
        b.iter(|| {
            let mut registry = LexiconRegistry::new();
            registry
                .import_text_from("BENCH", Cursor::new(black_box(words.as_str())), ImportOptions::default())
                .expect("Failed to import word list")
        })
    });
}

criterion_group!(
    benches,
    bench_query_parsing,
    bench_graph_search,
    bench_search,
    bench_import
);
criterion_main!(benches);
