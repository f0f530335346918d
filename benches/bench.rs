//! Criterion benchmarks for the monitor.
//!
//! Covers the main stages of a matching run:
//! - Document analysis
//! - Query registration and term extraction
//! - Selection and verification with each matcher strategy

use std::hint::black_box;
use std::io::Write;
use std::sync::Arc;

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use env_logger::Builder;
use log::LevelFilter;
use sarissa_monitor::analysis::{Analyzer, StandardAnalyzer};
use sarissa_monitor::document::InputDocument;
use sarissa_monitor::matcher::{
    HighlightingMatcher, ParallelMatcher, ParallelMatcherConfig, PartitionMatcher,
    PartitionMatcherConfig, ScoringMatcher, SimpleMatcher,
};
use sarissa_monitor::monitor::{Monitor, MonitorQuery};
use sarissa_monitor::presearcher::TermFilteredPresearcher;
use sarissa_monitor::query::{BooleanQuery, PhraseQuery, TermQuery, WildcardQuery};

const WORDS: &[&str] = &[
    "search",
    "engine",
    "full",
    "text",
    "index",
    "query",
    "document",
    "field",
    "term",
    "phrase",
    "boolean",
    "similarity",
    "relevance",
    "score",
    "analysis",
    "tokenization",
    "normalization",
    "algorithm",
    "structure",
    "performance",
    "optimization",
    "memory",
    "retrieval",
    "ranking",
    "filtering",
];

/// Generate test documents for benchmarking.
fn generate_test_documents(count: usize) -> Vec<String> {
    let mut documents = Vec::with_capacity(count);
    for i in 0..count {
        let doc_length = 50 + (i % 100);
        let doc_words: Vec<&str> = (0..doc_length)
            .map(|j| WORDS[(i * 7 + j * 13) % WORDS.len()])
            .collect();
        documents.push(doc_words.join(" "));
    }
    documents
}

/// Build a monitor holding `count` queries of mixed shapes.
fn build_monitor(count: usize) -> Monitor {
    let monitor = Monitor::new(TermFilteredPresearcher::new());
    for i in 0..count {
        let first = WORDS[i % WORDS.len()];
        let second = WORDS[(i * 11 + 5) % WORDS.len()];
        let id = format!("q{i}");
        let query = match i % 4 {
            0 => MonitorQuery::new(id, TermQuery::new("body", first)),
            1 => MonitorQuery::new(
                id,
                BooleanQuery::new()
                    .must(TermQuery::new("body", first))
                    .must(TermQuery::new("body", second)),
            ),
            2 => MonitorQuery::new(
                id,
                PhraseQuery::new("body", vec![first.to_string(), second.to_string()]),
            ),
            _ => match WildcardQuery::new("body", format!("*{}*", &first[1..4])) {
                Ok(query) => MonitorQuery::new(id, query),
                Err(_) => MonitorQuery::new(id, TermQuery::new("body", first)),
            },
        };
        monitor.register(query).unwrap();
    }
    monitor
}

fn build_document(text: &str) -> Arc<InputDocument> {
    Arc::new(
        InputDocument::builder("bench")
            .add_text("body", text)
            .build()
            .unwrap(),
    )
}

/// Benchmark document analysis.
fn bench_analysis(c: &mut Criterion) {
    let mut group = c.benchmark_group("analysis");

    let analyzer = StandardAnalyzer::new().unwrap();
    let texts = generate_test_documents(100);

    group.bench_function("analyze_single_document", |b| {
        b.iter(|| {
            let tokens: Vec<_> = analyzer.analyze(black_box(&texts[0])).unwrap().collect();
            black_box(tokens)
        })
    });

    group.throughput(Throughput::Elements(100));
    group.bench_function("build_input_documents", |b| {
        b.iter(|| {
            for text in &texts {
                black_box(build_document(black_box(text)));
            }
        })
    });

    group.finish();
}

/// Benchmark query registration.
fn bench_registration(c: &mut Criterion) {
    let mut group = c.benchmark_group("registration");
    group.sample_size(20);

    group.throughput(Throughput::Elements(1000));
    group.bench_function("register_1k_queries", |b| {
        b.iter(|| black_box(build_monitor(1000)))
    });

    group.finish();
}

/// Benchmark matching with each strategy.
fn bench_matching(c: &mut Criterion) {
    let _ = Builder::new()
        .filter_level(LevelFilter::Warn)
        .format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()))
        .try_init();

    let mut group = c.benchmark_group("matching");
    group.sample_size(20);

    let monitor = build_monitor(10_000);
    let texts = generate_test_documents(10);
    let docs: Vec<_> = texts.iter().map(|t| build_document(t)).collect();

    group.throughput(Throughput::Elements(docs.len() as u64));
    group.bench_function("simple", |b| {
        b.iter(|| {
            for doc in &docs {
                let matches = monitor
                    .match_document(Arc::clone(doc), &SimpleMatcher::new)
                    .unwrap();
                black_box(matches);
            }
        })
    });

    group.bench_function("scoring", |b| {
        b.iter(|| {
            for doc in &docs {
                let matches = monitor
                    .match_document(Arc::clone(doc), &ScoringMatcher::new)
                    .unwrap();
                black_box(matches);
            }
        })
    });

    group.bench_function("highlighting", |b| {
        b.iter(|| {
            for doc in &docs {
                let matches = monitor
                    .match_document(Arc::clone(doc), &HighlightingMatcher::new)
                    .unwrap();
                black_box(matches);
            }
        })
    });

    let parallel = ParallelMatcher::factory(SimpleMatcher::new, ParallelMatcherConfig::new())
        .unwrap();
    group.bench_function("parallel", |b| {
        b.iter(|| {
            for doc in &docs {
                let matches = monitor.match_document(Arc::clone(doc), &parallel).unwrap();
                black_box(matches);
            }
        })
    });

    let partition = PartitionMatcher::factory(
        SimpleMatcher::new,
        PartitionMatcherConfig::new().with_max_threads(num_cpus()),
    )
    .unwrap();
    group.bench_function("partition", |b| {
        b.iter(|| {
            for doc in &docs {
                let matches = monitor.match_document(Arc::clone(doc), &partition).unwrap();
                black_box(matches);
            }
        })
    });

    group.finish();
}

fn num_cpus() -> usize {
    ParallelMatcherConfig::new().threads
}

criterion_group!(benches, bench_analysis, bench_registration, bench_matching);

criterion_main!(benches);
