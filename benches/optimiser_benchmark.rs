use criterion::{black_box, criterion_group, criterion_main, Criterion, BenchmarkId};
use matchcore::core::database::Database;
use matchcore::core::types::DocId;
use matchcore::index::memory::MemoryDatabase;
use matchcore::matcher::notifier::MatchNotifier;
use matchcore::matcher::optimiser::QueryOptimiser;
use matchcore::matcher::stats::CollectionStats;
use matchcore::matcher::submatch::LocalSubMatch;
use matchcore::query::ast::QueryNode;
use rand::Rng;
use std::sync::Arc;

const VOCAB: [&str; 12] = [
    "the", "quick", "brown", "fox", "jumps", "over", "lazy", "dog", "search", "index", "query",
    "match",
];

/// Helper to build a database of random short documents
fn build_database(doc_count: u64, doc_len: usize) -> Arc<MemoryDatabase> {
    let mut rng = rand::thread_rng();
    let db = Arc::new(MemoryDatabase::new());
    for doc in 1..=doc_count {
        let tokens: Vec<(&str, u32)> = (0..doc_len)
            .map(|pos| (VOCAB[rng.gen_range(0..VOCAB.len())], pos as u32))
            .collect();
        db.index_document(DocId(doc), &tokens);
    }
    db
}

fn gathered_stats(db: &Arc<MemoryDatabase>) -> CollectionStats {
    let shards: Vec<Arc<dyn Database>> = vec![Arc::clone(db) as Arc<dyn Database>];
    let terms: Vec<String> = VOCAB.iter().map(|t| t.to_string()).collect();
    let mut stats = CollectionStats::gather(&shards, &terms);
    stats.set_bounds_from(Arc::clone(db) as Arc<dyn Database>);
    stats
}

fn wide_or_query(arity: usize) -> QueryNode {
    QueryNode::or((0..arity).map(|i| QueryNode::term(VOCAB[i % VOCAB.len()])).collect())
}

/// Benchmark optimising a wide OR at several arities
fn bench_or_tree_build(c: &mut Criterion) {
    let db = build_database(2_000, 16);
    let stats = gathered_stats(&db);
    let submatch = LocalSubMatch::new(Arc::clone(&db) as Arc<dyn Database>, stats.clone());

    let mut group = c.benchmark_group("or_tree_build");
    for arity in [2usize, 4, 8, 12].iter() {
        let query = wide_or_query(*arity);
        group.bench_with_input(BenchmarkId::from_parameter(arity), arity, |b, _| {
            let optimiser = QueryOptimiser::new(
                Arc::new(MatchNotifier::new()),
                Arc::clone(&db) as Arc<dyn Database>,
                db.doc_count(),
                &submatch,
                &stats,
            );
            b.iter(|| {
                let pl = optimiser.optimise(black_box(&query), 1.0).unwrap();
                black_box(pl.termfreq_est());
            });
        });
    }
    group.finish();
}

/// Benchmark optimising and draining a phrase query
fn bench_phrase_match(c: &mut Criterion) {
    let db = build_database(2_000, 16);
    let stats = gathered_stats(&db);
    let submatch = LocalSubMatch::new(Arc::clone(&db) as Arc<dyn Database>, stats.clone());

    let query = QueryNode::phrase(
        3,
        vec![
            QueryNode::term("quick"),
            QueryNode::term("brown"),
            QueryNode::term("fox"),
        ],
    );

    c.bench_function("phrase_optimise_and_drain", |b| {
        let optimiser = QueryOptimiser::new(
            Arc::new(MatchNotifier::new()),
            Arc::clone(&db) as Arc<dyn Database>,
            db.doc_count(),
            &submatch,
            &stats,
        );
        b.iter(|| {
            let mut pl = optimiser.optimise(black_box(&query), 1.0).unwrap();
            let mut matches = 0u64;
            loop {
                pl.next().unwrap();
                if pl.at_end() {
                    break;
                }
                matches += 1;
            }
            black_box(matches);
        });
    });
}

/// Benchmark folding per-shard statistics
fn bench_stats_gather(c: &mut Criterion) {
    let shards: Vec<Arc<dyn Database>> = (0..8)
        .map(|_| build_database(500, 16) as Arc<dyn Database>)
        .collect();
    let terms: Vec<String> = VOCAB.iter().map(|t| t.to_string()).collect();

    c.bench_function("stats_gather_8_shards", |b| {
        b.iter(|| {
            let stats = CollectionStats::gather(black_box(&shards), black_box(&terms));
            black_box(stats.collection_size);
        });
    });
}

criterion_group!(
    benches,
    bench_or_tree_build,
    bench_phrase_match,
    bench_stats_gather
);
criterion_main!(benches);
