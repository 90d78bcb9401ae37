use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use matchcore::core::database::Database;
use matchcore::core::error::{Error, ErrorKind, Result};
use matchcore::core::types::{DocCount, DocId, TermCount};
use matchcore::index::memory::MemoryDatabase;
use matchcore::matcher::notifier::MatchNotifier;
use matchcore::matcher::optimiser::QueryOptimiser;
use matchcore::matcher::stats::CollectionStats;
use matchcore::matcher::submatch::{LocalSubMatch, PostListFactory};
use matchcore::postlist::PostList;
use matchcore::query::ast::QueryNode;

/// Leaf with a chosen estimate and weight bound, tracking liveness through a
/// shared counter so tests can assert nothing leaks or double-drops.
struct StubLeaf {
    name: String,
    est: DocCount,
    max_weight: f64,
    finished: bool,
    live: Arc<AtomicUsize>,
}

impl StubLeaf {
    fn boxed(
        name: &str,
        est: DocCount,
        max_weight: f64,
        live: &Arc<AtomicUsize>,
    ) -> Box<dyn PostList> {
        live.fetch_add(1, Ordering::SeqCst);
        Box::new(StubLeaf {
            name: name.to_string(),
            est,
            max_weight,
            finished: false,
            live: Arc::clone(live),
        })
    }
}

impl Drop for StubLeaf {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}

impl PostList for StubLeaf {
    fn termfreq_min(&self) -> DocCount {
        0
    }

    fn termfreq_est(&self) -> DocCount {
        self.est
    }

    fn termfreq_max(&self) -> DocCount {
        self.est
    }

    fn maxweight(&self) -> f64 {
        self.max_weight
    }

    fn recalc_maxweight(&mut self) -> f64 {
        self.max_weight
    }

    fn next(&mut self) -> Result<()> {
        self.finished = true;
        Ok(())
    }

    fn skip_to(&mut self, _doc_id: DocId) -> Result<()> {
        self.finished = true;
        Ok(())
    }

    fn at_end(&self) -> bool {
        self.finished
    }

    fn doc_id(&self) -> DocId {
        DocId(0)
    }

    fn weight(&self) -> f64 {
        0.0
    }

    fn wdf(&self) -> TermCount {
        0
    }

    fn describe(&self) -> String {
        self.name.clone()
    }
}

/// Factory over fixed per-term estimates and weight bounds; terms named
/// "boom" fail, for unwinding tests.
struct StubFactory {
    freqs: HashMap<String, DocCount>,
    weights: HashMap<String, f64>,
    live: Arc<AtomicUsize>,
}

impl StubFactory {
    fn new(leaves: &[(&str, DocCount, f64)]) -> Self {
        StubFactory {
            freqs: leaves.iter().map(|(t, f, _)| (t.to_string(), *f)).collect(),
            weights: leaves.iter().map(|(t, _, w)| (t.to_string(), *w)).collect(),
            live: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }
}

impl PostListFactory for StubFactory {
    fn leaf_postlist(&self, term: &str, _wqf: TermCount, _factor: f64) -> Result<Box<dyn PostList>> {
        if term == "boom" {
            return Err(Error::new(ErrorKind::Backend, "leaf construction failed".to_string()));
        }
        let est = self.freqs.get(term).copied().unwrap_or(1);
        let max_weight = self.weights.get(term).copied().unwrap_or(0.0);
        Ok(StubLeaf::boxed(term, est, max_weight, &self.live))
    }

    fn synonym_postlist(&self, inner: Box<dyn PostList>, _factor: f64) -> Result<Box<dyn PostList>> {
        Ok(inner)
    }
}

fn stub_optimiser<'a>(
    factory: &'a StubFactory,
    stats: &'a CollectionStats,
    db: &Arc<MemoryDatabase>,
) -> QueryOptimiser<'a> {
    QueryOptimiser::new(
        Arc::new(MatchNotifier::new()),
        Arc::clone(db) as Arc<dyn Database>,
        1000,
        factory,
        stats,
    )
}

/// Real database with three phrase-bearing documents (plus one without any
/// of the phrase terms, so none of them is in every document), and its
/// submatch.
fn phrase_db(store_positions: bool) -> (Arc<MemoryDatabase>, LocalSubMatch, CollectionStats) {
    let db = Arc::new(MemoryDatabase::with_positions(store_positions));
    // doc 1: "x y z"       - exact phrase
    // doc 2: "x q y z"     - in order with one gap
    // doc 3: "z y x"       - all terms, reversed
    // doc 4: "w w"         - background
    db.index_document(DocId(1), &[("x", 0), ("y", 1), ("z", 2)]);
    db.index_document(DocId(2), &[("x", 0), ("q", 1), ("y", 2), ("z", 3)]);
    db.index_document(DocId(3), &[("z", 0), ("y", 1), ("x", 2)]);
    db.index_document(DocId(4), &[("w", 0), ("w", 1)]);

    let shards: Vec<Arc<dyn Database>> = vec![Arc::clone(&db) as Arc<dyn Database>];
    let terms: Vec<String> = ["x", "y", "z", "q"].iter().map(|t| t.to_string()).collect();
    let mut stats = CollectionStats::gather(&shards, &terms);
    stats.set_bounds_from(Arc::clone(&db) as Arc<dyn Database>);

    let submatch = LocalSubMatch::new(Arc::clone(&db) as Arc<dyn Database>, stats.clone());
    (db, submatch, stats)
}

fn collect_docs(pl: &mut dyn PostList) -> Vec<u64> {
    let mut seen = Vec::new();
    loop {
        pl.next().unwrap();
        if pl.at_end() {
            break;
        }
        seen.push(pl.doc_id().0);
    }
    seen
}

#[test]
fn nested_and_flattens_into_one_conjunction() {
    let factory = StubFactory::new(&[("A", 10, 0.0), ("B", 5, 0.0), ("C", 7, 0.0)]);
    let stats = CollectionStats::new();
    let db = Arc::new(MemoryDatabase::new());
    let optimiser = stub_optimiser(&factory, &stats, &db);

    let query = QueryNode::and(vec![
        QueryNode::term("A"),
        QueryNode::and(vec![QueryNode::term("B"), QueryNode::term("C")]),
    ]);
    let pl = optimiser.optimise(&query, 1.0).unwrap();
    assert_eq!(pl.describe(), "(A AND B AND C)");
}

#[test]
fn deep_and_family_nesting_flattens_too() {
    let factory = StubFactory::new(&[("A", 1, 0.0), ("B", 2, 0.0), ("C", 3, 0.0), ("D", 4, 0.0)]);
    let stats = CollectionStats::new();
    let db = Arc::new(MemoryDatabase::new());
    let optimiser = stub_optimiser(&factory, &stats, &db);

    let query = QueryNode::and(vec![
        QueryNode::and(vec![QueryNode::term("A"), QueryNode::term("B")]),
        QueryNode::filter(vec![QueryNode::term("C"), QueryNode::term("D")]),
    ]);
    let pl = optimiser.optimise(&query, 1.0).unwrap();
    assert_eq!(pl.describe(), "(A AND B AND C AND D)");
}

#[test]
fn phrase_without_positions_demotes_to_and() {
    let (db, submatch, stats) = phrase_db(false);
    let optimiser = QueryOptimiser::new(
        Arc::new(MatchNotifier::new()),
        Arc::clone(&db) as Arc<dyn Database>,
        4,
        &submatch,
        &stats,
    );

    let query = QueryNode::phrase(
        3,
        vec![QueryNode::term("x"), QueryNode::term("y"), QueryNode::term("z")],
    );
    let mut pl = optimiser.optimise(&query, 1.0).unwrap();
    assert_eq!(pl.describe(), "(x AND y AND z)");
    // Every document containing all three terms matches, order ignored.
    assert_eq!(collect_docs(pl.as_mut()), vec![1, 2, 3]);
}

#[test]
fn phrase_with_window_equal_to_arity_is_exact() {
    let (db, submatch, stats) = phrase_db(true);
    let optimiser = QueryOptimiser::new(
        Arc::new(MatchNotifier::new()),
        Arc::clone(&db) as Arc<dyn Database>,
        4,
        &submatch,
        &stats,
    );

    let query = QueryNode::phrase(
        3,
        vec![QueryNode::term("x"), QueryNode::term("y"), QueryNode::term("z")],
    );
    let mut pl = optimiser.optimise(&query, 1.0).unwrap();
    assert_eq!(pl.describe(), "(EXACT_PHRASE (x AND y AND z))");
    assert_eq!(collect_docs(pl.as_mut()), vec![1]);
}

#[test]
fn phrase_with_wider_window_allows_gaps() {
    let (db, submatch, stats) = phrase_db(true);
    let optimiser = QueryOptimiser::new(
        Arc::new(MatchNotifier::new()),
        Arc::clone(&db) as Arc<dyn Database>,
        4,
        &submatch,
        &stats,
    );

    let query = QueryNode::phrase(
        4,
        vec![QueryNode::term("x"), QueryNode::term("y"), QueryNode::term("z")],
    );
    let mut pl = optimiser.optimise(&query, 1.0).unwrap();
    assert_eq!(pl.describe(), "(PHRASE/4 (x AND y AND z))");
    // doc 2 spans x..z over 4 tokens; doc 3 is out of order.
    assert_eq!(collect_docs(pl.as_mut()), vec![1, 2]);
}

#[test]
fn near_matches_any_order_within_window() {
    let (db, submatch, stats) = phrase_db(true);
    let optimiser = QueryOptimiser::new(
        Arc::new(MatchNotifier::new()),
        Arc::clone(&db) as Arc<dyn Database>,
        4,
        &submatch,
        &stats,
    );

    let query = QueryNode::near(
        3,
        vec![QueryNode::term("x"), QueryNode::term("y"), QueryNode::term("z")],
    );
    let mut pl = optimiser.optimise(&query, 1.0).unwrap();
    assert_eq!(pl.describe(), "(NEAR/3 (x AND y AND z))");
    // docs 1 and 3 span 3 tokens; doc 2 spans 4.
    assert_eq!(collect_docs(pl.as_mut()), vec![1, 3]);
}

#[test]
fn or_merges_rarest_children_deepest() {
    let factory = StubFactory::new(&[
        ("A", 100, 0.0),
        ("B", 10, 0.0),
        ("C", 1000, 0.0),
        ("D", 1, 0.0),
    ]);
    let stats = CollectionStats::new();
    let db = Arc::new(MemoryDatabase::new());
    let optimiser = stub_optimiser(&factory, &stats, &db);

    let query = QueryNode::or(vec![
        QueryNode::term("A"),
        QueryNode::term("B"),
        QueryNode::term("C"),
        QueryNode::term("D"),
    ]);
    let pl = optimiser.optimise(&query, 1.0).unwrap();
    assert_eq!(pl.describe(), "(C OR (A OR (B OR D)))");
}

#[test]
fn elite_set_keeps_the_best_weighted_children() {
    let factory = StubFactory::new(&[
        ("A", 5, 0.2),
        ("B", 5, 0.8),
        ("C", 5, 0.5),
        ("D", 5, 0.9),
    ]);
    let stats = CollectionStats::new();
    let db = Arc::new(MemoryDatabase::new());
    let optimiser = stub_optimiser(&factory, &stats, &db);

    let query = QueryNode::elite_set(
        2,
        vec![
            QueryNode::term("A"),
            QueryNode::term("B"),
            QueryNode::term("C"),
            QueryNode::term("D"),
        ],
    );
    let pl = optimiser.optimise(&query, 1.0).unwrap();
    let shape = pl.describe();
    assert!(shape.contains('B') && shape.contains('D'), "got {}", shape);
    assert!(!shape.contains('A') && !shape.contains('C'), "got {}", shape);
    // The two losing leaves were released.
    drop(pl);
    assert_eq!(factory.live(), 0);
}

#[test]
fn elite_set_of_one_returns_the_single_best_child() {
    let factory = StubFactory::new(&[("A", 5, 0.2), ("B", 5, 0.8), ("C", 5, 0.5)]);
    let stats = CollectionStats::new();
    let db = Arc::new(MemoryDatabase::new());
    let optimiser = stub_optimiser(&factory, &stats, &db);

    let query = QueryNode::elite_set(
        1,
        vec![QueryNode::term("A"), QueryNode::term("B"), QueryNode::term("C")],
    );
    let pl = optimiser.optimise(&query, 1.0).unwrap();
    assert_eq!(pl.describe(), "B");
}

#[test]
fn elite_set_never_keeps_unmatchable_children() {
    let factory = StubFactory::new(&[("A", 0, 9.0), ("B", 5, 0.1), ("C", 5, 0.2)]);
    let stats = CollectionStats::new();
    let db = Arc::new(MemoryDatabase::new());
    let optimiser = stub_optimiser(&factory, &stats, &db);

    let query = QueryNode::elite_set(
        2,
        vec![QueryNode::term("A"), QueryNode::term("B"), QueryNode::term("C")],
    );
    let pl = optimiser.optimise(&query, 1.0).unwrap();
    let shape = pl.describe();
    assert!(!shape.contains('A'), "got {}", shape);
}

#[test]
fn failed_construction_releases_every_partial_postlist() {
    let factory = StubFactory::new(&[("a", 5, 0.0), ("b", 7, 0.0), ("c", 9, 0.0)]);
    let stats = CollectionStats::new();
    let db = Arc::new(MemoryDatabase::new());
    let optimiser = stub_optimiser(&factory, &stats, &db);

    let query = QueryNode::and(vec![
        QueryNode::term("a"),
        QueryNode::or(vec![
            QueryNode::term("b"),
            QueryNode::term("c"),
            QueryNode::term("boom"),
        ]),
    ]);
    let result = optimiser.optimise(&query, 1.0);
    assert!(result.is_err());
    assert_eq!(factory.live(), 0);

    // The same tree without the failing leaf builds and releases cleanly.
    let query = QueryNode::and(vec![
        QueryNode::term("a"),
        QueryNode::or(vec![QueryNode::term("b"), QueryNode::term("c")]),
    ]);
    let pl = optimiser.optimise(&query, 1.0).unwrap();
    assert_eq!(factory.live(), 3);
    drop(pl);
    assert_eq!(factory.live(), 0);
}

#[test]
fn scale_weight_matches_prescaled_factor() {
    let (db, submatch, stats) = phrase_db(true);
    let optimiser = QueryOptimiser::new(
        Arc::new(MatchNotifier::new()),
        Arc::clone(&db) as Arc<dyn Database>,
        4,
        &submatch,
        &stats,
    );

    let scaled = QueryNode::scale(0.5, QueryNode::term("x"));
    let mut scaled_pl = optimiser.optimise(&scaled, 1.0).unwrap();
    let mut plain_pl = optimiser.optimise(&QueryNode::term("x"), 0.5).unwrap();

    loop {
        scaled_pl.next().unwrap();
        plain_pl.next().unwrap();
        assert_eq!(scaled_pl.at_end(), plain_pl.at_end());
        if scaled_pl.at_end() {
            break;
        }
        assert_eq!(scaled_pl.doc_id(), plain_pl.doc_id());
        assert!((scaled_pl.weight() - plain_pl.weight()).abs() < 1e-12);
        assert!(scaled_pl.weight() > 0.0);
    }
}

#[test]
fn filter_second_branch_contributes_no_weight() {
    let (db, submatch, stats) = phrase_db(true);
    let optimiser = QueryOptimiser::new(
        Arc::new(MatchNotifier::new()),
        Arc::clone(&db) as Arc<dyn Database>,
        4,
        &submatch,
        &stats,
    );

    let filtered = QueryNode::filter(vec![QueryNode::term("x"), QueryNode::term("q")]);
    let mut filtered_pl = optimiser.optimise(&filtered, 1.0).unwrap();
    filtered_pl.next().unwrap();
    assert_eq!(filtered_pl.doc_id(), DocId(2));
    let filtered_weight = filtered_pl.weight();
    assert!(filtered_weight > 0.0);

    let mut plain_pl = optimiser.optimise(&QueryNode::term("x"), 1.0).unwrap();
    plain_pl.skip_to(DocId(2)).unwrap();
    assert!((filtered_weight - plain_pl.weight()).abs() < 1e-12);
}

#[test]
fn full_match_pipeline_scores_and_orders_documents() {
    let (db, submatch, stats) = phrase_db(true);
    let optimiser = QueryOptimiser::new(
        Arc::new(MatchNotifier::new()),
        Arc::clone(&db) as Arc<dyn Database>,
        4,
        &submatch,
        &stats,
    );

    let query = QueryNode::or(vec![QueryNode::term("q"), QueryNode::term("x")]);
    let mut pl = optimiser.optimise(&query, 1.0).unwrap();
    pl.recalc_maxweight();
    let bound = pl.maxweight();
    assert!(bound > 0.0);

    let mut seen = Vec::new();
    loop {
        pl.next().unwrap();
        if pl.at_end() {
            break;
        }
        assert!(pl.weight() > 0.0);
        assert!(pl.weight() <= bound + 1e-9);
        seen.push(pl.doc_id().0);
    }
    assert_eq!(seen, vec![1, 2, 3]);
}
