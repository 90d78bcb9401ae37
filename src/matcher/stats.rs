use std::collections::HashMap;
use std::ops::AddAssign;
use std::sync::Arc;
use rayon::prelude::*;
use serde::{Serialize, Deserialize};
use crate::core::database::Database;
use crate::core::types::DocCount;

/// Statistics for a collection (or one sub-database's share of it).
///
/// Term lookups return 0 for unseen terms; that is "no information", not an
/// error. The database handle only supplies doclength/wdf bounds to the
/// weighting schemes and is not part of the serialized form.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct CollectionStats {
    /// Total length of all documents in the collection.
    pub total_length: u64,

    /// Number of documents in the collection.
    pub collection_size: DocCount,

    /// Number of documents in the caller-supplied relevance set.
    pub rset_size: DocCount,

    termfreq: HashMap<String, DocCount>,
    reltermfreq: HashMap<String, DocCount>,

    #[serde(skip)]
    database: Option<Arc<dyn Database>>,
}

impl CollectionStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy the global statistics; term-specific maps start empty.
    pub fn copy_global(src: &CollectionStats) -> Self {
        CollectionStats {
            total_length: src.total_length,
            collection_size: src.collection_size,
            rset_size: src.rset_size,
            termfreq: HashMap::new(),
            reltermfreq: HashMap::new(),
            database: src.database.clone(),
        }
    }

    /// Copy the global statistics plus the entries for one term.
    pub fn copy_with_term(src: &CollectionStats, term: &str) -> Self {
        let mut stats = Self::copy_global(src);
        stats.set_termfreq(term, src.get_termfreq(term));
        stats.set_reltermfreq(term, src.get_reltermfreq(term));
        stats
    }

    /// Number of documents indexed by `term` ("n_t").
    pub fn get_termfreq(&self, term: &str) -> DocCount {
        self.termfreq.get(term).copied().unwrap_or(0)
    }

    pub fn set_termfreq(&mut self, term: &str, termfreq: DocCount) {
        self.termfreq.insert(term.to_string(), termfreq);
    }

    /// Number of relevant documents indexed by `term` ("r_t").
    pub fn get_reltermfreq(&self, term: &str) -> DocCount {
        self.reltermfreq.get(term).copied().unwrap_or(0)
    }

    pub fn set_reltermfreq(&mut self, term: &str, reltermfreq: DocCount) {
        self.reltermfreq.insert(term.to_string(), reltermfreq);
    }

    pub fn average_length(&self) -> f64 {
        if self.collection_size == 0 {
            return 0.0;
        }
        self.total_length as f64 / self.collection_size as f64
    }

    /// Attach the database the weighting bounds should come from.
    pub fn set_bounds_from(&mut self, db: Arc<dyn Database>) {
        self.database = Some(db);
    }

    pub fn database(&self) -> Option<&Arc<dyn Database>> {
        self.database.as_ref()
    }

    pub fn describe(&self) -> String {
        format!(
            "CollectionStats(total_length={}, collection_size={}, rset_size={}, terms={})",
            self.total_length,
            self.collection_size,
            self.rset_size,
            self.termfreq.len()
        )
    }

    /// Fold per-shard statistics for `terms` into one global record.
    ///
    /// The bounds database is left unset; callers attach whichever database
    /// the match will run against.
    pub fn gather(shards: &[Arc<dyn Database>], terms: &[String]) -> CollectionStats {
        shards
            .par_iter()
            .map(|shard| {
                let mut stats = CollectionStats::new();
                stats.total_length = shard.total_length();
                stats.collection_size = shard.doc_count();
                for term in terms {
                    stats.set_termfreq(term, shard.term_freq(term));
                }
                stats
            })
            .reduce(CollectionStats::new, |mut acc, shard| {
                acc += &shard;
                acc
            })
    }
}

impl AddAssign<&CollectionStats> for CollectionStats {
    fn add_assign(&mut self, other: &CollectionStats) {
        self.total_length += other.total_length;
        self.collection_size += other.collection_size;
        self.rset_size += other.rset_size;
        for (term, freq) in &other.termfreq {
            *self.termfreq.entry(term.clone()).or_insert(0) += freq;
        }
        for (term, freq) in &other.reltermfreq {
            *self.reltermfreq.entry(term.clone()).or_insert(0) += freq;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::DocId;
    use crate::index::memory::MemoryDatabase;

    fn sample(size: DocCount, term: &str, freq: DocCount) -> CollectionStats {
        let mut stats = CollectionStats::new();
        stats.collection_size = size;
        stats.total_length = size * 10;
        stats.set_termfreq(term, freq);
        stats
    }

    #[test]
    fn lookups_default_to_zero() {
        let stats = CollectionStats::new();
        assert_eq!(stats.get_termfreq("absent"), 0);
        assert_eq!(stats.get_reltermfreq("absent"), 0);
        assert_eq!(stats.average_length(), 0.0);
    }

    #[test]
    fn merge_is_commutative_and_associative() {
        let a = sample(10, "x", 3);
        let b = sample(20, "x", 5);
        let c = sample(5, "y", 2);

        let mut ab = a.clone();
        ab += &b;
        let mut ba = b.clone();
        ba += &a;
        assert_eq!(ab.collection_size, ba.collection_size);
        assert_eq!(ab.get_termfreq("x"), 8);
        assert_eq!(ba.get_termfreq("x"), 8);

        let mut ab_c = ab.clone();
        ab_c += &c;
        let mut bc = b.clone();
        bc += &c;
        let mut a_bc = a.clone();
        a_bc += &bc;
        assert_eq!(ab_c.collection_size, a_bc.collection_size);
        assert_eq!(ab_c.get_termfreq("x"), a_bc.get_termfreq("x"));
        assert_eq!(ab_c.get_termfreq("y"), a_bc.get_termfreq("y"));
    }

    #[test]
    fn copy_with_term_keeps_only_that_term() {
        let mut src = sample(10, "x", 3);
        src.set_termfreq("other", 7);
        src.set_reltermfreq("x", 1);

        let copy = CollectionStats::copy_with_term(&src, "x");
        assert_eq!(copy.collection_size, 10);
        assert_eq!(copy.get_termfreq("x"), 3);
        assert_eq!(copy.get_reltermfreq("x"), 1);
        assert_eq!(copy.get_termfreq("other"), 0);

        let absent = CollectionStats::copy_with_term(&src, "missing");
        assert_eq!(absent.get_termfreq("missing"), 0);
    }

    #[test]
    fn gather_folds_shards() {
        let shard_a = Arc::new(MemoryDatabase::new());
        shard_a.index_document(DocId(1), &[("rust", 0), ("db", 1)]);
        shard_a.index_document(DocId(2), &[("rust", 0)]);
        let shard_b = Arc::new(MemoryDatabase::new());
        shard_b.index_document(DocId(1), &[("rust", 0)]);

        let shards: Vec<Arc<dyn Database>> = vec![shard_a, shard_b];
        let stats = CollectionStats::gather(&shards, &["rust".to_string(), "db".to_string()]);

        assert_eq!(stats.collection_size, 3);
        assert_eq!(stats.total_length, 4);
        assert_eq!(stats.get_termfreq("rust"), 3);
        assert_eq!(stats.get_termfreq("db"), 1);
    }
}
