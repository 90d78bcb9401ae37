use std::sync::Arc;
use crate::core::database::Database;
use crate::core::error::Result;
use crate::core::types::TermCount;
use crate::matcher::stats::CollectionStats;
use crate::postlist::alldocs::AllDocsPostList;
use crate::postlist::empty::EmptyPostList;
use crate::postlist::synonym::SynonymPostList;
use crate::postlist::term::TermPostList;
use crate::postlist::PostList;
use crate::scoring::weight::{Bm25Weight, Weight};

/// Leaf-postlist factory the optimiser calls out to.
///
/// Split out as a trait so tests can substitute stub leaves with chosen
/// frequencies and weight bounds.
pub trait PostListFactory {
    fn leaf_postlist(
        &self,
        term: &str,
        wqf: TermCount,
        factor: f64,
    ) -> Result<Box<dyn PostList>>;

    fn synonym_postlist(
        &self,
        inner: Box<dyn PostList>,
        factor: f64,
    ) -> Result<Box<dyn PostList>>;
}

/// Factory building real leaves against one sub-database.
pub struct LocalSubMatch {
    db: Arc<dyn Database>,
    stats: CollectionStats,
}

impl LocalSubMatch {
    pub fn new(db: Arc<dyn Database>, stats: CollectionStats) -> Self {
        LocalSubMatch { db, stats }
    }
}

impl PostListFactory for LocalSubMatch {
    fn leaf_postlist(
        &self,
        term: &str,
        wqf: TermCount,
        factor: f64,
    ) -> Result<Box<dyn PostList>> {
        if term.is_empty() {
            // Match-everything leaf, never scored.
            return Ok(Box::new(AllDocsPostList::new(self.db.doc_ids())));
        }

        let postings = match self.db.postings(term) {
            Some(postings) => postings,
            None => return Ok(Box::new(EmptyPostList)),
        };

        let weight: Option<Box<dyn Weight>> = if factor != 0.0 {
            let term_stats = CollectionStats::copy_with_term(&self.stats, term);
            Some(Box::new(Bm25Weight::new(&term_stats, term, wqf, factor)))
        } else {
            None
        };

        Ok(Box::new(TermPostList::new(
            term.to_string(),
            postings,
            Arc::clone(&self.db),
            weight,
        )))
    }

    fn synonym_postlist(
        &self,
        inner: Box<dyn PostList>,
        factor: f64,
    ) -> Result<Box<dyn PostList>> {
        // The group is weighted like a single term whose frequency is the
        // subtree's estimate.
        let termfreq = inner.termfreq_est().min(self.db.doc_count());
        let weight = Bm25Weight::for_group(&self.stats, termfreq, factor);
        Ok(Box::new(SynonymPostList::new(
            inner,
            Arc::clone(&self.db),
            Box::new(weight),
        )))
    }
}
