use std::sync::Arc;
use crate::core::database::Database;
use crate::core::error::Result;
use crate::core::types::{DocCount, DocId, TermCount};
use crate::index::posting::PostingList;
use crate::postlist::{PositionTerm, PostList};
use crate::scoring::weight::Weight;

/// Leaf postlist over one term's postings.
///
/// `weight` is None when the leaf is match-only (factor 0); the scoring path
/// is skipped entirely in that case.
pub struct TermPostList {
    term: String,
    postings: Arc<PostingList>,
    db: Arc<dyn Database>,
    weight: Option<Box<dyn Weight>>,
    cur: Option<usize>,
    finished: bool,
}

impl TermPostList {
    pub fn new(
        term: String,
        postings: Arc<PostingList>,
        db: Arc<dyn Database>,
        weight: Option<Box<dyn Weight>>,
    ) -> Self {
        TermPostList {
            term,
            postings,
            db,
            weight,
            cur: None,
            finished: false,
        }
    }

    fn position_at(&mut self, idx: usize) {
        if idx >= self.postings.len() {
            self.finished = true;
        } else {
            self.cur = Some(idx);
        }
    }
}

impl PostList for TermPostList {
    fn termfreq_min(&self) -> DocCount {
        self.postings.doc_freq()
    }

    fn termfreq_est(&self) -> DocCount {
        self.postings.doc_freq()
    }

    fn termfreq_max(&self) -> DocCount {
        self.postings.doc_freq()
    }

    fn maxweight(&self) -> f64 {
        self.weight.as_ref().map(|w| w.max_score()).unwrap_or(0.0)
    }

    fn recalc_maxweight(&mut self) -> f64 {
        self.maxweight()
    }

    fn next(&mut self) -> Result<()> {
        if self.finished {
            return Ok(());
        }
        let idx = match self.cur {
            None => 0,
            Some(i) => i + 1,
        };
        self.position_at(idx);
        Ok(())
    }

    fn skip_to(&mut self, doc_id: DocId) -> Result<()> {
        if self.finished {
            return Ok(());
        }
        let from = match self.cur {
            Some(i) if self.postings.postings[i].doc_id >= doc_id => return Ok(()),
            Some(i) => i + 1,
            None => 0,
        };
        let idx = self.postings.first_at_or_after(from, doc_id);
        self.position_at(idx);
        Ok(())
    }

    fn at_end(&self) -> bool {
        self.finished
    }

    fn doc_id(&self) -> DocId {
        self.cur.map(|i| self.postings.postings[i].doc_id).unwrap_or(DocId(0))
    }

    fn weight(&self) -> f64 {
        match (&self.weight, self.cur) {
            (Some(w), Some(i)) => {
                let posting = &self.postings.postings[i];
                w.score(posting.wdf, self.db.doc_length(posting.doc_id))
            }
            _ => 0.0,
        }
    }

    fn wdf(&self) -> TermCount {
        self.cur.map(|i| self.postings.postings[i].wdf).unwrap_or(0)
    }

    fn position_terms(&self) -> Option<PositionTerm> {
        Some(PositionTerm {
            term: self.term.clone(),
            postings: Arc::clone(&self.postings),
        })
    }

    fn describe(&self) -> String {
        self.term.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::memory::MemoryDatabase;

    fn leaf(db: &Arc<MemoryDatabase>, term: &str) -> TermPostList {
        let postings = db.postings(term).unwrap();
        let db: Arc<dyn Database> = Arc::clone(db) as Arc<dyn Database>;
        TermPostList::new(term.to_string(), postings, db, None)
    }

    #[test]
    fn walks_matching_documents() {
        let db = Arc::new(MemoryDatabase::new());
        db.index_document(DocId(1), &[("a", 0)]);
        db.index_document(DocId(3), &[("a", 0), ("a", 1)]);
        db.index_document(DocId(4), &[("b", 0)]);

        let mut pl = leaf(&db, "a");
        assert_eq!(pl.termfreq_est(), 2);

        pl.next().unwrap();
        assert_eq!(pl.doc_id(), DocId(1));
        assert_eq!(pl.wdf(), 1);
        pl.next().unwrap();
        assert_eq!(pl.doc_id(), DocId(3));
        assert_eq!(pl.wdf(), 2);
        pl.next().unwrap();
        assert!(pl.at_end());
    }

    #[test]
    fn skip_to_seeks_forward_only() {
        let db = Arc::new(MemoryDatabase::new());
        for doc in [1u64, 4, 6, 9] {
            db.index_document(DocId(doc), &[("a", 0)]);
        }

        let mut pl = leaf(&db, "a");
        pl.skip_to(DocId(5)).unwrap();
        assert_eq!(pl.doc_id(), DocId(6));
        pl.skip_to(DocId(2)).unwrap();
        assert_eq!(pl.doc_id(), DocId(6));
        pl.skip_to(DocId(6)).unwrap();
        assert_eq!(pl.doc_id(), DocId(6));
        pl.skip_to(DocId(10)).unwrap();
        assert!(pl.at_end());
    }
}
