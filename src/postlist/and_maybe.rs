use std::sync::Arc;
use crate::core::error::Result;
use crate::core::types::{DocCount, DocId, TermCount};
use crate::matcher::notifier::MatchNotifier;
use crate::postlist::PostList;

/// Matches the left side; the right side only adds weight when it lines up.
pub struct AndMaybePostList {
    l: Box<dyn PostList>,
    r: Box<dyn PostList>,
    finished: bool,
    r_dead: bool,
    r_matches: bool,
    notifier: Arc<MatchNotifier>,
}

impl AndMaybePostList {
    pub fn new(
        l: Box<dyn PostList>,
        r: Box<dyn PostList>,
        notifier: Arc<MatchNotifier>,
        _db_size: DocCount,
    ) -> Self {
        AndMaybePostList {
            l,
            r,
            finished: false,
            r_dead: false,
            r_matches: false,
            notifier,
        }
    }

    fn sync_right(&mut self) -> Result<()> {
        self.r_matches = false;
        if self.l.at_end() {
            self.finished = true;
            self.notifier.notify();
            return Ok(());
        }
        if self.r_dead {
            return Ok(());
        }
        let did = self.l.doc_id();
        self.r.skip_to(did)?;
        if self.r.at_end() {
            self.r_dead = true;
            self.notifier.notify();
        } else {
            self.r_matches = self.r.doc_id() == did;
        }
        Ok(())
    }
}

impl PostList for AndMaybePostList {
    fn termfreq_min(&self) -> DocCount {
        self.l.termfreq_min()
    }

    fn termfreq_est(&self) -> DocCount {
        self.l.termfreq_est()
    }

    fn termfreq_max(&self) -> DocCount {
        self.l.termfreq_max()
    }

    fn maxweight(&self) -> f64 {
        self.l.maxweight() + if self.r_dead { 0.0 } else { self.r.maxweight() }
    }

    fn recalc_maxweight(&mut self) -> f64 {
        let mut max = self.l.recalc_maxweight();
        if !self.r_dead {
            max += self.r.recalc_maxweight();
        }
        max
    }

    fn next(&mut self) -> Result<()> {
        if self.finished {
            return Ok(());
        }
        self.l.next()?;
        self.sync_right()
    }

    fn skip_to(&mut self, doc_id: DocId) -> Result<()> {
        if self.finished {
            return Ok(());
        }
        self.l.skip_to(doc_id)?;
        self.sync_right()
    }

    fn at_end(&self) -> bool {
        self.finished
    }

    fn doc_id(&self) -> DocId {
        self.l.doc_id()
    }

    fn weight(&self) -> f64 {
        self.l.weight() + if self.r_matches { self.r.weight() } else { 0.0 }
    }

    fn wdf(&self) -> TermCount {
        self.l.wdf() + if self.r_matches { self.r.wdf() } else { 0 }
    }

    fn describe(&self) -> String {
        format!("({} AND_MAYBE {})", self.l.describe(), self.r.describe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::database::Database;
    use crate::index::memory::MemoryDatabase;
    use crate::postlist::term::TermPostList;
    use crate::scoring::weight::Weight;

    struct UnitWeight;

    impl Weight for UnitWeight {
        fn score(&self, _wdf: TermCount, _doc_len: TermCount) -> f64 {
            1.0
        }

        fn max_score(&self) -> f64 {
            1.0
        }

        fn name(&self) -> &str {
            "unit"
        }
    }

    fn scored_leaf(db: &Arc<MemoryDatabase>, term: &str) -> Box<dyn PostList> {
        Box::new(TermPostList::new(
            term.to_string(),
            db.postings(term).unwrap(),
            Arc::clone(db) as Arc<dyn Database>,
            Some(Box::new(UnitWeight)),
        ))
    }

    #[test]
    fn follows_left_and_adds_right_weight() {
        let db = Arc::new(MemoryDatabase::new());
        db.index_document(DocId(1), &[("a", 0)]);
        db.index_document(DocId(2), &[("a", 0), ("b", 1)]);
        db.index_document(DocId(4), &[("b", 0)]);
        db.index_document(DocId(5), &[("a", 0)]);

        let mut maybe = AndMaybePostList::new(
            scored_leaf(&db, "a"),
            scored_leaf(&db, "b"),
            Arc::new(MatchNotifier::new()),
            4,
        );

        let mut seen = Vec::new();
        loop {
            maybe.next().unwrap();
            if maybe.at_end() {
                break;
            }
            seen.push((maybe.doc_id().0, maybe.weight()));
        }
        assert_eq!(seen, vec![(1, 1.0), (2, 2.0), (5, 1.0)]);
    }
}
