use std::sync::Arc;
use crate::core::error::Result;
use crate::core::types::{DocCount, DocId, TermCount};
use crate::matcher::notifier::MatchNotifier;
use crate::postlist::PostList;

/// Matches the left side minus the right side.
///
/// The right side is match-only; weights come from the left alone.
pub struct AndNotPostList {
    l: Box<dyn PostList>,
    r: Box<dyn PostList>,
    finished: bool,
    db_size: DocCount,
    notifier: Arc<MatchNotifier>,
}

impl AndNotPostList {
    pub fn new(
        l: Box<dyn PostList>,
        r: Box<dyn PostList>,
        notifier: Arc<MatchNotifier>,
        db_size: DocCount,
    ) -> Self {
        AndNotPostList {
            l,
            r,
            finished: false,
            db_size,
            notifier,
        }
    }

    /// Advance the left side past every document the right side holds.
    fn settle(&mut self) -> Result<()> {
        loop {
            if self.l.at_end() {
                self.finished = true;
                self.notifier.notify();
                return Ok(());
            }
            let did = self.l.doc_id();
            self.r.skip_to(did)?;
            if !self.r.at_end() && self.r.doc_id() == did {
                self.l.next()?;
                continue;
            }
            return Ok(());
        }
    }
}

impl PostList for AndNotPostList {
    fn termfreq_min(&self) -> DocCount {
        self.l.termfreq_min().saturating_sub(self.r.termfreq_max())
    }

    fn termfreq_est(&self) -> DocCount {
        let l = self.l.termfreq_est();
        if self.db_size == 0 {
            return l;
        }
        let keep = 1.0 - self.r.termfreq_est() as f64 / self.db_size as f64;
        (l as f64 * keep.max(0.0)).round() as DocCount
    }

    fn termfreq_max(&self) -> DocCount {
        self.l.termfreq_max()
    }

    fn maxweight(&self) -> f64 {
        self.l.maxweight()
    }

    fn recalc_maxweight(&mut self) -> f64 {
        self.l.recalc_maxweight()
    }

    fn next(&mut self) -> Result<()> {
        if self.finished {
            return Ok(());
        }
        self.l.next()?;
        self.settle()
    }

    fn skip_to(&mut self, doc_id: DocId) -> Result<()> {
        if self.finished {
            return Ok(());
        }
        self.l.skip_to(doc_id)?;
        self.settle()
    }

    fn at_end(&self) -> bool {
        self.finished
    }

    fn doc_id(&self) -> DocId {
        self.l.doc_id()
    }

    fn weight(&self) -> f64 {
        self.l.weight()
    }

    fn wdf(&self) -> TermCount {
        self.l.wdf()
    }

    fn describe(&self) -> String {
        format!("({} AND_NOT {})", self.l.describe(), self.r.describe())
    }
}
