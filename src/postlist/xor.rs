use std::sync::Arc;
use crate::core::error::Result;
use crate::core::types::{DocCount, DocId, TermCount};
use crate::matcher::notifier::MatchNotifier;
use crate::postlist::PostList;

/// Binary symmetric difference: documents matched by exactly one side.
///
/// Same `l.termfreq_est() >= r.termfreq_est()` construction invariant as
/// `OrPostList`.
pub struct XorPostList {
    l: Box<dyn PostList>,
    r: Box<dyn PostList>,
    did: DocId,
    started: bool,
    finished: bool,
    l_dead: bool,
    r_dead: bool,
    db_size: DocCount,
    notifier: Arc<MatchNotifier>,
}

impl XorPostList {
    pub fn new(
        l: Box<dyn PostList>,
        r: Box<dyn PostList>,
        notifier: Arc<MatchNotifier>,
        db_size: DocCount,
    ) -> Self {
        debug_assert!(l.termfreq_est() >= r.termfreq_est());
        XorPostList {
            l,
            r,
            did: DocId(0),
            started: false,
            finished: false,
            l_dead: false,
            r_dead: false,
            db_size,
            notifier,
        }
    }

    fn note_deaths(&mut self) {
        if self.l.at_end() && !self.l_dead {
            self.l_dead = true;
            self.notifier.notify();
        }
        if self.r.at_end() && !self.r_dead {
            self.r_dead = true;
            self.notifier.notify();
        }
    }

    /// Position at the smallest doc held by exactly one side, advancing past
    /// any doc both sides share.
    fn settle(&mut self) -> Result<()> {
        loop {
            self.note_deaths();
            match (self.l.at_end(), self.r.at_end()) {
                (true, true) => {
                    self.finished = true;
                    return Ok(());
                }
                (true, false) => {
                    self.did = self.r.doc_id();
                    return Ok(());
                }
                (false, true) => {
                    self.did = self.l.doc_id();
                    return Ok(());
                }
                (false, false) => {
                    let ld = self.l.doc_id();
                    let rd = self.r.doc_id();
                    if ld == rd {
                        self.l.next()?;
                        self.r.next()?;
                        continue;
                    }
                    self.did = ld.min(rd);
                    return Ok(());
                }
            }
        }
    }

    fn side_at(side: &dyn PostList, did: DocId) -> bool {
        !side.at_end() && side.doc_id() == did
    }
}

impl PostList for XorPostList {
    fn termfreq_min(&self) -> DocCount {
        let l = self.l.termfreq_min();
        let r = self.r.termfreq_min();
        l.max(r).saturating_sub(self.l.termfreq_max().min(self.r.termfreq_max()))
    }

    fn termfreq_est(&self) -> DocCount {
        let l = self.l.termfreq_est();
        let r = self.r.termfreq_est();
        if self.db_size == 0 {
            return l.max(r);
        }
        let overlap = (l as f64 * r as f64 / self.db_size as f64).round() as DocCount;
        (l + r).saturating_sub(overlap.saturating_mul(2)).min(self.db_size)
    }

    fn termfreq_max(&self) -> DocCount {
        self.l
            .termfreq_max()
            .saturating_add(self.r.termfreq_max())
            .min(self.db_size.max(self.l.termfreq_max()))
    }

    fn maxweight(&self) -> f64 {
        // Exactly one side contributes to any match.
        self.l.maxweight().max(self.r.maxweight())
    }

    fn recalc_maxweight(&mut self) -> f64 {
        let l = if self.l_dead { 0.0 } else { self.l.recalc_maxweight() };
        let r = if self.r_dead { 0.0 } else { self.r.recalc_maxweight() };
        l.max(r)
    }

    fn next(&mut self) -> Result<()> {
        if self.finished {
            return Ok(());
        }
        if !self.started {
            self.started = true;
            self.l.next()?;
            self.r.next()?;
        } else {
            let did = self.did;
            if Self::side_at(self.l.as_ref(), did) {
                self.l.next()?;
            }
            if Self::side_at(self.r.as_ref(), did) {
                self.r.next()?;
            }
        }
        self.settle()
    }

    fn skip_to(&mut self, doc_id: DocId) -> Result<()> {
        if self.finished {
            return Ok(());
        }
        self.started = true;
        self.l.skip_to(doc_id)?;
        self.r.skip_to(doc_id)?;
        self.settle()
    }

    fn at_end(&self) -> bool {
        self.finished
    }

    fn doc_id(&self) -> DocId {
        self.did
    }

    fn weight(&self) -> f64 {
        if Self::side_at(self.l.as_ref(), self.did) {
            self.l.weight()
        } else if Self::side_at(self.r.as_ref(), self.did) {
            self.r.weight()
        } else {
            0.0
        }
    }

    fn wdf(&self) -> TermCount {
        if Self::side_at(self.l.as_ref(), self.did) {
            self.l.wdf()
        } else if Self::side_at(self.r.as_ref(), self.did) {
            self.r.wdf()
        } else {
            0
        }
    }

    fn describe(&self) -> String {
        format!("({} XOR {})", self.l.describe(), self.r.describe())
    }
}
