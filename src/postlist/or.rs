use std::sync::Arc;
use crate::core::error::Result;
use crate::core::types::{DocCount, DocId, TermCount};
use crate::matcher::notifier::MatchNotifier;
use crate::postlist::PostList;

/// Binary disjunction.
///
/// Constructed with `l.termfreq_est() >= r.termfreq_est()`; the Huffman
/// build in the optimiser guarantees it and iteration assumes it when
/// deciding which side drives.
pub struct OrPostList {
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

impl OrPostList {
    pub fn new(
        l: Box<dyn PostList>,
        r: Box<dyn PostList>,
        notifier: Arc<MatchNotifier>,
        db_size: DocCount,
    ) -> Self {
        debug_assert!(l.termfreq_est() >= r.termfreq_est());
        OrPostList {
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

    fn pick(&mut self) {
        self.note_deaths();
        match (self.l.at_end(), self.r.at_end()) {
            (true, true) => self.finished = true,
            (true, false) => self.did = self.r.doc_id(),
            (false, true) => self.did = self.l.doc_id(),
            (false, false) => self.did = self.l.doc_id().min(self.r.doc_id()),
        }
    }

    fn side_matches(side: &dyn PostList, did: DocId) -> bool {
        !side.at_end() && side.doc_id() == did
    }
}

impl PostList for OrPostList {
    fn termfreq_min(&self) -> DocCount {
        self.l.termfreq_min().max(self.r.termfreq_min())
    }

    fn termfreq_est(&self) -> DocCount {
        // Inclusion-exclusion under independence.
        let l = self.l.termfreq_est();
        let r = self.r.termfreq_est();
        if self.db_size == 0 {
            return l.max(r);
        }
        let overlap = (l as f64 * r as f64 / self.db_size as f64).round() as DocCount;
        (l + r).saturating_sub(overlap).min(self.db_size)
    }

    fn termfreq_max(&self) -> DocCount {
        self.l
            .termfreq_max()
            .saturating_add(self.r.termfreq_max())
            .min(self.db_size.max(self.l.termfreq_max()))
    }

    fn maxweight(&self) -> f64 {
        self.l.maxweight() + self.r.maxweight()
    }

    fn recalc_maxweight(&mut self) -> f64 {
        let mut max = 0.0;
        if !self.l_dead {
            max += self.l.recalc_maxweight();
        }
        if !self.r_dead {
            max += self.r.recalc_maxweight();
        }
        max
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
            if Self::side_matches(self.l.as_ref(), did) {
                self.l.next()?;
            }
            if Self::side_matches(self.r.as_ref(), did) {
                self.r.next()?;
            }
        }
        self.pick();
        Ok(())
    }

    fn skip_to(&mut self, doc_id: DocId) -> Result<()> {
        if self.finished {
            return Ok(());
        }
        self.started = true;
        self.l.skip_to(doc_id)?;
        self.r.skip_to(doc_id)?;
        self.pick();
        Ok(())
    }

    fn at_end(&self) -> bool {
        self.finished
    }

    fn doc_id(&self) -> DocId {
        self.did
    }

    fn weight(&self) -> f64 {
        let mut weight = 0.0;
        if Self::side_matches(self.l.as_ref(), self.did) {
            weight += self.l.weight();
        }
        if Self::side_matches(self.r.as_ref(), self.did) {
            weight += self.r.weight();
        }
        weight
    }

    fn wdf(&self) -> TermCount {
        let mut wdf = 0;
        if Self::side_matches(self.l.as_ref(), self.did) {
            wdf += self.l.wdf();
        }
        if Self::side_matches(self.r.as_ref(), self.did) {
            wdf += self.r.wdf();
        }
        wdf
    }

    fn describe(&self) -> String {
        format!("({} OR {})", self.l.describe(), self.r.describe())
    }
}
