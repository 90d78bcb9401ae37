use std::sync::Arc;
use crate::core::error::Result;
use crate::core::types::{DocCount, DocId, TermCount};
use crate::matcher::notifier::MatchNotifier;
use crate::postlist::PostList;

/// Multi-way conjunction.
///
/// Children keep the order the optimiser flattened them in; positional
/// filters recorded against that order index into it. Alignment is a
/// skip-to driven leapfrog with the first child as the driver.
pub struct MultiAndPostList {
    children: Vec<Box<dyn PostList>>,
    did: DocId,
    finished: bool,
    db_size: DocCount,
    notifier: Arc<MatchNotifier>,
}

impl MultiAndPostList {
    pub fn new(
        children: Vec<Box<dyn PostList>>,
        notifier: Arc<MatchNotifier>,
        db_size: DocCount,
    ) -> Self {
        debug_assert!(children.len() >= 2);
        MultiAndPostList {
            children,
            did: DocId(0),
            finished: false,
            db_size,
            notifier,
        }
    }

    pub fn children(&self) -> &[Box<dyn PostList>] {
        &self.children
    }

    fn finish(&mut self) {
        self.finished = true;
        self.notifier.notify();
    }

    /// Align all children on the driver's candidate, restarting whenever a
    /// child overshoots.
    fn align(&mut self) -> Result<()> {
        'outer: loop {
            if self.children[0].at_end() {
                self.finish();
                return Ok(());
            }
            let candidate = self.children[0].doc_id();
            for i in 1..self.children.len() {
                self.children[i].skip_to(candidate)?;
                if self.children[i].at_end() {
                    self.finish();
                    return Ok(());
                }
                let got = self.children[i].doc_id();
                if got > candidate {
                    self.children[0].skip_to(got)?;
                    continue 'outer;
                }
            }
            self.did = candidate;
            return Ok(());
        }
    }
}

impl PostList for MultiAndPostList {
    fn termfreq_min(&self) -> DocCount {
        // All children matching everywhere except (n-1) disjoint misses.
        let sum: u64 = self.children.iter().map(|c| c.termfreq_min()).sum();
        let slack = self.db_size.saturating_mul(self.children.len() as u64 - 1);
        sum.saturating_sub(slack)
    }

    fn termfreq_est(&self) -> DocCount {
        // Independence assumption: scale db_size by each child's selectivity.
        if self.db_size == 0 {
            return 0;
        }
        let mut est = self.db_size as f64;
        for child in &self.children {
            est = est * child.termfreq_est() as f64 / self.db_size as f64;
        }
        est.round() as DocCount
    }

    fn termfreq_max(&self) -> DocCount {
        self.children.iter().map(|c| c.termfreq_max()).min().unwrap_or(0)
    }

    fn maxweight(&self) -> f64 {
        self.children.iter().map(|c| c.maxweight()).sum()
    }

    fn recalc_maxweight(&mut self) -> f64 {
        self.children.iter_mut().map(|c| c.recalc_maxweight()).sum()
    }

    fn next(&mut self) -> Result<()> {
        if self.finished {
            return Ok(());
        }
        self.children[0].next()?;
        self.align()
    }

    fn skip_to(&mut self, doc_id: DocId) -> Result<()> {
        if self.finished {
            return Ok(());
        }
        self.children[0].skip_to(doc_id)?;
        self.align()
    }

    fn at_end(&self) -> bool {
        self.finished
    }

    fn doc_id(&self) -> DocId {
        self.did
    }

    fn weight(&self) -> f64 {
        self.children.iter().map(|c| c.weight()).sum()
    }

    fn wdf(&self) -> TermCount {
        self.children.iter().map(|c| c.wdf()).sum()
    }

    fn describe(&self) -> String {
        let parts: Vec<String> = self.children.iter().map(|c| c.describe()).collect();
        format!("({})", parts.join(" AND "))
    }
}
