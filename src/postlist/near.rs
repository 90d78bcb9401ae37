use crate::core::error::Result;
use crate::core::types::{DocCount, DocId, TermCount};
use crate::postlist::{PositionTerm, PostList};

/// Positional filter: all constituent terms within a window, any order.
///
/// Wraps the conjunction built over the flat child list; candidates stream
/// from the inner postlist and are kept when the stored positions admit a
/// window of fewer than `window` tokens covering one occurrence of each term.
pub struct NearPostList {
    inner: Box<dyn PostList>,
    window: TermCount,
    terms: Vec<PositionTerm>,
}

impl NearPostList {
    pub fn new(inner: Box<dyn PostList>, window: TermCount, terms: Vec<PositionTerm>) -> Self {
        debug_assert!(terms.len() >= 2);
        NearPostList {
            inner,
            window,
            terms,
        }
    }

    fn test_window(&self, did: DocId) -> bool {
        let mut lists = Vec::with_capacity(self.terms.len());
        for term in &self.terms {
            match term.positions(did) {
                Some(positions) if !positions.is_empty() => lists.push(positions),
                _ => return false,
            }
        }
        near_within(&lists, self.window)
    }

    fn advance_to_match(&mut self) -> Result<()> {
        while !self.inner.at_end() && !self.test_window(self.inner.doc_id()) {
            self.inner.next()?;
        }
        Ok(())
    }
}

/// Minimal-cover sweep over the sorted position lists: repeatedly drop the
/// smallest candidate until some choice of one position per list spans fewer
/// than `window` tokens.
fn near_within(lists: &[&[u32]], window: TermCount) -> bool {
    let mut idx = vec![0usize; lists.len()];
    loop {
        let mut min_i = 0;
        let mut min_pos = u32::MAX;
        let mut max_pos = 0u32;
        for (i, list) in lists.iter().enumerate() {
            let pos = list[idx[i]];
            if pos < min_pos {
                min_pos = pos;
                min_i = i;
            }
            max_pos = max_pos.max(pos);
        }
        if max_pos - min_pos < window {
            return true;
        }
        idx[min_i] += 1;
        if idx[min_i] >= lists[min_i].len() {
            return false;
        }
    }
}

impl PostList for NearPostList {
    fn termfreq_min(&self) -> DocCount {
        0
    }

    fn termfreq_est(&self) -> DocCount {
        self.inner.termfreq_est() / 2
    }

    fn termfreq_max(&self) -> DocCount {
        self.inner.termfreq_max()
    }

    fn maxweight(&self) -> f64 {
        self.inner.maxweight()
    }

    fn recalc_maxweight(&mut self) -> f64 {
        self.inner.recalc_maxweight()
    }

    fn next(&mut self) -> Result<()> {
        self.inner.next()?;
        self.advance_to_match()
    }

    fn skip_to(&mut self, doc_id: DocId) -> Result<()> {
        self.inner.skip_to(doc_id)?;
        self.advance_to_match()
    }

    fn at_end(&self) -> bool {
        self.inner.at_end()
    }

    fn doc_id(&self) -> DocId {
        self.inner.doc_id()
    }

    fn weight(&self) -> f64 {
        self.inner.weight()
    }

    fn wdf(&self) -> TermCount {
        self.inner.wdf()
    }

    fn describe(&self) -> String {
        format!("(NEAR/{} {})", self.window, self.inner.describe())
    }
}
