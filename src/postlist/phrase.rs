use crate::core::error::Result;
use crate::core::types::{DocCount, DocId, TermCount};
use crate::postlist::{PositionTerm, PostList};

/// Positional filter: terms in query order, spanning fewer than `window`
/// tokens.
pub struct PhrasePostList {
    inner: Box<dyn PostList>,
    window: TermCount,
    terms: Vec<PositionTerm>,
}

impl PhrasePostList {
    pub fn new(inner: Box<dyn PostList>, window: TermCount, terms: Vec<PositionTerm>) -> Self {
        debug_assert!(terms.len() >= 2);
        PhrasePostList {
            inner,
            window,
            terms,
        }
    }

    fn test_window(&self, did: DocId) -> bool {
        match gather(&self.terms, did) {
            Some(lists) => ordered_within(&lists, self.window),
            None => false,
        }
    }

    fn advance_to_match(&mut self) -> Result<()> {
        while !self.inner.at_end() && !self.test_window(self.inner.doc_id()) {
            self.inner.next()?;
        }
        Ok(())
    }
}

/// Positional filter: terms strictly consecutive, in query order.
pub struct ExactPhrasePostList {
    inner: Box<dyn PostList>,
    terms: Vec<PositionTerm>,
}

impl ExactPhrasePostList {
    pub fn new(inner: Box<dyn PostList>, terms: Vec<PositionTerm>) -> Self {
        debug_assert!(terms.len() >= 2);
        ExactPhrasePostList { inner, terms }
    }

    fn test_adjacent(&self, did: DocId) -> bool {
        match gather(&self.terms, did) {
            Some(lists) => consecutive(&lists),
            None => false,
        }
    }

    fn advance_to_match(&mut self) -> Result<()> {
        while !self.inner.at_end() && !self.test_adjacent(self.inner.doc_id()) {
            self.inner.next()?;
        }
        Ok(())
    }
}

fn gather<'a>(terms: &'a [PositionTerm], did: DocId) -> Option<Vec<&'a [u32]>> {
    let mut lists = Vec::with_capacity(terms.len());
    for term in terms {
        match term.positions(did) {
            Some(positions) if !positions.is_empty() => lists.push(positions),
            _ => return None,
        }
    }
    Some(lists)
}

/// Greedy chain: for each start in the first list, follow with the smallest
/// strictly-larger position per subsequent list. The greedy choice minimises
/// the chain's end, so it decides the window test exactly.
fn ordered_within(lists: &[&[u32]], window: TermCount) -> bool {
    for &start in lists[0] {
        let mut prev = start;
        for list in &lists[1..] {
            let idx = list.partition_point(|&p| p <= prev);
            match list.get(idx) {
                Some(&p) => prev = p,
                // Later starts only push the chain further right.
                None => return false,
            }
        }
        if prev - start < window {
            return true;
        }
    }
    false
}

fn consecutive(lists: &[&[u32]]) -> bool {
    for &start in lists[0] {
        let mut pos = start;
        let mut found = true;
        for list in &lists[1..] {
            pos += 1;
            if list.binary_search(&pos).is_err() {
                found = false;
                break;
            }
        }
        if found {
            return true;
        }
    }
    false
}

impl PostList for PhrasePostList {
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
        format!("(PHRASE/{} {})", self.window, self.inner.describe())
    }
}

impl PostList for ExactPhrasePostList {
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
        format!("(EXACT_PHRASE {})", self.inner.describe())
    }
}
