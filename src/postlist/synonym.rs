use std::sync::Arc;
use crate::core::database::Database;
use crate::core::error::Result;
use crate::core::types::{DocCount, DocId, TermCount};
use crate::postlist::PostList;
use crate::scoring::weight::Weight;

/// Scores an OR-structured subtree as if it were a single term.
///
/// The inner tree is built unweighted; this wrapper supplies the group's
/// weight from the summed wdf of whichever children match each document.
pub struct SynonymPostList {
    inner: Box<dyn PostList>,
    db: Arc<dyn Database>,
    weight: Box<dyn Weight>,
}

impl SynonymPostList {
    pub fn new(inner: Box<dyn PostList>, db: Arc<dyn Database>, weight: Box<dyn Weight>) -> Self {
        SynonymPostList { inner, db, weight }
    }
}

impl PostList for SynonymPostList {
    fn termfreq_min(&self) -> DocCount {
        self.inner.termfreq_min()
    }

    fn termfreq_est(&self) -> DocCount {
        self.inner.termfreq_est()
    }

    fn termfreq_max(&self) -> DocCount {
        self.inner.termfreq_max()
    }

    fn maxweight(&self) -> f64 {
        self.weight.max_score()
    }

    fn recalc_maxweight(&mut self) -> f64 {
        self.inner.recalc_maxweight();
        self.maxweight()
    }

    fn next(&mut self) -> Result<()> {
        self.inner.next()
    }

    fn skip_to(&mut self, doc_id: DocId) -> Result<()> {
        self.inner.skip_to(doc_id)
    }

    fn at_end(&self) -> bool {
        self.inner.at_end()
    }

    fn doc_id(&self) -> DocId {
        self.inner.doc_id()
    }

    fn weight(&self) -> f64 {
        let did = self.inner.doc_id();
        let doc_len = self.db.doc_length(did);
        // The summed child wdf can exceed the document length; clamp so the
        // group never looks denser than the document it matched.
        let mut wdf = self.inner.wdf();
        if doc_len > 0 {
            wdf = wdf.min(doc_len);
        }
        self.weight.score(wdf, doc_len)
    }

    fn wdf(&self) -> TermCount {
        self.inner.wdf()
    }

    fn describe(&self) -> String {
        format!("(SYN {})", self.inner.describe())
    }
}
