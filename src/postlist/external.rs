use std::fmt;
use crate::core::database::ConstDatabaseView;
use crate::core::error::Result;
use crate::core::types::{DocCount, DocId, TermCount};
use crate::postlist::PostList;

/// Caller-supplied document source plugged into a query tree.
///
/// A source is shared inside the query node; each sub-database match takes
/// its own working copy through `clone_source` and primes it with `reset`.
pub trait PostingSource: Send + Sync + fmt::Debug {
    fn clone_source(&self) -> Box<dyn PostingSource>;

    /// Prime the source against the (read-only) database it will run over.
    fn reset(&mut self, db: &ConstDatabaseView);

    fn termfreq_min(&self) -> DocCount;

    fn termfreq_est(&self) -> DocCount;

    fn termfreq_max(&self) -> DocCount;

    fn maxweight(&self) -> f64;

    fn next(&mut self) -> Result<()>;

    fn skip_to(&mut self, doc_id: DocId) -> Result<()>;

    fn at_end(&self) -> bool;

    fn doc_id(&self) -> DocId;

    fn weight(&self) -> f64;

    fn describe(&self) -> String {
        "external".to_string()
    }
}

/// Adapter presenting a `PostingSource` as a postlist, with the query's
/// weight factor applied.
pub struct ExternalPostList {
    source: Box<dyn PostingSource>,
    factor: f64,
}

impl ExternalPostList {
    pub fn new(db: ConstDatabaseView, source: &dyn PostingSource, factor: f64) -> Self {
        let mut source = source.clone_source();
        source.reset(&db);
        ExternalPostList { source, factor }
    }
}

impl PostList for ExternalPostList {
    fn termfreq_min(&self) -> DocCount {
        self.source.termfreq_min()
    }

    fn termfreq_est(&self) -> DocCount {
        self.source.termfreq_est()
    }

    fn termfreq_max(&self) -> DocCount {
        self.source.termfreq_max()
    }

    fn maxweight(&self) -> f64 {
        self.factor * self.source.maxweight()
    }

    fn recalc_maxweight(&mut self) -> f64 {
        self.maxweight()
    }

    fn next(&mut self) -> Result<()> {
        self.source.next()
    }

    fn skip_to(&mut self, doc_id: DocId) -> Result<()> {
        self.source.skip_to(doc_id)
    }

    fn at_end(&self) -> bool {
        self.source.at_end()
    }

    fn doc_id(&self) -> DocId {
        self.source.doc_id()
    }

    fn weight(&self) -> f64 {
        self.factor * self.source.weight()
    }

    fn wdf(&self) -> TermCount {
        0
    }

    fn describe(&self) -> String {
        format!("(EXTERNAL {})", self.source.describe())
    }
}
