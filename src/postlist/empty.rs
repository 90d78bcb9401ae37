use crate::core::error::Result;
use crate::core::types::{DocCount, DocId, TermCount};
use crate::postlist::PostList;

/// Postlist over no documents.
pub struct EmptyPostList;

impl PostList for EmptyPostList {
    fn termfreq_min(&self) -> DocCount {
        0
    }

    fn termfreq_est(&self) -> DocCount {
        0
    }

    fn termfreq_max(&self) -> DocCount {
        0
    }

    fn maxweight(&self) -> f64 {
        0.0
    }

    fn recalc_maxweight(&mut self) -> f64 {
        0.0
    }

    fn next(&mut self) -> Result<()> {
        Ok(())
    }

    fn skip_to(&mut self, _doc_id: DocId) -> Result<()> {
        Ok(())
    }

    fn at_end(&self) -> bool {
        true
    }

    fn doc_id(&self) -> DocId {
        DocId(0)
    }

    fn weight(&self) -> f64 {
        0.0
    }

    fn wdf(&self) -> TermCount {
        0
    }

    fn describe(&self) -> String {
        "<empty>".to_string()
    }
}
