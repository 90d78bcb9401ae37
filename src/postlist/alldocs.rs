use roaring::RoaringTreemap;
use crate::core::error::Result;
use crate::core::types::{DocCount, DocId, TermCount};
use crate::postlist::PostList;

/// Postlist over every document in a sub-database.
///
/// Produced for the empty-term leaf; never scores.
pub struct AllDocsPostList {
    docs: RoaringTreemap,
    cur: Option<u64>,
    finished: bool,
}

impl AllDocsPostList {
    pub fn new(docs: RoaringTreemap) -> Self {
        AllDocsPostList {
            docs,
            cur: None,
            finished: false,
        }
    }

    fn position_at(&mut self, doc: Option<u64>) {
        match doc {
            Some(d) => self.cur = Some(d),
            None => self.finished = true,
        }
    }
}

impl PostList for AllDocsPostList {
    fn termfreq_min(&self) -> DocCount {
        self.docs.len()
    }

    fn termfreq_est(&self) -> DocCount {
        self.docs.len()
    }

    fn termfreq_max(&self) -> DocCount {
        self.docs.len()
    }

    fn maxweight(&self) -> f64 {
        0.0
    }

    fn recalc_maxweight(&mut self) -> f64 {
        0.0
    }

    fn next(&mut self) -> Result<()> {
        if self.finished {
            return Ok(());
        }
        let next = match self.cur {
            None => self.docs.min(),
            // rank(c) counts members <= c, so it is the index of the first
            // member past c.
            Some(c) => self.docs.select(self.docs.rank(c)),
        };
        self.position_at(next);
        Ok(())
    }

    fn skip_to(&mut self, doc_id: DocId) -> Result<()> {
        if self.finished {
            return Ok(());
        }
        if let Some(c) = self.cur {
            if c >= doc_id.0 {
                return Ok(());
            }
        }
        let next = match doc_id.0.checked_sub(1) {
            None => self.docs.min(),
            Some(prev) => self.docs.select(self.docs.rank(prev)),
        };
        self.position_at(next);
        Ok(())
    }

    fn at_end(&self) -> bool {
        self.finished
    }

    fn doc_id(&self) -> DocId {
        DocId(self.cur.unwrap_or(0))
    }

    fn weight(&self) -> f64 {
        0.0
    }

    fn wdf(&self) -> TermCount {
        0
    }

    fn describe(&self) -> String {
        "<alldocs>".to_string()
    }
}
