use std::sync::Arc;
use crate::core::database::Database;
use crate::core::error::Result;
use crate::core::types::{DocCount, DocId, TermCount, ValueSlot};
use crate::postlist::PostList;

/// Match-only postlist over documents whose value in `slot` falls in
/// `[begin, end]` by string order. An empty `begin` bounds nothing below.
pub struct ValueRangePostList {
    db: Arc<dyn Database>,
    slot: ValueSlot,
    begin: String,
    end: String,
    docs: Vec<DocId>,
    cur: Option<usize>,
    finished: bool,
    db_size: DocCount,
}

impl ValueRangePostList {
    pub fn new(db: Arc<dyn Database>, slot: ValueSlot, begin: String, end: String) -> Self {
        let docs = db.value_slot_docs(slot);
        let db_size = db.doc_count();
        ValueRangePostList {
            db,
            slot,
            begin,
            end,
            docs,
            cur: None,
            finished: false,
            db_size,
        }
    }

    fn admits(&self, did: DocId) -> bool {
        match self.db.value(did, self.slot) {
            Some(v) => v.as_str() >= self.begin.as_str() && v.as_str() <= self.end.as_str(),
            None => false,
        }
    }

    fn advance_from(&mut self, mut idx: usize) {
        while idx < self.docs.len() {
            if self.admits(self.docs[idx]) {
                self.cur = Some(idx);
                return;
            }
            idx += 1;
        }
        self.finished = true;
    }
}

impl PostList for ValueRangePostList {
    fn termfreq_min(&self) -> DocCount {
        0
    }

    fn termfreq_est(&self) -> DocCount {
        self.db_size / 2
    }

    fn termfreq_max(&self) -> DocCount {
        self.db_size
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
        let idx = match self.cur {
            None => 0,
            Some(i) => i + 1,
        };
        self.advance_from(idx);
        Ok(())
    }

    fn skip_to(&mut self, doc_id: DocId) -> Result<()> {
        if self.finished {
            return Ok(());
        }
        let from = match self.cur {
            Some(i) if self.docs[i] >= doc_id => return Ok(()),
            Some(i) => i + 1,
            None => 0,
        };
        let idx = from + self.docs[from..].partition_point(|&d| d < doc_id);
        self.advance_from(idx);
        Ok(())
    }

    fn at_end(&self) -> bool {
        self.finished
    }

    fn doc_id(&self) -> DocId {
        self.cur.map(|i| self.docs[i]).unwrap_or(DocId(0))
    }

    fn weight(&self) -> f64 {
        0.0
    }

    fn wdf(&self) -> TermCount {
        0
    }

    fn describe(&self) -> String {
        format!("VALUE_RANGE {} {}..{}", self.slot, self.begin, self.end)
    }
}

/// Match-only postlist over documents whose value in `slot` is at least
/// `begin`.
pub struct ValueGePostList {
    db: Arc<dyn Database>,
    slot: ValueSlot,
    begin: String,
    docs: Vec<DocId>,
    cur: Option<usize>,
    finished: bool,
    db_size: DocCount,
}

impl ValueGePostList {
    pub fn new(db: Arc<dyn Database>, slot: ValueSlot, begin: String) -> Self {
        let docs = db.value_slot_docs(slot);
        let db_size = db.doc_count();
        ValueGePostList {
            db,
            slot,
            begin,
            docs,
            cur: None,
            finished: false,
            db_size,
        }
    }

    fn admits(&self, did: DocId) -> bool {
        match self.db.value(did, self.slot) {
            Some(v) => v.as_str() >= self.begin.as_str(),
            None => false,
        }
    }

    fn advance_from(&mut self, mut idx: usize) {
        while idx < self.docs.len() {
            if self.admits(self.docs[idx]) {
                self.cur = Some(idx);
                return;
            }
            idx += 1;
        }
        self.finished = true;
    }
}

impl PostList for ValueGePostList {
    fn termfreq_min(&self) -> DocCount {
        0
    }

    fn termfreq_est(&self) -> DocCount {
        self.db_size / 2
    }

    fn termfreq_max(&self) -> DocCount {
        self.db_size
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
        let idx = match self.cur {
            None => 0,
            Some(i) => i + 1,
        };
        self.advance_from(idx);
        Ok(())
    }

    fn skip_to(&mut self, doc_id: DocId) -> Result<()> {
        if self.finished {
            return Ok(());
        }
        let from = match self.cur {
            Some(i) if self.docs[i] >= doc_id => return Ok(()),
            Some(i) => i + 1,
            None => 0,
        };
        let idx = from + self.docs[from..].partition_point(|&d| d < doc_id);
        self.advance_from(idx);
        Ok(())
    }

    fn at_end(&self) -> bool {
        self.finished
    }

    fn doc_id(&self) -> DocId {
        self.cur.map(|i| self.docs[i]).unwrap_or(DocId(0))
    }

    fn weight(&self) -> f64 {
        0.0
    }

    fn wdf(&self) -> TermCount {
        0
    }

    fn describe(&self) -> String {
        format!("VALUE_GE {} {}", self.slot, self.begin)
    }
}
