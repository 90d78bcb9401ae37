use serde::{Serialize, Deserialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DocId(pub u64);

impl DocId {
    pub fn new(id: u64) -> Self {
        DocId(id)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl From<u64> for DocId {
    fn from(id: u64) -> Self {
        DocId(id)
    }
}

/// Number of documents (a whole collection or a posting list).
pub type DocCount = u64;

/// Count of term occurrences: wdf, wqf, phrase windows.
pub type TermCount = u32;

/// Slot number of a document value.
pub type ValueSlot = u32;
