use std::sync::Arc;
use roaring::RoaringTreemap;
use crate::core::types::{DocCount, DocId, TermCount, ValueSlot};
use crate::index::posting::PostingList;

/// Read surface of a single sub-database.
///
/// The matcher only ever reads: capability queries (`has_positions`), the
/// bounds the weighting schemes need, postings for leaf construction, and
/// document values for range filtering. Writers freeze their index into one
/// of these before a match starts.
pub trait Database: Send + Sync {
    /// Number of documents in this sub-database.
    fn doc_count(&self) -> DocCount;

    /// Sum of all document lengths.
    fn total_length(&self) -> u64;

    /// Length (token count) of one document, 0 if unknown.
    fn doc_length(&self, doc_id: DocId) -> TermCount;

    /// Lower bound on document length across the collection.
    fn doc_length_lower_bound(&self) -> TermCount;

    /// Upper bound on document length across the collection.
    fn doc_length_upper_bound(&self) -> TermCount;

    /// Upper bound on the wdf of `term` across the collection.
    fn wdf_upper_bound(&self, term: &str) -> TermCount;

    /// Whether this sub-database stores positional information.
    fn has_positions(&self) -> bool;

    /// Number of documents indexed by `term` (0 if unseen).
    fn term_freq(&self, term: &str) -> DocCount;

    /// Posting list for `term`, if the term occurs at all.
    fn postings(&self, term: &str) -> Option<Arc<PostingList>>;

    /// The full document-id universe of this sub-database.
    fn doc_ids(&self) -> RoaringTreemap;

    /// Value stored for `doc_id` in `slot`, if any.
    fn value(&self, doc_id: DocId, slot: ValueSlot) -> Option<String>;

    /// Documents carrying a value in `slot`, in ascending doc-id order.
    fn value_slot_docs(&self, slot: ValueSlot) -> Vec<DocId>;
}

/// Read-only view handed to external posting sources.
///
/// Sources get statistics access but no way to reach the index internals.
#[derive(Clone)]
pub struct ConstDatabaseView {
    db: Arc<dyn Database>,
}

impl ConstDatabaseView {
    pub fn new(db: Arc<dyn Database>) -> Self {
        ConstDatabaseView { db }
    }

    pub fn doc_count(&self) -> DocCount {
        self.db.doc_count()
    }

    pub fn total_length(&self) -> u64 {
        self.db.total_length()
    }

    pub fn doc_length(&self, doc_id: DocId) -> TermCount {
        self.db.doc_length(doc_id)
    }

    pub fn term_freq(&self, term: &str) -> DocCount {
        self.db.term_freq(term)
    }

    pub fn value(&self, doc_id: DocId, slot: ValueSlot) -> Option<String> {
        self.db.value(doc_id, slot)
    }

    pub fn doc_ids(&self) -> RoaringTreemap {
        self.db.doc_ids()
    }
}
