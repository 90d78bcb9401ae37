use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use parking_lot::RwLock;
use roaring::RoaringTreemap;
use crate::core::database::Database;
use crate::core::types::{DocCount, DocId, TermCount, ValueSlot};
use crate::index::posting::{Posting, PostingList};

/// In-memory sub-database.
///
/// Writers feed documents in through `index_document` / `set_value`; the
/// matcher side only goes through the `Database` trait. Shared behind `Arc`
/// so several matches can run against the same shard.
pub struct MemoryDatabase {
    inner: RwLock<Inner>,
    store_positions: bool,
}

#[derive(Default)]
struct Inner {
    postings: HashMap<String, Arc<PostingList>>,
    doc_lengths: HashMap<DocId, TermCount>,
    doc_ids: RoaringTreemap,
    values: HashMap<ValueSlot, BTreeMap<DocId, String>>,
    total_length: u64,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::with_positions(true)
    }

    /// `store_positions = false` models a backend indexed without positional
    /// information.
    pub fn with_positions(store_positions: bool) -> Self {
        MemoryDatabase {
            inner: RwLock::new(Inner::default()),
            store_positions,
        }
    }

    /// Index one document from its token stream, given as (term, position)
    /// pairs in token order.
    pub fn index_document(&self, doc_id: DocId, tokens: &[(&str, u32)]) {
        let mut term_positions: HashMap<&str, Vec<u32>> = HashMap::new();
        for (term, position) in tokens {
            term_positions.entry(term).or_default().push(*position);
        }

        let mut inner = self.inner.write();
        for (term, mut positions) in term_positions {
            positions.sort_unstable();
            let posting = Posting {
                doc_id,
                wdf: positions.len() as TermCount,
                positions: if self.store_positions { positions } else { Vec::new() },
            };
            let list = inner
                .postings
                .entry(term.to_string())
                .or_insert_with(|| Arc::new(PostingList::new()));
            Arc::make_mut(list).add_posting(posting);
        }

        if inner.doc_ids.insert(doc_id.0) {
            inner.total_length += tokens.len() as u64;
            inner.doc_lengths.insert(doc_id, tokens.len() as TermCount);
        }
    }

    pub fn set_value(&self, doc_id: DocId, slot: ValueSlot, value: &str) {
        let mut inner = self.inner.write();
        inner
            .values
            .entry(slot)
            .or_default()
            .insert(doc_id, value.to_string());
        inner.doc_ids.insert(doc_id.0);
    }
}

impl Default for MemoryDatabase {
    fn default() -> Self {
        Self::new()
    }
}

impl Database for MemoryDatabase {
    fn doc_count(&self) -> DocCount {
        self.inner.read().doc_ids.len()
    }

    fn total_length(&self) -> u64 {
        self.inner.read().total_length
    }

    fn doc_length(&self, doc_id: DocId) -> TermCount {
        self.inner.read().doc_lengths.get(&doc_id).copied().unwrap_or(0)
    }

    fn doc_length_lower_bound(&self) -> TermCount {
        self.inner
            .read()
            .doc_lengths
            .values()
            .copied()
            .min()
            .unwrap_or(1)
            .max(1)
    }

    fn doc_length_upper_bound(&self) -> TermCount {
        self.inner
            .read()
            .doc_lengths
            .values()
            .copied()
            .max()
            .unwrap_or(1)
            .max(1)
    }

    fn wdf_upper_bound(&self, term: &str) -> TermCount {
        self.inner
            .read()
            .postings
            .get(term)
            .map(|list| list.wdf_upper_bound())
            .unwrap_or(0)
    }

    fn has_positions(&self) -> bool {
        self.store_positions
    }

    fn term_freq(&self, term: &str) -> DocCount {
        self.inner
            .read()
            .postings
            .get(term)
            .map(|list| list.doc_freq())
            .unwrap_or(0)
    }

    fn postings(&self, term: &str) -> Option<Arc<PostingList>> {
        self.inner.read().postings.get(term).cloned()
    }

    fn doc_ids(&self) -> RoaringTreemap {
        self.inner.read().doc_ids.clone()
    }

    fn value(&self, doc_id: DocId, slot: ValueSlot) -> Option<String> {
        self.inner
            .read()
            .values
            .get(&slot)
            .and_then(|slot_values| slot_values.get(&doc_id).cloned())
    }

    fn value_slot_docs(&self, slot: ValueSlot) -> Vec<DocId> {
        self.inner
            .read()
            .values
            .get(&slot)
            .map(|slot_values| slot_values.keys().copied().collect())
            .unwrap_or_default()
    }
}
