use serde::{Serialize, Deserialize};
use crate::core::types::{DocCount, DocId, TermCount};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Posting {
    pub doc_id: DocId,
    pub wdf: TermCount,       // Within-document frequency
    pub positions: Vec<u32>,  // Token positions for phrase and near matching
}

/// Posting list for a term
/// Note: Sorted by doc_id for efficient merging
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostingList {
    pub postings: Vec<Posting>,  // Sorted by doc_id
}

impl PostingList {
    pub fn new() -> Self {
        PostingList {
            postings: Vec::new(),
        }
    }

    pub fn add_posting(&mut self, posting: Posting) {
        // Keep sorted by doc_id for efficient merging
        match self.postings.binary_search_by_key(&posting.doc_id.0, |p| p.doc_id.0) {
            Ok(pos) => {
                self.postings[pos] = posting;
            }
            Err(pos) => {
                self.postings.insert(pos, posting);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.postings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.postings.is_empty()
    }

    pub fn doc_freq(&self) -> DocCount {
        self.postings.len() as DocCount
    }

    /// Total occurrences of the term across all documents.
    pub fn collection_freq(&self) -> u64 {
        self.postings.iter().map(|p| p.wdf as u64).sum()
    }

    pub fn wdf_upper_bound(&self) -> TermCount {
        self.postings.iter().map(|p| p.wdf).max().unwrap_or(0)
    }

    /// Positions of the term in one document, if it occurs there.
    pub fn positions(&self, doc_id: DocId) -> Option<&[u32]> {
        self.postings
            .binary_search_by_key(&doc_id.0, |p| p.doc_id.0)
            .ok()
            .map(|pos| self.postings[pos].positions.as_slice())
    }

    /// Index of the first posting with doc_id >= `doc_id`, starting the
    /// search at `from`.
    pub fn first_at_or_after(&self, from: usize, doc_id: DocId) -> usize {
        match self.postings[from..].binary_search_by_key(&doc_id.0, |p| p.doc_id.0) {
            Ok(pos) => from + pos,
            Err(pos) => from + pos,
        }
    }
}
