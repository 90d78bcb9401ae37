pub mod alldocs;
pub mod and_maybe;
pub mod and_not;
pub mod empty;
pub mod external;
pub mod multiand;
pub mod near;
pub mod or;
pub mod phrase;
pub mod synonym;
pub mod term;
pub mod value;
pub mod xor;

use std::sync::Arc;
use crate::core::error::Result;
use crate::core::types::{DocCount, DocId, TermCount};
use crate::index::posting::PostingList;

/// Document iterator with scoring hooks, the unit the optimiser composes.
///
/// Iteration contract:
/// - A fresh postlist is unpositioned; the first `next` (or `skip_to`)
///   positions it at its first match.
/// - `skip_to(d)` positions at the first match with doc id >= `d`; it never
///   moves backwards and is a no-op on a postlist already at or past `d`.
/// - `doc_id`, `weight` and `wdf` are only meaningful while positioned
///   (`at_end()` is false after at least one advance).
///
/// The termfreq methods and `maxweight` are planning estimates and valid
/// before any advance, except that `maxweight` may only be relied on after
/// `recalc_maxweight` has been called.
pub trait PostList {
    /// Lower bound on the number of documents this postlist can return.
    fn termfreq_min(&self) -> DocCount;

    /// Cheap estimate of the number of documents, used for tree planning.
    fn termfreq_est(&self) -> DocCount;

    /// Upper bound on the number of documents.
    fn termfreq_max(&self) -> DocCount;

    /// Upper bound on the weight contribution of any single document.
    fn maxweight(&self) -> f64;

    /// Recompute and return the maxweight bound.
    fn recalc_maxweight(&mut self) -> f64;

    fn next(&mut self) -> Result<()>;

    fn skip_to(&mut self, doc_id: DocId) -> Result<()>;

    fn at_end(&self) -> bool;

    fn doc_id(&self) -> DocId;

    fn weight(&self) -> f64;

    /// Within-document frequency at the current document; composite lists
    /// report the sum over their matching children.
    fn wdf(&self) -> TermCount;

    /// Positional handle for leaves backed by a term's postings. Composite
    /// postlists return None.
    fn position_terms(&self) -> Option<PositionTerm> {
        None
    }

    /// Compact textual form for tracing and tests.
    fn describe(&self) -> String;
}

/// Cheap positional handle for one constituent term of a NEAR/PHRASE filter.
///
/// Cloned out of the flat child list before the conjunction takes ownership
/// of the child postlists; the posting data itself is shared.
#[derive(Clone)]
pub struct PositionTerm {
    pub term: String,
    pub postings: Arc<PostingList>,
}

impl PositionTerm {
    pub fn positions(&self, doc_id: DocId) -> Option<&[u32]> {
        self.postings.positions(doc_id)
    }
}
