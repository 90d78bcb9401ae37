use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::sync::Arc;
use tracing::{debug, trace};
use crate::core::database::{ConstDatabaseView, Database};
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::types::{DocCount, TermCount};
use crate::matcher::notifier::MatchNotifier;
use crate::matcher::stats::CollectionStats;
use crate::matcher::submatch::PostListFactory;
use crate::postlist::and_maybe::AndMaybePostList;
use crate::postlist::and_not::AndNotPostList;
use crate::postlist::empty::EmptyPostList;
use crate::postlist::external::ExternalPostList;
use crate::postlist::multiand::MultiAndPostList;
use crate::postlist::near::NearPostList;
use crate::postlist::or::OrPostList;
use crate::postlist::phrase::{ExactPhrasePostList, PhrasePostList};
use crate::postlist::value::{ValueGePostList, ValueRangePostList};
use crate::postlist::xor::XorPostList;
use crate::postlist::{PositionTerm, PostList};
use crate::query::ast::QueryNode;

/// Converts a query expression tree into the postlist tree the matcher
/// iterates.
///
/// The weight `factor` threads through every rewrite; a factor of 0 means
/// the subtree's weights will never be read, so leaves are built match-only.
pub struct QueryOptimiser<'a> {
    matcher: Arc<MatchNotifier>,
    db: Arc<dyn Database>,
    db_size: DocCount,
    submatch: &'a dyn PostListFactory,
    stats: &'a CollectionStats,
}

#[derive(Clone, Copy)]
enum AndKind {
    And,
    Filter,
    Near(TermCount),
    Phrase(TermCount),
}

#[derive(Clone, Copy)]
enum OrKind {
    Or,
    Xor,
    Elite(usize),
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum PosKind {
    Near,
    Phrase,
}

/// Deferred positional constraint, indexing into the flat child list of the
/// enclosing conjunction.
struct PosFilter {
    kind: PosKind,
    begin: usize,
    end: usize,
    window: TermCount,
}

impl<'a> QueryOptimiser<'a> {
    pub fn new(
        matcher: Arc<MatchNotifier>,
        db: Arc<dyn Database>,
        db_size: DocCount,
        submatch: &'a dyn PostListFactory,
        stats: &'a CollectionStats,
    ) -> Self {
        debug!(stats = %stats.describe(), db_size, "optimiser ready");
        QueryOptimiser {
            matcher,
            db,
            db_size,
            submatch,
            stats,
        }
    }

    pub fn stats(&self) -> &CollectionStats {
        self.stats
    }

    /// Build the postlist tree for `query`, never returning null: an empty
    /// subtree comes back as an `EmptyPostList`.
    pub fn optimise(&self, query: &QueryNode, factor: f64) -> Result<Box<dyn PostList>> {
        trace!(factor, query = %query, "optimise subquery");

        match query {
            QueryNode::MatchNothing => Ok(Box::new(EmptyPostList)),

            QueryNode::Leaf { term, wqf } => self.do_leaf(term, *wqf, factor),

            QueryNode::External(source) => {
                let view = ConstDatabaseView::new(Arc::clone(&self.db));
                Ok(Box::new(ExternalPostList::new(view, source.as_ref(), factor)))
            }

            QueryNode::And(children) => self.do_and_like(AndKind::And, children, factor),
            QueryNode::Filter(children) => self.do_and_like(AndKind::Filter, children, factor),
            QueryNode::Near { window, children } => {
                self.do_and_like(AndKind::Near(*window), children, factor)
            }
            QueryNode::Phrase { window, children } => {
                self.do_and_like(AndKind::Phrase(*window), children, factor)
            }

            QueryNode::Or(children) => self.do_or_like(OrKind::Or, children, factor),
            QueryNode::Xor(children) => self.do_or_like(OrKind::Xor, children, factor),
            QueryNode::EliteSet { size, children } => {
                self.do_or_like(OrKind::Elite(*size), children, factor)
            }

            QueryNode::Synonym { children, .. } => self.do_synonym(children, factor),

            QueryNode::AndNot(left, right) => {
                let l = self.optimise(left, factor)?;
                let r = self.optimise(right, 0.0)?;
                Ok(Box::new(AndNotPostList::new(
                    l,
                    r,
                    Arc::clone(&self.matcher),
                    self.db_size,
                )))
            }

            QueryNode::AndMaybe(left, right) => {
                let l = self.optimise(left, factor)?;
                let r = self.optimise(right, factor)?;
                Ok(Box::new(AndMaybePostList::new(
                    l,
                    r,
                    Arc::clone(&self.matcher),
                    self.db_size,
                )))
            }

            QueryNode::ValueRange { slot, begin, end } => Ok(Box::new(ValueRangePostList::new(
                Arc::clone(&self.db),
                *slot,
                begin.clone(),
                end.clone(),
            ))),

            QueryNode::ValueGe { slot, begin } => Ok(Box::new(ValueGePostList::new(
                Arc::clone(&self.db),
                *slot,
                begin.clone(),
            ))),

            QueryNode::ValueLe { slot, end } => Ok(Box::new(ValueRangePostList::new(
                Arc::clone(&self.db),
                *slot,
                String::new(),
                end.clone(),
            ))),

            QueryNode::ScaleWeight { factor: scale, child } => {
                debug_assert!(*scale >= 0.0);
                let sub_factor = if factor == 0.0 { 0.0 } else { factor * scale };
                self.optimise(child, sub_factor)
            }
        }
    }

    fn do_leaf(&self, term: &str, wqf: TermCount, factor: f64) -> Result<Box<dyn PostList>> {
        // An empty term matches everything and never scores.
        let factor = if term.is_empty() { 0.0 } else { factor };
        self.submatch.leaf_postlist(term, wqf, factor)
    }

    /// Multi-way conjunction with deferred positional constraints.
    fn do_and_like(
        &self,
        kind: AndKind,
        children: &[QueryNode],
        factor: f64,
    ) -> Result<Box<dyn PostList>> {
        let mut plists: Vec<Box<dyn PostList>> = Vec::new();
        let mut pos_filters: Vec<PosFilter> = Vec::new();
        self.flatten_and_like(kind, children, factor, &mut plists, &mut pos_filters)?;
        debug_assert!(plists.len() >= 2);

        // Copy out the positional handles before the conjunction takes
        // ownership of the flat list; the posting data is shared, not the
        // postlists themselves.
        let mut prepared = Vec::with_capacity(pos_filters.len());
        for filter in &pos_filters {
            let mut terms: Vec<PositionTerm> = Vec::with_capacity(filter.end - filter.begin);
            for pl in &plists[filter.begin..filter.end] {
                match pl.position_terms() {
                    Some(term) => terms.push(term),
                    None => {
                        return Err(Error::new(
                            ErrorKind::UnsupportedQuery,
                            "positional operator over a non-term subquery".to_string(),
                        ))
                    }
                }
            }
            prepared.push((filter.kind, filter.window, terms));
        }

        let mut pl: Box<dyn PostList> = Box::new(MultiAndPostList::new(
            plists,
            Arc::clone(&self.matcher),
            self.db_size,
        ));

        // Apply the positional filters above the conjunction, in the order
        // they were recorded.
        for (kind, window, terms) in prepared {
            pl = match kind {
                PosKind::Near => Box::new(NearPostList::new(pl, window, terms)),
                PosKind::Phrase if window as usize == terms.len() => {
                    Box::new(ExactPhrasePostList::new(pl, terms))
                }
                PosKind::Phrase => Box::new(PhrasePostList::new(pl, window, terms)),
            };
        }

        Ok(pl)
    }

    /// Left-linear flatten: AND-family children are inlined rather than
    /// built as black boxes, transitively.
    fn flatten_and_like(
        &self,
        kind: AndKind,
        children: &[QueryNode],
        factor: f64,
        plists: &mut Vec<Box<dyn PostList>>,
        pos_filters: &mut Vec<PosFilter>,
    ) -> Result<()> {
        debug_assert!(children.len() >= 2);
        trace!(factor, arity = children.len(), "and-like subtree");

        // Without positional data a PHRASE/NEAR degrades to a plain AND:
        // matching a superset beats matching nothing.
        let positional = match kind {
            AndKind::Near(_) | AndKind::Phrase(_) => self.db.has_positions(),
            _ => false,
        };

        let begin = plists.len();
        for (i, subq) in children.iter().enumerate() {
            // The second branch of a FILTER is always match-only.
            let child_factor = if i == 1 && matches!(kind, AndKind::Filter) {
                0.0
            } else {
                factor
            };

            match subq {
                QueryNode::And(sub) => {
                    self.flatten_and_like(AndKind::And, sub, child_factor, plists, pos_filters)?
                }
                QueryNode::Filter(sub) => {
                    self.flatten_and_like(AndKind::Filter, sub, child_factor, plists, pos_filters)?
                }
                QueryNode::Near { window, children: sub } => self.flatten_and_like(
                    AndKind::Near(*window),
                    sub,
                    child_factor,
                    plists,
                    pos_filters,
                )?,
                QueryNode::Phrase { window, children: sub } => self.flatten_and_like(
                    AndKind::Phrase(*window),
                    sub,
                    child_factor,
                    plists,
                    pos_filters,
                )?,
                _ => plists.push(self.optimise(subq, child_factor)?),
            }
        }

        if positional {
            let (pos_kind, window) = match kind {
                AndKind::Near(w) => (PosKind::Near, w),
                AndKind::Phrase(w) => (PosKind::Phrase, w),
                AndKind::And | AndKind::Filter => unreachable!(),
            };
            pos_filters.push(PosFilter {
                kind: pos_kind,
                begin,
                end: plists.len(),
                window,
            });
        }

        Ok(())
    }

    /// Disjunction family: elite-set pruning, then a Huffman-style build so
    /// the rarest children sit deepest.
    fn do_or_like(
        &self,
        kind: OrKind,
        children: &[QueryNode],
        factor: f64,
    ) -> Result<Box<dyn PostList>> {
        debug_assert!(children.len() >= 2);
        trace!(factor, arity = children.len(), "or-like subtree");

        let mut postlists: Vec<Box<dyn PostList>> = Vec::with_capacity(children.len());
        for subq in children {
            postlists.push(self.optimise(subq, factor)?);
        }

        if let OrKind::Elite(size) = kind {
            debug_assert!(size > 0);
            if size > 0 && postlists.len() > size {
                // get_maxweight() is only valid once recalculated.
                for pl in postlists.iter_mut() {
                    pl.recalc_maxweight();
                }

                postlists.select_nth_unstable_by(size - 1, cmp_max_or_terms);
                // Dropping the tail releases the losing children.
                postlists.truncate(size);

                if size == 1 {
                    if let Some(single) = postlists.pop() {
                        return Ok(single);
                    }
                }
            }
        }

        // Heap the children so the lowest-frequency pair is always at hand;
        // combining the two rarest at each step mirrors an optimal prefix
        // code and minimises advance work in the worst case.
        let mut seq: u64 = 0;
        let mut heap: BinaryHeap<Reverse<HeapEntry>> = BinaryHeap::with_capacity(postlists.len());
        for pl in postlists {
            heap.push(Reverse(HeapEntry::new(pl, seq)));
            seq += 1;
        }

        loop {
            let r = match heap.pop() {
                Some(Reverse(entry)) => entry,
                None => return Ok(Box::new(EmptyPostList)),
            };
            let l = match heap.pop() {
                Some(Reverse(entry)) => entry,
                None => return Ok(r.pl),
            };
            debug_assert!(l.est >= r.est);

            // Every binary node keeps l.termfreq_est() >= r.termfreq_est();
            // the OR/XOR iterators assume it.
            let combined: Box<dyn PostList> = match kind {
                OrKind::Xor => Box::new(XorPostList::new(
                    l.pl,
                    r.pl,
                    Arc::clone(&self.matcher),
                    self.db_size,
                )),
                OrKind::Or | OrKind::Elite(_) => Box::new(OrPostList::new(
                    l.pl,
                    r.pl,
                    Arc::clone(&self.matcher),
                    self.db_size,
                )),
            };

            if heap.is_empty() {
                return Ok(combined);
            }
            heap.push(Reverse(HeapEntry::new(combined, seq)));
            seq += 1;
        }
    }

    /// A synonym's children only contribute matches; the group itself is
    /// weighted as one term.
    fn do_synonym(&self, children: &[QueryNode], factor: f64) -> Result<Box<dyn PostList>> {
        if factor == 0.0 {
            // Weights are never read, so a plain OR is enough.
            return self.do_or_like(OrKind::Or, children, 0.0);
        }

        // TODO: decide what role the group's wqf should play; it is ignored
        // for now.
        let inner = self.do_or_like(OrKind::Or, children, 0.0)?;
        self.submatch.synonym_postlist(inner, factor)
    }
}

/// Heap entry for the Huffman build. Orders ascending by estimated term
/// frequency, then by insertion sequence so ties are stable and the build
/// deterministic.
struct HeapEntry {
    est: DocCount,
    seq: u64,
    pl: Box<dyn PostList>,
}

impl HeapEntry {
    fn new(pl: Box<dyn PostList>, seq: u64) -> Self {
        HeapEntry {
            est: pl.termfreq_est(),
            seq,
            pl,
        }
    }
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.est == other.est && self.seq == other.seq
    }
}

impl Eq for HeapEntry {}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.est.cmp(&other.est).then(self.seq.cmp(&other.seq))
    }
}

/// Elite-set ordering: best weight bound first, with postlists that cannot
/// match anything sorted last regardless of their bound.
fn cmp_max_or_terms(a: &Box<dyn PostList>, b: &Box<dyn PostList>) -> Ordering {
    match (a.termfreq_max() == 0, b.termfreq_max() == 0) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => {
            let a_wt = stored_weight(a.maxweight());
            let b_wt = stored_weight(b.maxweight());
            b_wt.partial_cmp(&a_wt).unwrap_or(Ordering::Equal)
        }
    }
}

/// Round a weight bound to IEEE double width by forcing it through memory.
///
/// On targets that keep intermediates in extended-precision registers, one
/// comparand can be spilled while the other is not; comparing the raw values
/// can then order `a > b` and `b > a` at once and break the strict weak
/// ordering the partial select needs.
#[inline(never)]
fn stored_weight(weight: f64) -> f64 {
    let slot = weight;
    // SAFETY: `slot` is a live, initialized stack local.
    unsafe { std::ptr::read_volatile(&slot) }
}
