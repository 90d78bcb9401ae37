use std::fmt;
use std::sync::Arc;
use crate::core::types::{TermCount, ValueSlot};
use crate::postlist::external::PostingSource;

/// Query expression tree handed to the matcher.
///
/// One variant per operator, carrying only the fields that operator needs.
/// Arity rules the matcher relies on:
/// - n-ary operators (`And`, `Or`, `Xor`, `Filter`, `Near`, `Phrase`,
///   `EliteSet`, `Synonym`) have at least 2 children;
/// - `AndNot` / `AndMaybe` are structurally binary;
/// - `ScaleWeight` has a single child and a non-negative factor.
#[derive(Debug, Clone)]
pub enum QueryNode {
    /// Matches no documents.
    MatchNothing,
    /// Single term; an empty term matches every document without scoring.
    Leaf { term: String, wqf: TermCount },
    And(Vec<QueryNode>),
    Or(Vec<QueryNode>),
    Xor(Vec<QueryNode>),
    /// First child scored, second child match-only.
    Filter(Vec<QueryNode>),
    Near { window: TermCount, children: Vec<QueryNode> },
    Phrase { window: TermCount, children: Vec<QueryNode> },
    /// Keep only the `size` best-weighted children.
    EliteSet { size: usize, children: Vec<QueryNode> },
    Synonym { children: Vec<QueryNode>, wqf: TermCount },
    AndNot(Box<QueryNode>, Box<QueryNode>),
    AndMaybe(Box<QueryNode>, Box<QueryNode>),
    ScaleWeight { factor: f64, child: Box<QueryNode> },
    ValueRange { slot: ValueSlot, begin: String, end: String },
    ValueGe { slot: ValueSlot, begin: String },
    ValueLe { slot: ValueSlot, end: String },
    External(Arc<dyn PostingSource>),
}

impl QueryNode {
    pub fn term(term: &str) -> Self {
        QueryNode::Leaf { term: term.to_string(), wqf: 1 }
    }

    pub fn term_with_wqf(term: &str, wqf: TermCount) -> Self {
        QueryNode::Leaf { term: term.to_string(), wqf }
    }

    pub fn and(children: Vec<QueryNode>) -> Self {
        debug_assert!(children.len() >= 2);
        QueryNode::And(children)
    }

    pub fn or(children: Vec<QueryNode>) -> Self {
        debug_assert!(children.len() >= 2);
        QueryNode::Or(children)
    }

    pub fn xor(children: Vec<QueryNode>) -> Self {
        debug_assert!(children.len() >= 2);
        QueryNode::Xor(children)
    }

    pub fn filter(children: Vec<QueryNode>) -> Self {
        debug_assert!(children.len() >= 2);
        QueryNode::Filter(children)
    }

    pub fn near(window: TermCount, children: Vec<QueryNode>) -> Self {
        debug_assert!(children.len() >= 2);
        QueryNode::Near { window, children }
    }

    pub fn phrase(window: TermCount, children: Vec<QueryNode>) -> Self {
        debug_assert!(children.len() >= 2);
        QueryNode::Phrase { window, children }
    }

    pub fn elite_set(size: usize, children: Vec<QueryNode>) -> Self {
        debug_assert!(size > 0);
        debug_assert!(children.len() >= 2);
        QueryNode::EliteSet { size, children }
    }

    pub fn synonym(children: Vec<QueryNode>) -> Self {
        debug_assert!(children.len() >= 2);
        QueryNode::Synonym { children, wqf: 0 }
    }

    pub fn and_not(left: QueryNode, right: QueryNode) -> Self {
        QueryNode::AndNot(Box::new(left), Box::new(right))
    }

    pub fn and_maybe(left: QueryNode, right: QueryNode) -> Self {
        QueryNode::AndMaybe(Box::new(left), Box::new(right))
    }

    pub fn scale(factor: f64, child: QueryNode) -> Self {
        debug_assert!(factor >= 0.0);
        QueryNode::ScaleWeight { factor, child: Box::new(child) }
    }

    /// True for the operators that flatten into a multi-way AND.
    pub fn is_and_like(&self) -> bool {
        matches!(
            self,
            QueryNode::And(_)
                | QueryNode::Filter(_)
                | QueryNode::Near { .. }
                | QueryNode::Phrase { .. }
        )
    }
}

fn join(f: &mut fmt::Formatter, children: &[QueryNode], sep: &str) -> fmt::Result {
    for (i, child) in children.iter().enumerate() {
        if i > 0 {
            write!(f, "{}", sep)?;
        }
        write!(f, "{}", child)?;
    }
    Ok(())
}

impl fmt::Display for QueryNode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            QueryNode::MatchNothing => write!(f, "<nothing>"),
            QueryNode::Leaf { term, .. } if term.is_empty() => write!(f, "<alldocs>"),
            QueryNode::Leaf { term, wqf } if *wqf != 1 => write!(f, "{}#{}", term, wqf),
            QueryNode::Leaf { term, .. } => write!(f, "{}", term),
            QueryNode::And(children) => {
                write!(f, "(")?;
                join(f, children, " AND ")?;
                write!(f, ")")
            }
            QueryNode::Or(children) => {
                write!(f, "(")?;
                join(f, children, " OR ")?;
                write!(f, ")")
            }
            QueryNode::Xor(children) => {
                write!(f, "(")?;
                join(f, children, " XOR ")?;
                write!(f, ")")
            }
            QueryNode::Filter(children) => {
                write!(f, "(")?;
                join(f, children, " FILTER ")?;
                write!(f, ")")
            }
            QueryNode::Near { window, children } => {
                write!(f, "(NEAR/{} ", window)?;
                join(f, children, " ")?;
                write!(f, ")")
            }
            QueryNode::Phrase { window, children } => {
                write!(f, "(PHRASE/{} ", window)?;
                join(f, children, " ")?;
                write!(f, ")")
            }
            QueryNode::EliteSet { size, children } => {
                write!(f, "(ELITE_SET/{} ", size)?;
                join(f, children, " ")?;
                write!(f, ")")
            }
            QueryNode::Synonym { children, .. } => {
                write!(f, "(SYN ")?;
                join(f, children, " ")?;
                write!(f, ")")
            }
            QueryNode::AndNot(left, right) => write!(f, "({} AND_NOT {})", left, right),
            QueryNode::AndMaybe(left, right) => write!(f, "({} AND_MAYBE {})", left, right),
            QueryNode::ScaleWeight { factor, child } => write!(f, "(SCALE/{} {})", factor, child),
            QueryNode::ValueRange { slot, begin, end } => {
                write!(f, "VALUE_RANGE {} {}..{}", slot, begin, end)
            }
            QueryNode::ValueGe { slot, begin } => write!(f, "VALUE_GE {} {}", slot, begin),
            QueryNode::ValueLe { slot, end } => write!(f, "VALUE_LE {} {}", slot, end),
            QueryNode::External(source) => write!(f, "(EXTERNAL {})", source.describe()),
        }
    }
}
