//! Query predicates understood by every node store.
//!
//! A [`Query`] is a conjunction of [`Filter`]s plus a result order. Stores are
//! free to translate filters into whatever their engine speaks, but
//! [`Filter::matches`] is the reference semantics they must agree with.

use crate::node::{ID, NodeRecord};
use crate::path::AncestryPath;

/// Numeric comparison used by depth and position filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Lt,
    Le,
    Eq,
    Ge,
    Gt,
}

impl Comparison {
    /// Evaluate `lhs <op> rhs`.
    pub fn test(self, lhs: i64, rhs: i64) -> bool {
        match self {
            Comparison::Lt => lhs < rhs,
            Comparison::Le => lhs <= rhs,
            Comparison::Eq => lhs == rhs,
            Comparison::Ge => lhs >= rhs,
            Comparison::Gt => lhs > rhs,
        }
    }
}

/// A single predicate over a stored node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    IdEq(ID),
    IdNe(ID),
    IdIn(Vec<ID>),
    /// Path equal to the given one.
    PathEq(AncestryPath),
    /// Path equal to, or structurally prefixed by, the given one.
    PathWithin(AncestryPath),
    /// Cached depth compared against a value.
    Depth(Comparison, i64),
    /// Sibling position compared against a value.
    Position(Comparison, i64),
    /// Matches when any inner filter matches.
    Any(Vec<Filter>),
}

impl Filter {
    pub fn matches<T>(&self, record: &NodeRecord<T>) -> bool {
        match self {
            Filter::IdEq(id) => record.id == *id,
            Filter::IdNe(id) => record.id != *id,
            Filter::IdIn(ids) => ids.contains(&record.id),
            Filter::PathEq(path) => record.ancestry == *path,
            Filter::PathWithin(prefix) => record.ancestry.starts_with(prefix),
            Filter::Depth(cmp, depth) => cmp.test(record.ancestry_depth as i64, *depth),
            Filter::Position(cmp, position) => cmp.test(record.position, *position),
            Filter::Any(filters) => filters.iter().any(|f| f.matches(record)),
        }
    }
}

/// Result ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Order of first insertion into the store.
    #[default]
    Insertion,
    /// Ascending sibling position, ties broken by insertion order.
    Position,
}

/// A conjunction of filters with a result order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Query {
    filters: Vec<Filter>,
    order: SortOrder,
}

impl Query {
    /// A query matching every node.
    pub fn new() -> Self {
        Self::default()
    }

    /// Narrow the query with another filter.
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn order_by(mut self, order: SortOrder) -> Self {
        self.order = order;
        self
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn order(&self) -> SortOrder {
        self.order
    }

    /// True when every filter matches.
    pub fn matches<T>(&self, record: &NodeRecord<T>) -> bool {
        self.filters.iter().all(|f| f.matches(record))
    }
}
