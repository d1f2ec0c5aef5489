//! Lazy node queries and depth filters.
//!
//! A [`NodeQuery`] is a store query that has not run yet. Tree views hand them
//! out so callers can keep narrowing before anything touches the store.
//!
//! A [`DepthQuery`] additionally remembers the depth of the node it was derived
//! from (for example the node whose descendants it selects). Relative depth
//! filters resolve against that reference depth, and every filter applied to a
//! `DepthQuery` keeps the original reference, so
//! `from_relative_depth(1)?.to_relative_depth(2)?` means "one to two levels
//! below the reference" whatever order the filters are chained in.

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use crate::Result;
use crate::node::{ID, Node, NodeRecord};
use crate::path::AncestryPath;
use crate::store::{Comparison, Filter, NodeStore, Query, SortOrder};

use super::TreeError;

/// A lazily evaluated query over the nodes of one tree.
pub struct NodeQuery<T> {
    store: Arc<dyn NodeStore<T>>,
    query: Query,
    cache_depth: bool,
}

impl<T> NodeQuery<T> {
    pub(crate) fn new(store: Arc<dyn NodeStore<T>>, query: Query, cache_depth: bool) -> Self {
        Self {
            store,
            query,
            cache_depth,
        }
    }

    /// The underlying store query.
    pub fn query(&self) -> &Query {
        &self.query
    }

    /// Narrow with an arbitrary store filter.
    pub fn filter(mut self, filter: Filter) -> Self {
        self.query = self.query.filter(filter);
        self
    }

    pub fn order_by(mut self, order: SortOrder) -> Self {
        self.query = self.query.order_by(order);
        self
    }

    /// Only nodes without ancestors. Works whether or not depth is cached.
    pub fn roots(self) -> Self {
        self.filter(Filter::PathEq(AncestryPath::root()))
    }

    /// Nodes with cached depth `< depth`.
    pub fn before_depth(self, depth: i64) -> Result<Self> {
        self.depth_filter("before_depth", Comparison::Lt, depth)
    }

    /// Nodes with cached depth `<= depth`.
    pub fn to_depth(self, depth: i64) -> Result<Self> {
        self.depth_filter("to_depth", Comparison::Le, depth)
    }

    /// Nodes with cached depth `== depth`.
    pub fn at_depth(self, depth: i64) -> Result<Self> {
        self.depth_filter("at_depth", Comparison::Eq, depth)
    }

    /// Nodes with cached depth `>= depth`.
    pub fn from_depth(self, depth: i64) -> Result<Self> {
        self.depth_filter("from_depth", Comparison::Ge, depth)
    }

    /// Nodes with cached depth `> depth`.
    pub fn after_depth(self, depth: i64) -> Result<Self> {
        self.depth_filter("after_depth", Comparison::Gt, depth)
    }

    fn depth_filter(self, filter: &'static str, cmp: Comparison, depth: i64) -> Result<Self> {
        if !self.cache_depth {
            return Err(TreeError::DepthCachingDisabled { filter }.into());
        }
        Ok(self.filter(Filter::Depth(cmp, depth)))
    }

    /// Attach a reference depth for relative filtering.
    pub fn with_reference_depth(self, reference_depth: usize) -> DepthQuery<T> {
        DepthQuery {
            inner: self,
            reference_depth,
        }
    }

    /// Run the query and return raw records.
    pub fn records(&self) -> Result<Vec<NodeRecord<T>>> {
        self.store.find(&self.query)
    }

    /// Run the query.
    pub fn all(&self) -> Result<Vec<Node<T>>> {
        Ok(self.records()?.into_iter().map(Node::from_record).collect())
    }

    pub fn ids(&self) -> Result<Vec<ID>> {
        Ok(self.records()?.into_iter().map(|r| r.id).collect())
    }

    pub fn count(&self) -> Result<usize> {
        self.store.count(&self.query)
    }

    pub fn exists(&self) -> Result<bool> {
        Ok(self.count()? > 0)
    }

    pub fn first(&self) -> Result<Option<Node<T>>> {
        Ok(self.records()?.into_iter().next().map(Node::from_record))
    }

    pub fn last(&self) -> Result<Option<Node<T>>> {
        Ok(self.records()?.into_iter().last().map(Node::from_record))
    }
}

impl<T> Clone for NodeQuery<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            query: self.query.clone(),
            cache_depth: self.cache_depth,
        }
    }
}

impl<T> fmt::Debug for NodeQuery<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeQuery")
            .field("query", &self.query)
            .field("cache_depth", &self.cache_depth)
            .finish()
    }
}

/// A [`NodeQuery`] annotated with a fixed reference depth.
pub struct DepthQuery<T> {
    inner: NodeQuery<T>,
    reference_depth: usize,
}

impl<T> DepthQuery<T> {
    /// The depth relative filters resolve against. Fixed at construction.
    pub fn reference_depth(&self) -> usize {
        self.reference_depth
    }

    /// Drop the reference depth.
    pub fn into_inner(self) -> NodeQuery<T> {
        self.inner
    }

    fn map(self, f: impl FnOnce(NodeQuery<T>) -> Result<NodeQuery<T>>) -> Result<Self> {
        let reference_depth = self.reference_depth;
        Ok(DepthQuery {
            inner: f(self.inner)?,
            reference_depth,
        })
    }

    fn absolute(&self, relative_depth: i64) -> i64 {
        self.reference_depth as i64 + relative_depth
    }

    pub fn filter(self, filter: Filter) -> Self {
        DepthQuery {
            inner: self.inner.filter(filter),
            reference_depth: self.reference_depth,
        }
    }

    pub fn order_by(self, order: SortOrder) -> Self {
        DepthQuery {
            inner: self.inner.order_by(order),
            reference_depth: self.reference_depth,
        }
    }

    pub fn roots(self) -> Self {
        self.filter(Filter::PathEq(AncestryPath::root()))
    }

    pub fn before_depth(self, depth: i64) -> Result<Self> {
        self.map(|q| q.before_depth(depth))
    }

    pub fn to_depth(self, depth: i64) -> Result<Self> {
        self.map(|q| q.to_depth(depth))
    }

    pub fn at_depth(self, depth: i64) -> Result<Self> {
        self.map(|q| q.at_depth(depth))
    }

    pub fn from_depth(self, depth: i64) -> Result<Self> {
        self.map(|q| q.from_depth(depth))
    }

    pub fn after_depth(self, depth: i64) -> Result<Self> {
        self.map(|q| q.after_depth(depth))
    }

    /// Nodes shallower than `reference + relative_depth`.
    pub fn before_relative_depth(self, relative_depth: i64) -> Result<Self> {
        let depth = self.absolute(relative_depth);
        self.before_depth(depth)
    }

    /// Nodes no deeper than `reference + relative_depth`.
    pub fn to_relative_depth(self, relative_depth: i64) -> Result<Self> {
        let depth = self.absolute(relative_depth);
        self.to_depth(depth)
    }

    /// Nodes exactly at `reference + relative_depth`.
    pub fn at_relative_depth(self, relative_depth: i64) -> Result<Self> {
        let depth = self.absolute(relative_depth);
        self.at_depth(depth)
    }

    /// Nodes at least as deep as `reference + relative_depth`.
    pub fn from_relative_depth(self, relative_depth: i64) -> Result<Self> {
        let depth = self.absolute(relative_depth);
        self.from_depth(depth)
    }

    /// Nodes deeper than `reference + relative_depth`.
    pub fn after_relative_depth(self, relative_depth: i64) -> Result<Self> {
        let depth = self.absolute(relative_depth);
        self.after_depth(depth)
    }
}

impl<T> Deref for DepthQuery<T> {
    type Target = NodeQuery<T>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl<T> Clone for DepthQuery<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            reference_depth: self.reference_depth,
        }
    }
}

impl<T> fmt::Debug for DepthQuery<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DepthQuery")
            .field("inner", &self.inner)
            .field("reference_depth", &self.reference_depth)
            .finish()
    }
}
