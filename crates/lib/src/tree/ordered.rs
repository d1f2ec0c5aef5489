//! Trees whose siblings are kept in an explicit, dense order.
//!
//! Every sibling group holds positions `0..n` with no gaps or duplicates.
//! New nodes and moved nodes are appended to their group, removals close the
//! gap they leave, and the explicit move operations shift the affected range
//! of siblings with atomic increments before writing the moved node.

use std::ops::Deref;
use std::sync::Arc;

use crate::Result;
use crate::node::{ID, Node};
use crate::path::AncestryPath;
use crate::store::{Comparison, Filter, NodeStore, NumericField, Query, SortOrder};

use super::{MoveObserver, MoveOutcome, NodeQuery, OrphanStrategy, Tree, TreeError, TreePolicy};

/// A [`Tree`] that maintains sibling positions.
///
/// All read-only views of [`Tree`] are available through `Deref`; queries
/// default to position order. `create`, `save` and `destroy` are overridden
/// here to keep positions dense, so always persist ordered nodes through this
/// type.
pub struct OrderedTree<T> {
    tree: Tree<T>,
}

impl<T> Clone for OrderedTree<T> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree.clone(),
        }
    }
}

impl<T> std::fmt::Debug for OrderedTree<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderedTree")
            .field("tree", &self.tree)
            .finish()
    }
}

impl<T> Deref for OrderedTree<T> {
    type Target = Tree<T>;

    fn deref(&self) -> &Self::Target {
        &self.tree
    }
}

/// Half-open or closed position window within one sibling group.
struct Window {
    lower: (Comparison, i64),
    upper: (Comparison, i64),
}

impl Window {
    /// `[lo, hi)`
    fn from_inclusive(lo: i64, hi: i64) -> Self {
        Self {
            lower: (Comparison::Ge, lo),
            upper: (Comparison::Lt, hi),
        }
    }

    /// `(lo, hi)`
    fn exclusive(lo: i64, hi: i64) -> Self {
        Self {
            lower: (Comparison::Gt, lo),
            upper: (Comparison::Lt, hi),
        }
    }

    /// `(lo, hi]`
    fn to_inclusive(lo: i64, hi: i64) -> Self {
        Self {
            lower: (Comparison::Gt, lo),
            upper: (Comparison::Le, hi),
        }
    }
}

impl<T> OrderedTree<T> {
    pub fn new(store: Arc<dyn NodeStore<T>>, policy: TreePolicy) -> Self {
        Self {
            tree: Tree::new(store, policy).with_default_order(SortOrder::Position),
        }
    }

    /// Register a move observer (builder style).
    pub fn with_observer(mut self, observer: Arc<dyn MoveObserver<T>>) -> Self {
        self.tree.add_observer(observer);
        self
    }

    /// The underlying unordered tree.
    pub fn tree(&self) -> &Tree<T> {
        &self.tree
    }

    /// Siblings after this node (larger position).
    ///
    /// Not guaranteed sorted unless the query order says so.
    pub fn lower_siblings(&self, node: &Node<T>) -> NodeQuery<T> {
        self.tree
            .siblings(node)
            .filter(Filter::Position(Comparison::Gt, node.position()))
    }

    /// Siblings before this node (smaller position).
    pub fn higher_siblings(&self, node: &Node<T>) -> NodeQuery<T> {
        self.tree
            .siblings(node)
            .filter(Filter::Position(Comparison::Lt, node.position()))
    }

    pub fn at_top(&self, node: &Node<T>) -> Result<bool> {
        Ok(!self.higher_siblings(node).exists()?)
    }

    pub fn at_bottom(&self, node: &Node<T>) -> Result<bool> {
        Ok(!self.lower_siblings(node).exists()?)
    }

    fn shift(&self, group: &AncestryPath, exclude: &ID, window: Window, delta: i64) -> Result<usize> {
        let query = Query::new()
            .filter(Filter::PathEq(group.clone()))
            .filter(Filter::IdNe(exclude.clone()))
            .filter(Filter::Position(window.lower.0, window.lower.1))
            .filter(Filter::Position(window.upper.0, window.upper.1));
        self.shift_matching(&query, delta)
    }

    fn shift_matching(&self, query: &Query, delta: i64) -> Result<usize> {
        let ids: Vec<ID> = self
            .tree
            .store()
            .find(query)?
            .into_iter()
            .map(|r| r.id)
            .collect();
        for id in &ids {
            self.tree
                .store()
                .increment(id, NumericField::Position, delta)?;
        }
        if !ids.is_empty() {
            tracing::debug!(shifted = ids.len(), delta, "Shifted sibling positions");
        }
        Ok(ids.len())
    }

    /// Pull sibling shifts made since the handle was loaded.
    fn refresh(&self, node: &mut Node<T>) -> Result<()> {
        let Some(id) = node.id().cloned() else {
            return Ok(());
        };
        if let Some(stored) = self.tree.store().find_by_id(&id)? {
            node.refresh_position(stored.position);
        }
        Ok(())
    }
}

fn require_id<'a, T>(node: &'a Node<T>, operation: &'static str) -> Result<&'a ID> {
    node.id()
        .ok_or_else(|| TreeError::NotPersisted { operation }.into())
}

impl<T: Clone> OrderedTree<T> {
    /// Build a node, stage its parent and save it at the end of its sibling group.
    ///
    /// # Errors
    /// [`TreeError::CreateVetoed`] if an observer declines the parent; nothing is written.
    pub fn create(&self, data: T, parent: Option<&Node<T>>) -> Result<Node<T>> {
        let mut node = self.tree.stage_new(data, parent)?;
        self.save(&mut node)?;
        Ok(node)
    }

    /// Persist the node, maintaining positions.
    ///
    /// A node without a position, or one that changed parent, is appended to
    /// its (new) sibling group. A node that left a group closes the gap behind
    /// it in the group it left. Sibling shifts applied to the stored record
    /// since the handle was loaded are kept unless the handle stages its own
    /// position.
    pub fn save(&self, node: &mut Node<T>) -> Result<()> {
        self.refresh(node)?;
        let moved = node.has_moved();

        if !node.has_position() || moved {
            let last = self
                .tree
                .siblings(node)
                .records()?
                .into_iter()
                .map(|r| r.position)
                .max();
            node.set_position(last.map_or(0, |p| p + 1));
        }

        if moved
            && let (Some(id), Some(old_path), Some(old_position)) =
                (node.id(), node.persisted_path(), node.persisted_position())
        {
            let former = Query::new()
                .filter(Filter::PathEq(old_path.clone()))
                .filter(Filter::IdNe(id.clone()))
                .filter(Filter::Position(Comparison::Gt, old_position));
            self.shift_matching(&former, -1)?;
        }

        self.tree.save(node)
    }

    /// Remove the node and close the gap it leaves among its siblings.
    ///
    /// Under [`OrphanStrategy::Rootify`] the promoted children are appended
    /// after the existing roots, keeping their relative order.
    pub fn destroy(&self, node: &Node<T>) -> Result<()> {
        let Some(stored) = node
            .id()
            .map(|id| self.tree.store().find_by_id(id))
            .transpose()?
            .flatten()
        else {
            return self.tree.destroy(node);
        };
        let (id, path, position) = (&stored.id, &stored.ancestry, stored.position);

        let root_offset = match self.tree.policy().orphan_strategy {
            OrphanStrategy::Rootify => {
                let last_root = self
                    .tree
                    .store()
                    .find(&Query::new().filter(Filter::PathEq(AncestryPath::root())))?
                    .into_iter()
                    .map(|r| r.position)
                    .max();
                Some(last_root.map_or(0, |p| p + 1))
            }
            _ => None,
        };

        if self.tree.destroy_with(node, root_offset)? {
            let lower = Query::new()
                .filter(Filter::PathEq(path.clone()))
                .filter(Filter::IdNe(id.clone()))
                .filter(Filter::Position(Comparison::Gt, position));
            self.shift_matching(&lower, -1)?;
        }
        Ok(())
    }

    /// The first sibling by position (possibly the node itself).
    pub fn highest_sibling(&self, node: &Node<T>) -> Result<Node<T>> {
        Ok(self
            .tree
            .siblings_and_self(node)
            .order_by(SortOrder::Position)
            .first()?
            .unwrap_or_else(|| node.clone()))
    }

    /// The last sibling by position (possibly the node itself).
    pub fn lowest_sibling(&self, node: &Node<T>) -> Result<Node<T>> {
        Ok(self
            .tree
            .siblings_and_self(node)
            .order_by(SortOrder::Position)
            .last()?
            .unwrap_or_else(|| node.clone()))
    }

    pub fn move_to_top(&self, node: &mut Node<T>) -> Result<()> {
        self.refresh(node)?;
        if self.at_top(node)? {
            return Ok(());
        }
        let highest = self.highest_sibling(node)?;
        self.move_above(node, &highest)
    }

    pub fn move_to_bottom(&self, node: &mut Node<T>) -> Result<()> {
        self.refresh(node)?;
        if self.at_bottom(node)? {
            return Ok(());
        }
        let lowest = self.lowest_sibling(node)?;
        self.move_below(node, &lowest)
    }

    /// Reparent next to `other` if needed. Returns false if an observer vetoed.
    fn join_group_of(&self, node: &mut Node<T>, other: &Node<T>) -> Result<bool> {
        if node.is_sibling_of(other) {
            return Ok(true);
        }
        if self.tree.set_parent_id(node, other.parent_id())? == MoveOutcome::Vetoed {
            return Ok(false);
        }
        self.save(node)?;
        Ok(true)
    }

    /// Place the node immediately before `other`, changing parent if necessary.
    pub fn move_above(&self, node: &mut Node<T>, other: &Node<T>) -> Result<()> {
        let id = require_id(node, "move_above")?.clone();
        self.refresh(node)?;
        let other = self.tree.find(require_id(other, "move_above")?)?;
        if other.id() == Some(&id) || !self.join_group_of(node, &other)? {
            return Ok(());
        }

        let (current, target) = (node.position(), other.position());
        if current > target {
            self.shift(other.path(), &id, Window::from_inclusive(target, current), 1)?;
            node.set_position(target);
        } else {
            self.shift(other.path(), &id, Window::exclusive(current, target), -1)?;
            node.set_position(target - 1);
        }
        self.save(node)
    }

    /// Place the node immediately after `other`, changing parent if necessary.
    pub fn move_below(&self, node: &mut Node<T>, other: &Node<T>) -> Result<()> {
        let id = require_id(node, "move_below")?.clone();
        self.refresh(node)?;
        let other = self.tree.find(require_id(other, "move_below")?)?;
        if other.id() == Some(&id) || !self.join_group_of(node, &other)? {
            return Ok(());
        }

        let (current, target) = (node.position(), other.position());
        if current > target {
            self.shift(other.path(), &id, Window::exclusive(target, current), 1)?;
            node.set_position(target + 1);
        } else {
            self.shift(other.path(), &id, Window::to_inclusive(current, target), -1)?;
            node.set_position(target);
        }
        self.save(node)
    }

    /// Move the node to `position` within its current sibling group.
    ///
    /// # Errors
    /// [`TreeError::PositionOutOfRange`] unless `0 <= position < group size`.
    pub fn move_to_position(&self, node: &mut Node<T>, position: i64) -> Result<()> {
        let id = require_id(node, "move_to_position")?.clone();
        self.refresh(node)?;
        let len = self.tree.siblings_and_self(node).count()?;
        if position < 0 || position >= len as i64 {
            return Err(TreeError::PositionOutOfRange { position, len }.into());
        }

        let current = node.position();
        if current == position {
            return Ok(());
        }

        let group = node.path().clone();
        if position < current {
            self.shift(&group, &id, Window::from_inclusive(position, current), 1)?;
        } else {
            self.shift(&group, &id, Window::to_inclusive(current, position), -1)?;
        }
        node.set_position(position);
        self.save(node)
    }
}
