//! Hierarchical tree semantics over a flat node store.
//!
//! [`Tree`] derives ancestors, descendants, siblings and roots from each
//! node's materialized [`AncestryPath`], and keeps those paths correct when
//! nodes move or are destroyed:
//!
//! - Saving a node whose path changed since it was last persisted rewrites the
//!   path of every existing descendant.
//! - Destroying a node applies the configured [`OrphanStrategy`] to its
//!   descendants before the node itself is removed.
//!
//! Descendant fixups are written through an internal raw path that skips move
//! observers and orphan handling, so corrective writes never re-trigger the
//! machinery that caused them. Each fixup is its own store write; a failure
//! part way through surfaces immediately and leaves the rewrites already done
//! in place.
//!
//! [`OrderedTree`] layers dense sibling positions on top.

use std::sync::Arc;

use crate::Result;
use crate::node::{ID, Node, NodeRecord};
use crate::path::AncestryPath;
use crate::store::{Filter, NodeStore, Query, SortOrder};

mod errors;
pub use errors::TreeError;

mod observer;
pub use observer::{MoveListeners, MoveObserver, MoveOutcome};

mod ordered;
pub use ordered::OrderedTree;

mod policy;
pub use policy::{OrphanStrategy, TreePolicy};

mod query;
pub use query::{DepthQuery, NodeQuery};

/// Tree operations for nodes of type `T` held in one store.
///
/// Cloning is cheap; clones share the store and observers.
pub struct Tree<T> {
    store: Arc<dyn NodeStore<T>>,
    policy: TreePolicy,
    observers: MoveListeners<T>,
    default_order: SortOrder,
}

impl<T> Clone for Tree<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            policy: self.policy,
            observers: self.observers.clone(),
            default_order: self.default_order,
        }
    }
}

impl<T> std::fmt::Debug for Tree<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tree")
            .field("policy", &self.policy)
            .field("observers", &self.observers)
            .field("default_order", &self.default_order)
            .finish()
    }
}

impl<T> Tree<T> {
    pub fn new(store: Arc<dyn NodeStore<T>>, policy: TreePolicy) -> Self {
        Self {
            store,
            policy,
            observers: MoveListeners::new(),
            default_order: SortOrder::Insertion,
        }
    }

    /// Register a move observer (builder style).
    pub fn with_observer(mut self, observer: Arc<dyn MoveObserver<T>>) -> Self {
        self.observers.register(observer);
        self
    }

    /// Register a move observer.
    pub fn add_observer(&mut self, observer: Arc<dyn MoveObserver<T>>) {
        self.observers.register(observer);
    }

    pub(crate) fn with_default_order(mut self, order: SortOrder) -> Self {
        self.default_order = order;
        self
    }

    pub fn store(&self) -> &Arc<dyn NodeStore<T>> {
        &self.store
    }

    pub fn policy(&self) -> &TreePolicy {
        &self.policy
    }

    pub fn observers(&self) -> &MoveListeners<T> {
        &self.observers
    }

    fn scoped(&self, query: Query) -> NodeQuery<T> {
        NodeQuery::new(
            Arc::clone(&self.store),
            query.order_by(self.default_order),
            self.policy.cache_depth,
        )
    }

    fn scoped_filter(&self, filter: Filter) -> NodeQuery<T> {
        self.scoped(Query::new().filter(filter))
    }

    /// Every node in the store.
    pub fn all(&self) -> NodeQuery<T> {
        self.scoped(Query::new())
    }

    /// Every node without ancestors.
    pub fn roots(&self) -> NodeQuery<T> {
        self.all().roots()
    }

    pub fn find_optional(&self, id: &ID) -> Result<Option<Node<T>>> {
        Ok(self.store.find_by_id(id)?.map(Node::from_record))
    }

    /// Load a node by ID.
    ///
    /// # Errors
    /// [`TreeError::NodeNotFound`] if no such node exists.
    pub fn find(&self, id: &ID) -> Result<Node<T>> {
        self.find_optional(id)?
            .ok_or_else(|| TreeError::NodeNotFound { id: id.clone() }.into())
    }

    /// Replace `node` with its current stored state, discarding unsaved edits.
    pub fn reload(&self, node: &mut Node<T>) -> Result<()> {
        let id = node
            .id()
            .cloned()
            .ok_or(TreeError::NotPersisted {
                operation: "reload",
            })?;
        *node = self.find(&id)?;
        Ok(())
    }

    // ===== Ancestors =====

    /// The node's ancestors, annotated with the node's depth.
    pub fn ancestors(&self, node: &Node<T>) -> DepthQuery<T> {
        self.scoped_filter(Filter::IdIn(node.ancestor_ids().to_vec()))
            .with_reference_depth(node.depth())
    }

    /// The node's ancestors plus the node itself.
    pub fn ancestors_and_self(&self, node: &Node<T>) -> DepthQuery<T> {
        self.scoped_filter(Filter::IdIn(node.ancestors_and_self_ids()))
            .with_reference_depth(node.depth())
    }

    /// The top of the node's tree; the node itself when it is a root.
    pub fn root(&self, node: &Node<T>) -> Result<Node<T>>
    where
        T: Clone,
    {
        match node.path().first() {
            None => Ok(node.clone()),
            Some(root_id) => self.find(root_id),
        }
    }

    /// The node's parent, `None` for roots.
    pub fn parent(&self, node: &Node<T>) -> Result<Option<Node<T>>> {
        node.parent_id().map(|id| self.find(id)).transpose()
    }

    // ===== Children =====

    /// Nodes whose path is exactly this node's child prefix.
    ///
    /// # Errors
    /// [`TreeError::NotPersisted`] for a transient node.
    pub fn children(&self, node: &Node<T>) -> Result<NodeQuery<T>> {
        Ok(self.scoped_filter(Filter::PathEq(node.child_prefix()?)))
    }

    pub fn child_ids(&self, node: &Node<T>) -> Result<Vec<ID>> {
        self.children(node)?.ids()
    }

    pub fn has_children(&self, node: &Node<T>) -> Result<bool> {
        self.children(node)?.exists()
    }

    pub fn is_childless(&self, node: &Node<T>) -> Result<bool> {
        Ok(!self.has_children(node)?)
    }

    // ===== Siblings =====

    /// Nodes sharing this node's current path, including the node.
    pub fn siblings_and_self(&self, node: &Node<T>) -> NodeQuery<T> {
        self.scoped_filter(Filter::PathEq(node.path().clone()))
    }

    /// Nodes sharing this node's current path, excluding the node.
    pub fn siblings(&self, node: &Node<T>) -> NodeQuery<T> {
        let query = self.siblings_and_self(node);
        match node.id() {
            Some(id) => query.filter(Filter::IdNe(id.clone())),
            None => query,
        }
    }

    pub fn sibling_ids(&self, node: &Node<T>) -> Result<Vec<ID>> {
        self.siblings(node).ids()
    }

    pub fn has_siblings(&self, node: &Node<T>) -> Result<bool> {
        self.siblings(node).exists()
    }

    pub fn is_only_child(&self, node: &Node<T>) -> Result<bool> {
        Ok(!self.has_siblings(node)?)
    }

    // ===== Descendants =====

    /// Every node below this one, annotated with this node's depth.
    ///
    /// # Errors
    /// [`TreeError::NotPersisted`] for a transient node.
    pub fn descendants(&self, node: &Node<T>) -> Result<DepthQuery<T>> {
        Ok(self
            .scoped_filter(Filter::PathWithin(node.child_prefix()?))
            .with_reference_depth(node.depth()))
    }

    /// Every node below this one plus the node itself.
    pub fn descendants_and_self(&self, node: &Node<T>) -> Result<DepthQuery<T>> {
        let prefix = node.child_prefix()?;
        let id = node.id().cloned().ok_or(TreeError::NotPersisted {
            operation: "descendants_and_self",
        })?;
        Ok(self
            .scoped_filter(Filter::Any(vec![
                Filter::IdEq(id),
                Filter::PathWithin(prefix),
            ]))
            .with_reference_depth(node.depth()))
    }

    pub fn descendant_ids(&self, node: &Node<T>) -> Result<Vec<ID>> {
        self.descendants(node)?.ids()
    }

    pub fn descendants_and_self_ids(&self, node: &Node<T>) -> Result<Vec<ID>> {
        self.descendants_and_self(node)?.ids()
    }

    // ===== Moves =====

    /// Stage `parent` as the node's new parent (`None` makes it a root).
    ///
    /// The parent is validated first, then observers are consulted; a veto
    /// leaves the node untouched and returns [`MoveOutcome::Vetoed`]. The new
    /// path is written on the next save.
    ///
    /// # Errors
    /// - [`TreeError::NotPersisted`] if `parent` has never been saved
    /// - [`TreeError::MoveIntoOwnSubtree`] if `parent` is the node or one of its descendants
    pub fn set_parent(&self, node: &mut Node<T>, parent: Option<&Node<T>>) -> Result<MoveOutcome> {
        let new_path = match parent {
            None => AncestryPath::root(),
            Some(parent) => parent.child_prefix()?,
        };
        if let (Some(id), Some(target)) = (node.id(), parent.and_then(Node::id))
            && new_path.contains(id)
        {
            return Err(TreeError::MoveIntoOwnSubtree {
                id: id.clone(),
                target: target.clone(),
            }
            .into());
        }

        if !self.observers.before_move(node, parent) {
            tracing::warn!(
                node_id = ?node.id(),
                new_parent = ?parent.and_then(Node::id),
                "Move vetoed by observer"
            );
            return Ok(MoveOutcome::Vetoed);
        }

        node.set_path(new_path);
        self.observers.after_move(node, parent);
        Ok(MoveOutcome::Moved)
    }

    /// Like [`set_parent`](Self::set_parent), resolving the parent by ID.
    pub fn set_parent_id(
        &self,
        node: &mut Node<T>,
        parent_id: Option<&ID>,
    ) -> Result<MoveOutcome> {
        let parent = parent_id.map(|id| self.find(id)).transpose()?;
        self.set_parent(node, parent.as_ref())
    }
}

impl<T: Clone> Tree<T> {
    /// Build a node, stage its parent and save it.
    ///
    /// # Errors
    /// [`TreeError::CreateVetoed`] if an observer declines the parent; nothing is written.
    pub fn create(&self, data: T, parent: Option<&Node<T>>) -> Result<Node<T>> {
        let mut node = self.stage_new(data, parent)?;
        self.save(&mut node)?;
        Ok(node)
    }

    /// A transient node already placed under `parent`.
    pub(crate) fn stage_new(&self, data: T, parent: Option<&Node<T>>) -> Result<Node<T>> {
        let mut node = Node::new(data);
        if let Some(parent) = parent
            && self.set_parent(&mut node, Some(parent))?.is_vetoed()
        {
            let parent = parent.id().cloned().ok_or(TreeError::NotPersisted {
                operation: "create",
            })?;
            return Err(TreeError::CreateVetoed { parent }.into());
        }
        Ok(node)
    }

    /// Persist the node.
    ///
    /// A transient node is created in the store and receives its ID. For a
    /// persisted node whose path changed since its last save, the node's own
    /// record is written first and then every descendant found under the old
    /// child prefix is rewritten to sit under the new one.
    pub fn save(&self, node: &mut Node<T>) -> Result<()> {
        if self.policy.cache_depth {
            node.set_cached_depth(node.depth());
        }

        let Some(id) = node.id().cloned() else {
            let record = self.store.create(node.draft())?;
            tracing::trace!(node_id = %record.id, "Created node");
            node.mark_persisted(record.id);
            return Ok(());
        };

        let rewrite = if node.has_moved() {
            Some((node.child_prefix()?, node.path().child(&id)?))
        } else {
            None
        };

        self.store.save(&node.to_record()?)?;
        node.mark_persisted(id);

        if let Some((old_prefix, new_prefix)) = rewrite {
            self.rewrite_descendants(&old_prefix, &new_prefix)?;
        }
        Ok(())
    }

    /// Remove the node, applying the orphan strategy to its descendants first.
    ///
    /// Destroying a transient node does nothing.
    ///
    /// # Errors
    /// [`TreeError::HasChildren`] under [`OrphanStrategy::Restrict`]; nothing is removed.
    pub fn destroy(&self, node: &Node<T>) -> Result<()> {
        self.destroy_with(node, None).map(|_| ())
    }

    /// Destroy with an optional position offset for children promoted to roots.
    ///
    /// Returns whether the node's own record was removed.
    pub(crate) fn destroy_with(&self, node: &Node<T>, root_offset: Option<i64>) -> Result<bool> {
        let Some(id) = node.id() else {
            tracing::debug!("Destroy requested for a transient node; nothing to do");
            return Ok(false);
        };

        self.apply_orphan_strategy(id, &node.child_prefix()?, root_offset)?;
        let removed = self.store.destroy(id)?;
        tracing::debug!(node_id = %id, removed, "Destroyed node");
        Ok(removed)
    }

    fn apply_orphan_strategy(
        &self,
        id: &ID,
        prefix: &AncestryPath,
        root_offset: Option<i64>,
    ) -> Result<()> {
        match self.policy.orphan_strategy {
            OrphanStrategy::Destroy => {
                let ids: Vec<ID> = self
                    .store
                    .find(&Query::new().filter(Filter::PathWithin(prefix.clone())))?
                    .into_iter()
                    .map(|r| r.id)
                    .collect();
                for descendant in &ids {
                    self.store.destroy(descendant)?;
                }
                if !ids.is_empty() {
                    tracing::debug!(node_id = %id, descendants = ids.len(), "Destroyed descendants");
                }
            }
            OrphanStrategy::Rootify => {
                let descendants = self
                    .store
                    .find(&Query::new().filter(Filter::PathWithin(prefix.clone())))?;
                let count = descendants.len();
                let root = AncestryPath::root();
                for mut record in descendants {
                    let promoted = record.ancestry == *prefix;
                    record.ancestry = record.ancestry.replace_prefix(prefix, &root)?;
                    if promoted && let Some(offset) = root_offset {
                        record.position += offset;
                    }
                    self.write_raw(&mut record)?;
                }
                if count > 0 {
                    tracing::debug!(node_id = %id, descendants = count, "Rootified descendants");
                }
            }
            OrphanStrategy::Restrict => {
                let children = self
                    .store
                    .count(&Query::new().filter(Filter::PathEq(prefix.clone())))?;
                if children > 0 {
                    tracing::warn!(node_id = %id, children, "Destroy restricted by existing children");
                    return Err(TreeError::HasChildren {
                        id: id.clone(),
                        children,
                    }
                    .into());
                }
            }
        }
        Ok(())
    }

    fn rewrite_descendants(&self, old_prefix: &AncestryPath, new_prefix: &AncestryPath) -> Result<()> {
        let descendants = self
            .store
            .find(&Query::new().filter(Filter::PathWithin(old_prefix.clone())))?;
        let count = descendants.len();
        for mut record in descendants {
            record.ancestry = record.ancestry.replace_prefix(old_prefix, new_prefix)?;
            self.write_raw(&mut record)?;
        }
        if count > 0 {
            tracing::debug!(
                from = %old_prefix,
                to = %new_prefix,
                descendants = count,
                "Rewrote descendant paths"
            );
        }
        Ok(())
    }

    /// Corrective write used by cascades: refreshes the cached depth and
    /// writes the record without observers, positioning or orphan handling.
    fn write_raw(&self, record: &mut NodeRecord<T>) -> Result<()> {
        if self.policy.cache_depth {
            record.ancestry_depth = record.ancestry.len();
        }
        tracing::trace!(node_id = %record.id, path = %record.ancestry, "Raw node write");
        self.store.save(record)
    }
}
