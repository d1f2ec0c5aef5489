//! Tree nodes and their persisted layout.
//!
//! A [`Node`] is the in-memory handle callers work with. It carries the
//! caller's document (`data`) alongside the tree fields the engine maintains,
//! and remembers what its path and position looked like the last time it was
//! loaded or saved. That snapshot is how the engine detects a reparent and
//! finds the subtree it has to rewrite.
//!
//! A [`NodeRecord`] is what a [`NodeStore`](crate::store::NodeStore) persists:
//! the identifier, the encoded path, the cached depth, the sibling position and
//! the document.

use serde::{Deserialize, Serialize};

use crate::Result;
use crate::path::AncestryPath;
use crate::tree::TreeError;

mod id;
pub use id::ID;

/// The persisted field layout of one node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord<T> {
    /// Store-assigned identifier
    pub id: ID,
    /// Ancestor chain, persisted as a nullable string
    pub ancestry: AncestryPath,
    /// Cached `ancestry.len()`; only meaningful when depth caching is enabled
    #[serde(default)]
    pub ancestry_depth: usize,
    /// Position within the sibling group
    #[serde(default)]
    pub position: i64,
    /// The caller's document
    pub data: T,
}

/// A record that has not been assigned an identifier yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeDraft<T> {
    pub ancestry: AncestryPath,
    pub ancestry_depth: usize,
    pub position: i64,
    pub data: T,
}

impl<T> NodeDraft<T> {
    /// Attach the identifier assigned by the store.
    pub fn into_record(self, id: ID) -> NodeRecord<T> {
        NodeRecord {
            id,
            ancestry: self.ancestry,
            ancestry_depth: self.ancestry_depth,
            position: self.position,
            data: self.data,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Snapshot {
    path: AncestryPath,
    position: i64,
}

/// A node of type `T` as seen by the caller.
///
/// Nodes start out transient (no identifier) and become persisted on their
/// first successful save. Tree fields are only changed through a
/// [`Tree`](crate::tree::Tree) or [`OrderedTree`](crate::tree::OrderedTree) so
/// the engine can keep the persisted snapshot coherent.
#[derive(Debug, Clone, PartialEq)]
pub struct Node<T> {
    id: Option<ID>,
    path: AncestryPath,
    persisted: Option<Snapshot>,
    cached_depth: usize,
    position: Option<i64>,
    /// The caller's document
    pub data: T,
}

impl<T> Node<T> {
    /// A new transient root node.
    pub fn new(data: T) -> Self {
        Self {
            id: None,
            path: AncestryPath::root(),
            persisted: None,
            cached_depth: 0,
            position: None,
            data,
        }
    }

    /// Builds a persisted node from a stored record.
    pub fn from_record(record: NodeRecord<T>) -> Self {
        Self {
            id: Some(record.id),
            persisted: Some(Snapshot {
                path: record.ancestry.clone(),
                position: record.position,
            }),
            path: record.ancestry,
            cached_depth: record.ancestry_depth,
            position: Some(record.position),
            data: record.data,
        }
    }

    pub fn id(&self) -> Option<&ID> {
        self.id.as_ref()
    }

    /// True until the first successful save.
    pub fn is_new_record(&self) -> bool {
        self.id.is_none()
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// The current (possibly unsaved) ancestry path.
    pub fn path(&self) -> &AncestryPath {
        &self.path
    }

    /// The path as of the last load or save, if the node has been persisted.
    pub fn persisted_path(&self) -> Option<&AncestryPath> {
        self.persisted.as_ref().map(|s| &s.path)
    }

    /// The position as of the last load or save, if the node has been persisted.
    pub fn persisted_position(&self) -> Option<i64> {
        self.persisted.as_ref().map(|s| s.position)
    }

    pub fn ancestor_ids(&self) -> &[ID] {
        self.path.ids()
    }

    /// Ancestor identifiers followed by this node's own identifier, when assigned.
    pub fn ancestors_and_self_ids(&self) -> Vec<ID> {
        let mut ids = self.path.ids().to_vec();
        if let Some(id) = &self.id {
            ids.push(id.clone());
        }
        ids
    }

    /// Number of ancestors, computed from the current path.
    pub fn depth(&self) -> usize {
        self.path.len()
    }

    /// The depth value last written to the store.
    ///
    /// Only meaningful when the tree caches depth.
    pub fn cached_depth(&self) -> usize {
        self.cached_depth
    }

    pub fn is_root(&self) -> bool {
        self.path.is_root()
    }

    /// The immediate parent's identifier, `None` for roots.
    pub fn parent_id(&self) -> Option<&ID> {
        self.path.last()
    }

    /// The first ancestor, or this node's own identifier if it is a root.
    pub fn root_id(&self) -> Option<&ID> {
        self.path.first().or(self.id.as_ref())
    }

    /// Position among siblings; 0 when never assigned.
    pub fn position(&self) -> i64 {
        self.position.unwrap_or_default()
    }

    /// Whether a position has been assigned explicitly or by a save.
    pub fn has_position(&self) -> bool {
        self.position.is_some()
    }

    /// Stage a new position. Takes effect on save.
    pub fn set_position(&mut self, position: i64) {
        self.position = Some(position);
    }

    /// True when the node is persisted and its path differs from the snapshot.
    pub fn has_moved(&self) -> bool {
        match &self.persisted {
            Some(snapshot) => snapshot.path != self.path,
            None => false,
        }
    }

    /// Siblings share a parent.
    pub fn is_sibling_of(&self, other: &Node<T>) -> bool {
        self.parent_id() == other.parent_id()
    }

    /// The path carried by this node's children.
    ///
    /// Built from the persisted path, not the staged one, so a node with an
    /// unsaved reparent still addresses its existing children. Fails for a
    /// transient node, which cannot have children yet.
    pub fn child_prefix(&self) -> Result<AncestryPath> {
        match (&self.id, &self.persisted) {
            (Some(id), Some(snapshot)) => Ok(snapshot.path.child(id)?),
            _ => Err(TreeError::NotPersisted {
                operation: "child_prefix",
            }
            .into()),
        }
    }

    pub(crate) fn set_path(&mut self, path: AncestryPath) {
        self.path = path;
    }

    pub(crate) fn set_cached_depth(&mut self, depth: usize) {
        self.cached_depth = depth;
    }

    /// Record a successful write: assign the identifier if new and refresh the snapshot.
    pub(crate) fn mark_persisted(&mut self, id: ID) {
        let position = self.position();
        self.id = Some(id);
        self.position = Some(position);
        self.persisted = Some(Snapshot {
            path: self.path.clone(),
            position,
        });
    }

    /// Adopt the stored position, unless the handle carries an unsaved one.
    pub(crate) fn refresh_position(&mut self, stored: i64) {
        if let Some(snapshot) = self.persisted.as_mut()
            && self.position == Some(snapshot.position)
        {
            snapshot.position = stored;
            self.position = Some(stored);
        }
    }
}

impl<T: Clone> Node<T> {
    /// The record for this node's current state.
    pub fn to_record(&self) -> Result<NodeRecord<T>> {
        let id = self.id.clone().ok_or(TreeError::NotPersisted {
            operation: "to_record",
        })?;
        Ok(self.draft().into_record(id))
    }

    pub(crate) fn draft(&self) -> NodeDraft<T> {
        NodeDraft {
            ancestry: self.path.clone(),
            ancestry_depth: self.cached_depth,
            position: self.position(),
            data: self.data.clone(),
        }
    }
}
