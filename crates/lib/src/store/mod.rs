//! Document stores that hold tree nodes.
//!
//! The tree engine never talks to a storage engine directly. It consumes the
//! [`NodeStore`] trait, which abstracts a flat collection of [`NodeRecord`]s
//! with single-record atomicity: create, upsert, delete, lookup by ID, filtered
//! queries and an atomic numeric increment. Nothing here spans more than one
//! record, so cascades built on top of it are not transactional.

use crate::Result;
use crate::node::{ID, NodeDraft, NodeRecord};

mod errors;
pub use errors::StoreError;

mod query;
pub use query::{Comparison, Filter, Query, SortOrder};

pub mod in_memory;
pub use in_memory::InMemory;

/// Numeric fields that can be bumped in place with [`NodeStore::increment`].
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericField {
    /// Sibling order within a group.
    Position,
}

/// Storage collaborator for a single node type.
///
/// Implementations must be `Send` and `Sync` so a tree can be shared across
/// threads, though the engine itself issues calls one at a time.
pub trait NodeStore<T>: Send + Sync {
    /// Persists a new node and returns it with its assigned identifier.
    fn create(&self, draft: NodeDraft<T>) -> Result<NodeRecord<T>>;

    /// Writes a node, inserting it if its ID is unknown.
    fn save(&self, record: &NodeRecord<T>) -> Result<()>;

    /// Removes a node.
    ///
    /// # Returns
    /// `Ok(true)` if a node was removed, `Ok(false)` if none existed.
    fn destroy(&self, id: &ID) -> Result<bool>;

    fn find_by_id(&self, id: &ID) -> Result<Option<NodeRecord<T>>>;

    /// All nodes matching `query`, in the query's order.
    fn find(&self, query: &Query) -> Result<Vec<NodeRecord<T>>>;

    /// Number of nodes matching `query`.
    fn count(&self, query: &Query) -> Result<usize> {
        Ok(self.find(query)?.len())
    }

    /// Atomically add `delta` to a numeric field without rewriting the record.
    ///
    /// Fails with [`StoreError::NodeNotFound`] if the node does not exist.
    fn increment(&self, id: &ID, field: NumericField, delta: i64) -> Result<()>;
}
