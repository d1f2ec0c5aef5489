//!
//! Ancestry: hierarchical trees stored as flat documents.
//! This library organizes records of any type into trees using materialized
//! ancestor paths, so that ancestry queries become simple filters over a flat
//! collection.
//!
//! ## Core Concepts
//!
//! * **Paths (`path::AncestryPath`)**: The ordered chain of ancestor identifiers
//!   from the root down to a node's parent, persisted as a single `/`-joined
//!   string (or null for roots).
//! * **Nodes (`node::Node`)**: A caller document plus its tree fields. A node
//!   remembers its last persisted path so a reparent can be detected and the
//!   affected subtree rewritten.
//! * **Stores (`store::NodeStore`)**: A pluggable flat collection of records with
//!   filtered queries and atomic increments. `store::InMemory` is provided.
//! * **Trees (`tree::Tree`)**: Navigation (ancestors, children, siblings,
//!   descendants), reparenting with descendant path maintenance, orphan
//!   strategies on destroy, and move observers.
//! * **Depth filters (`tree::NodeQuery`, `tree::DepthQuery`)**: Absolute and
//!   relative depth filtering over cached node depth.
//! * **Ordered trees (`tree::OrderedTree`)**: Dense, contiguous sibling
//!   positions maintained across create, reparent, reorder and destroy.

pub mod constants;
pub mod node;
pub mod path;
pub mod store;
pub mod tree;

pub use node::{ID, Node, NodeDraft, NodeRecord};
pub use path::{AncestryPath, PathError};
pub use store::{InMemory, NodeStore, StoreError};
pub use tree::{
    DepthQuery, MoveObserver, MoveOutcome, NodeQuery, OrderedTree, OrphanStrategy, Tree,
    TreeError, TreePolicy,
};

/// Result type used throughout the Ancestry library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the Ancestry library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Structured path encoding errors from the path module
    #[error(transparent)]
    Path(path::PathError),

    /// Structured storage errors from the store module
    #[error(transparent)]
    Store(store::StoreError),

    /// Structured tree errors from the tree module
    #[error(transparent)]
    Tree(tree::TreeError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Path(_) => "path",
            Error::Store(_) => "store",
            Error::Tree(_) => "tree",
        }
    }

    /// Check if this error indicates a node was not found.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Store(store_err) => store_err.is_not_found(),
            Error::Tree(tree_err) => tree_err.is_not_found(),
            _ => false,
        }
    }

    /// Check if this error reports a misconfigured tree, such as a depth
    /// filter used without depth caching.
    pub fn is_configuration_error(&self) -> bool {
        match self {
            Error::Tree(tree_err) => tree_err.is_configuration_error(),
            _ => false,
        }
    }

    /// Check if the operation needed a persisted node and got a transient one.
    pub fn is_invalid_state(&self) -> bool {
        match self {
            Error::Tree(tree_err) => tree_err.is_invalid_state(),
            _ => false,
        }
    }

    /// Check if the operation was refused to keep the tree consistent.
    pub fn is_invariant_violation(&self) -> bool {
        match self {
            Error::Tree(tree_err) => tree_err.is_invariant_violation(),
            _ => false,
        }
    }

    /// Check if an observer declined the operation.
    pub fn is_vetoed(&self) -> bool {
        match self {
            Error::Tree(tree_err) => tree_err.is_vetoed(),
            _ => false,
        }
    }

    /// Check if this error reports a position outside its sibling group.
    pub fn is_range_error(&self) -> bool {
        match self {
            Error::Tree(tree_err) => tree_err.is_range_error(),
            _ => false,
        }
    }

    /// Check if this error reports a malformed path or identifier.
    pub fn is_format_error(&self) -> bool {
        match self {
            Error::Path(path_err) => path_err.is_format_error(),
            _ => false,
        }
    }

    /// Check if this error is storage-related.
    pub fn is_store_error(&self) -> bool {
        matches!(self, Error::Store(_))
    }

    /// Check if this error is a serialization failure.
    pub fn is_serialization_error(&self) -> bool {
        match self {
            Error::Store(store_err) => store_err.is_serialization_error(),
            _ => false,
        }
    }

    /// Check if this error is I/O related.
    pub fn is_io_error(&self) -> bool {
        match self {
            Error::Store(store_err) => store_err.is_io_error(),
            _ => false,
        }
    }
}
