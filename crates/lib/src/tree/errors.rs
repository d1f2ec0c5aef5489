//! Error types for tree operations.

use thiserror::Error;

use crate::node::ID;

/// Errors raised by tree views and mutations.
///
/// A vetoed move of an existing node is not an error; see
/// [`MoveOutcome`](super::MoveOutcome). Creation under a vetoed parent is.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Existing variants will not be removed in minor versions
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    /// A depth filter was used on a tree that does not cache depth.
    #[error("Depth filter '{filter}' requires depth caching to be enabled")]
    DepthCachingDisabled {
        /// The filter that was requested
        filter: &'static str,
    },

    /// A policy value could not be parsed.
    #[error("Invalid tree policy value '{value}': {reason}")]
    InvalidPolicy {
        /// The rejected value
        value: String,
        /// Why it was rejected
        reason: String,
    },

    /// The operation needs a node that has been saved at least once.
    #[error("Cannot {operation} on a node that has never been saved")]
    NotPersisted {
        /// The operation that was attempted
        operation: &'static str,
    },

    /// Destroy refused by the `Restrict` orphan strategy.
    #[error("Cannot destroy node {id}: it still has {children} children")]
    HasChildren {
        /// The node that was to be destroyed
        id: ID,
        /// How many children it has
        children: usize,
    },

    /// A node was staged under itself or one of its own descendants.
    #[error("Cannot move node {id} under {target}, which is inside its own subtree")]
    MoveIntoOwnSubtree {
        /// The node being moved
        id: ID,
        /// The requested parent
        target: ID,
    },

    /// An observer declined placing a new node under `parent`.
    #[error("Creating a node under {parent} was vetoed by an observer")]
    CreateVetoed {
        /// The requested parent
        parent: ID,
    },

    /// An explicit position is outside the sibling group.
    #[error("Position {position} is out of range for a sibling group of {len}")]
    PositionOutOfRange {
        /// The requested position
        position: i64,
        /// Size of the sibling group, including the node itself
        len: usize,
    },

    /// A referenced node does not exist.
    #[error("Node not found: {id}")]
    NodeNotFound {
        /// The missing node's ID
        id: ID,
    },
}

impl TreeError {
    /// Check if this error is a misconfiguration of the tree.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            TreeError::DepthCachingDisabled { .. } | TreeError::InvalidPolicy { .. }
        )
    }

    /// Check if this error was caused by using a transient node.
    pub fn is_invalid_state(&self) -> bool {
        matches!(self, TreeError::NotPersisted { .. })
    }

    /// Check if this error protects a structural invariant of the tree.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(
            self,
            TreeError::HasChildren { .. } | TreeError::MoveIntoOwnSubtree { .. }
        )
    }

    /// Check if this error is an out-of-range position.
    pub fn is_range_error(&self) -> bool {
        matches!(self, TreeError::PositionOutOfRange { .. })
    }

    /// Check if an observer declined the operation.
    pub fn is_vetoed(&self) -> bool {
        matches!(self, TreeError::CreateVetoed { .. })
    }

    /// Check if this error indicates a node was not found.
    pub fn is_not_found(&self) -> bool {
        matches!(self, TreeError::NodeNotFound { .. })
    }
}

impl From<TreeError> for crate::Error {
    fn from(err: TreeError) -> Self {
        crate::Error::Tree(err)
    }
}
