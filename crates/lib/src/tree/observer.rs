//! Move observers.
//!
//! Observers are notified synchronously whenever a node is staged under a new
//! parent. Any observer can veto the move from `before_move`; the first veto
//! stops the remaining observers from being asked and leaves the node as it was.

use std::fmt;
use std::sync::Arc;

use crate::node::Node;

/// Listener for parent changes on nodes of type `T`.
pub trait MoveObserver<T>: Send + Sync {
    /// Called before the new parent is staged. Return `false` to veto.
    fn before_move(&self, _node: &Node<T>, _new_parent: Option<&Node<T>>) -> bool {
        true
    }

    /// Called after the new parent has been staged.
    fn after_move(&self, _node: &Node<T>, _new_parent: Option<&Node<T>>) {}
}

/// Result of staging a new parent.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The new path was staged and will be written on save.
    Moved,
    /// An observer declined the move; nothing changed.
    Vetoed,
}

impl MoveOutcome {
    pub fn is_moved(self) -> bool {
        self == MoveOutcome::Moved
    }

    pub fn is_vetoed(self) -> bool {
        self == MoveOutcome::Vetoed
    }
}

/// Ordered list of registered observers.
pub struct MoveListeners<T> {
    observers: Vec<Arc<dyn MoveObserver<T>>>,
}

impl<T> MoveListeners<T> {
    pub fn new() -> Self {
        Self {
            observers: Vec::new(),
        }
    }

    /// Append an observer. Observers run in registration order.
    pub fn register(&mut self, observer: Arc<dyn MoveObserver<T>>) {
        self.observers.push(observer);
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    /// True when every observer allows the move.
    pub(crate) fn before_move(&self, node: &Node<T>, new_parent: Option<&Node<T>>) -> bool {
        self.observers
            .iter()
            .all(|observer| observer.before_move(node, new_parent))
    }

    pub(crate) fn after_move(&self, node: &Node<T>, new_parent: Option<&Node<T>>) {
        for observer in &self.observers {
            observer.after_move(node, new_parent);
        }
    }
}

impl<T> Default for MoveListeners<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for MoveListeners<T> {
    fn clone(&self) -> Self {
        Self {
            observers: self.observers.clone(),
        }
    }
}

impl<T> fmt::Debug for MoveListeners<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MoveListeners")
            .field("observers", &self.observers.len())
            .finish()
    }
}
