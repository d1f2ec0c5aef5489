//! In-memory node store implementation
//!
//! This module provides an in-memory implementation of the NodeStore trait,
//! suitable for testing, development, or scenarios where data persistence
//! is handled by saving and loading the whole collection as JSON.

mod persistence;

use std::collections::HashMap;
use std::path::Path;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::Result;
use crate::node::{ID, NodeDraft, NodeRecord};
use crate::store::{NodeStore, NumericField, Query, SortOrder, StoreError};

#[derive(Debug, Clone)]
struct Slot<T> {
    /// Insertion sequence, used for stable result ordering
    seq: u64,
    record: NodeRecord<T>,
}

#[derive(Debug)]
struct Records<T> {
    slots: HashMap<ID, Slot<T>>,
    next_seq: u64,
}

impl<T> Records<T> {
    fn insert(&mut self, record: NodeRecord<T>) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.slots.insert(record.id.clone(), Slot { seq, record });
    }
}

/// A simple in-memory store using a `HashMap` for storage.
///
/// Results come back in insertion order unless the query asks for position
/// order. Every call takes the lock once, so each individual operation is
/// atomic with respect to the others.
#[derive(Debug)]
pub struct InMemory<T> {
    records: RwLock<Records<T>>,
}

impl<T> InMemory<T> {
    /// Creates a new, empty store.
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Records {
                slots: HashMap::new(),
                next_seq: 0,
            }),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Records<T>>> {
        self.records.read().map_err(|e| {
            StoreError::LockPoisoned {
                reason: e.to_string(),
            }
            .into()
        })
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Records<T>>> {
        self.records.write().map_err(|e| {
            StoreError::LockPoisoned {
                reason: e.to_string(),
            }
            .into()
        })
    }

    /// Number of stored nodes.
    pub fn len(&self) -> Result<usize> {
        Ok(self.read()?.slots.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// IDs of all stored nodes in insertion order.
    pub fn all_ids(&self) -> Result<Vec<ID>> {
        let records = self.read()?;
        let mut slots: Vec<&Slot<T>> = records.slots.values().collect();
        slots.sort_by_key(|s| s.seq);
        Ok(slots.into_iter().map(|s| s.record.id.clone()).collect())
    }
}

impl<T: Clone> InMemory<T> {
    fn records_in_order(&self) -> Result<Vec<NodeRecord<T>>> {
        let records = self.read()?;
        let mut slots: Vec<&Slot<T>> = records.slots.values().collect();
        slots.sort_by_key(|s| s.seq);
        Ok(slots.into_iter().map(|s| s.record.clone()).collect())
    }
}

impl<T: Serialize + DeserializeOwned + Clone> InMemory<T> {
    /// Saves every stored node to a JSON file.
    ///
    /// # Arguments
    /// * `path` - The path to the file where the state should be saved.
    ///
    /// # Returns
    /// A `Result` indicating success or an I/O or serialization error.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        persistence::save_to_file(self, path)
    }

    /// Loads a store from a JSON file.
    ///
    /// If the file does not exist, a new, empty store is returned.
    ///
    /// # Arguments
    /// * `path` - The path to the file from which to load the state.
    ///
    /// # Returns
    /// A `Result` containing the loaded store or an I/O or deserialization error.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        persistence::load_from_file(path)
    }
}

impl<T> Default for InMemory<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send + Sync> NodeStore<T> for InMemory<T> {
    fn create(&self, draft: NodeDraft<T>) -> Result<NodeRecord<T>> {
        let mut records = self.write()?;
        let mut id = ID::generate();
        while records.slots.contains_key(&id) {
            id = ID::generate();
        }
        let record = draft.into_record(id);
        records.insert(record.clone());
        tracing::trace!(node_id = %record.id, "Created node");
        Ok(record)
    }

    fn save(&self, record: &NodeRecord<T>) -> Result<()> {
        let mut records = self.write()?;
        match records.slots.get_mut(&record.id) {
            Some(slot) => slot.record = record.clone(),
            None => records.insert(record.clone()),
        }
        Ok(())
    }

    fn destroy(&self, id: &ID) -> Result<bool> {
        let mut records = self.write()?;
        Ok(records.slots.remove(id).is_some())
    }

    fn find_by_id(&self, id: &ID) -> Result<Option<NodeRecord<T>>> {
        let records = self.read()?;
        Ok(records.slots.get(id).map(|s| s.record.clone()))
    }

    fn find(&self, query: &Query) -> Result<Vec<NodeRecord<T>>> {
        let records = self.read()?;
        let mut matched: Vec<&Slot<T>> = records
            .slots
            .values()
            .filter(|s| query.matches(&s.record))
            .collect();
        match query.order() {
            SortOrder::Insertion => matched.sort_by_key(|s| s.seq),
            SortOrder::Position => matched.sort_by_key(|s| (s.record.position, s.seq)),
        }
        Ok(matched.into_iter().map(|s| s.record.clone()).collect())
    }

    fn count(&self, query: &Query) -> Result<usize> {
        let records = self.read()?;
        Ok(records
            .slots
            .values()
            .filter(|s| query.matches(&s.record))
            .count())
    }

    fn increment(&self, id: &ID, field: NumericField, delta: i64) -> Result<()> {
        let mut records = self.write()?;
        let slot = records
            .slots
            .get_mut(id)
            .ok_or_else(|| StoreError::NodeNotFound { id: id.clone() })?;
        match field {
            NumericField::Position => slot.record.position += delta,
        }
        Ok(())
    }
}
