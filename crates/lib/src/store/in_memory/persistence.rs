//! Persistence operations for the InMemory store
//!
//! This module handles serialization and file I/O for saving/loading
//! the in-memory store state to/from JSON files.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

use super::InMemory;
use crate::{
    Error, Result, constants::PERSISTENCE_VERSION, node::NodeRecord, store::StoreError,
};

/// Helper to check if version is default (0) for serde skip_serializing_if
fn is_v0(v: &u8) -> bool {
    *v == 0
}

/// Validates the persistence version during deserialization.
fn validate_persistence_version<'de, D>(deserializer: D) -> std::result::Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let version = u8::deserialize(deserializer)?;
    if version != PERSISTENCE_VERSION {
        return Err(serde::de::Error::custom(format!(
            "unsupported persistence version {version}; only version {PERSISTENCE_VERSION} is supported"
        )));
    }
    Ok(version)
}

/// Serializable form of the store. Nodes are kept in insertion order.
#[derive(Serialize, Deserialize)]
#[serde(bound(
    serialize = "T: Serialize",
    deserialize = "T: DeserializeOwned"
))]
struct SerializableStore<T> {
    /// File format version for compatibility checking
    #[serde(
        rename = "_v",
        default,
        skip_serializing_if = "is_v0",
        deserialize_with = "validate_persistence_version"
    )]
    version: u8,
    #[serde(default = "Vec::new")]
    nodes: Vec<NodeRecord<T>>,
}

pub(crate) fn save_to_file<T, P>(store: &InMemory<T>, path: P) -> Result<()>
where
    T: Serialize + Clone,
    P: AsRef<Path>,
{
    let serializable = SerializableStore {
        version: PERSISTENCE_VERSION,
        nodes: store.records_in_order()?,
    };

    let json = serde_json::to_string_pretty(&serializable)
        .map_err(|e| -> Error { StoreError::SerializationFailed { source: e }.into() })?;
    std::fs::write(path, json).map_err(|e| -> Error { StoreError::FileIo { source: e }.into() })
}

pub(crate) fn load_from_file<T, P>(path: P) -> Result<InMemory<T>>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    match std::fs::read_to_string(path) {
        Ok(json) => {
            let serializable: SerializableStore<T> =
                serde_json::from_str(&json).map_err(|e| -> Error {
                    StoreError::DeserializationFailed { source: e }.into()
                })?;
            let store = InMemory::new();
            {
                let mut records = store.write()?;
                for record in serializable.nodes {
                    records.insert(record);
                }
            }
            Ok(store)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(InMemory::new()),
        Err(e) => Err(StoreError::FileIo { source: e }.into()),
    }
}
