//! Materialized ancestry paths.
//!
//! A node's ancestry is the ordered chain of its ancestors' identifiers, from
//! the root down to the immediate parent. An empty chain means the node is a
//! root. The chain is persisted as a single nullable string field: the
//! identifiers joined with [`PATH_SEPARATOR`], or no value at all for a root.
//!
//! All structural operations (prefix tests, prefix replacement) work on the
//! decoded identifier sequence, never on the encoded string, so identifiers
//! need no escaping beyond the rule that they cannot contain the separator.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::constants::PATH_SEPARATOR;
use crate::node::ID;

mod errors;
pub use errors::PathError;


/// The decoded ancestor chain of a node, root first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct AncestryPath(Vec<ID>);

impl AncestryPath {
    /// The empty path carried by root nodes.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Builds a path from an ordered identifier sequence, validating each identifier.
    pub fn new(ids: impl IntoIterator<Item = ID>) -> Result<Self, PathError> {
        let ids: Vec<ID> = ids.into_iter().collect();
        for id in &ids {
            validate_id(id)?;
        }
        Ok(Self(ids))
    }

    /// Encodes the path into its persisted representation.
    ///
    /// The root path encodes to `None`.
    pub fn encode(&self) -> Option<String> {
        if self.0.is_empty() {
            return None;
        }
        let sep = PATH_SEPARATOR.to_string();
        Some(
            self.0
                .iter()
                .map(ID::as_str)
                .collect::<Vec<_>>()
                .join(&sep),
        )
    }

    /// Decodes a persisted path value.
    ///
    /// Both a missing value and the empty string decode to the root path.
    pub fn decode(raw: Option<&str>) -> Result<Self, PathError> {
        let raw = match raw {
            None => return Ok(Self::root()),
            Some(raw) if raw.is_empty() => return Ok(Self::root()),
            Some(raw) => raw,
        };

        let mut ids = Vec::new();
        for (index, segment) in raw.split(PATH_SEPARATOR).enumerate() {
            if segment.is_empty() {
                return Err(PathError::Malformed {
                    raw: raw.to_string(),
                    reason: format!("empty identifier at segment {index}"),
                });
            }
            ids.push(ID::new(segment));
        }
        Ok(Self(ids))
    }

    /// The identifiers in root-to-parent order.
    pub fn ids(&self) -> &[ID] {
        &self.0
    }

    /// Number of ancestors, which is also the depth of the owning node.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True for the root path.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True for the root path.
    pub fn is_root(&self) -> bool {
        self.is_empty()
    }

    /// The root ancestor, if any.
    pub fn first(&self) -> Option<&ID> {
        self.0.first()
    }

    /// The immediate parent, if any.
    pub fn last(&self) -> Option<&ID> {
        self.0.last()
    }

    /// Whether `id` appears anywhere in the chain.
    pub fn contains(&self, id: &ID) -> bool {
        self.0.contains(id)
    }

    /// The path a child of the node owning `self` and identified by `id` would carry.
    pub fn child(&self, id: &ID) -> Result<Self, PathError> {
        validate_id(id)?;
        let mut ids = self.0.clone();
        ids.push(id.clone());
        Ok(Self(ids))
    }

    /// Structural prefix test on identifier sequences.
    pub fn starts_with(&self, prefix: &AncestryPath) -> bool {
        self.0.starts_with(&prefix.0)
    }

    /// Returns `new_prefix ++ self[old_prefix.len()..]`.
    ///
    /// Fails with [`PathError::PrefixMismatch`] if `self` does not start with
    /// `old_prefix`.
    pub fn replace_prefix(
        &self,
        old_prefix: &AncestryPath,
        new_prefix: &AncestryPath,
    ) -> Result<Self, PathError> {
        if !self.starts_with(old_prefix) {
            return Err(PathError::PrefixMismatch {
                path: self.to_string(),
                prefix: old_prefix.to_string(),
            });
        }
        let mut ids = new_prefix.0.clone();
        ids.extend_from_slice(&self.0[old_prefix.len()..]);
        Ok(Self(ids))
    }
}

fn validate_id(id: &ID) -> Result<(), PathError> {
    if id.as_str().is_empty() {
        return Err(PathError::InvalidId {
            id: String::new(),
            reason: "identifier is empty".to_string(),
        });
    }
    if id.as_str().contains(PATH_SEPARATOR) {
        return Err(PathError::InvalidId {
            id: id.to_string(),
            reason: format!("identifier contains the separator '{PATH_SEPARATOR}'"),
        });
    }
    Ok(())
}

impl fmt::Display for AncestryPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.encode() {
            Some(encoded) => f.write_str(&encoded),
            None => Ok(()),
        }
    }
}

impl FromStr for AncestryPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(Some(s))
    }
}

// Persisted as a nullable string: `null` for roots.
impl Serialize for AncestryPath {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.encode().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for AncestryPath {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        AncestryPath::decode(raw.as_deref()).map_err(serde::de::Error::custom)
    }
}
