//! Per-node-type tree configuration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::TreeError;

/// What happens to a node's descendants when the node is destroyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrphanStrategy {
    /// Remove every descendant along with the node.
    #[default]
    Destroy,
    /// Detach the subtree: children become roots, deeper nesting is kept.
    Rootify,
    /// Refuse to destroy a node that still has children.
    Restrict,
}

impl fmt::Display for OrphanStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OrphanStrategy::Destroy => "destroy",
            OrphanStrategy::Rootify => "rootify",
            OrphanStrategy::Restrict => "restrict",
        };
        f.write_str(name)
    }
}

impl FromStr for OrphanStrategy {
    type Err = TreeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "destroy" => Ok(OrphanStrategy::Destroy),
            "rootify" => Ok(OrphanStrategy::Rootify),
            "restrict" => Ok(OrphanStrategy::Restrict),
            _ => Err(TreeError::InvalidPolicy {
                value: s.to_string(),
                reason: "expected one of destroy, rootify, restrict".to_string(),
            }),
        }
    }
}

/// Configuration shared by every node of one type.
///
/// Supplied once when the [`Tree`](super::Tree) is built; it never varies per
/// node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TreePolicy {
    pub orphan_strategy: OrphanStrategy,
    /// Keep each node's depth in its record so depth filters can run in the store.
    pub cache_depth: bool,
}

impl TreePolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_orphan_strategy(mut self, strategy: OrphanStrategy) -> Self {
        self.orphan_strategy = strategy;
        self
    }

    pub fn with_cache_depth(mut self, cache_depth: bool) -> Self {
        self.cache_depth = cache_depth;
        self
    }
}
