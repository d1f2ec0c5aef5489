//! Opening and saving the JSON-backed node store.

use std::sync::Arc;

use ancestry::{ID, InMemory, OrderedTree};
use serde::{Deserialize, Serialize};

use crate::cli::StoreArgs;

/// The document carried by every node the CLI manages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub name: String,
}

/// An ordered tree over the store file named on the command line.
pub struct Workspace {
    store: Arc<InMemory<Label>>,
    pub tree: OrderedTree<Label>,
}

impl Workspace {
    /// Load the store file, or start empty if it does not exist yet.
    pub fn open(args: &StoreArgs) -> ancestry::Result<Self> {
        let store = Arc::new(InMemory::<Label>::load_from_file(&args.store)?);
        tracing::info!(
            path = %args.store.display(),
            nodes = store.len()?,
            "Opened node store"
        );
        let tree = OrderedTree::new(store.clone(), args.policy());
        Ok(Self { store, tree })
    }

    /// Write every node back to `args.store`.
    pub fn save(&self, args: &StoreArgs) -> ancestry::Result<()> {
        self.store.save_to_file(&args.store)?;
        tracing::info!(path = %args.store.display(), "Saved node store");
        Ok(())
    }
}

/// Parse a node ID given on the command line.
pub fn parse_id(raw: &str) -> ID {
    ID::from(raw.trim())
}
