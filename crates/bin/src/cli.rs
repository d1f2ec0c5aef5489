//! CLI argument definitions for the Ancestry binary.

use std::path::PathBuf;

use ancestry::{OrphanStrategy, TreePolicy};
use clap::{ArgGroup, Parser, Subcommand};

/// Ancestry ordered tree tool
#[derive(Parser, Debug)]
#[command(name = "ancestry")]
#[command(about = "Ancestry: materialized-path trees over a JSON node store")]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub store: StoreArgs,

    /// Print machine-readable JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Add a node, optionally under a parent
    Add(AddArgs),
    /// Show the whole forest or one subtree
    Show(ShowArgs),
    /// Move a node to a new parent or position
    Mv(MvArgs),
    /// Remove a node, applying the orphan strategy to its descendants
    Rm(RmArgs),
}

/// Store location and tree policy, shared by every command
#[derive(clap::Args, Debug)]
pub struct StoreArgs {
    /// JSON file holding the nodes; created on first write
    #[arg(
        short,
        long,
        global = true,
        default_value = "ancestry.json",
        env = "ANCESTRY_STORE"
    )]
    pub store: PathBuf,

    /// What happens to descendants when a node is removed
    #[arg(
        long,
        global = true,
        default_value_t = OrphanStrategy::Destroy,
        env = "ANCESTRY_ORPHAN_STRATEGY"
    )]
    pub orphan_strategy: OrphanStrategy,

    /// Cache node depth in each record
    #[arg(long, global = true, env = "ANCESTRY_CACHE_DEPTH")]
    pub cache_depth: bool,
}

impl StoreArgs {
    pub fn policy(&self) -> TreePolicy {
        TreePolicy::new()
            .with_orphan_strategy(self.orphan_strategy)
            .with_cache_depth(self.cache_depth)
    }
}

/// Arguments for the add command
#[derive(clap::Args, Debug)]
pub struct AddArgs {
    /// Label of the new node
    pub name: String,

    /// ID of the parent node; omitted for a new root
    #[arg(short, long)]
    pub parent: Option<String>,
}

/// Arguments for the show command
#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Only show this node and its descendants
    pub id: Option<String>,

    /// Limit how many levels below the starting point are shown
    #[arg(short, long)]
    pub levels: Option<usize>,
}

/// Arguments for the mv command
#[derive(clap::Args, Debug)]
#[command(group(
    ArgGroup::new("destination")
        .required(true)
        .args(["parent", "root", "above", "below", "position", "top", "bottom"])
))]
pub struct MvArgs {
    /// ID of the node to move
    pub id: String,

    /// Reparent under this node (appended last)
    #[arg(long)]
    pub parent: Option<String>,

    /// Make the node a root
    #[arg(long)]
    pub root: bool,

    /// Place immediately before this node
    #[arg(long)]
    pub above: Option<String>,

    /// Place immediately after this node
    #[arg(long)]
    pub below: Option<String>,

    /// Move to this index within the current siblings
    #[arg(long)]
    pub position: Option<i64>,

    /// Move to the first sibling position
    #[arg(long)]
    pub top: bool,

    /// Move to the last sibling position
    #[arg(long)]
    pub bottom: bool,
}

/// Arguments for the rm command
#[derive(clap::Args, Debug)]
pub struct RmArgs {
    /// ID of the node to remove
    pub id: String,
}
