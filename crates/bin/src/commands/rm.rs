//! Rm command - destroys a node under the configured orphan strategy.

use crate::cli::{RmArgs, StoreArgs};
use crate::output::OutputFormat;
use crate::store::{Workspace, parse_id};

/// Run the rm command
pub fn run(
    store_args: &StoreArgs,
    args: &RmArgs,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let workspace = Workspace::open(store_args)?;
    let tree = &workspace.tree;

    let node = tree.find(&parse_id(&args.id))?;
    let descendants = tree.descendant_ids(&node)?.len();
    tree.destroy(&node)?;
    workspace.save(store_args)?;

    let strategy = store_args.orphan_strategy;
    match format {
        OutputFormat::Human => {
            println!("Removed {} ({descendants} descendants, strategy {strategy})", args.id);
        }
        OutputFormat::Json => {
            let value = serde_json::json!({
                "id": args.id,
                "descendants": descendants,
                "orphan_strategy": strategy,
            });
            println!("{}", serde_json::to_string(&value)?);
        }
    }
    Ok(())
}
