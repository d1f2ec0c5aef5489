//! Mv command - reparents or reorders a node.

use crate::cli::{MvArgs, StoreArgs};
use crate::output::{NODE_HEADERS, OutputFormat, node_json, node_row, print_table};
use crate::store::{Workspace, parse_id};

/// Run the mv command
pub fn run(
    store_args: &StoreArgs,
    args: &MvArgs,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let workspace = Workspace::open(store_args)?;
    let tree = &workspace.tree;
    let mut node = tree.find(&parse_id(&args.id))?;

    if let Some(raw) = &args.parent {
        let parent = tree.find(&parse_id(raw))?;
        if tree.set_parent(&mut node, Some(&parent))?.is_moved() {
            tree.save(&mut node)?;
        }
    } else if args.root {
        if tree.set_parent(&mut node, None)?.is_moved() {
            tree.save(&mut node)?;
        }
    } else if let Some(raw) = &args.above {
        let other = tree.find(&parse_id(raw))?;
        tree.move_above(&mut node, &other)?;
    } else if let Some(raw) = &args.below {
        let other = tree.find(&parse_id(raw))?;
        tree.move_below(&mut node, &other)?;
    } else if let Some(position) = args.position {
        tree.move_to_position(&mut node, position)?;
    } else if args.top {
        tree.move_to_top(&mut node)?;
    } else if args.bottom {
        tree.move_to_bottom(&mut node)?;
    }

    workspace.save(store_args)?;
    tree.reload(&mut node)?;

    match format {
        OutputFormat::Human => print_table(&NODE_HEADERS, &[node_row(&node, 0)]),
        OutputFormat::Json => println!("{}", serde_json::to_string(&node_json(&node))?),
    }
    Ok(())
}
