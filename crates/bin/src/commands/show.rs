//! Show command - prints the forest, or one subtree, in sibling order.

use ancestry::{Node, OrderedTree};

use crate::cli::{ShowArgs, StoreArgs};
use crate::output::{NODE_HEADERS, OutputFormat, node_json, node_row, print_table};
use crate::store::{Label, Workspace, parse_id};

/// Run the show command
pub fn run(
    store_args: &StoreArgs,
    args: &ShowArgs,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let workspace = Workspace::open(store_args)?;
    let tree = &workspace.tree;

    let starts = match &args.id {
        Some(raw) => vec![tree.find(&parse_id(raw))?],
        None => tree.roots().all()?,
    };

    let mut listed = Vec::new();
    for start in starts {
        walk(tree, start, 0, args.levels, &mut listed)?;
    }

    match format {
        OutputFormat::Human => {
            if listed.is_empty() {
                println!("No nodes found.");
                return Ok(());
            }
            let rows: Vec<Vec<String>> = listed
                .iter()
                .map(|(node, level)| node_row(node, *level))
                .collect();
            print_table(&NODE_HEADERS, &rows);
        }
        OutputFormat::Json => {
            let entries: Vec<serde_json::Value> =
                listed.iter().map(|(node, _)| node_json(node)).collect();
            println!("{}", serde_json::to_string(&entries)?);
        }
    }
    Ok(())
}

/// Depth-first, children in position order.
fn walk(
    tree: &OrderedTree<Label>,
    node: Node<Label>,
    level: usize,
    max_levels: Option<usize>,
    out: &mut Vec<(Node<Label>, usize)>,
) -> ancestry::Result<()> {
    let children = if max_levels.is_some_and(|max| level >= max) {
        Vec::new()
    } else {
        tree.children(&node)?.all()?
    };
    out.push((node, level));
    for child in children {
        walk(tree, child, level + 1, max_levels, out)?;
    }
    Ok(())
}
