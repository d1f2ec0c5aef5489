//! Add command - creates a node at the end of its sibling group.

use crate::cli::{AddArgs, StoreArgs};
use crate::output::{NODE_HEADERS, OutputFormat, node_json, node_row, print_table};
use crate::store::{Label, Workspace, parse_id};

/// Run the add command
pub fn run(
    store_args: &StoreArgs,
    args: &AddArgs,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let workspace = Workspace::open(store_args)?;
    let tree = &workspace.tree;

    let parent = args
        .parent
        .as_deref()
        .map(|raw| tree.find(&parse_id(raw)))
        .transpose()?;
    let label = Label {
        name: args.name.clone(),
    };
    let node = tree.create(label, parent.as_ref())?;
    workspace.save(store_args)?;

    match format {
        OutputFormat::Human => print_table(&NODE_HEADERS, &[node_row(&node, 0)]),
        OutputFormat::Json => println!("{}", serde_json::to_string(&node_json(&node))?),
    }
    Ok(())
}
