//! Output formatting helpers for human-readable and JSON output.

use ancestry::Node;

use crate::store::Label;

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Human,
    Json,
}

/// Print a table with aligned columns in human-readable format.
///
/// `headers` and each row in `rows` must have the same length.
pub fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    if rows.is_empty() {
        return;
    }

    // Calculate column widths (max of header and all row values)
    let col_count = headers.len();
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate().take(col_count) {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let header_line: Vec<String> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| format!("{:<width$}", h, width = widths[i]))
        .collect();
    println!("{}", header_line.join("  ").trim_end());

    for row in rows {
        let line: Vec<String> = row
            .iter()
            .enumerate()
            .take(col_count)
            .map(|(i, cell)| format!("{:<width$}", cell, width = widths[i]))
            .collect();
        println!("{}", line.join("  ").trim_end());
    }
}

/// JSON object describing one node.
pub fn node_json(node: &Node<Label>) -> serde_json::Value {
    serde_json::json!({
        "id": node.id().map(|id| id.to_string()),
        "name": node.data.name,
        "parent": node.parent_id().map(|id| id.to_string()),
        "ancestry": node.path().encode(),
        "depth": node.depth(),
        "position": node.position(),
    })
}

/// Table row for one node, with the name indented by `indent` levels.
pub fn node_row(node: &Node<Label>, indent: usize) -> Vec<String> {
    vec![
        format!("{}{}", "  ".repeat(indent), node.data.name),
        node.id().map(|id| id.to_string()).unwrap_or_default(),
        node.position().to_string(),
        node.depth().to_string(),
    ]
}

pub const NODE_HEADERS: [&str; 4] = ["NAME", "ID", "POSITION", "DEPTH"];
