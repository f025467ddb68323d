//! JSON output formatting

use std::io::{self, Write};

use crate::tree::TreeNode;

/// Pretty-printed JSON for a tree, newline-terminated.
pub fn to_json(node: &TreeNode) -> serde_json::Result<String> {
    let mut json = serde_json::to_string_pretty(node)?;
    json.push('\n');
    Ok(json)
}

/// Write a tree as pretty-printed JSON.
pub fn write_json<W: Write>(node: &TreeNode, out: &mut W) -> io::Result<()> {
    let json = to_json(node).map_err(io::Error::other)?;
    out.write_all(json.as_bytes())
}
