//! Indented outline of a tree, for debugging and tests.
//!
//! This is not a serialization format: text is shown escaped on one line and
//! attribute values are not quoted for reparsing.

use std::fmt::{self, Write};

use crate::{DomTree, NodeId, NodeType};

/// Write the subtree at `id` as an indented outline, one node per line.
///
/// # Errors
///
/// Returns any error reported by `out`.
pub fn write_tree<W: Write>(tree: &DomTree, id: NodeId, indent: usize, out: &mut W) -> fmt::Result {
    let prefix = "  ".repeat(indent);
    let Some(node) = tree.get(id) else {
        return Ok(());
    };
    match &node.node_type {
        NodeType::Element(data) => {
            write!(out, "{prefix}<{}", data.tag_name)?;
            for attr in data.attrs() {
                write!(out, " {}=\"{}\"", data.qualified_name(&attr.name), attr.value)?;
            }
            writeln!(out, ">")?;
        }
        NodeType::Text(data) => {
            let display = data.replace('\n', "\\n");
            writeln!(out, "{prefix}\"{display}\"")?;
        }
        NodeType::Comment(data) => writeln!(out, "{prefix}<!--{data}-->")?,
        NodeType::Cdata(data) => writeln!(out, "{prefix}<![CDATA[{data}]]>")?,
    }
    for &child_id in tree.children(id) {
        write_tree(tree, child_id, indent + 1, out)?;
    }
    Ok(())
}

/// Render the whole tree, preceded by its doctype line if it has one.
#[must_use]
pub fn dump_tree(tree: &DomTree) -> String {
    let mut out = String::new();
    if let Some(doctype) = tree.doctype() {
        out.push_str("<!DOCTYPE ");
        out.push_str(&doctype.name);
        match (&doctype.public_id, &doctype.system_id) {
            (Some(public), Some(system)) => {
                out.push_str(&format!(" PUBLIC \"{public}\" \"{system}\""));
            }
            (None, Some(system)) => out.push_str(&format!(" SYSTEM \"{system}\"")),
            _ => {}
        }
        out.push_str(">\n");
    }
    // Writing into a String cannot fail.
    let _ = write_tree(tree, tree.root(), 0, &mut out);
    out
}
