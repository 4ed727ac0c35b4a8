//! Outline view of a parsed document.
//!
//! One line per structure, indented two spaces per level, followed by an
//! extra line for a typed payload:
//!
//! ```text
//! root (key = "distance")
//!   Metric
//!     float {1.0}
//!   GeometryNode $node1
//!     Mesh (primitive = "triangles")
//!       VertexArray (attrib = "position")
//!         float[3] {{0.0, 0.0, 0.0}, {1.0, 0.0, 0.0}}
//! ```
//!
//! This is a debugging view for people and tests. It is not OpenDDL.

use std::fmt::Write;

use crate::node::{Context, NodeRef};
use crate::value::{Payload, Property, Reference, Value};

const INDENT: &str = "  ";

/// Render a whole parse result, document-level properties on the root line.
pub fn format_document(context: &Context) -> String {
    let mut out = String::new();
    let root = context.root();
    out.push_str(root.node_type());
    write_properties(&mut out, &context.properties);
    out.push('\n');
    for child in root.children() {
        write_node(&mut out, child, 1);
    }
    out
}

/// Render one node and everything below it.
pub fn format_node(node: NodeRef<'_>) -> String {
    let mut out = String::new();
    write_node(&mut out, node, 0);
    out
}

/// Write `node` and its subtree in document order.
///
/// Walks with an explicit stack so deep documents cannot exhaust the call
/// stack.
fn write_node(out: &mut String, node: NodeRef<'_>, depth: usize) {
    let mut pending = vec![(node, depth)];
    while let Some((node, depth)) = pending.pop() {
        push_indent(out, depth);
        out.push_str(node.node_type());
        if let Some(name) = node.scoped_name() {
            let _ = write!(out, " {}", name);
        }
        write_properties(out, node.properties());
        out.push('\n');

        if let Some(payload) = node.payload() {
            push_indent(out, depth + 1);
            write_payload(out, payload);
            out.push('\n');
        }
        // Reversed so the first child is written first.
        pending.extend(node.children().rev().map(|child| (child, depth + 1)));
    }
}

fn push_indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}

fn write_properties(out: &mut String, properties: &[Property]) {
    if properties.is_empty() {
        return;
    }
    out.push_str(" (");
    for (i, prop) in properties.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        let _ = write!(out, "{}", prop);
    }
    out.push(')');
}

fn write_payload(out: &mut String, payload: &Payload) {
    match payload {
        Payload::List { value_type, values } => {
            let _ = write!(out, "{} ", value_type);
            write_values(out, values);
        }
        Payload::Array {
            value_type,
            width,
            entries,
        } => {
            let _ = write!(out, "{}[{}] {{", value_type, width);
            for (i, entry) in entries.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_values(out, entry);
            }
            out.push('}');
        }
    }
}

fn write_values(out: &mut String, values: &[Value]) {
    out.push('{');
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        // The payload's type keyword already says `ref`.
        let _ = match value {
            Value::Ref(r) => write_names(out, r),
            _ => write!(out, "{}", value),
        };
    }
    out.push('}');
}

fn write_names(out: &mut String, reference: &Reference) -> std::fmt::Result {
    for (i, name) in reference.names.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        write!(out, "{}", name)?;
    }
    Ok(())
}
