//! Walk a parsed document and summarize every structure.
//!
//! Usage: cargo run --example walk_tree [FILE]
//!
//! Without a file the bundled `test/ddl/opengex-scene.ddl` is used.

use libopenddl::{NodeRef, OpenDdlParser, Payload};
use std::fs;
use std::path::Path;

fn main() {
    let path = std::env::args().nth(1).unwrap_or_else(|| {
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .parent()
            .unwrap()
            .join("test/ddl/opengex-scene.ddl")
            .to_string_lossy()
            .to_string()
    });
    let bytes = fs::read(&path).unwrap();

    let mut parser = OpenDdlParser::new();
    parser.set_owned_buffer(bytes);
    if !parser.parse() {
        eprintln!("{}: empty input", path);
        return;
    }

    let context = parser.context().unwrap();
    for prop in &context.properties {
        println!("metric {}", prop);
    }
    for child in context.root().children() {
        walk(child);
    }
}

fn walk(node: NodeRef<'_>) {
    let indent = "  ".repeat(node.depth() - 1);
    let label = match node.scoped_name() {
        Some(name) => format!("{} {}", node.node_type(), name),
        None => node.node_type().to_string(),
    };
    match node.payload() {
        Some(Payload::List { value_type, values }) => {
            println!("{}{}: {} x {}", indent, label, values.len(), value_type)
        }
        Some(Payload::Array {
            value_type,
            width,
            entries,
        }) => println!("{}{}: {} x {}[{}]", indent, label, entries.len(), value_type, width),
        None => println!("{}{}", indent, label),
    }
    for child in node.children() {
        walk(child);
    }
}
