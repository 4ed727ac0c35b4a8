//! OpenDDL (Open Data Description Language) parser.
//!
//! OpenDDL describes data as nested, typed structures:
//!
//! ```text
//! Metric (key = "distance") { float { 1.0 } }
//!
//! GeometryNode $node1 {
//!     ObjectRef { ref { $geometry1 } }
//! }
//!
//! GeometryObject $geometry1 {
//!     Mesh (primitive = "triangles") {
//!         VertexArray (attrib = "position") {
//!             float[3] { {0, 0, 0}, {1, 0, 0}, {0, 1, 0} }
//!         }
//!     }
//! }
//! ```
//!
//! # Parsing Pipeline
//!
//! 1. **Scanner**: strips `//` comments from the buffer in place, keeping one
//!    newline per comment so diagnostics still point at the right line.
//!
//! 2. **Token decoding**: identifiers, `$`/`%` names and typed literals
//!    (booleans, sized integers, floats, strings, hex, references).
//!
//! 3. **Structure parser**: builds the node tree, attaching properties, names
//!    and typed payloads as it goes. Open structures are kept on an explicit
//!    stack, so nesting depth is not limited by the call stack.
//!
//! Malformed input is reported through a log callback; parsing carries on
//! and the tree keeps everything that could be read.

mod dump;
mod error;
mod lexer;
mod log;
mod node;
mod parser;
mod scanner;
mod session;
mod value;

pub use dump::{format_document, format_node};
pub use error::{Diagnostic, Location};
pub use log::{default_log_callback, LogCallback, Severity};
pub use node::{Context, Node, NodeId, NodeRef, Tree};
pub use scanner::normalize_buffer;
pub use session::OpenDdlParser;
pub use value::{
    f32_to_half_bits, half_bits_to_f32, Identifier, Name, NameScope, Payload, Property,
    PropertyValue, Reference, Value, ValueType,
};

/// Library version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Parse a document from a string, sending diagnostics to `log`.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use libopenddl::{parse_str, Severity};
///
/// let ctx = parse_str("Cube $box { }", Arc::new(|_: Severity, _: &str| {})).unwrap();
/// let cube = ctx.root().child(0).unwrap();
/// assert_eq!(cube.node_type(), "Cube");
/// assert_eq!(cube.name(), "box");
/// ```
pub fn parse_str(input: &str, log: LogCallback) -> Option<Context> {
    let mut parser = OpenDdlParser::new();
    parser.set_log_callback(Some(log));
    parser.set_owned_buffer(input.as_bytes().to_vec());
    if !parser.parse() {
        return None;
    }
    parser.take_context()
}
