//! Phase 3: Structure Parser
//!
//! Reads a normalized buffer structure by structure. Each structure is read
//! in two steps, its header (type, name, properties) and then its body (a
//! typed payload or nested structures). Nesting lives on a stack of open
//! nodes, not on the call stack, so document depth is bounded only by memory.
//!
//! Malformed input never stops the parse. Problems are reported through the
//! log callback and the parser resynchronizes at the next brace or
//! parenthesis it can find.

use crate::error::{Diagnostic, Location};
use crate::lexer::{
    parse_boolean_literal, parse_floating_literal, parse_hexa_literal, parse_identifier,
    parse_integer_literal, parse_name, parse_string_literal, parse_unsigned_literal,
};
use crate::log::{LogCallback, Severity};
use crate::node::{Context, NodeId};
use crate::scanner::{is_separator, is_space, Cursor};
use crate::value::{Payload, Property, PropertyValue, Reference, Value, ValueType};

/// Structure type whose properties describe the whole document.
const METRIC: &str = "Metric";

/// Parse a whole normalized buffer into a fresh context.
pub fn parse_document(buf: &[u8], log: &LogCallback) -> Context {
    let mut parser = Parser::new(buf, log);
    parser.parse_structures();
    parser.context
}

/// Grammar driver state for one buffer.
pub struct Parser<'b, 'l> {
    cur: Cursor<'b>,
    context: Context,
    stack: Vec<NodeId>,
    log: &'l LogCallback,
}

impl<'b, 'l> Parser<'b, 'l> {
    pub fn new(buf: &'b [u8], log: &'l LogCallback) -> Self {
        let context = Context::new();
        let stack = vec![context.tree.root_id()];
        Self {
            cur: Cursor::new(buf),
            context,
            stack,
            log,
        }
    }

    fn report(&self, diagnostic: Diagnostic) {
        let loc = Location::of(self.cur.buf(), self.cur.pos());
        (self.log)(Severity::Error, &diagnostic.with_location(loc));
    }

    fn expected(&self, token: &'static str) {
        self.report(Diagnostic::invalid_token(self.cur.buf(), self.cur.pos(), token));
    }

    /// The node new structures attach to.
    fn top(&self) -> NodeId {
        self.stack
            .last()
            .copied()
            .unwrap_or_else(|| self.context.tree.root_id())
    }

    // ========================================================================
    // Structures
    // ========================================================================

    /// Parse every structure in the buffer.
    ///
    /// Nesting is tracked on `stack` alone: a body that holds structures is
    /// pushed when its `{` is read and popped at its `}`, so depth costs no
    /// native stack.
    fn parse_structures(&mut self) {
        loop {
            self.cur.skip_space();
            if self.cur.at_end() {
                break;
            }
            if self.stack.len() > 1 && self.cur.eat(b'}') {
                self.stack.pop();
                continue;
            }
            match self.parse_header() {
                Some(node) => self.open_body(node),
                None => {
                    self.report(Diagnostic::stray_token(self.cur.buf(), self.cur.pos()));
                    self.cur.advance(1);
                }
            }
        }

        // One report per body still open at the end of input.
        while self.stack.len() > 1 {
            self.expected("'}'");
            self.stack.pop();
        }
    }

    /// Type identifier, optional name and optional property list.
    ///
    /// The name is accepted on either side of the property list.
    fn parse_header(&mut self) -> Option<NodeId> {
        let id = parse_identifier(&mut self.cur)?;

        let mut name = parse_name(&mut self.cur);
        self.cur.skip_space();
        let properties = if self.cur.is(b'(') {
            self.parse_property_list()
        } else {
            Vec::new()
        };
        if name.is_none() {
            name = parse_name(&mut self.cur);
        }

        let parent = self.top();
        let node = self.context.tree.add_child(parent, id.as_str());
        if id.as_str() == METRIC {
            self.context.properties.extend(properties);
        } else {
            self.context.tree.node_mut(node).properties = properties;
        }
        self.context.tree.node_mut(node).name = name;
        Some(node)
    }

    /// `( key = value, ... )`, with the cursor on the opening parenthesis.
    fn parse_property_list(&mut self) -> Vec<Property> {
        let mut properties = Vec::new();
        self.cur.advance(1);
        loop {
            self.cur.skip_space();
            if self.cur.eat(b')') {
                break;
            }
            if self.cur.at_end() {
                self.expected("')'");
                break;
            }

            if let Some(prop) = parse_property(&mut self.cur) {
                properties.push(prop);
            }
            self.cur.skip_space();
            if self.cur.eat(b',') {
                continue;
            }
            if self.cur.eat(b')') {
                break;
            }
            self.expected("')'");
            self.skip_to_property_list_end();
            break;
        }
        properties
    }

    /// Resynchronize after a malformed property list: stop past the first
    /// `)`, or in front of the first `{`.
    fn skip_to_property_list_end(&mut self) {
        while let Some(c) = self.cur.peek() {
            match c {
                b')' => {
                    self.cur.advance(1);
                    return;
                }
                b'{' => return,
                _ => self.cur.advance(1),
            }
        }
    }

    /// The opening brace of a structure's body.
    ///
    /// A typed payload is read up to its closing brace right away. Otherwise
    /// `node` becomes the parent of the structures that follow.
    fn open_body(&mut self, node: NodeId) {
        self.cur.skip_space();
        if !self.cur.eat(b'{') {
            self.expected("'{'");
            return;
        }

        self.cur.skip_space();
        match parse_primitive_data_type(&mut self.cur) {
            Some((value_type, width)) => {
                self.parse_payload(node, value_type, width);
                self.cur.skip_space();
                if !self.cur.eat(b'}') {
                    self.expected("'}'");
                }
            }
            None => self.stack.push(node),
        }
    }

    /// The braced literal data following a primitive type keyword.
    fn parse_payload(&mut self, node: NodeId, value_type: ValueType, width: usize) {
        self.cur.skip_space();
        if !self.cur.is(b'{') {
            self.expected("'{'");
            return;
        }

        let payload = match width {
            0 => {
                self.report(Diagnostic::ZeroArrayWidth);
                self.skip_block();
                return;
            }
            1 => Payload::List {
                value_type,
                values: self.parse_data_list(value_type),
            },
            _ => Payload::Array {
                value_type,
                width,
                entries: self.parse_data_array_list(value_type),
            },
        };
        self.context.tree.node_mut(node).payload = Some(payload);
    }

    /// Skip a balanced `{ ... }` block, strings included.
    fn skip_block(&mut self) {
        let mut depth = 0usize;
        while let Some(c) = self.cur.peek() {
            match c {
                b'"' => {
                    self.cur.advance(1);
                    self.cur.skip_past(b'"');
                    continue;
                }
                b'{' => depth += 1,
                b'}' => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        self.cur.advance(1);
                        return;
                    }
                }
                _ => {}
            }
            self.cur.advance(1);
        }
    }

    // ========================================================================
    // Data Lists
    // ========================================================================

    /// `{ literal, literal, ... }`, with the cursor on the opening brace.
    pub fn parse_data_list(&mut self, value_type: ValueType) -> Vec<Value> {
        let mut values = Vec::new();
        self.cur.skip_space();
        if !self.cur.eat(b'{') {
            return values;
        }

        loop {
            self.cur.skip_space();
            if self.cur.eat(b'}') {
                break;
            }
            if self.cur.at_end() {
                self.expected("'}'");
                break;
            }

            if let Some(value) = parse_literal(&mut self.cur, value_type) {
                values.push(value);
            }
            self.cur.skip_to_separator();
            if self.cur.eat(b',') || self.cur.is(b'}') || self.cur.peek().is_some_and(is_space) {
                continue;
            }
            self.expected("'}'");
            self.cur.skip_past(b'}');
            break;
        }
        values
    }

    /// `{ {..}, {..}, ... }`, with the cursor on the outer opening brace.
    pub fn parse_data_array_list(&mut self, value_type: ValueType) -> Vec<Vec<Value>> {
        let mut entries = Vec::new();
        self.cur.skip_space();
        if !self.cur.eat(b'{') {
            return entries;
        }

        loop {
            self.cur.skip_space();
            if self.cur.eat(b'}') {
                break;
            }
            if !self.cur.is(b'{') {
                self.expected("'{'");
                self.cur.skip_past(b'}');
                break;
            }

            entries.push(self.parse_data_list(value_type));
            self.cur.skip_space();
            if self.cur.eat(b',') || self.cur.is(b'}') {
                continue;
            }
            self.expected("'}'");
            self.cur.skip_past(b'}');
            break;
        }
        entries
    }
}

// ============================================================================
// Headers: types, properties and references
// ============================================================================

/// A primitive type keyword with an optional `[width]`.
///
/// The keyword must end at a separator or `[`, so a structure type such as
/// `floatData` is not mistaken for `float`. An unclosed `[` means no type.
/// The cursor only moves on success.
pub fn parse_primitive_data_type(cur: &mut Cursor<'_>) -> Option<(ValueType, usize)> {
    let mut probe = *cur;
    probe.skip_space();
    let value_type = ValueType::ALL.into_iter().find(|t| {
        let rest = probe.rest();
        let token = t.token().as_bytes();
        rest.starts_with(token)
            && rest
                .get(token.len())
                .map_or(true, |&c| is_separator(c) || c == b'[')
    })?;
    probe.advance(value_type.token().len());

    let mut width = 1;
    if probe.eat(b'[') {
        let rest = probe.rest();
        let close = rest.iter().position(|&c| c == b']')?;
        width = decode_width(&rest[..close]);
        probe.advance(close + 1);
    }

    *cur = probe;
    Some((value_type, width))
}

/// Leading decimal digits of a width, 0 when there are none.
fn decode_width(text: &[u8]) -> usize {
    text.iter()
        .skip_while(|c| c.is_ascii_whitespace())
        .take_while(|c| c.is_ascii_digit())
        .fold(0usize, |n, &c| n.saturating_mul(10).saturating_add(usize::from(c - b'0')))
}

/// `key = value`. Without `=` or with an unreadable value there is no
/// property; an unreadable value token is skipped.
pub fn parse_property(cur: &mut Cursor<'_>) -> Option<Property> {
    let key = parse_identifier(cur)?;
    cur.skip_space();
    if !cur.eat(b'=') {
        return None;
    }
    cur.skip_space();

    let value = if cur.is_integer() {
        parse_integer_literal(cur, ValueType::Int32).map(PropertyValue::Data)
    } else if cur.is_float() {
        parse_floating_literal(cur, ValueType::Float).map(PropertyValue::Data)
    } else if cur.is_string_literal() {
        parse_string_literal(cur).map(PropertyValue::Data)
    } else if cur.is_hex_literal() {
        parse_hexa_literal(cur).map(PropertyValue::Data)
    } else if let Some(b) = probe(cur, parse_boolean_literal) {
        Some(PropertyValue::Data(b))
    } else {
        parse_reference(cur).map(PropertyValue::Reference)
    };

    if value.is_none() {
        cur.skip_to_separator();
    }
    Some(Property::new(key, value?))
}

/// `ref { $name, %name, ... }`. Names are kept unresolved.
pub fn parse_reference(cur: &mut Cursor<'_>) -> Option<Reference> {
    cur.skip_space();
    let mut keyword = *cur;
    if !keyword.eat_str("ref") || keyword.peek().is_some_and(|c| !is_separator(c)) {
        return None;
    }
    *cur = keyword;
    cur.skip_space();
    if !cur.eat(b'{') {
        return None;
    }

    let mut names = Vec::new();
    loop {
        if let Some(name) = parse_name(cur) {
            names.push(name);
        }
        cur.skip_to_separator();
        cur.skip_space();
        if cur.eat(b',') {
            continue;
        }
        cur.eat(b'}');
        break;
    }
    Some(Reference::new(names))
}

/// Run `decode` on a copy of the cursor and commit only on success.
fn probe<T>(cur: &mut Cursor<'_>, decode: impl FnOnce(&mut Cursor<'_>) -> Option<T>) -> Option<T> {
    let mut copy = *cur;
    let value = decode(&mut copy)?;
    *cur = copy;
    Some(value)
}

/// One list element, classified by its spelling and stored as the declared
/// type where the spelling allows it.
///
/// Classification order is integer, float, string, hex, then boolean or
/// name. Integer spellings in floating payloads become floating values and
/// hex is always `int32`.
fn parse_literal(cur: &mut Cursor<'_>, value_type: ValueType) -> Option<Value> {
    cur.skip_space();
    if cur.is_integer() {
        if value_type.is_floating() {
            parse_floating_literal(cur, value_type)
        } else if value_type.is_unsigned_integer() {
            parse_unsigned_literal(cur, value_type)
        } else if value_type.is_signed_integer() {
            parse_integer_literal(cur, value_type)
        } else {
            parse_integer_literal(cur, ValueType::Int32)
        }
    } else if cur.is_float() {
        parse_floating_literal(cur, value_type)
    } else if cur.is_string_literal() {
        parse_string_literal(cur)
    } else if cur.is_hex_literal() {
        parse_hexa_literal(cur)
    } else if let Some(b) = probe(cur, parse_boolean_literal) {
        Some(b)
    } else {
        parse_name(cur).map(|name| Value::Ref(Reference::new(vec![name])))
    }
}
