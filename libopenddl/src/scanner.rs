//! Phase 1: Scanner
//!
//! Byte-level groundwork shared by every later phase:
//! - Comment stripping over the raw buffer (done once, in place)
//! - Character and span classification
//! - A cursor that skips whitespace and finds token boundaries
//!
//! Nothing in here allocates or fails. Positions past the end of the
//! buffer behave like the end of the buffer.

// ============================================================================
// Buffer Normalization
// ============================================================================

/// Strip `//` line comments in place and return the usable length.
///
/// Each comment, from its marker through the end of its line, collapses to a
/// single `\n` so line numbers survive. Surviving bytes move left; when the
/// region shrank, a NUL sentinel follows the last one. `//` inside a string
/// literal is kept.
pub fn normalize_buffer(buf: &mut [u8]) -> usize {
    let len = buf.len();
    let mut write = 0;
    let mut read = 0;
    let mut in_string = false;

    while read < len {
        let c = buf[read];
        if !in_string && is_comment_start(buf, read) {
            read += 2;
            while read < len && !is_newline(buf[read]) {
                read += 1;
            }
            // The comment's own newline (if any) is replaced by ours.
            read += 1;
            buf[write] = b'\n';
            write += 1;
            continue;
        }
        if is_string_literal_start(c) {
            in_string = !in_string;
        }
        buf[write] = c;
        write += 1;
        read += 1;
    }

    if write < len {
        buf[write] = 0;
    }
    write
}

// ============================================================================
// Classification
// ============================================================================

pub fn is_space(c: u8) -> bool {
    matches!(c, b' ' | b'\t' | b'\r' | b'\n')
}

pub fn is_newline(c: u8) -> bool {
    c == b'\n'
}

pub fn is_numeric(c: u8) -> bool {
    c.is_ascii_digit()
}

/// Whitespace, list punctuation, braces and parentheses end a token.
pub fn is_separator(c: u8) -> bool {
    is_space(c) || matches!(c, b',' | b'{' | b'}' | b'(' | b')' | 0)
}

pub fn is_string_literal_start(c: u8) -> bool {
    c == b'"'
}

/// `0x` or `0X` at `pos`.
pub fn is_hex_literal_start(buf: &[u8], pos: usize) -> bool {
    buf.get(pos) == Some(&b'0') && matches!(buf.get(pos + 1), Some(b'x' | b'X'))
}

/// `//` at `pos`.
pub fn is_comment_start(buf: &[u8], pos: usize) -> bool {
    buf.get(pos) == Some(&b'/') && buf.get(pos + 1) == Some(&b'/')
}

/// The token at `pos`, up to the next separator.
fn token_at(buf: &[u8], pos: usize) -> &[u8] {
    let start = pos.min(buf.len());
    let end = next_separator(buf, start);
    &buf[start..end]
}

/// An optional `-` followed by nothing but digits, up to the next separator.
pub fn is_integer_span(buf: &[u8], pos: usize) -> bool {
    let token = token_at(buf, pos);
    let digits = token.strip_prefix(b"-").unwrap_or(token);
    !digits.is_empty() && digits.iter().all(|&c| is_numeric(c))
}

/// An optional `-`, a digit, then digits with at least one `.` or exponent.
pub fn is_float_span(buf: &[u8], pos: usize) -> bool {
    let token = token_at(buf, pos);
    let body = token.strip_prefix(b"-").unwrap_or(token);
    match body.first() {
        Some(&c) if is_numeric(c) => {}
        _ => return false,
    }
    let mut has_marker = false;
    for &c in body {
        match c {
            b'0'..=b'9' | b'+' | b'-' => {}
            b'.' | b'e' | b'E' => has_marker = true,
            _ => return false,
        }
    }
    has_marker
}

// ============================================================================
// Cursor
// ============================================================================

/// Skip whitespace forward from `pos`.
pub fn next_token(buf: &[u8], mut pos: usize) -> usize {
    while pos < buf.len() && is_space(buf[pos]) {
        pos += 1;
    }
    pos.min(buf.len())
}

/// Scan forward from `pos` to the next separator.
pub fn next_separator(buf: &[u8], mut pos: usize) -> usize {
    while pos < buf.len() && !is_separator(buf[pos]) {
        pos += 1;
    }
    pos.min(buf.len())
}

/// A read position over the usable region of a normalized buffer.
#[derive(Debug, Clone, Copy)]
pub struct Cursor<'b> {
    buf: &'b [u8],
    pos: usize,
}

impl<'b> Cursor<'b> {
    pub fn new(buf: &'b [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn buf(&self) -> &'b [u8] {
        self.buf
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn set_pos(&mut self, pos: usize) {
        self.pos = pos.min(self.buf.len());
    }

    pub fn at_end(&self) -> bool {
        self.pos >= self.buf.len()
    }

    /// The byte under the cursor.
    pub fn peek(&self) -> Option<u8> {
        self.buf.get(self.pos).copied()
    }

    /// The byte `n` places after the cursor.
    pub fn peek_at(&self, n: usize) -> Option<u8> {
        self.buf.get(self.pos + n).copied()
    }

    pub fn is(&self, c: u8) -> bool {
        self.peek() == Some(c)
    }

    pub fn advance(&mut self, n: usize) {
        self.set_pos(self.pos + n);
    }

    /// Consume `c` if it is under the cursor.
    pub fn eat(&mut self, c: u8) -> bool {
        if self.is(c) {
            self.advance(1);
            true
        } else {
            false
        }
    }

    /// Consume `text` if the buffer continues with it.
    pub fn eat_str(&mut self, text: &str) -> bool {
        if self.rest().starts_with(text.as_bytes()) {
            self.advance(text.len());
            true
        } else {
            false
        }
    }

    pub fn rest(&self) -> &'b [u8] {
        &self.buf[self.pos..]
    }

    pub fn skip_space(&mut self) {
        self.pos = next_token(self.buf, self.pos);
    }

    pub fn skip_to_separator(&mut self) {
        self.pos = next_separator(self.buf, self.pos);
    }

    /// Move to just past the next `c`, or to the end.
    pub fn skip_past(&mut self, c: u8) {
        match self.rest().iter().position(|&b| b == c) {
            Some(i) => self.advance(i + 1),
            None => self.pos = self.buf.len(),
        }
    }

    pub fn is_integer(&self) -> bool {
        is_integer_span(self.buf, self.pos)
    }

    pub fn is_float(&self) -> bool {
        is_float_span(self.buf, self.pos)
    }

    pub fn is_string_literal(&self) -> bool {
        self.peek().is_some_and(is_string_literal_start)
    }

    pub fn is_hex_literal(&self) -> bool {
        is_hex_literal_start(self.buf, self.pos)
    }
}
