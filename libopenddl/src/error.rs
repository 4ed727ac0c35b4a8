//! Diagnostic types for OpenDDL parsing.
//!
//! Parsing never aborts on malformed input. Each problem becomes a
//! [`Diagnostic`] that is rendered with its location and handed to the
//! session's log callback; the tree keeps whatever could be built.

use thiserror::Error;

/// A problem found while parsing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A structural token was not where the grammar needs it.
    #[error("Invalid token {found}, {expected} expected.")]
    InvalidToken { found: String, expected: &'static str },

    /// A typed payload declared with `[0]`.
    #[error("0 for array is invalid.")]
    ZeroArrayWidth,

    /// A byte that cannot start a structure at document level.
    #[error("Unexpected {0} outside of a structure.")]
    StrayToken(String),
}

impl Diagnostic {
    /// A structural mismatch at `pos` in `buf`.
    pub fn invalid_token(buf: &[u8], pos: usize, expected: &'static str) -> Self {
        Diagnostic::InvalidToken {
            found: describe_byte(buf, pos),
            expected,
        }
    }

    /// A stray byte at `pos` in `buf`.
    pub fn stray_token(buf: &[u8], pos: usize) -> Self {
        Diagnostic::StrayToken(describe_byte(buf, pos))
    }

    /// Render the message with a location prefix.
    pub fn with_location(&self, loc: Location) -> String {
        format!("line {}: {}", loc.line, self)
    }
}

/// Quote the byte at `pos`, or name the end of input.
fn describe_byte(buf: &[u8], pos: usize) -> String {
    match buf.get(pos) {
        Some(&b) if b.is_ascii_graphic() => format!("'{}'", b as char),
        Some(&b) => format!("0x{:02x}", b),
        None => "end of input".to_string(),
    }
}

/// Where a diagnostic was raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    /// One-based line number.
    pub line: usize,
}

impl Location {
    /// Locate a byte offset by counting the newlines before it.
    ///
    /// Comment stripping keeps one newline per comment, so offsets into the
    /// normalized buffer map to the same lines as the input text.
    pub fn of(buf: &[u8], pos: usize) -> Self {
        let end = pos.min(buf.len());
        let line = buf[..end].iter().filter(|&&b| b == b'\n').count() + 1;
        Self { line }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_counts_lines() {
        let buf = b"a\nb\n\nc";
        assert_eq!(Location::of(buf, 0).line, 1);
        assert_eq!(Location::of(buf, 2).line, 2);
        assert_eq!(Location::of(buf, 5).line, 4);
        assert_eq!(Location::of(buf, 99).line, 4);
    }

    #[test]
    fn test_messages() {
        let d = Diagnostic::invalid_token(b"A ]", 2, "'{'");
        assert_eq!(d.to_string(), "Invalid token ']', '{' expected.");
        let d = Diagnostic::invalid_token(b"A", 1, "'}'");
        assert_eq!(
            d.with_location(Location { line: 3 }),
            "line 3: Invalid token end of input, '}' expected."
        );
        assert_eq!(Diagnostic::ZeroArrayWidth.to_string(), "0 for array is invalid.");
    }
}
