//! Parse session.
//!
//! An [`OpenDdlParser`] holds one input buffer, one log callback and, after
//! [`OpenDdlParser::parse`], the resulting [`Context`]. Sessions share no
//! state with each other.

use std::fmt;

use crate::log::{default_log_callback, LogCallback};
use crate::node::{Context, NodeRef};
use crate::parser::parse_document;
use crate::scanner::normalize_buffer;

/// The bytes a session parses: a private copy or a caller's buffer.
enum Buffer<'a> {
    Owned(Vec<u8>),
    Borrowed(&'a mut [u8]),
}

impl Buffer<'_> {
    fn bytes(&self) -> &[u8] {
        match self {
            Buffer::Owned(v) => v,
            Buffer::Borrowed(b) => b,
        }
    }

    fn bytes_mut(&mut self) -> &mut [u8] {
        match self {
            Buffer::Owned(v) => v,
            Buffer::Borrowed(b) => b,
        }
    }
}

/// An OpenDDL parse session.
///
/// # Example
///
/// ```
/// use libopenddl::OpenDdlParser;
///
/// let mut text = b"Metric (key = \"up\") { string { \"z\" } }".to_vec();
/// let mut parser = OpenDdlParser::with_buffer(&mut text, false);
/// assert!(parser.parse());
/// let root = parser.root().unwrap();
/// assert_eq!(root.child(0).unwrap().node_type(), "Metric");
/// ```
pub struct OpenDdlParser<'a> {
    buffer: Option<Buffer<'a>>,
    /// Usable length after comment stripping.
    len: usize,
    log: LogCallback,
    context: Option<Context>,
}

impl<'a> OpenDdlParser<'a> {
    /// A session without input, logging to stdout.
    pub fn new() -> Self {
        Self {
            buffer: None,
            len: 0,
            log: default_log_callback(),
            context: None,
        }
    }

    /// A session over `bytes`; see [`OpenDdlParser::set_buffer`].
    pub fn with_buffer(bytes: &'a mut [u8], owns_it: bool) -> Self {
        let mut parser = Self::new();
        parser.set_buffer(bytes, owns_it);
        parser
    }

    /// Replace the input.
    ///
    /// With `owns_it` the session copies `bytes` and the caller's buffer is
    /// left alone. Without it the session works on the caller's buffer,
    /// and [`OpenDdlParser::parse`] strips comments from it in place.
    /// Callers that only hold `&[u8]`, or that must not keep the session
    /// tied to their buffer, use [`OpenDdlParser::copy_buffer`] or
    /// [`OpenDdlParser::set_owned_buffer`] instead.
    pub fn set_buffer(&mut self, bytes: &'a mut [u8], owns_it: bool) {
        if owns_it {
            self.copy_buffer(bytes);
        } else {
            self.len = bytes.len();
            self.buffer = Some(Buffer::Borrowed(bytes));
        }
    }

    /// Use a private copy of `bytes` as the input.
    pub fn copy_buffer(&mut self, bytes: &[u8]) {
        self.set_owned_buffer(bytes.to_vec());
    }

    /// Take ownership of `bytes` as the input.
    pub fn set_owned_buffer(&mut self, bytes: Vec<u8>) {
        self.len = bytes.len();
        self.buffer = Some(Buffer::Owned(bytes));
    }

    /// The input; after parsing, the comment-stripped text.
    pub fn buffer(&self) -> Option<&[u8]> {
        self.buffer.as_ref().map(|b| &b.bytes()[..self.len])
    }

    pub fn buffer_size(&self) -> usize {
        self.len
    }

    /// Install a log callback; `None` restores the stdout default.
    pub fn set_log_callback(&mut self, callback: Option<LogCallback>) {
        self.log = callback.unwrap_or_else(default_log_callback);
    }

    pub fn log_callback(&self) -> LogCallback {
        self.log.clone()
    }

    /// Strip comments, then parse the whole buffer.
    ///
    /// Returns `false` only when there is no input. Every grammar problem
    /// goes to the log callback and the tree keeps what could be read.
    /// A previous result is replaced.
    pub fn parse(&mut self) -> bool {
        let Some(buffer) = self.buffer.as_mut() else {
            return false;
        };
        if self.len == 0 {
            return false;
        }

        let bytes = &mut buffer.bytes_mut()[..self.len];
        self.len = normalize_buffer(bytes);
        self.context = Some(parse_document(&bytes[..self.len], &self.log));
        true
    }

    /// The root node of the last parse.
    pub fn root(&self) -> Option<NodeRef<'_>> {
        self.context.as_ref().map(Context::root)
    }

    pub fn context(&self) -> Option<&Context> {
        self.context.as_ref()
    }

    /// Take the result of the last parse out of the session.
    pub fn take_context(&mut self) -> Option<Context> {
        self.context.take()
    }

    /// Release the input and the tree.
    pub fn clear(&mut self) {
        self.buffer = None;
        self.len = 0;
        self.context = None;
    }
}

impl Default for OpenDdlParser<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for OpenDdlParser<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenDdlParser")
            .field("buffer_size", &self.len)
            .field("owns_buffer", &matches!(self.buffer, Some(Buffer::Owned(_))))
            .field("parsed", &self.context.is_some())
            .finish()
    }
}
