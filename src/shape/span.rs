//! Byte spans and the borrowed input line
//!
//! Every parsed fragment is addressed by a half-open byte interval into the original line.
//! Spans never own text; [InputLine] materializes it on demand.

use serde::Serialize;
use std::borrow::Cow;
use std::fmt;
use std::ops::Range;

/// A half-open byte interval `[begin, end)` into one input line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Span {
    pub begin: usize,
    pub end: usize,
}

impl Span {
    pub fn new(begin: usize, end: usize) -> Self {
        debug_assert!(begin <= end, "span begins after it ends: {}..{}", begin, end);
        Self { begin, end }
    }

    /// A zero-length span anchored at `offset`, used for synthetic blank keys
    pub fn empty_at(offset: usize) -> Self {
        Self {
            begin: offset,
            end: offset,
        }
    }

    /// The span running from the start of `first` to the end of `last`
    pub fn covering(first: Span, last: Span) -> Self {
        Self {
            begin: first.begin,
            end: last.end.max(first.begin),
        }
    }

    pub fn range(&self) -> Range<usize> {
        self.begin..self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.begin
    }

    pub fn is_empty(&self) -> bool {
        self.begin == self.end
    }
}

impl From<Range<usize>> for Span {
    fn from(range: Range<usize>) -> Self {
        Span::new(range.start, range.end)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.begin, self.end)
    }
}

/// Read-only view over the bytes of one line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputLine<'a> {
    text: &'a str,
}

impl<'a> InputLine<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { text }
    }

    pub fn as_str(&self) -> &'a str {
        self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Raw bytes covered by `span`. Out-of-range spans are clamped to the line.
    pub fn bytes(&self, span: Span) -> &'a [u8] {
        let bytes = self.text.as_bytes();
        let end = span.end.min(bytes.len());
        let begin = span.begin.min(end);
        &bytes[begin..end]
    }

    /// Text covered by `span`.
    ///
    /// Spans produced by error recovery can split a multi-byte character, so this goes through
    /// a lossy conversion instead of slicing the `str` directly.
    pub fn substring(&self, span: Span) -> Cow<'a, str> {
        String::from_utf8_lossy(self.bytes(span))
    }
}
