//! One-line parser
//!
//!     [DataParser] runs the whole pipeline over a single token source: bracket grouping with
//!     format discovery, then pairing with the schema hasher attached to the outermost level.
//!     The result is plain owned data and can be sent between threads freely.
//!
//!     The parse never fails. A line with no discoverable structure comes back with no pairs
//!     and everything in the free row.

use crate::shape::element::{Element, ElementKind};
use crate::shape::format::FormatDescriptor;
use crate::shape::grouping::{group_tokens_within, DEFAULT_MAX_DEPTH};
use crate::shape::pairing::pair_up;
use crate::shape::scanner::{Scanner, TokenKind, TokenSource};
use crate::shape::schema::{SchemaHasher, SchemaId};
use crate::shape::span::{InputLine, Span};
use serde::Serialize;
use tracing::debug;

pub const DEFAULT_BLANK_KEY_PREFIX: &str = "col_";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseResult {
    pub pairs: Vec<Element>,
    pub free_row: Vec<Element>,
    pub schema: SchemaId,
    pub format: FormatDescriptor,
    /// Brackets nested deeper than the parser's bound were left as plain leaves
    pub depth_limited: bool,
}

/// One named field of a parsed line, as a tabular consumer sees it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    pub name: String,
    pub value: String,
    /// Token kind of a scalar value, `Invalid` for lists and groups
    pub kind: TokenKind,
    pub span: Span,
}

impl ParseResult {
    /// Columns named after their keys, with `col_N` names for blank keys
    pub fn columns(&self, input: InputLine<'_>) -> Vec<Column> {
        self.columns_with_prefix(input, DEFAULT_BLANK_KEY_PREFIX)
    }

    /// Like [ParseResult::columns]; blank keys are numbered in pair order behind `prefix`
    pub fn columns_with_prefix(&self, input: InputLine<'_>, prefix: &str) -> Vec<Column> {
        let mut blank_index = 0;
        let mut columns = Vec::with_capacity(self.pairs.len());

        for pair in &self.pairs {
            let (Some(key), Some(value)) = (pair.pair_key(), pair.pair_value()) else {
                continue;
            };
            let name = if key.span().is_empty() {
                let name = format!("{}{}", prefix, blank_index);
                blank_index += 1;
                name
            } else {
                input.substring(key.span()).into_owned()
            };
            columns.push(Column {
                name,
                value: input.substring(value.span()).into_owned(),
                kind: scalar_kind(value),
                span: value.span(),
            });
        }
        columns
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty() && self.free_row.is_empty()
    }
}

fn scalar_kind(value: &Element) -> TokenKind {
    match value {
        Element::Leaf(token) => token.kind,
        Element::Node {
            kind: ElementKind::Value,
            ..
        } => value.value_token(),
        Element::Node { .. } => TokenKind::Invalid,
    }
}

/// Drives grouping and pairing over one token source
pub struct DataParser<S> {
    source: S,
    max_depth: usize,
}

impl<S: TokenSource> DataParser<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Bounds bracket nesting; deeper brackets are kept as plain leaves
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn parse(self) -> ParseResult {
        self.parse_with_source().0
    }

    /// Parses and hands the drained source back, e.g. to inspect a [Capped] wrapper
    ///
    /// [Capped]: crate::shape::scanner::Capped
    pub fn parse_with_source(mut self) -> (ParseResult, S) {
        let grouping = group_tokens_within(&mut self.source, self.max_depth);
        let depth_limited = grouping.depth_limited;
        let format = grouping.format;

        let mut hasher = SchemaHasher::new();
        let pairing = pair_up(
            self.source.input(),
            format,
            grouping.elements,
            Some(&mut hasher),
        );
        let schema = hasher.finish();

        debug!(
            format = format.name,
            pairs = pairing.pairs.len(),
            free = pairing.free_row.len(),
            schema = %schema,
            "parsed line"
        );

        let result = ParseResult {
            pairs: pairing.pairs,
            free_row: pairing.free_row,
            schema,
            format,
            depth_limited,
        };
        (result, self.source)
    }
}

/// Parses one line with the default scanner
pub fn parse_line(line: &str) -> ParseResult {
    DataParser::new(Scanner::new(line)).parse()
}
