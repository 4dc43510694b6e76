//! Fluent assertion API for parse results
//!
//! Assertions read the same way the shape of a line is described:
//!
//!     let line = "name: bob; age: 42";
//!     assert_shape(line, &parse_line(line))
//!         .format("semi")
//!         .keys(&["name", "age"])
//!         .pair(1, |pair| {
//!             pair.value("42").value_kind(TokenKind::Number);
//!         });
//!
//! Failures panic with the path of the failing element, e.g. `pairs[1].value`.

use crate::shape::element::{Element, ElementKind};
use crate::shape::parser::ParseResult;
use crate::shape::scanner::TokenKind;
use crate::shape::span::InputLine;

// ============================================================================
// Entry Point
// ============================================================================

/// Create an assertion builder for the result of parsing `line`
pub fn assert_shape<'a>(line: &'a str, result: &'a ParseResult) -> ShapeAssertion<'a> {
    ShapeAssertion {
        input: InputLine::new(line),
        result,
    }
}

fn text(input: InputLine<'_>, element: &Element) -> String {
    input.substring(element.span()).into_owned()
}

fn summarize_pairs(input: InputLine<'_>, pairs: &[Element]) -> String {
    pairs
        .iter()
        .map(|pair| {
            let key = pair.pair_key().map(|k| text(input, k)).unwrap_or_default();
            let value = pair.pair_value().map(|v| text(input, v)).unwrap_or_default();
            format!("({:?}, {:?})", key, value)
        })
        .collect::<Vec<_>>()
        .join(", ")
}

// ============================================================================
// Line Assertions
// ============================================================================

pub struct ShapeAssertion<'a> {
    input: InputLine<'a>,
    result: &'a ParseResult,
}

impl<'a> ShapeAssertion<'a> {
    /// Assert the discovered delimiter format by name ("semi", "comma" or "plain")
    pub fn format(self, expected: &str) -> Self {
        assert_eq!(
            self.result.format.name, expected,
            "Expected format '{}', found '{}'",
            expected, self.result.format.name
        );
        self
    }

    pub fn pair_count(self, expected: usize) -> Self {
        self.pairs().pair_count(expected);
        self
    }

    pub fn no_pairs(self) -> Self {
        self.pair_count(0)
    }

    /// Assert the key text of every pair, in order. Blank keys read as "".
    pub fn keys(self, expected: &[&str]) -> Self {
        self.pairs().keys(expected);
        self
    }

    pub fn pair<F>(self, index: usize, assertion: F) -> Self
    where
        F: FnOnce(PairAssertion<'a>),
    {
        self.pairs().pair(index, assertion);
        self
    }

    /// Assert the text of the non-whitespace free-row elements, in order
    pub fn free_row(self, expected: &[&str]) -> Self {
        let actual: Vec<String> = self
            .result
            .free_row
            .iter()
            .filter(|element| !element.is_whitespace())
            .map(|element| text(self.input, element))
            .collect();
        assert_eq!(actual, expected, "Free row mismatch");
        self
    }

    pub fn schema_empty(self) -> Self {
        assert!(
            self.result.schema.is_empty(),
            "Expected no schema, found {}",
            self.result.schema
        );
        self
    }

    pub fn schema_present(self) -> Self {
        assert!(
            !self.result.schema.is_empty(),
            "Expected a schema, found none (pairs: [{}])",
            summarize_pairs(self.input, &self.result.pairs)
        );
        self
    }

    fn pairs(&self) -> PairsAssertion<'a> {
        PairsAssertion {
            input: self.input,
            pairs: &self.result.pairs,
            context: "pairs".to_string(),
        }
    }
}

// ============================================================================
// Pair List Assertions
// ============================================================================

/// Assertions over a list of pairs, top level or inside a group
pub struct PairsAssertion<'a> {
    input: InputLine<'a>,
    pairs: &'a [Element],
    context: String,
}

impl<'a> PairsAssertion<'a> {
    pub fn pair_count(self, expected: usize) -> Self {
        assert_eq!(
            self.pairs.len(),
            expected,
            "{}: Expected {} pairs, found {}: [{}]",
            self.context,
            expected,
            self.pairs.len(),
            summarize_pairs(self.input, self.pairs)
        );
        self
    }

    pub fn keys(self, expected: &[&str]) -> Self {
        let actual: Vec<String> = self
            .pairs
            .iter()
            .map(|pair| pair.pair_key().map(|k| text(self.input, k)).unwrap_or_default())
            .collect();
        assert_eq!(actual, expected, "{}: key mismatch", self.context);
        self
    }

    pub fn pair<F>(self, index: usize, assertion: F) -> Self
    where
        F: FnOnce(PairAssertion<'a>),
    {
        assert!(
            index < self.pairs.len(),
            "{}: Pair index {} out of bounds ({} pairs)",
            self.context,
            index,
            self.pairs.len()
        );
        let pair = &self.pairs[index];
        assert!(
            pair.is_kind(ElementKind::Pair),
            "{}[{}]: Expected a pair, found {}",
            self.context,
            index,
            pair.short_name()
        );
        assertion(PairAssertion {
            input: self.input,
            pair,
            context: format!("{}[{}]", self.context, index),
        });
        self
    }
}

// ============================================================================
// Pair Assertions
// ============================================================================

pub struct PairAssertion<'a> {
    input: InputLine<'a>,
    pair: &'a Element,
    context: String,
}

impl<'a> PairAssertion<'a> {
    fn key_element(&self) -> &'a Element {
        match self.pair.pair_key() {
            Some(key) => key,
            None => panic!("{}: pair has no key", self.context),
        }
    }

    fn value_element(&self) -> &'a Element {
        match self.pair.pair_value() {
            Some(value) => value,
            None => panic!("{}: pair has no value", self.context),
        }
    }

    pub fn key(self, expected: &str) -> Self {
        let actual = text(self.input, self.key_element());
        assert_eq!(actual, expected, "{}.key mismatch", self.context);
        self
    }

    /// Assert the key is a synthesized zero-length key
    pub fn blank_key(self) -> Self {
        let key = self.key_element();
        assert!(
            key.span().is_empty() && key.children().is_empty(),
            "{}.key: Expected a blank key, found '{}'",
            self.context,
            text(self.input, key)
        );
        self
    }

    pub fn value(self, expected: &str) -> Self {
        let actual = text(self.input, self.value_element());
        assert_eq!(actual, expected, "{}.value mismatch", self.context);
        self
    }

    /// Assert the token kind of a scalar value, or of a promoted leaf
    pub fn value_kind(self, expected: TokenKind) -> Self {
        let value = self.value_element();
        let actual = value.token_kind().unwrap_or_else(|| value.value_token());
        assert_eq!(actual, expected, "{}.value kind mismatch", self.context);
        self
    }

    /// Assert the value is a bracket group and run assertions over the pairs inside it
    pub fn group<F>(self, assertion: F) -> Self
    where
        F: FnOnce(PairsAssertion<'a>),
    {
        let value = self.value_element();
        assert!(
            value.is_kind(ElementKind::Group),
            "{}.value: Expected a group, found {}",
            self.context,
            value.short_name()
        );
        assertion(PairsAssertion {
            input: self.input,
            pairs: value.children(),
            context: format!("{}.value", self.context),
        });
        self
    }
}
