//! Delimiter formats and the classifiers that pick one
//!
//! Format Descriptors
//!
//!     A line is either semicolon-delimited, comma-delimited or plain. The descriptor names the
//!     two tokens the pairing engine looks for when it needs to find where one field's value
//!     ends and the next field's key begins:
//!         - the terminator closes a field (`;` for SEMI, `,` for COMMA),
//!         - the appender continues a value across a sub-delimiter (`,` inside a SEMI field).
//!     PLAIN has neither, and pairing falls back to positional heuristics. The key/value marker
//!     itself is always the [TokenKind::Separator] token (`=` or `:`).
//!
//! Classifiers
//!
//!     Two small state machines watch every token and model the alternation
//!     `key <separator> value <delimiter> key <separator> value ...` for their delimiter.
//!     Whitespace and brackets never move them. A token that breaks the alternation sends the
//!     machine to `Error`, where it stays. Neither machine requires balanced brackets.

use crate::shape::scanner::TokenKind;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FormatDescriptor {
    pub name: &'static str,
    pub appender: TokenKind,
    pub terminator: TokenKind,
}

impl FormatDescriptor {
    pub const SEMI: FormatDescriptor = FormatDescriptor {
        name: "semi",
        appender: TokenKind::Comma,
        terminator: TokenKind::Semi,
    };

    pub const COMMA: FormatDescriptor = FormatDescriptor {
        name: "comma",
        appender: TokenKind::Invalid,
        terminator: TokenKind::Comma,
    };

    pub const PLAIN: FormatDescriptor = FormatDescriptor {
        name: "plain",
        appender: TokenKind::Invalid,
        terminator: TokenKind::Invalid,
    };

    pub fn is_appender(&self, kind: TokenKind) -> bool {
        self.appender != TokenKind::Invalid && self.appender == kind
    }

    pub fn is_terminator(&self, kind: TokenKind) -> bool {
        self.terminator != TokenKind::Invalid && self.terminator == kind
    }
}

impl fmt::Display for FormatDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ClassifierState {
    Error,
    Init,
    SeenKey,
    SeenValue,
}

fn is_neutral(kind: TokenKind) -> bool {
    kind.is_whitespace() || kind.is_bracket()
}

/// Transition for the semicolon-delimited classifier
pub fn semi_next(state: ClassifierState, kind: TokenKind) -> ClassifierState {
    use ClassifierState::*;

    if state == Error {
        return Error;
    }
    if is_neutral(kind) {
        return state;
    }
    match (state, kind) {
        (Init, TokenKind::Semi | TokenKind::Comma | TokenKind::Separator) => Error,
        (Init, _) => SeenKey,
        (SeenKey, TokenKind::Separator) => SeenValue,
        (SeenKey, TokenKind::Semi) => Error,
        (SeenValue, TokenKind::Semi) => Init,
        (current, _) => current,
    }
}

/// Transition for the comma-delimited classifier
pub fn comma_next(state: ClassifierState, kind: TokenKind) -> ClassifierState {
    use ClassifierState::*;

    if state == Error {
        return Error;
    }
    if is_neutral(kind) {
        return state;
    }
    match (state, kind) {
        (Init, TokenKind::Comma) => Init,
        (Init, TokenKind::Semi | TokenKind::Separator) => Error,
        (Init, _) => SeenKey,
        (SeenKey, TokenKind::Separator) => SeenValue,
        (SeenKey, TokenKind::Comma | TokenKind::Semi) => Error,
        (SeenValue, TokenKind::Comma) => Init,
        (SeenValue, TokenKind::Semi) => Error,
        (current, _) => current,
    }
}

/// Per-kind token counts for one line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenHistogram {
    counts: std::collections::BTreeMap<TokenKind, usize>,
}

impl TokenHistogram {
    pub fn record(&mut self, kind: TokenKind) {
        *self.counts.entry(kind).or_insert(0) += 1;
    }

    pub fn count(&self, kind: TokenKind) -> usize {
        self.counts.get(&kind).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }
}

/// Runs both classifiers over a token stream and applies the fixed decision policy:
/// SEMI if the semicolon machine survived and saw at least one `;`, else COMMA if the comma
/// machine survived, else PLAIN.
#[derive(Debug, Clone)]
pub struct FormatClassifier {
    semi: ClassifierState,
    comma: ClassifierState,
    histogram: TokenHistogram,
}

impl Default for FormatClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatClassifier {
    pub fn new() -> Self {
        Self {
            semi: ClassifierState::Init,
            comma: ClassifierState::Init,
            histogram: TokenHistogram::default(),
        }
    }

    pub fn observe(&mut self, kind: TokenKind) {
        self.semi = semi_next(self.semi, kind);
        self.comma = comma_next(self.comma, kind);
        self.histogram.record(kind);
    }

    pub fn semi_state(&self) -> ClassifierState {
        self.semi
    }

    pub fn comma_state(&self) -> ClassifierState {
        self.comma
    }

    pub fn histogram(&self) -> &TokenHistogram {
        &self.histogram
    }

    pub fn decide(&self) -> FormatDescriptor {
        if self.semi != ClassifierState::Error && self.histogram.count(TokenKind::Semi) > 0 {
            FormatDescriptor::SEMI
        } else if self.comma != ClassifierState::Error {
            FormatDescriptor::COMMA
        } else {
            FormatDescriptor::PLAIN
        }
    }

    pub fn into_histogram(self) -> TokenHistogram {
        self.histogram
    }
}
