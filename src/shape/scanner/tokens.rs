//! Token definitions for log lines
//!
//! This module defines every token kind the scanner can produce. The tokens are defined using
//! the logos derive macro. Several content classes overlap (a version number is also a valid
//! symbol, a date is also a valid symbol), so logos resolves them by longest match first and
//! explicit priority second: typed content outranks words, and words outrank symbols.
use crate::shape::span::Span;
use logos::Logos;
use serde::Serialize;
use std::fmt;

/// All token kinds a log line can be split into
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum TokenKind {
    // Sentinels, never produced by the regex rules
    Invalid,
    Any,

    // Structural markers
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("<")]
    LAngle,
    #[token(">")]
    RAngle,
    #[token("{")]
    LCurly,
    #[token("}")]
    RCurly,
    #[token("[")]
    LSquare,
    #[token("]")]
    RSquare,

    // Punctuation
    #[token(",")]
    Comma,
    #[token(";")]
    Semi,
    #[token(":")]
    #[token("=")]
    Separator,
    #[regex(r"[ \t\r\n\f]+", priority = 5)]
    Whitespace,

    // Typed content
    #[regex(r#""([^"\\\n]|\\[^\n])*""#, priority = 20)]
    #[regex(r#"'([^'\\\n]|\\[^\n])*'"#, priority = 20)]
    QuotedString,
    #[regex(r#"[a-zA-Z][a-zA-Z0-9+.\-]*://[^\s"'<>(){}\[\],;]*"#, priority = 19)]
    Url,
    #[regex(
        r"[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}",
        priority = 18
    )]
    Uuid,
    #[regex(r"[0-9a-fA-F]{2}(:[0-9a-fA-F]{2}){5}", priority = 17)]
    #[regex(r"[0-9a-fA-F]{2}(-[0-9a-fA-F]{2}){5}", priority = 17)]
    MacAddress,
    #[regex(r"([0-9a-fA-F]{1,4}:){7}[0-9a-fA-F]{1,4}", priority = 16)]
    #[regex(r"([0-9a-fA-F]{1,4}:){1,7}:", priority = 16)]
    #[regex(r"([0-9a-fA-F]{1,4}:){1,6}(:[0-9a-fA-F]{1,4}){1,6}", priority = 16)]
    #[regex(r"::([0-9a-fA-F]{1,4}:){0,6}[0-9a-fA-F]{1,4}", priority = 16)]
    Ipv6Address,
    #[regex(r"[0-9]{1,2}:[0-9]{2}(:[0-9]{2})?([.,][0-9]+)?", priority = 15)]
    #[regex(
        r"[0-9]{4}-[0-9]{2}-[0-9]{2}([Tt][0-9]{2}:[0-9]{2}(:[0-9]{2})?([.,][0-9]+)?([Zz]|[+\-][0-9]{2}:?[0-9]{2})?)?",
        priority = 15
    )]
    Time,
    #[regex(r"[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}", priority = 14)]
    Ipv4Address,
    #[regex(r"[vV]?[0-9]+\.[0-9]+(\.[0-9]+)+", priority = 13)]
    VersionNumber,
    #[regex(r"0[xX][0-9a-fA-F]+", priority = 12)]
    HexNumber,
    #[regex(r"0[0-7]+", priority = 11)]
    OctalNumber,
    #[regex(r"-?[0-9]+(\.[0-9]+)?%", priority = 10)]
    Percentage,
    #[regex(r"-?[0-9]+(\.[0-9]+)?([eE][+\-]?[0-9]+)?", priority = 9)]
    Number,
    #[regex(r"(\.{1,2})?(/[a-zA-Z0-9_.~+\-]+)+/?", priority = 8)]
    Path,

    // Untyped content
    #[regex(r"[a-zA-Z]+", priority = 7)]
    Word,
    #[regex(r"[a-zA-Z0-9_.@#$&*+!?~^|/\\-]+", priority = 6)]
    Symbol,
}

impl TokenKind {
    pub fn is_opening(&self) -> bool {
        matches!(
            self,
            TokenKind::LParen | TokenKind::LAngle | TokenKind::LCurly | TokenKind::LSquare
        )
    }

    pub fn is_closing(&self) -> bool {
        self.opener_for().is_some()
    }

    pub fn is_bracket(&self) -> bool {
        self.is_opening() || self.is_closing()
    }

    /// The opening bracket this closing bracket pairs with
    pub fn opener_for(&self) -> Option<TokenKind> {
        match self {
            TokenKind::RParen => Some(TokenKind::LParen),
            TokenKind::RAngle => Some(TokenKind::LAngle),
            TokenKind::RCurly => Some(TokenKind::LCurly),
            TokenKind::RSquare => Some(TokenKind::LSquare),
            _ => None,
        }
    }

    pub fn is_whitespace(&self) -> bool {
        matches!(self, TokenKind::Whitespace)
    }

    /// Content classes that are worth exposing as anonymous columns
    pub fn is_typed_content(&self) -> bool {
        matches!(
            self,
            TokenKind::Number
                | TokenKind::HexNumber
                | TokenKind::OctalNumber
                | TokenKind::VersionNumber
                | TokenKind::QuotedString
                | TokenKind::Ipv4Address
                | TokenKind::Ipv6Address
                | TokenKind::MacAddress
                | TokenKind::Uuid
                | TokenKind::Url
                | TokenKind::Path
                | TokenKind::Time
                | TokenKind::Percentage
        )
    }

    /// Equality where `Any` matches every kind
    pub fn matches(&self, other: TokenKind) -> bool {
        *self == other || *self == TokenKind::Any || other == TokenKind::Any
    }

    /// Four-character name used by the aligned dump
    pub fn short_name(&self) -> &'static str {
        match self {
            TokenKind::Invalid => "inv",
            TokenKind::Any => "any",
            TokenKind::LParen => "lpar",
            TokenKind::RParen => "rpar",
            TokenKind::LAngle => "lang",
            TokenKind::RAngle => "rang",
            TokenKind::LCurly => "lcur",
            TokenKind::RCurly => "rcur",
            TokenKind::LSquare => "lsqu",
            TokenKind::RSquare => "rsqu",
            TokenKind::Comma => "comm",
            TokenKind::Semi => "semi",
            TokenKind::Separator => "sep",
            TokenKind::Whitespace => "wspc",
            TokenKind::QuotedString => "quot",
            TokenKind::Url => "url",
            TokenKind::Uuid => "uuid",
            TokenKind::MacAddress => "mac",
            TokenKind::Ipv6Address => "ipv6",
            TokenKind::Time => "time",
            TokenKind::Ipv4Address => "ipv4",
            TokenKind::VersionNumber => "vers",
            TokenKind::HexNumber => "hex",
            TokenKind::OctalNumber => "oct",
            TokenKind::Percentage => "pcnt",
            TokenKind::Number => "num",
            TokenKind::Path => "path",
            TokenKind::Word => "word",
            TokenKind::Symbol => "sym",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.short_name())
    }
}

/// One classified fragment of the line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }
}
