//! Token source
//!
//!     The engine consumes tokens through the [TokenSource] trait: a pull-style stream that
//!     yields one token and its span per call and signals the end of the line with `None`.
//!     Anything that can classify bytes into [TokenKind]s can drive the engine.
//!
//!     [Scanner] is the default source. The tokenization is handled entirely by logos, see
//!     [tokens](tokens) for the rules. Bytes no rule recognises come out as [TokenKind::Any]
//!     instead of being dropped, so every byte of the line stays covered by some token.

pub mod tokens;

pub use tokens::{Token, TokenKind};

use crate::shape::span::{InputLine, Span};
use logos::Logos;

/// A pull-style stream of tokens over one input line
pub trait TokenSource {
    /// The next token, or `None` once the line is exhausted
    fn next_token(&mut self) -> Option<Token>;

    /// The line the tokens index into
    fn input(&self) -> InputLine<'_>;
}

/// The default logos-backed token source
pub struct Scanner<'a> {
    lexer: logos::Lexer<'a, TokenKind>,
    input: InputLine<'a>,
}

impl<'a> Scanner<'a> {
    pub fn new(line: &'a str) -> Self {
        Self {
            lexer: TokenKind::lexer(line),
            input: InputLine::new(line),
        }
    }
}

impl TokenSource for Scanner<'_> {
    fn next_token(&mut self) -> Option<Token> {
        let result = self.lexer.next()?;
        let kind = result.unwrap_or(TokenKind::Any);
        Some(Token::new(kind, Span::from(self.lexer.span())))
    }

    fn input(&self) -> InputLine<'_> {
        self.input
    }
}

impl Iterator for Scanner<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        self.next_token()
    }
}

/// Ends the wrapped stream after a fixed number of tokens.
///
/// The engine is linear in the token count, so this is how callers bound the cost of a
/// pathological line.
pub struct Capped<S> {
    inner: S,
    remaining: usize,
    cut: bool,
}

impl<S: TokenSource> Capped<S> {
    pub fn new(inner: S, max_tokens: usize) -> Self {
        Self {
            inner,
            remaining: max_tokens,
            cut: false,
        }
    }

    /// Whether the cap refused a token the wrapped source still had
    pub fn was_cut(&self) -> bool {
        self.cut
    }
}

impl<S: TokenSource> TokenSource for Capped<S> {
    fn next_token(&mut self) -> Option<Token> {
        if self.remaining == 0 {
            if !self.cut && self.inner.next_token().is_some() {
                self.cut = true;
            }
            return None;
        }
        self.remaining -= 1;
        self.inner.next_token()
    }

    fn input(&self) -> InputLine<'_> {
        self.inner.input()
    }
}

/// Convenience function to tokenize a line and collect the token kinds
pub fn tokenize(line: &str) -> Vec<TokenKind> {
    Scanner::new(line).map(|token| token.kind).collect()
}

/// Convenience function to tokenize a line and collect tokens with their spans
pub fn tokenize_with_spans(line: &str) -> Vec<Token> {
    Scanner::new(line).collect()
}
