//! Main module for logshape library functionality
//!
//! The Discovery Pipeline
//!
//!     1. A token source yields typed tokens with byte spans. See [scanner](scanner).
//!     2. The bracket-grouping pass folds matched brackets into group elements and, on the
//!        same walk, classifies the line's delimiter format. See [grouping](grouping).
//!     3. The pairing engine turns the grouped elements into key/value pairs, innermost
//!        groups first, and folds the top-level key text into a schema fingerprint. See
//!        [pairing](pairing).
//!
//!     Nothing after step 2 looks at raw tokens again; only the element tree and spans flow
//!     forward. Each line gets a fresh tree and fresh classifier state, so lines can be parsed
//!     on independent threads without any coordination.

pub mod config;
pub mod element;
pub mod format;
pub mod formats;
pub mod grouping;
pub mod pairing;
pub mod parser;
pub mod processor;
pub mod scanner;
pub mod schema;
pub mod span;
pub mod testing;

pub use element::{Element, ElementKind};
pub use format::FormatDescriptor;
pub use parser::{parse_line, Column, DataParser, ParseResult};
pub use scanner::{Scanner, Token, TokenKind, TokenSource};
pub use schema::SchemaId;
pub use span::{InputLine, Span};
