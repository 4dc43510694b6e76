//! # logshape
//!
//! Structure discovery for single lines of unstructured log text.
//!
//! Given one line, logshape infers a record shape: an ordered list of key/value pairs plus a
//! schema fingerprint derived from the key text. No schema is needed up front, which lets a
//! line-oriented viewer expose ad-hoc fields as table columns for formats it has never seen.
//!
//! File Layout
//!
//! src/shape
//!   ├── span / scanner     Byte spans, the input line, and the default token source
//!   ├── element            The element tree (leaves and labeled groups)
//!   ├── format / grouping  Bracket grouping and delimiter-format classification
//!   ├── pairing / schema   Key/value pairing and the schema fingerprint
//!   ├── parser             One-line façade tying the passes together
//!   ├── formats            Diagnostic renderers (caret dump, treeviz)
//!   └── processor / config Line and file processing for the CLI
//!
//! For the fluent assertion helpers used across the tests, see the [testing module](shape::testing).

pub mod shape;
