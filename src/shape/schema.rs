//! Schema fingerprints
//!
//! A line's schema id is a SHA-1 digest over its top-level key text, fed in pair order. Lines
//! with the same keys in the same order share an id whatever their values are. The digest is
//! used only as a fingerprint, never for integrity.
//!
//! The all-zero id means "no schema": nothing was hashed, or the single-pair collapse rule
//! threw the fingerprint away.

use serde::{Serialize, Serializer};
use sha1::{Digest, Sha1};
use std::fmt;

pub const SCHEMA_ID_LEN: usize = 20;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SchemaId([u8; SCHEMA_ID_LEN]);

impl SchemaId {
    pub fn from_bytes(bytes: [u8; SCHEMA_ID_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; SCHEMA_ID_LEN] {
        &self.0
    }

    /// True for the zero id, i.e. no schema was computed
    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|byte| *byte == 0)
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for SchemaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for SchemaId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

/// Running digest over key text for one line
#[derive(Clone, Default)]
pub struct SchemaHasher {
    digest: Sha1,
    fed: bool,
    invalidated: bool,
}

impl SchemaHasher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, key_text: &[u8]) {
        self.digest.update(key_text);
        self.fed = true;
    }

    /// Discards everything hashed so far; the line will report the zero id
    pub fn invalidate(&mut self) {
        self.digest = Sha1::new();
        self.invalidated = true;
    }

    pub fn is_invalidated(&self) -> bool {
        self.invalidated
    }

    pub fn finish(self) -> SchemaId {
        if self.invalidated || !self.fed {
            return SchemaId::default();
        }
        SchemaId(self.digest.finalize().into())
    }
}

impl fmt::Debug for SchemaHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaHasher")
            .field("fed", &self.fed)
            .field("invalidated", &self.invalidated)
            .finish()
    }
}
