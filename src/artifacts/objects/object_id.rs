//! Object identifier (content digest)
//!
//! Object IDs are lowercase hexadecimal renderings of a content digest. Their length
//! depends on the repository's hash algorithm (40 chars for SHA-1, 64 for BLAKE3).
//!
//! ## Storage
//!
//! Objects are stored in `.mgit/objects/<first-2-chars>/<remaining-chars>`

use crate::artifacts::objects::SHORT_OID_LENGTH;
use crate::errors::{Error, Result};
use std::path::PathBuf;

/// Object identifier
///
/// A validated lowercase hex digest that uniquely identifies a stored object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct ObjectId(String);

impl ObjectId {
    /// Parse and validate an object ID from a string
    ///
    /// Uppercase input is accepted and normalised to lowercase.
    pub fn try_parse(id: impl Into<String>) -> Result<Self> {
        let id = id.into();

        if id.len() < 2 || id.len() % 2 != 0 {
            return Err(Error::InvalidObjectId {
                reason: format!("invalid length {}", id.len()),
                value: id,
            });
        }
        if !id.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(Error::InvalidObjectId {
                value: id,
                reason: "non-hexadecimal characters".to_string(),
            });
        }

        Ok(Self(id.to_ascii_lowercase()))
    }

    pub fn from_digest(digest: &[u8]) -> Self {
        Self(hex::encode(digest))
    }

    /// Convert to file system path for object storage
    ///
    /// Splits the hash as `XX/YYYYYY...` where XX is the first 2 chars.
    pub fn to_path(&self) -> PathBuf {
        let (dir, file) = self.0.split_at(2);
        PathBuf::from(dir).join(file)
    }

    /// First 7 characters of the hash
    pub fn to_short_oid(&self) -> String {
        self.0.chars().take(SHORT_OID_LENGTH).collect()
    }
}

impl AsRef<str> for ObjectId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
