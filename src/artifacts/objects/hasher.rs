//! Content hashing
//!
//! Every stored object is named by the digest of its framed bytes. The algorithm is a
//! per-repository setting chosen at `init` time and recorded in the config.

use crate::artifacts::objects::object_id::ObjectId;
use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};

/// A pluggable digest function
pub trait ContentHasher {
    /// Number of bytes produced by [`ContentHasher::hash`]
    fn digest_len(&self) -> usize;

    fn hash(&self, data: &[u8]) -> Vec<u8>;

    /// Lowercase hex rendering of a digest, `2 * digest_len` characters long
    fn to_hex(&self, digest: &[u8]) -> String {
        hex::encode(digest)
    }

    fn object_id(&self, data: &[u8]) -> ObjectId {
        ObjectId::from_digest(&self.hash(data))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    #[default]
    Sha1,
    Blake3,
}

impl HashAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            HashAlgorithm::Sha1 => "sha1",
            HashAlgorithm::Blake3 => "blake3",
        }
    }

    /// Length of an object id in hex characters
    pub fn hex_len(&self) -> usize {
        self.digest_len() * 2
    }
}

impl ContentHasher for HashAlgorithm {
    fn digest_len(&self) -> usize {
        match self {
            HashAlgorithm::Sha1 => 20,
            HashAlgorithm::Blake3 => blake3::OUT_LEN,
        }
    }

    fn hash(&self, data: &[u8]) -> Vec<u8> {
        match self {
            HashAlgorithm::Sha1 => {
                let mut hasher = Sha1::new();
                hasher.update(data);
                hasher.finalize().to_vec()
            }
            HashAlgorithm::Blake3 => blake3::hash(data).as_bytes().to_vec(),
        }
    }
}

impl std::str::FromStr for HashAlgorithm {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "sha1" => Ok(HashAlgorithm::Sha1),
            "blake3" => Ok(HashAlgorithm::Blake3),
            other => Err(format!("unsupported hash algorithm '{other}'")),
        }
    }
}

impl std::fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
