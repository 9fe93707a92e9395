//! Index file format
//!
//! The index (staging area) records the changes that the next commit will seal on top of
//! its parent's manifest.
//!
//! ## File Format (Version 1)
//!
//! ```text
//! Header (12 bytes):
//!   - Signature: "MIDX" (4 bytes)
//!   - Version: 1 (4 bytes)
//!   - Entry count (4 bytes)
//!
//! Entries (variable length, in staging order):
//!   - Kind: 1 = upsert, 2 = removal (1 byte)
//!   - Path length (2 bytes) and path bytes
//!   - Object id length (1 byte) and object id (empty for removals)
//!
//! Checksum (20 bytes):
//!   - SHA-1 hash of all preceding bytes
//! ```
//!
//! All integers are in network byte order.

pub mod checksum;
pub mod index_entry;
pub mod index_header;

/// Size of SHA-1 checksum in bytes
pub const CHECKSUM_SIZE: usize = 20;

/// Size of index header in bytes
pub const HEADER_SIZE: usize = 12;

/// Magic signature identifying index files
pub const SIGNATURE: &[u8; 4] = b"MIDX";

/// Index file format version
pub const VERSION: u32 = 1;
