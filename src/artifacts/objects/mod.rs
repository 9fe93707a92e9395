//! Stored object types
//!
//! All content is stored as objects identified by the digest of their framed bytes.
//! There are two kinds:
//!
//! - **Blob**: File content (raw bytes)
//! - **Commit**: Snapshot with metadata (parents, author, message) and the full manifest
//!
//! All objects share the frame `<type> <size>\0<payload>`.

pub mod blob;
pub mod commit;
pub mod hasher;
pub mod manifest;
pub mod object;
pub mod object_id;
pub mod object_type;

/// Number of hex characters shown for abbreviated object ids
pub const SHORT_OID_LENGTH: usize = 7;

/// Shortest prefix accepted when resolving abbreviated object ids
pub const MIN_PREFIX_LENGTH: usize = 4;
