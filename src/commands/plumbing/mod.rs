//! Plumbing commands
//!
//! Direct access to the object store, mostly useful for scripting and debugging.
//!
//! - `cat-file`: print a stored object
//! - `hash-object`: digest a working file, optionally storing it as a blob

pub mod cat_file;
pub mod hash_object;
