//! Working-copy reconciliation
//!
//! Moving the working copy between manifests touches only the paths that differ, and
//! every such path is checked for local work before anything is written:
//!
//! - `migration`: computes the path changes, detects conflicts, applies them
//! - `conflict`: conflict kinds and their messages

pub mod conflict;
pub mod migration;
