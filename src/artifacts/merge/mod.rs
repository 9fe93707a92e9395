//! Merge algorithms
//!
//! - `merge_base`: breadth-first common-ancestor search over all parent edges
//! - `resolution`: three-way reconciliation of manifests

pub mod merge_base;
pub mod resolution;
