//! Commit history traversal
//!
//! `rev_list` walks first parents from a starting commit back to the root, the order
//! `log` prints history in. Ancestry questions that must see every parent (merge bases,
//! fast-forward checks) live in `merge::merge_base` instead.

pub mod rev_list;
