//! Working tree status inspection
//!
//! Status compares three snapshots of every path: the HEAD manifest, the staged manifest
//! (HEAD overlaid with the index) and the working copy.
//!
//! - `file_change`: change kinds per side and their rendering
//! - `inspector`: per-path comparisons
//! - `status_info`: the aggregated report

pub mod file_change;
pub mod inspector;
pub mod status_info;
