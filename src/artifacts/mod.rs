//! Version-control data structures and algorithms
//!
//! - `branch`: branch names and revision expressions
//! - `checkout`: working-copy migrations and conflict detection
//! - `diff`: line diff (Myers' algorithm)
//! - `index`: staging file format
//! - `log`: first-parent history traversal
//! - `merge`: merge-base search and three-way resolution
//! - `objects`: stored object types (blob, commit) and their ids
//! - `status`: working tree status inspection

pub mod branch;
pub mod checkout;
pub mod diff;
pub mod index;
pub mod log;
pub mod merge;
pub mod objects;
pub mod status;
