//! Porcelain commands
//!
//! - `init`: create a repository
//! - `add`: stage files
//! - `rm`: stage removals
//! - `commit`: seal the staged changes
//! - `status`: compare HEAD, the staged manifest and the working copy
//! - `diff`: line diffs of working or staged changes
//! - `log`: first-parent history
//! - `branch`: create and list branches
//! - `checkout`: switch branches or detach HEAD
//! - `merge`: fast-forward or three-way merge another branch

pub mod add;
pub mod branch;
pub mod checkout;
pub mod commit;
pub mod diff;
pub mod init;
pub mod log;
pub mod merge;
pub mod rm;
pub mod status;
