//! Command implementations
//!
//! Commands are methods on [`Repository`](crate::areas::repository::Repository), split the
//! way the CLI presents them:
//!
//! - `plumbing`: direct object access (cat-file, hash-object)
//! - `porcelain`: version-control workflows (add, commit, merge, ...)
//!
//! Most porcelain commands come in two layers: an operation returning a typed result
//! (`stage`, `seal_commit`, `begin_merge`, ...) and a command printing a report to the
//! repository writer (`add`, `commit`, `merge`, ...).

pub mod plumbing;
pub mod porcelain;
