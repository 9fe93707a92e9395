//! Repository areas
//!
//! Each area owns one part of the on-disk state under the repository root:
//!
//! - `config`: repository settings (`.mgit/config`, JSON)
//! - `database`: content-addressed object store
//! - `index`: staged changes for the next commit
//! - `refs`: branches, HEAD and merge state
//! - `repository`: ties the areas together
//! - `workspace`: the working copy

pub mod config;
pub mod database;
pub mod index;
pub mod refs;
pub mod repository;
pub mod workspace;
