//! A minimal content-addressed version-control engine
//!
//! Files are stored as blobs, commits record a full path-to-blob manifest, and branches
//! are named pointers to commits. Merging finds the closest common ancestor and
//! reconciles the three manifests path by path.
//!
//! All repository state lives under `.mgit/` at the repository root.
//!
//! ```no_run
//! use mgit::areas::config::Config;
//! use mgit::areas::repository::Repository;
//! use std::path::Path;
//!
//! # fn main() -> mgit::errors::Result<()> {
//! let repository = Repository::init(Path::new("project"), Config::default())?;
//! repository.stage(&["notes.txt".into()])?;
//! repository.seal_commit("Add notes")?;
//! # Ok(())
//! # }
//! ```

pub mod areas;
pub mod artifacts;
pub mod commands;
pub mod errors;
