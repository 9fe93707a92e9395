//! Repository configuration
//!
//! Stored as JSON at `.mgit/config`:
//!
//! ```json
//! {
//!   "hash_algorithm": "sha1",
//!   "default_branch": "master",
//!   "user": { "name": "A U Thor", "email": "author@example.com" },
//!   "merge": { "allow_unrelated_histories": false }
//! }
//! ```
//!
//! Every field is optional when reading; missing fields take their defaults.

use crate::artifacts::objects::commit::Author;
use crate::artifacts::objects::hasher::HashAlgorithm;
use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_BRANCH: &str = "master";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub hash_algorithm: HashAlgorithm,
    pub default_branch: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserConfig>,
    pub merge: MergeConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserConfig {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    /// Merge histories without a common ancestor against an empty base
    pub allow_unrelated_histories: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            hash_algorithm: HashAlgorithm::default(),
            default_branch: DEFAULT_BRANCH.to_string(),
            user: None,
            merge: MergeConfig::default(),
        }
    }
}

impl Config {
    /// Read the config file; a missing file yields the defaults
    pub fn load(path: &Path) -> Result<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Config::default()),
            Err(e) => return Err(Error::io(path, e)),
        };

        serde_json::from_str(&content).map_err(|e| Error::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self).map_err(|e| Error::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        std::fs::write(path, content + "\n").map_err(|e| Error::io(path, e))
    }

    /// Identity configured for commits, stamped with the current time
    pub fn author(&self) -> Option<Author> {
        self.user
            .as_ref()
            .map(|user| Author::new(user.name.clone(), user.email.clone()))
    }
}
