//! References (branches, HEAD, merge state)
//!
//! References are human-readable names pointing to commits. Every reference is a small
//! text file under the metadata directory:
//!
//! - `HEAD`: either `ref: refs/heads/<name>` (symbolic) or a bare commit id (detached)
//! - `refs/heads/<name>`: the tip commit id of a branch
//! - `MERGE_HEAD` / `MERGE_MSG`: the incoming tip and message of an unfinished merge
//!
//! Writes hold an exclusive lock on the file being written.

use crate::areas::database::Database;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::{Error, ErrorKind, Result};
use derive_new::new;
use file_guard::Lock;
use std::io::Write;
use std::ops::DerefMut;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Regex pattern for parsing symbolic references
const SYMREF_REGEX: &str = r"^ref: (.+)$";

/// Name of the HEAD reference
pub const HEAD_REF_NAME: &str = "HEAD";
const MERGE_HEAD_REF_NAME: &str = "MERGE_HEAD";
const MERGE_MSG_FILE_NAME: &str = "MERGE_MSG";

/// Where HEAD points
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Head {
    /// HEAD names a branch; the branch may not have a commit yet
    Symbolic(BranchName),
    /// HEAD holds a commit id directly
    Detached(ObjectId),
}

/// A branch as seen by [`Refs::list_branches`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchEntry {
    pub name: BranchName,
    pub is_current: bool,
}

/// Lazy listing of branches
///
/// Each call to [`BranchListing::iter`] walks `refs/heads` afresh, so the listing can be
/// consumed any number of times and always reflects the refs on disk.
#[derive(Debug)]
pub struct BranchListing<'r> {
    refs: &'r Refs,
    current: Option<BranchName>,
}

impl<'r> BranchListing<'r> {
    pub fn iter(&self) -> impl Iterator<Item = BranchEntry> + '_ {
        let heads_path = self.refs.heads_path();

        WalkDir::new(&heads_path)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter_map(move |entry| {
                let relative_path = entry.path().strip_prefix(&heads_path).ok()?;
                let name = relative_path
                    .components()
                    .map(|component| component.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/");

                BranchName::try_parse(name).ok()
            })
            .map(|name| BranchEntry {
                is_current: self.current.as_ref() == Some(&name),
                name,
            })
    }
}

impl<'r, 'l> IntoIterator for &'l BranchListing<'r> {
    type Item = BranchEntry;
    type IntoIter = Box<dyn Iterator<Item = BranchEntry> + 'l>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

/// Reference store
#[derive(Debug, new)]
pub struct Refs {
    /// Path to the metadata directory (typically `.mgit`)
    path: Box<Path>,
}

impl Refs {
    /// Read where HEAD points
    pub fn head(&self) -> Result<Head> {
        let content = self
            .read_ref_file(&self.head_path())?
            .ok_or_else(|| Error::dangling_ref(HEAD_REF_NAME, "HEAD is missing"))?;

        let symref_match = regex::Regex::new(SYMREF_REGEX)
            .map_err(|e| Error::corrupt("HEAD", e.to_string()))?
            .captures(&content)
            .map(|captures| captures[1].to_string());

        match symref_match {
            Some(ref_path) => Ok(Head::Symbolic(BranchName::try_parse_ref_path(&ref_path)?)),
            None => Ok(Head::Detached(ObjectId::try_parse(content)?)),
        }
    }

    /// Branch named by a symbolic HEAD
    pub fn current_branch(&self) -> Result<Option<BranchName>> {
        match self.head()? {
            Head::Symbolic(name) => Ok(Some(name)),
            Head::Detached(_) => Ok(None),
        }
    }

    /// Commit HEAD points at, or `None` while the current branch is unborn
    pub fn head_oid(&self) -> Result<Option<ObjectId>> {
        match self.head()? {
            Head::Symbolic(name) => self.read_branch(&name),
            Head::Detached(oid) => Ok(Some(oid)),
        }
    }

    /// Follow HEAD to a stored commit
    ///
    /// Fails with `DanglingRef` when the branch has no tip yet or the id names no commit.
    pub fn resolve_head(&self, database: &Database) -> Result<ObjectId> {
        let (ref_name, oid) = match self.head()? {
            Head::Symbolic(name) => {
                let oid = self
                    .read_branch(&name)?
                    .ok_or_else(|| {
                        Error::dangling_ref(name.ref_path(), "branch has no commits yet")
                    })?;
                (name.ref_path(), oid)
            }
            Head::Detached(oid) => (HEAD_REF_NAME.to_string(), oid),
        };

        match database.object_type(&oid) {
            Ok(ObjectType::Commit) => Ok(oid),
            Ok(other) => Err(Error::dangling_ref(ref_name, format!("{oid} is a {other}"))),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(Error::dangling_ref(ref_name, format!("commit {oid} is missing")))
            }
            Err(e) => Err(e),
        }
    }

    pub fn read_branch(&self, name: &BranchName) -> Result<Option<ObjectId>> {
        self.read_ref_file(&self.branch_path(name))?
            .map(ObjectId::try_parse)
            .transpose()
    }

    pub fn branch_exists(&self, name: &BranchName) -> bool {
        self.branch_path(name).is_file()
    }

    pub fn create_branch(&self, name: &BranchName, oid: &ObjectId) -> Result<()> {
        if self.branch_exists(name) {
            return Err(Error::BranchExists {
                name: name.to_string(),
            });
        }

        self.update_ref_file(&self.branch_path(name), oid.as_ref())?;
        tracing::info!(branch = %name, %oid, "created branch");

        Ok(())
    }

    /// Rebind a branch to a commit, creating the branch if needed
    pub fn set_branch_tip(&self, name: &BranchName, oid: &ObjectId) -> Result<()> {
        self.update_ref_file(&self.branch_path(name), oid.as_ref())?;
        tracing::info!(branch = %name, %oid, "advanced branch tip");

        Ok(())
    }

    /// Advance whatever HEAD points at: the branch tip, or HEAD itself when detached
    pub fn update_head(&self, oid: &ObjectId) -> Result<()> {
        match self.head()? {
            Head::Symbolic(name) => self.set_branch_tip(&name, oid),
            Head::Detached(_) => self.set_head(&Head::Detached(oid.clone())),
        }
    }

    pub fn set_head(&self, head: &Head) -> Result<()> {
        let content = match head {
            Head::Symbolic(name) => format!("ref: {}", name.ref_path()),
            Head::Detached(oid) => oid.to_string(),
        };

        tracing::debug!(head = %content, "updating HEAD");
        self.update_ref_file(&self.head_path(), &content)
    }

    pub fn list_branches(&self) -> Result<BranchListing<'_>> {
        Ok(BranchListing {
            refs: self,
            current: self.current_branch()?,
        })
    }

    pub fn read_merge_head(&self) -> Result<Option<ObjectId>> {
        self.read_ref_file(&self.path.join(MERGE_HEAD_REF_NAME))?
            .map(ObjectId::try_parse)
            .transpose()
    }

    pub fn read_merge_message(&self) -> Result<Option<String>> {
        let path = self.path.join(MERGE_MSG_FILE_NAME);

        match std::fs::read_to_string(&path) {
            Ok(message) => Ok(Some(message.strip_suffix('\n').unwrap_or(&message).to_string())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::io(&path, e)),
        }
    }

    /// Record an unfinished merge of `incoming`
    pub fn write_merge_state(&self, incoming: &ObjectId, message: &str) -> Result<()> {
        self.update_ref_file(&self.path.join(MERGE_MSG_FILE_NAME), message)?;
        self.update_ref_file(&self.path.join(MERGE_HEAD_REF_NAME), incoming.as_ref())
    }

    pub fn clear_merge_state(&self) -> Result<()> {
        for name in [MERGE_HEAD_REF_NAME, MERGE_MSG_FILE_NAME] {
            let path = self.path.join(name);

            match std::fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(Error::io(&path, e)),
            }
        }

        Ok(())
    }

    fn read_ref_file(&self, path: &Path) -> Result<Option<String>> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let content = content.trim();
                Ok((!content.is_empty()).then(|| content.to_string()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::io(path, e)),
        }
    }

    fn update_ref_file(&self, path: &Path, raw_ref: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }

        let mut ref_file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .map_err(|e| Error::io(path, e))?;
        let mut lock =
            file_guard::lock(&mut ref_file, Lock::Exclusive, 0, 1).map_err(|e| Error::io(path, e))?;
        writeln!(lock.deref_mut(), "{raw_ref}").map_err(|e| Error::io(path, e))?;

        Ok(())
    }

    fn branch_path(&self, name: &BranchName) -> PathBuf {
        self.path.join(name.ref_path())
    }

    pub fn head_path(&self) -> PathBuf {
        self.path.join(HEAD_REF_NAME)
    }

    pub fn heads_path(&self) -> PathBuf {
        self.path.join("refs").join("heads")
    }
}
