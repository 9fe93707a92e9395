use crate::areas::refs::Head;
use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::status::file_change::{
    FileChange, FileChangeType, IndexChangeType, WorkspaceChangeType,
};
use crate::artifacts::status::inspector::Inspector;
use crate::errors::Result;
use derive_new::new;
use std::collections::{BTreeMap, BTreeSet};

pub type ChangeSet = BTreeMap<String, FileChangeType>;
pub type FileSet = BTreeSet<String>;

/// What HEAD currently stands for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeadState {
    Branch { name: BranchName, tip: ObjectId },
    /// The branch exists only as HEAD's target until its first commit
    Unborn { name: BranchName },
    Detached { oid: ObjectId },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusInfo {
    pub head: HeadState,
    /// Incoming tip of an unfinished merge
    pub merge_head: Option<ObjectId>,
    pub changed_files: BTreeMap<String, FileChange>,
    pub untracked_files: FileSet,
}

impl StatusInfo {
    /// Staged differences from HEAD
    pub fn index_changeset(&self) -> ChangeSet {
        self.changed_files
            .iter()
            .filter(|(_, change)| change.index_change != IndexChangeType::None)
            .map(|(path, change)| (path.clone(), FileChangeType::Index(change.index_change)))
            .collect()
    }

    /// Working-copy differences from the staged manifest
    pub fn workspace_changeset(&self) -> ChangeSet {
        self.changed_files
            .iter()
            .filter(|(_, change)| change.workspace_change != WorkspaceChangeType::None)
            .map(|(path, change)| {
                (path.clone(), FileChangeType::Workspace(change.workspace_change))
            })
            .collect()
    }

    pub fn staged_paths(&self) -> Vec<&str> {
        self.changed_files
            .iter()
            .filter(|(_, change)| change.index_change != IndexChangeType::None)
            .map(|(path, _)| path.as_str())
            .collect()
    }

    pub fn is_clean(&self) -> bool {
        self.changed_files.is_empty() && self.untracked_files.is_empty()
    }
}

#[derive(new)]
pub struct Status<'r> {
    repository: &'r Repository,
}

impl<'r> Status<'r> {
    pub fn initialize(&self) -> Result<StatusInfo> {
        let repository = self.repository;
        let inspector = Inspector::new(repository.database(), repository.workspace());

        let head_manifest = repository.head_manifest()?;
        let staged_manifest = repository.staged_manifest()?;
        let mut changed_files = BTreeMap::<String, FileChange>::new();

        // staged side: every path either manifest knows about
        for path in head_manifest.paths().chain(staged_manifest.paths()) {
            let index_change = inspector
                .check_staged_against_head(staged_manifest.get(path), head_manifest.get(path));

            if index_change != IndexChangeType::None {
                changed_files.entry(path.clone()).or_default().index_change = index_change;
            }
        }

        for (path, staged) in staged_manifest.iter() {
            let workspace_change = inspector.check_staged_against_workspace(path, staged)?;

            if workspace_change != WorkspaceChangeType::None {
                changed_files.entry(path.clone()).or_default().workspace_change = workspace_change;
            }
        }

        let untracked_files = repository
            .workspace()
            .list_files("")?
            .into_iter()
            .filter(|path| !staged_manifest.contains(path))
            .collect();

        Ok(StatusInfo {
            head: self.head_state()?,
            merge_head: repository.refs().read_merge_head()?,
            changed_files,
            untracked_files,
        })
    }

    fn head_state(&self) -> Result<HeadState> {
        let refs = self.repository.refs();

        Ok(match refs.head()? {
            Head::Symbolic(name) => match refs.read_branch(&name)? {
                Some(tip) => HeadState::Branch { name, tip },
                None => HeadState::Unborn { name },
            },
            Head::Detached(oid) => HeadState::Detached { oid },
        })
    }
}
