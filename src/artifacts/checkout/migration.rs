//! Working-copy migration and conflict detection
//!
//! Moving the working copy from one manifest to another touches only the paths whose
//! blobs differ between the two. Before anything is written, every such path is checked
//! against the working copy and the index:
//!
//! - Stale files: the path is staged, or its working content no longer matches the
//!   source manifest (edited or deleted locally)
//! - Untracked overwrites: the path is not tracked but a file there would be replaced
//!
//! A path whose working content already equals the target is never a conflict.

use crate::areas::database::Database;
use crate::areas::index::Index;
use crate::areas::workspace::Workspace;
use crate::artifacts::checkout::conflict::ConflictType;
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::manifest::Manifest;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::{Error, Result};
use bytes::Bytes;
use std::collections::BTreeSet;

/// One path whose blob differs between two manifests
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathChange {
    pub path: String,
    /// Blob in the source manifest, `None` if the path is added
    pub from: Option<ObjectId>,
    /// Blob in the target manifest, `None` if the path is removed
    pub to: Option<ObjectId>,
}

/// Paths that differ between two manifests, in path order
pub fn manifest_changes(from: &Manifest, to: &Manifest) -> Vec<PathChange> {
    from.paths()
        .chain(to.paths())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .filter_map(|path| {
            let before = from.get(path);
            let after = to.get(path);

            (before != after).then(|| PathChange {
                path: path.clone(),
                from: before.cloned(),
                to: after.cloned(),
            })
        })
        .collect()
}

pub struct Migration<'r> {
    database: &'r Database,
    workspace: &'r Workspace,
    changes: Vec<PathChange>,
}

impl<'r> Migration<'r> {
    pub fn new(
        database: &'r Database,
        workspace: &'r Workspace,
        from: &Manifest,
        to: &Manifest,
    ) -> Self {
        Migration {
            database,
            workspace,
            changes: manifest_changes(from, to),
        }
    }

    pub fn changes(&self) -> &[PathChange] {
        &self.changes
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn load_blob_data(&self, oid: &ObjectId) -> Result<Bytes> {
        Ok(self.database.parse_object_as_blob(oid)?.into_content())
    }

    /// Every path the migration would clobber, in path order
    pub fn detect_conflicts(&self, index: &Index) -> Result<Vec<(ConflictType, String)>> {
        let mut conflicts = Vec::new();

        for change in &self.changes {
            if index.entry_by_path(&change.path).is_some() {
                conflicts.push((ConflictType::StaleFile, change.path.clone()));
                continue;
            }

            let working_oid = self
                .workspace
                .try_read_file(&change.path)?
                .map(|data| self.database.hash_object(&Blob::new(data)))
                .transpose()?;

            if working_oid == change.to || working_oid == change.from {
                continue;
            }

            conflicts.push((
                ConflictType::get_conflict_type(change.from.is_some()),
                change.path.clone(),
            ));
        }

        Ok(conflicts)
    }

    /// Fail with `WorkingCopyConflict` before anything is touched
    pub fn check_conflicts(&self, index: &Index) -> Result<()> {
        let conflicts = self.detect_conflicts(index)?;

        if conflicts.is_empty() {
            Ok(())
        } else {
            tracing::debug!(count = conflicts.len(), "working copy blocks migration");
            Err(Error::WorkingCopyConflict { conflicts })
        }
    }

    pub fn apply_changes(&self, index: &Index) -> Result<()> {
        self.check_conflicts(index)?;
        self.workspace.apply_migration(self)
    }
}
