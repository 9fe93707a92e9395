use crate::areas::repository::Repository;
use crate::areas::workspace::Workspace;
use crate::artifacts::checkout::conflict::ConflictType;
use crate::artifacts::status::inspector::Inspector;
use crate::errors::{Error, Result};
use std::path::PathBuf;

impl Repository {
    /// Stage the removal of tracked files, deleting them from the working copy unless
    /// `cached` is set
    ///
    /// Files whose working content differs from the staged content are left alone and
    /// reported, so no unstaged work is lost.
    pub fn remove(&self, paths: &[PathBuf], cached: bool) -> Result<Vec<String>> {
        let head = self.head_manifest()?;
        let tracked = self.index().apply_to(head.clone());
        let inspector = Inspector::new(self.database(), self.workspace());
        let mut removed = Vec::new();

        for path in paths {
            let relative = self.workspace().normalize(path)?;
            let matches = tracked
                .iter()
                .filter(|(tracked_path, _)| Workspace::is_within(&relative, tracked_path))
                .collect::<Vec<_>>();

            if matches.is_empty() {
                return Err(Error::PathNotFound { path: path.clone() });
            }
            removed.extend(matches);
        }

        if !cached {
            let mut stale = Vec::new();
            for (path, staged) in &removed {
                if matches!(inspector.working_oid(path)?, Some(working) if &working != *staged) {
                    stale.push((ConflictType::StaleFile, path.to_string()));
                }
            }

            if !stale.is_empty() {
                return Err(Error::WorkingCopyConflict { conflicts: stale });
            }
        }

        let mut index = self.index_mut();
        for (path, _) in &removed {
            if head.contains(path) {
                index.stage_removal(path.as_str());
            } else {
                index.unstage(path);
            }
            if !cached {
                self.workspace().remove_file(path)?;
            }
        }
        index.write_updates()?;

        Ok(removed.into_iter().map(|(path, _)| path.clone()).collect())
    }
}
