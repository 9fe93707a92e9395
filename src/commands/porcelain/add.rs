use crate::areas::repository::Repository;
use crate::areas::workspace::Workspace;
use crate::errors::{Error, Result};
use std::path::PathBuf;

impl Repository {
    /// Stage the current content of files and directories
    ///
    /// Directories are expanded recursively. Tracked files that no longer exist under a
    /// given path are staged for removal. A file whose content matches HEAD leaves no
    /// entry behind, so the index only ever holds real changes. Returns the staged paths
    /// in order.
    pub fn stage(&self, paths: &[PathBuf]) -> Result<Vec<String>> {
        let head = self.head_manifest()?;
        let tracked = self.index().apply_to(head.clone());
        let mut staged = Vec::new();

        // resolve every path before touching the index
        let mut targets = Vec::new();
        for path in paths {
            let relative = self.workspace().normalize(path)?;
            let tracked_here = tracked
                .paths()
                .filter(|tracked_path| Workspace::is_within(&relative, tracked_path))
                .cloned()
                .collect::<Vec<_>>();

            let files = match self.workspace().list_files(&relative) {
                Ok(files) => files,
                Err(Error::PathNotFound { .. }) if !tracked_here.is_empty() => Vec::new(),
                Err(e) => return Err(e),
            };

            targets.push((files, tracked_here));
        }

        let mut index = self.index_mut();
        for (files, tracked_here) in targets {
            for file in &files {
                let blob = self.workspace().parse_blob(file)?;
                let oid = self.database().store(&blob)?;

                if head.get(file) == Some(&oid) {
                    index.unstage(file);
                } else {
                    index.stage(file.clone(), oid);
                }
                staged.push(file.clone());
            }

            for deleted in tracked_here.into_iter().filter(|path| !files.contains(path)) {
                if head.contains(&deleted) {
                    index.stage_removal(deleted.clone());
                } else {
                    index.unstage(&deleted);
                }
                staged.push(deleted);
            }
        }

        index.write_updates()?;
        tracing::debug!(count = staged.len(), "staged paths");

        Ok(staged)
    }
}
