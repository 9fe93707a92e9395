use crate::areas::repository::Repository;
use crate::artifacts::diff::diff_algorithm::{Edit, diff_lines};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::status::file_change::{FileChangeType, IndexChangeType, WorkspaceChangeType};
use crate::errors::Result;
use bytes::Bytes;
use colored::Colorize;
use std::io::Write;
use std::path::Path;

/// Line edits between two texts, owning their lines
fn line_edits(a: &str, b: &str) -> Vec<Edit<String>> {
    diff_lines(a, b)
        .into_iter()
        .map(|edit| edit.map(str::to_string))
        .collect()
}

fn as_text(data: Option<Bytes>) -> String {
    data.map(|data| String::from_utf8_lossy(&data).into_owned())
        .unwrap_or_default()
}

impl Repository {
    /// Line diff between two working files
    pub fn diff_files(&self, a: &Path, b: &Path) -> Result<Vec<Edit<String>>> {
        let a = self.workspace().read_file(&self.workspace().normalize(a)?)?;
        let b = self.workspace().read_file(&self.workspace().normalize(b)?)?;

        Ok(line_edits(
            &String::from_utf8_lossy(&a),
            &String::from_utf8_lossy(&b),
        ))
    }

    /// Line diff from the HEAD version of `path` to its working content
    ///
    /// A side that does not exist diffs as empty text.
    pub fn diff_head(&self, path: &Path) -> Result<Vec<Edit<String>>> {
        let path = self.workspace().normalize(path)?;

        let head = self.committed_text(&path)?;
        let working = as_text(self.workspace().try_read_file(&path)?);

        Ok(line_edits(&head, &working))
    }

    /// Print the working changes of every tracked file, or the staged ones with `cached`
    pub fn diff(&self, cached: bool) -> Result<()> {
        let status = self.current_status()?;
        let staged = self.staged_manifest()?;

        let changeset = if cached {
            status.index_changeset()
        } else {
            status.workspace_changeset()
        };

        for (path, change) in changeset {
            let (a, b) = match change {
                FileChangeType::Index(IndexChangeType::Added) => {
                    (String::new(), self.blob_text(staged.get(&path))?)
                }
                FileChangeType::Index(_) => {
                    (self.committed_text(&path)?, self.blob_text(staged.get(&path))?)
                }
                FileChangeType::Workspace(WorkspaceChangeType::Deleted) => {
                    (self.blob_text(staged.get(&path))?, String::new())
                }
                FileChangeType::Workspace(_) => (
                    self.blob_text(staged.get(&path))?,
                    as_text(self.workspace().try_read_file(&path)?),
                ),
            };

            self.print_diff(&path, &path, &line_edits(&a, &b))?;
        }

        Ok(())
    }

    pub fn print_diff(&self, a_path: &str, b_path: &str, edits: &[Edit<String>]) -> Result<()> {
        if !edits.iter().any(Edit::is_change) {
            return Ok(());
        }

        writeln!(self.writer(), "{}", format!("--- a/{a_path}").bold())?;
        writeln!(self.writer(), "{}", format!("+++ b/{b_path}").bold())?;

        for edit in edits {
            let line = match edit {
                Edit::Delete { .. } => edit.to_string().red(),
                Edit::Insert { .. } => edit.to_string().green(),
                Edit::Equal { .. } => edit.to_string().normal(),
            };
            writeln!(self.writer(), "{line}")?;
        }

        Ok(())
    }

    fn committed_text(&self, path: &str) -> Result<String> {
        let head_manifest = self.head_manifest()?;
        self.blob_text(head_manifest.get(path))
    }

    fn blob_text(&self, oid: Option<&ObjectId>) -> Result<String> {
        let data = oid
            .map(|oid| self.database().parse_object_as_blob(oid))
            .transpose()?
            .map(|blob| blob.into_content());

        Ok(as_text(data))
    }
}
