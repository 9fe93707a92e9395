use crate::areas::database::Database;
use crate::areas::workspace::Workspace;
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::status::file_change::{IndexChangeType, WorkspaceChangeType};
use crate::errors::Result;
use derive_new::new;

/// Classifies a single path against HEAD, the staged manifest and the working copy
#[derive(new)]
pub struct Inspector<'r> {
    database: &'r Database,
    workspace: &'r Workspace,
}

impl<'r> Inspector<'r> {
    /// Digest the working file would get if it were staged now
    pub fn working_oid(&self, path: &str) -> Result<Option<ObjectId>> {
        self.workspace
            .try_read_file(path)?
            .map(|data| self.database.hash_object(&Blob::new(data)))
            .transpose()
    }

    pub fn check_staged_against_workspace(
        &self,
        path: &str,
        staged: &ObjectId,
    ) -> Result<WorkspaceChangeType> {
        match self.working_oid(path)? {
            None => Ok(WorkspaceChangeType::Deleted),
            Some(oid) if &oid != staged => Ok(WorkspaceChangeType::Modified),
            Some(_) => Ok(WorkspaceChangeType::None),
        }
    }

    pub fn check_staged_against_head(
        &self,
        staged: Option<&ObjectId>,
        head: Option<&ObjectId>,
    ) -> IndexChangeType {
        match (staged, head) {
            (Some(staged), Some(head)) if staged != head => IndexChangeType::Modified,
            (Some(_), None) => IndexChangeType::Added,
            (None, Some(_)) => IndexChangeType::Deleted,
            _ => IndexChangeType::None,
        }
    }
}
