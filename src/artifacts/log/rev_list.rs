use crate::areas::database::Database;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::Result;
use derive_new::new;

/// First-parent history starting at a commit
///
/// The history is restartable: every call to [`RevList::iter`] walks again from the start.
#[derive(Debug, Clone, new)]
pub struct RevList<'r> {
    database: &'r Database,
    start: Option<ObjectId>,
}

impl<'r> RevList<'r> {
    pub fn iter(&self) -> RevListIter<'r> {
        RevListIter {
            database: self.database,
            current_commit_oid: self.start.clone(),
        }
    }
}

impl<'r> IntoIterator for &RevList<'r> {
    type Item = Result<(ObjectId, Commit)>;
    type IntoIter = RevListIter<'r>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[derive(Debug, Clone)]
pub struct RevListIter<'r> {
    database: &'r Database,
    current_commit_oid: Option<ObjectId>,
}

impl Iterator for RevListIter<'_> {
    type Item = Result<(ObjectId, Commit)>;

    fn next(&mut self) -> Option<Self::Item> {
        let commit_oid = self.current_commit_oid.take()?;

        match self.database.parse_object_as_commit(&commit_oid) {
            Ok(commit) => {
                // Move to the first parent for the next iteration
                self.current_commit_oid = commit.parent().cloned();
                Some(Ok((commit_oid, commit)))
            }
            // the walk ends after reporting the failure
            Err(e) => Some(Err(e)),
        }
    }
}
