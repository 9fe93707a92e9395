use crate::areas::refs::Head;
use crate::areas::repository::Repository;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::manifest::Manifest;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::{Error, Result};
use std::io::Write;

impl Repository {
    /// Seal the staged changes into a commit on top of HEAD
    ///
    /// While a merge is in progress the commit gets the incoming tip as second parent
    /// and may be sealed even with nothing staged; an empty `message` then falls back
    /// to the recorded merge message.
    pub fn seal_commit(&self, message: &str) -> Result<ObjectId> {
        let merge_head = self.refs().read_merge_head()?;
        let parent = self.refs().head_oid()?;

        let head_manifest = self.database().load_manifest(parent.as_ref())?;
        let manifest = self.index().apply_to(head_manifest.clone());

        if merge_head.is_none()
            && (self.index().is_empty() || (parent.is_some() && manifest == head_manifest))
        {
            return Err(Error::NothingToCommit);
        }

        let message = match message.trim() {
            "" if merge_head.is_some() => self.refs().read_merge_message()?.unwrap_or_default(),
            trimmed => trimmed.to_string(),
        };
        if message.trim().is_empty() {
            return Err(Error::EmptyMessage);
        }

        let parents = parent.into_iter().chain(merge_head).collect();
        self.write_commit(parents, manifest, message)
    }

    /// Store a commit, advance HEAD to it, then clear the index and any merge state
    ///
    /// The ref update is the commit point: a failure before it leaves the ref and the
    /// index untouched.
    pub(crate) fn write_commit(
        &self,
        parents: Vec<ObjectId>,
        manifest: Manifest,
        message: String,
    ) -> Result<ObjectId> {
        let author = self.author()?;

        for (path, oid) in manifest.iter() {
            if !self.database().exists(oid) {
                return Err(Error::corrupt(
                    "manifest",
                    format!("blob {oid} for '{path}' is not stored"),
                ));
            }
        }

        let commit = Commit::new(parents, manifest, author, message);
        let commit_id = self.database().store(&commit)?;
        self.refs().update_head(&commit_id)?;

        {
            let mut index = self.index_mut();
            index.clear();
            index.write_updates()?;
        }
        self.refs().clear_merge_state()?;

        tracing::info!(commit = %commit_id, parents = commit.parents().len(), "sealed commit");
        Ok(commit_id)
    }

    pub fn commit(&self, message: &str) -> Result<ObjectId> {
        let commit_id = self.seal_commit(message)?;
        let commit = self.database().parse_object_as_commit(&commit_id)?;

        let location = match self.refs().head()? {
            Head::Symbolic(name) => name.to_string(),
            Head::Detached(_) => "detached HEAD".to_string(),
        };
        let is_root = if commit.parent().is_none() {
            " (root-commit)"
        } else {
            ""
        };

        writeln!(
            self.writer(),
            "[{}{} {}] {}",
            location,
            is_root,
            commit_id.to_short_oid(),
            commit.short_message()
        )?;

        Ok(commit_id)
    }
}
