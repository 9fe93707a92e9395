use crate::areas::refs::Head;
use crate::areas::repository::Repository;
use crate::artifacts::branch::revision::Revision;
use crate::artifacts::checkout::migration::Migration;
use crate::artifacts::merge::merge_base::MergeBaseFinder;
use crate::artifacts::merge::resolution::{MergeConflict, resolve};
use crate::artifacts::objects::manifest::Manifest;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::{Error, Result};
use std::io::Write;

/// How a merge ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The incoming commit is already part of the current history
    UpToDate,
    /// The branch tip moved to the incoming commit; no merge commit was needed
    FastForwarded(ObjectId),
    /// A two-parent merge commit was created
    Committed(ObjectId),
    /// Nothing was committed; the conflicting paths are listed in path order
    Conflicts(Vec<MergeConflict>),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeOptions {
    pub message: Option<String>,
    /// Merge against an empty base when the histories share no commit
    pub allow_unrelated_histories: bool,
}

impl Repository {
    /// Merge `target` into the checked-out branch
    ///
    /// On conflicts the non-conflicting changes stay applied and staged, conflicted
    /// paths keep their current content, and the unfinished merge is recorded for the
    /// next commit. No commit is created and no branch moves in that case.
    pub fn begin_merge(&self, target: &str, options: &MergeOptions) -> Result<MergeOutcome> {
        if let Some(incoming) = self.refs().read_merge_head()? {
            return Err(Error::MergeInProgress {
                incoming: incoming.to_string(),
            });
        }

        let branch = match self.refs().head()? {
            Head::Symbolic(name) => name,
            Head::Detached(oid) => return Err(Error::DetachedHead { oid: oid.to_string() }),
        };

        if !self.index().is_empty() {
            let paths = self.index().entries().map(|entry| entry.path.clone()).collect();
            return Err(Error::DirtyIndex { paths });
        }

        let current = self.refs().resolve_head(self.database())?;
        let revision = Revision::try_parse(target)?;
        let incoming = revision.resolve(self.refs(), self.database())?;

        let database = self.database();
        let finder = MergeBaseFinder::new(|oid| database.load_slim_commit(oid));

        if current == incoming || finder.is_ancestor(&incoming, &current)? {
            return Ok(MergeOutcome::UpToDate);
        }

        let base = finder.find_merge_base(&current, &incoming)?;
        let current_manifest = database.load_manifest(Some(&current))?;
        let incoming_manifest = database.load_manifest(Some(&incoming))?;

        if base.as_ref() == Some(&current) {
            Migration::new(database, self.workspace(), &current_manifest, &incoming_manifest)
                .apply_changes(&self.index())?;
            self.refs().set_branch_tip(&branch, &incoming)?;

            return Ok(MergeOutcome::FastForwarded(incoming));
        }

        let base_manifest = match base {
            Some(base) => database.load_manifest(Some(&base))?,
            None if options.allow_unrelated_histories
                || self.config().merge.allow_unrelated_histories =>
            {
                tracing::info!(
                    %current,
                    %incoming,
                    "merging unrelated histories against an empty base"
                );
                Manifest::new()
            }
            None => {
                return Err(Error::Unrelated {
                    current: current.to_string(),
                    incoming: incoming.to_string(),
                });
            }
        };

        let resolution = resolve(&base_manifest, &current_manifest, &incoming_manifest);

        let migration = Migration::new(
            database,
            self.workspace(),
            &current_manifest,
            &resolution.merged,
        );
        migration.apply_changes(&self.index())?;

        {
            let mut index = self.index_mut();
            for change in migration.changes() {
                match &change.to {
                    Some(oid) => index.stage(change.path.clone(), oid.clone()),
                    None => index.stage_removal(change.path.clone()),
                }
            }
        }

        let message = match (&options.message, revision.as_branch(self.refs())) {
            (Some(message), _) => message.clone(),
            (None, Some(name)) => format!("Merge branch '{name}'"),
            (None, None) => format!("Merge commit '{target}'"),
        };

        if resolution.is_clean() {
            let commit_id = self.write_commit(vec![current, incoming], resolution.merged, message)?;
            return Ok(MergeOutcome::Committed(commit_id));
        }

        self.index_mut().write_updates()?;
        self.refs().write_merge_state(&incoming, &message)?;
        tracing::debug!(conflicts = resolution.conflicts.len(), "merge stopped on conflicts");

        Ok(MergeOutcome::Conflicts(resolution.conflicts))
    }

    /// Abandon an unfinished merge
    ///
    /// Every staged path is restored to its HEAD content, then the index and the merge
    /// state are cleared.
    pub fn abort_merge(&self) -> Result<()> {
        if self.refs().read_merge_head()?.is_none() {
            return Err(Error::NoMergeInProgress);
        }

        let head_manifest = self.head_manifest()?;
        let mut index = self.index_mut();

        for entry in index.entries() {
            match head_manifest.get(&entry.path) {
                Some(oid) => {
                    let blob = self.database().parse_object_as_blob(oid)?;
                    self.workspace().write_file(&entry.path, blob.content())?;
                }
                None => self.workspace().remove_file(&entry.path)?,
            }
        }

        index.clear();
        index.write_updates()?;
        self.refs().clear_merge_state()?;

        Ok(())
    }

    pub fn merge(&self, target: &str, options: &MergeOptions) -> Result<MergeOutcome> {
        let previous = self.refs().head_oid()?;
        let outcome = self.begin_merge(target, options)?;

        match &outcome {
            MergeOutcome::UpToDate => writeln!(self.writer(), "Already up to date.")?,
            MergeOutcome::FastForwarded(oid) => {
                let from = previous.as_ref().map(ObjectId::to_short_oid).unwrap_or_default();
                writeln!(self.writer(), "Updating {}..{}", from, oid.to_short_oid())?;
                writeln!(self.writer(), "Fast-forward")?;
            }
            MergeOutcome::Committed(oid) => {
                writeln!(self.writer(), "Merge made by the 'three-way' strategy.")?;
                let commit = self.database().parse_object_as_commit(oid)?;
                writeln!(self.writer(), "[{}] {}", oid.to_short_oid(), commit.short_message())?;
            }
            MergeOutcome::Conflicts(conflicts) => {
                for conflict in conflicts {
                    writeln!(
                        self.writer(),
                        "CONFLICT ({}): Merge conflict in {}",
                        conflict.kind().as_str(),
                        conflict.path
                    )?;
                }
                writeln!(
                    self.writer(),
                    "Automatic merge failed; fix conflicts and then commit the result."
                )?;
            }
        }

        Ok(outcome)
    }
}
