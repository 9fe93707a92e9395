use crate::areas::refs::Head;
use crate::areas::repository::Repository;
use crate::artifacts::branch::revision::Revision;
use crate::artifacts::checkout::migration::Migration;
use crate::artifacts::objects::manifest::Manifest;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::{Error, Result};
use std::io::Write;

const DETACHMENT_NOTICE: &str = r#"
You are in 'detached HEAD' state. You can look around, make experimental
changes and commit them, and you can discard any commits you make in this
state without impacting any branches by performing another checkout.

If you want to create a new branch to retain commits you create, you may
do so (now or later) by using the branch command. Example:

    mgit branch <new-branch-name>
"#;

impl Repository {
    /// Move HEAD and the working copy to `target`
    ///
    /// Only paths that differ between the current and the target manifest are written
    /// or removed, and nothing is touched if any of them holds local work. A branch
    /// target keeps HEAD symbolic; any other revision detaches it. Returns the manifest
    /// now materialized.
    pub fn switch_to(&self, target: &str) -> Result<Manifest> {
        if let Some(incoming) = self.refs().read_merge_head()? {
            return Err(Error::MergeInProgress {
                incoming: incoming.to_string(),
            });
        }

        let revision = Revision::try_parse(target)?;
        let target_oid = revision.resolve(self.refs(), self.database())?;
        let new_head = match revision.as_branch(self.refs()) {
            Some(name) => Head::Symbolic(name.clone()),
            None => Head::Detached(target_oid.clone()),
        };

        let current_manifest = self.head_manifest()?;
        let target_manifest = self.database().load_manifest(Some(&target_oid))?;

        let migration = Migration::new(
            self.database(),
            self.workspace(),
            &current_manifest,
            &target_manifest,
        );
        migration.apply_changes(&self.index())?;

        self.refs().set_head(&new_head)?;
        tracing::debug!(%target, changes = migration.changes().len(), "switched working copy");

        Ok(target_manifest)
    }

    pub fn checkout(&self, target: &str) -> Result<()> {
        let previous_head = self.refs().head()?;

        self.switch_to(target)?;

        let new_head = self.refs().head()?;
        let new_oid = self.refs().resolve_head(self.database())?;

        if let Head::Detached(previous_oid) = &previous_head
            && previous_oid != &new_oid
        {
            self.print_head_position("Previous HEAD position was", previous_oid)?;
        }

        match (&previous_head, &new_head) {
            (Head::Symbolic(_), Head::Detached(_)) => {
                writeln!(
                    self.writer(),
                    "Note: checking out '{}'.\n{}",
                    target, DETACHMENT_NOTICE
                )?;
                self.print_head_position("HEAD is now at", &new_oid)?;
            }
            (_, Head::Detached(_)) => self.print_head_position("HEAD is now at", &new_oid)?,
            (previous, Head::Symbolic(name)) if previous == &new_head => {
                writeln!(self.writer(), "Already on '{}'", name)?;
            }
            (_, Head::Symbolic(name)) => {
                writeln!(self.writer(), "Switched to branch '{}'", name)?;
            }
        }

        Ok(())
    }

    fn print_head_position(&self, message: &str, oid: &ObjectId) -> Result<()> {
        let commit = self.database().parse_object_as_commit(oid)?;

        writeln!(
            self.writer(),
            "{} {} {}",
            message,
            oid.to_short_oid(),
            commit.short_message()
        )?;

        Ok(())
    }
}
