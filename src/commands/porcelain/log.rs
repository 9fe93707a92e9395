use crate::areas::repository::Repository;
use crate::artifacts::branch::revision::Revision;
use crate::artifacts::log::rev_list::RevList;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::Result;
use colored::Colorize;
use std::io::Write;

#[derive(Debug, Clone, Default)]
pub struct LogOptions {
    pub oneline: bool,
    pub abbrev_commit: bool,
}

impl Repository {
    /// First-parent history from `start`, or from HEAD when no revision is given
    ///
    /// An unborn branch yields an empty history.
    pub fn history(&self, start: Option<&str>) -> Result<RevList<'_>> {
        let start = match start {
            Some(revision) => {
                Some(Revision::try_parse(revision)?.resolve(self.refs(), self.database())?)
            }
            None => self.refs().head_oid()?,
        };

        Ok(RevList::new(self.database(), start))
    }

    pub fn log(&self, start: Option<&str>, opts: &LogOptions) -> Result<()> {
        let history = self.history(start)?;

        for (index, entry) in history.iter().enumerate() {
            let (oid, commit) = entry?;

            if opts.oneline {
                self.show_commit_oneline(&oid, &commit)?;
            } else {
                if index > 0 {
                    writeln!(self.writer())?;
                }
                self.show_commit_medium(&oid, &commit, opts.abbrev_commit)?;
            }
        }

        Ok(())
    }

    fn show_commit_medium(
        &self,
        oid: &ObjectId,
        commit: &Commit,
        abbrev_commit: bool,
    ) -> Result<()> {
        let commit_id = if abbrev_commit {
            oid.to_short_oid()
        } else {
            oid.to_string()
        };

        writeln!(self.writer(), "{}", format!("commit {commit_id}").yellow())?;
        if commit.is_merge() {
            let parents = commit
                .parents()
                .iter()
                .map(ObjectId::to_short_oid)
                .collect::<Vec<_>>()
                .join(" ");
            writeln!(self.writer(), "Merge: {parents}")?;
        }
        writeln!(self.writer(), "Author: {}", commit.author().display_name())?;
        writeln!(self.writer(), "Date:   {}", commit.author().readable_timestamp())?;
        writeln!(self.writer())?;
        for message_line in commit.message().lines() {
            writeln!(self.writer(), "    {}", message_line)?;
        }

        Ok(())
    }

    fn show_commit_oneline(&self, oid: &ObjectId, commit: &Commit) -> Result<()> {
        writeln!(
            self.writer(),
            "{} {}",
            oid.to_short_oid().yellow(),
            commit.short_message()
        )?;

        Ok(())
    }
}
