use crate::areas::repository::Repository;
use crate::artifacts::status::status_info::{ChangeSet, HeadState, Status, StatusInfo};
use crate::errors::Result;
use colored::Colorize;
use std::io::Write;

impl Repository {
    /// Compare HEAD, the staged manifest and the working copy
    pub fn current_status(&self) -> Result<StatusInfo> {
        Status::new(self).initialize()
    }

    pub fn status(&self, porcelain: bool) -> Result<()> {
        let status_info = self.current_status()?;

        if porcelain {
            self.print_porcelain_status(&status_info)
        } else {
            self.print_long_status(&status_info)
        }
    }

    fn print_porcelain_status(&self, status_info: &StatusInfo) -> Result<()> {
        for (path, change) in &status_info.changed_files {
            writeln!(self.writer(), "{change} {path}")?;
        }

        for path in &status_info.untracked_files {
            writeln!(self.writer(), "?? {path}")?;
        }

        Ok(())
    }

    fn print_long_status(&self, status_info: &StatusInfo) -> Result<()> {
        match &status_info.head {
            HeadState::Branch { name, .. } => writeln!(self.writer(), "On branch {name}")?,
            HeadState::Unborn { name } => {
                writeln!(self.writer(), "On branch {name}\n\nNo commits yet")?
            }
            HeadState::Detached { oid } => {
                let notice = format!("HEAD detached at {}", oid.to_short_oid());
                writeln!(self.writer(), "{}", notice.red())?
            }
        }

        if status_info.merge_head.is_some() {
            writeln!(self.writer(), "\nYou have unmerged paths.")?;
            writeln!(
                self.writer(),
                "  (commit to conclude the merge, or run \"mgit merge --abort\")"
            )?;
        }

        self.print_changeset("Changes to be committed:", &status_info.index_changeset())?;
        self.print_changeset(
            "Changes not staged for commit:",
            &status_info.workspace_changeset(),
        )?;

        if !status_info.untracked_files.is_empty() {
            writeln!(self.writer(), "\nUntracked files:")?;
            for path in &status_info.untracked_files {
                writeln!(self.writer(), "\t{}", path.red())?;
            }
        }

        if status_info.is_clean() {
            writeln!(self.writer(), "\nnothing to commit, working tree clean")?;
        } else if status_info.index_changeset().is_empty() {
            writeln!(self.writer(), "\nno changes added to commit")?;
        }

        Ok(())
    }

    fn print_changeset(&self, header: &str, changeset: &ChangeSet) -> Result<()> {
        if changeset.is_empty() {
            return Ok(());
        }

        writeln!(self.writer(), "\n{header}")?;
        for (path, change) in changeset {
            writeln!(self.writer(), "{change}{path}")?;
        }

        Ok(())
    }
}
