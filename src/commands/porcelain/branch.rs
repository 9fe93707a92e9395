use crate::areas::repository::Repository;
use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::branch::revision::Revision;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::Result;
use colored::Colorize;
use std::io::Write;

impl Repository {
    /// Create a branch at `start`, or at HEAD when no start revision is given
    pub fn create_branch(&self, branch_name: &str, start: Option<&str>) -> Result<ObjectId> {
        let branch_name = BranchName::try_parse(branch_name)?;

        let source_oid = match start {
            Some(start) => Revision::try_parse(start)?.resolve(self.refs(), self.database())?,
            None => self.refs().resolve_head(self.database())?,
        };

        self.refs().create_branch(&branch_name, &source_oid)?;

        Ok(source_oid)
    }

    /// Print every branch, marking the checked-out one
    pub fn list_branches(&self) -> Result<()> {
        let listing = self.refs().list_branches()?;

        for entry in &listing {
            if entry.is_current {
                writeln!(self.writer(), "* {}", entry.name.to_string().green())?;
            } else {
                writeln!(self.writer(), "  {}", entry.name)?;
            }
        }

        Ok(())
    }
}
