use crate::artifacts::branch::INVALID_BRANCH_NAME_REGEX;
use crate::errors::{Error, Result};

/// Prefix of branch refs, relative to the metadata directory
pub const REF_PREFIX: &str = "refs/heads/";

/// A validated branch name such as `master` or `feature/login`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BranchName(String);

impl BranchName {
    pub fn try_parse(name: impl Into<String>) -> Result<Self> {
        let name = name.into();

        let re = regex::Regex::new(INVALID_BRANCH_NAME_REGEX)
            .map_err(|_| Error::InvalidBranchName { name: name.clone() })?;

        if name.is_empty() || re.is_match(&name) {
            Err(Error::InvalidBranchName { name })
        } else {
            Ok(Self(name))
        }
    }

    /// Parse the target of a symbolic ref such as `refs/heads/master`
    pub fn try_parse_ref_path(ref_path: &str) -> Result<Self> {
        let name = ref_path
            .strip_prefix(REF_PREFIX)
            .ok_or_else(|| {
                Error::corrupt("symbolic ref", format!("'{ref_path}' is not a branch"))
            })?;

        Self::try_parse(name)
    }

    /// Path of the branch ref relative to the metadata directory
    pub fn ref_path(&self) -> String {
        format!("{REF_PREFIX}{}", self.0)
    }
}

impl AsRef<str> for BranchName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BranchName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
