//! Error types for the mgit engine
//!
//! Every failure names the offending path, digest or branch. Merge conflicts are not
//! errors: they are reported through `MergeOutcome::Conflicts`.

use crate::artifacts::checkout::conflict::ConflictType;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias using mgit's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    AlreadyExists,
    DanglingRef,
    Unrelated,
    IoFailure,
    InvalidInput,
    InvalidState,
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("object {oid} not found")]
    ObjectNotFound { oid: String },

    #[error("path '{}' not found", path.display())]
    PathNotFound { path: PathBuf },

    #[error("branch '{name}' not found")]
    BranchNotFound { name: String },

    #[error("revision '{revision}' could not be resolved")]
    RevisionNotFound { revision: String },

    #[error("invalid revision '{revision}': {reason}")]
    InvalidRevision { revision: String, reason: String },

    #[error("a branch named '{name}' already exists")]
    BranchExists { name: String },

    #[error("reference '{name}' points nowhere ({reason})")]
    DanglingRef { name: String, reason: String },

    #[error("refusing to merge unrelated histories {current} and {incoming}")]
    Unrelated { current: String, incoming: String },

    #[error("I/O failure on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),

    #[error("corrupt {what}: {reason}")]
    Corrupt { what: String, reason: String },

    #[error("invalid object id '{value}': {reason}")]
    InvalidObjectId { value: String, reason: String },

    #[error("short object id {prefix} is ambiguous ({} candidates)", candidates.len())]
    AmbiguousObjectId {
        prefix: String,
        candidates: Vec<String>,
    },

    #[error("object {oid} is a {actual}, not a {expected}")]
    UnexpectedObjectType {
        oid: String,
        expected: String,
        actual: String,
    },

    #[error("invalid branch name '{name}'")]
    InvalidBranchName { name: String },

    #[error("path '{}' is outside the repository", path.display())]
    PathOutsideRepository { path: PathBuf },

    #[error("not an mgit repository: '{}'", path.display())]
    NotARepository { path: PathBuf },

    #[error("invalid configuration at '{}': {reason}", path.display())]
    Config { path: PathBuf, reason: String },

    #[error("author identity unknown: set MGIT_AUTHOR_NAME and MGIT_AUTHOR_EMAIL or configure a user")]
    MissingIdentity,

    #[error("nothing staged to commit")]
    NothingToCommit,

    #[error("aborting commit due to empty commit message")]
    EmptyMessage,

    #[error("HEAD is detached at {oid}; check out a branch before merging")]
    DetachedHead { oid: String },

    #[error("staged changes present for {}; commit them before merging", paths.join(", "))]
    DirtyIndex { paths: Vec<String> },

    #[error("a merge of {incoming} is in progress; commit the resolution or abort it")]
    MergeInProgress { incoming: String },

    #[error("there is no merge to abort")]
    NoMergeInProgress,

    #[error("{}", describe_conflicts(conflicts))]
    WorkingCopyConflict {
        conflicts: Vec<(ConflictType, String)>,
    },
}

impl Error {
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn corrupt(what: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Corrupt {
            what: what.into(),
            reason: reason.into(),
        }
    }

    pub fn object_not_found(oid: impl ToString) -> Self {
        Error::ObjectNotFound {
            oid: oid.to_string(),
        }
    }

    pub fn dangling_ref(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::DanglingRef {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::ObjectNotFound { .. }
            | Error::PathNotFound { .. }
            | Error::BranchNotFound { .. }
            | Error::RevisionNotFound { .. } => ErrorKind::NotFound,
            Error::BranchExists { .. } => ErrorKind::AlreadyExists,
            Error::DanglingRef { .. } => ErrorKind::DanglingRef,
            Error::Unrelated { .. } => ErrorKind::Unrelated,
            Error::Io { .. } | Error::Output(_) => ErrorKind::IoFailure,
            Error::Corrupt { .. }
            | Error::InvalidObjectId { .. }
            | Error::AmbiguousObjectId { .. }
            | Error::UnexpectedObjectType { .. }
            | Error::InvalidBranchName { .. }
            | Error::InvalidRevision { .. }
            | Error::PathOutsideRepository { .. }
            | Error::NotARepository { .. }
            | Error::Config { .. }
            | Error::EmptyMessage => ErrorKind::InvalidInput,
            Error::MissingIdentity
            | Error::NothingToCommit
            | Error::DetachedHead { .. }
            | Error::DirtyIndex { .. }
            | Error::MergeInProgress { .. }
            | Error::NoMergeInProgress
            | Error::WorkingCopyConflict { .. } => ErrorKind::InvalidState,
        }
    }
}

fn describe_conflicts(conflicts: &[(ConflictType, String)]) -> String {
    let mut sections = Vec::new();

    for conflict_type in [ConflictType::StaleFile, ConflictType::UntrackedOverwritten] {
        let paths = conflicts
            .iter()
            .filter(|(kind, _)| *kind == conflict_type)
            .map(|(_, path)| format!("\t{path}"))
            .collect::<Vec<_>>();

        if !paths.is_empty() {
            let message = conflict_type.message();
            sections.push(format!(
                "{}\n{}\n{}",
                message.header,
                paths.join("\n"),
                message.footer
            ));
        }
    }

    format!("{}\nAborting", sections.join("\n"))
}
