#[derive(Debug)]
pub struct ConflictMessage {
    pub header: &'static str,
    pub footer: &'static str,
}

/// Why a working-copy path blocks a checkout or merge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConflictType {
    /// Tracked path with staged or unstaged local changes
    StaleFile,
    /// Untracked file the target would overwrite
    UntrackedOverwritten,
}

impl ConflictType {
    pub fn message(&self) -> ConflictMessage {
        match self {
            ConflictType::StaleFile => ConflictMessage {
                header: "Your local changes to the following files would be overwritten:",
                footer: "Please commit your changes before you switch branches or merge.",
            },
            ConflictType::UntrackedOverwritten => ConflictMessage {
                header: "The following untracked working tree files would be overwritten:",
                footer: "Please move or remove them before you switch branches or merge.",
            },
        }
    }

    pub fn get_conflict_type(tracked: bool) -> ConflictType {
        if tracked {
            ConflictType::StaleFile
        } else {
            ConflictType::UntrackedOverwritten
        }
    }
}
