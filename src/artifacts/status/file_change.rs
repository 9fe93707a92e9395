use colored::Colorize;

const LABEL_WIDTH: usize = 8;

/// Working copy compared with the staged manifest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum WorkspaceChangeType {
    #[default]
    None,
    Modified,
    Deleted,
}

impl From<&WorkspaceChangeType> for &str {
    fn from(change: &WorkspaceChangeType) -> Self {
        match change {
            WorkspaceChangeType::None => " ",
            WorkspaceChangeType::Modified => "M",
            WorkspaceChangeType::Deleted => "D",
        }
    }
}

/// Staged manifest compared with HEAD
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum IndexChangeType {
    #[default]
    None,
    Added,
    Modified,
    Deleted,
}

impl From<&IndexChangeType> for &str {
    fn from(change: &IndexChangeType) -> Self {
        match change {
            IndexChangeType::None => " ",
            IndexChangeType::Added => "A",
            IndexChangeType::Modified => "M",
            IndexChangeType::Deleted => "D",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FileChangeType {
    Workspace(WorkspaceChangeType),
    Index(IndexChangeType),
}

impl FileChangeType {
    /// Long-format label such as `modified:   `
    pub fn label(&self) -> &'static str {
        match self {
            FileChangeType::Workspace(WorkspaceChangeType::None)
            | FileChangeType::Index(IndexChangeType::None) => "",
            FileChangeType::Workspace(WorkspaceChangeType::Modified)
            | FileChangeType::Index(IndexChangeType::Modified) => "modified:   ",
            FileChangeType::Workspace(WorkspaceChangeType::Deleted)
            | FileChangeType::Index(IndexChangeType::Deleted) => "deleted:    ",
            FileChangeType::Index(IndexChangeType::Added) => "new file:   ",
        }
    }
}

impl std::fmt::Display for FileChangeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let colored_str = match self {
            FileChangeType::Workspace(_) => self.label().red(),
            FileChangeType::Index(_) => self.label().green(),
        };
        write!(f, "{:>width$}{}", "", colored_str, width = LABEL_WIDTH)
    }
}

/// Both sides of a path's status; renders as the two-letter porcelain code
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct FileChange {
    pub index_change: IndexChangeType,
    pub workspace_change: WorkspaceChangeType,
}

impl From<&FileChange> for String {
    fn from(change: &FileChange) -> Self {
        let index_str: &str = (&change.index_change).into();
        let workspace_str: &str = (&change.workspace_change).into();
        format!("{}{}", index_str, workspace_str)
    }
}

impl std::fmt::Display for FileChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let change_str: String = self.into();
        write!(f, "{}", change_str)
    }
}
