use crate::artifacts::checkout::migration::Migration;
use crate::artifacts::objects::blob::Blob;
use crate::errors::{Error, Result};
use bytes::Bytes;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

/// Name of the metadata directory at the root of the working directory
pub const METADATA_DIR: &str = ".mgit";

/// Working-directory accessor
///
/// Paths handed out and accepted by the workspace are repository-relative and
/// `/`-separated, the same form manifests and the index use.
#[derive(Debug)]
pub struct Workspace {
    path: Box<Path>,
}

impl Workspace {
    pub fn new(path: Box<Path>) -> Self {
        Workspace { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Turn a user path into a repository-relative path
    ///
    /// Relative paths are taken relative to the repository root. The root itself
    /// normalizes to the empty string.
    pub fn normalize(&self, path: &Path) -> Result<String> {
        let relative = if path.is_absolute() {
            path.strip_prefix(&self.path)
                .map_err(|_| Error::PathOutsideRepository {
                    path: path.to_path_buf(),
                })?
        } else {
            path
        };

        let mut components: Vec<String> = Vec::new();
        for component in relative.components() {
            match component {
                Component::Normal(name) => components.push(name.to_string_lossy().into_owned()),
                Component::CurDir => {}
                Component::ParentDir => {
                    components.pop().ok_or_else(|| Error::PathOutsideRepository {
                        path: path.to_path_buf(),
                    })?;
                }
                Component::RootDir | Component::Prefix(_) => {
                    return Err(Error::PathOutsideRepository {
                        path: path.to_path_buf(),
                    });
                }
            }
        }

        if components.first().map(String::as_str) == Some(METADATA_DIR) {
            return Err(Error::PathOutsideRepository {
                path: path.to_path_buf(),
            });
        }

        Ok(components.join("/"))
    }

    /// Whether `file_path` is `prefix` itself or lies below it; the empty prefix covers all
    pub fn is_within(prefix: &str, file_path: &str) -> bool {
        prefix.is_empty()
            || file_path == prefix
            || file_path
                .strip_prefix(prefix)
                .is_some_and(|rest| rest.starts_with('/'))
    }

    fn absolute(&self, file_path: &str) -> PathBuf {
        file_path
            .split('/')
            .filter(|component| !component.is_empty())
            .fold(self.path.to_path_buf(), |path, component| path.join(component))
    }

    /// Files under a repository-relative path, sorted, excluding the metadata directory
    ///
    /// The empty path lists the whole working directory.
    pub fn list_files(&self, root_file_path: &str) -> Result<Vec<String>> {
        let root = self.absolute(root_file_path);

        if root.is_file() {
            return Ok(vec![root_file_path.to_string()]);
        }
        if !root.is_dir() {
            return Err(Error::PathNotFound {
                path: PathBuf::from(root_file_path),
            });
        }

        let mut files = Vec::new();
        let walker = WalkDir::new(&root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.file_name() != METADATA_DIR);

        for entry in walker {
            let entry = entry.map_err(|e| {
                let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| root.clone());
                Error::io(path, std::io::Error::other(e.to_string()))
            })?;

            if entry.file_type().is_file()
                && let Ok(relative) = entry.path().strip_prefix(&self.path)
            {
                files.push(self.normalize(relative)?);
            }
        }
        files.sort();

        Ok(files)
    }

    pub fn is_file(&self, file_path: &str) -> bool {
        self.absolute(file_path).is_file()
    }

    pub fn read_file(&self, file_path: &str) -> Result<Bytes> {
        self.try_read_file(file_path)?.ok_or_else(|| Error::PathNotFound {
            path: PathBuf::from(file_path),
        })
    }

    /// File content, or `None` when no regular file exists at the path
    pub fn try_read_file(&self, file_path: &str) -> Result<Option<Bytes>> {
        let path = self.absolute(file_path);
        if !path.is_file() {
            return Ok(None);
        }

        std::fs::read(&path)
            .map(|content| Some(content.into()))
            .map_err(|e| Error::io(&path, e))
    }

    pub fn parse_blob(&self, file_path: &str) -> Result<Blob> {
        Ok(Blob::new(self.read_file(file_path)?))
    }

    pub fn write_file(&self, file_path: &str, data: &[u8]) -> Result<()> {
        let path = self.absolute(file_path);

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }

        std::fs::write(&path, data).map_err(|e| Error::io(&path, e))
    }

    /// Remove a file and any directories left empty by its removal
    pub fn remove_file(&self, file_path: &str) -> Result<()> {
        let path = self.absolute(file_path);

        match std::fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(Error::io(&path, e)),
        }

        let mut parent = path.parent();
        while let Some(dir) = parent {
            if dir == self.path.as_ref() || !Self::is_empty_dir(dir) {
                break;
            }
            std::fs::remove_dir(dir).map_err(|e| Error::io(dir, e))?;
            parent = dir.parent();
        }

        Ok(())
    }

    fn is_empty_dir(dir: &Path) -> bool {
        std::fs::read_dir(dir)
            .map(|mut entries| entries.next().is_none())
            .unwrap_or(false)
    }

    // Removals go first so a file can replace a directory emptied by the same migration.
    pub fn apply_migration(&self, migration: &Migration) -> Result<()> {
        for change in migration.changes().iter().filter(|change| change.to.is_none()) {
            self.remove_file(&change.path)?;
        }

        for change in migration.changes() {
            if let Some(oid) = &change.to {
                let data = migration.load_blob_data(oid)?;
                self.write_file(&change.path, &data)?;
            }
        }

        tracing::debug!(changes = migration.changes().len(), "applied migration to workspace");
        Ok(())
    }
}
