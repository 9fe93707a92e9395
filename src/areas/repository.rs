//! Explicit repository handle
//!
//! A `Repository` is opened once for a working directory and threaded through every
//! operation. Nothing is looked up from process-global state except the author identity
//! fallback, so several repositories can live in one process.

use crate::areas::config::Config;
use crate::areas::database::Database;
use crate::areas::index::Index;
use crate::areas::refs::Refs;
use crate::areas::workspace::{METADATA_DIR, Workspace};
use crate::artifacts::objects::commit::Author;
use crate::artifacts::objects::manifest::Manifest;
use crate::errors::{Error, Result};
use std::cell::{Ref, RefCell, RefMut};
use std::io::Write;
use std::path::{Path, PathBuf};

pub(crate) const CONFIG_FILE_NAME: &str = "config";
pub(crate) const OBJECTS_DIR: &str = "objects";
const INDEX_FILE_NAME: &str = "index";

pub struct Repository {
    path: Box<Path>,
    writer: RefCell<Box<dyn Write>>,
    index: RefCell<Index>,
    database: Database,
    workspace: Workspace,
    refs: Refs,
    config: Config,
    author: Option<Author>,
}

impl std::fmt::Debug for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("path", &self.path)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Repository {
    /// Open the repository whose working directory is `path`
    pub fn open(path: &Path) -> Result<Self> {
        let root = path.canonicalize().map_err(|_| Error::NotARepository {
            path: path.to_path_buf(),
        })?;
        let metadata_path = root.join(METADATA_DIR);

        if !metadata_path.is_dir() {
            return Err(Error::NotARepository { path: root });
        }

        let config = Config::load(&metadata_path.join(CONFIG_FILE_NAME))?;
        let database = Database::new(
            metadata_path.join(OBJECTS_DIR).into_boxed_path(),
            config.hash_algorithm,
        );
        let mut index = Index::new(metadata_path.join(INDEX_FILE_NAME).into_boxed_path());
        index.rehydrate()?;
        let refs = Refs::new(metadata_path.into_boxed_path());
        let workspace = Workspace::new(root.clone().into_boxed_path());

        Ok(Repository {
            path: root.into_boxed_path(),
            writer: RefCell::new(Box::new(std::io::sink())),
            index: RefCell::new(index),
            database,
            workspace,
            refs,
            config,
            author: None,
        })
    }

    /// Open the repository containing `start`, searching parent directories
    pub fn discover(start: &Path) -> Result<Self> {
        let start = start.canonicalize().map_err(|_| Error::NotARepository {
            path: start.to_path_buf(),
        })?;

        start
            .ancestors()
            .find(|dir| dir.join(METADATA_DIR).is_dir())
            .map(Self::open)
            .unwrap_or(Err(Error::NotARepository { path: start }))
    }

    /// Send command output to `writer` instead of discarding it
    pub fn with_writer(mut self, writer: Box<dyn Write>) -> Self {
        self.writer = RefCell::new(writer);
        self
    }

    /// Use a fixed identity for commits made through this handle
    pub fn with_author(mut self, author: Author) -> Self {
        self.author = Some(author);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.path.join(METADATA_DIR)
    }

    pub fn writer(&'_ self) -> RefMut<'_, Box<dyn Write>> {
        self.writer.borrow_mut()
    }

    pub fn index(&'_ self) -> Ref<'_, Index> {
        self.index.borrow()
    }

    pub fn index_mut(&'_ self) -> RefMut<'_, Index> {
        self.index.borrow_mut()
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn refs(&self) -> &Refs {
        &self.refs
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Identity for new commits: injected author, then environment, then config
    pub fn author(&self) -> Result<Author> {
        self.author
            .clone()
            .or_else(Author::load_from_env)
            .or_else(|| self.config.author())
            .ok_or(Error::MissingIdentity)
    }

    /// Manifest of the HEAD commit; empty while the current branch is unborn
    pub fn head_manifest(&self) -> Result<Manifest> {
        self.database.load_manifest(self.refs.head_oid()?.as_ref())
    }

    /// Manifest the next commit would record
    pub fn staged_manifest(&self) -> Result<Manifest> {
        Ok(self.index().apply_to(self.head_manifest()?))
    }
}
