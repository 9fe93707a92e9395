use crate::areas::config::Config;
use crate::areas::refs::{Head, Refs};
use crate::areas::repository::{CONFIG_FILE_NAME, OBJECTS_DIR, Repository};
use crate::areas::workspace::METADATA_DIR;
use crate::artifacts::branch::branch_name::BranchName;
use crate::errors::{Error, Result};
use std::io::Write;
use std::path::Path;

impl Repository {
    /// Create the metadata directory under `path` and open the repository
    ///
    /// Re-initializing keeps the existing HEAD, config and objects.
    pub fn init(path: &Path, config: Config) -> Result<Self> {
        std::fs::create_dir_all(path).map_err(|e| Error::io(path, e))?;
        let root = path.canonicalize().map_err(|e| Error::io(path, e))?;
        let metadata_path = root.join(METADATA_DIR);

        for dir in [
            metadata_path.join(OBJECTS_DIR),
            metadata_path.join("refs").join("heads"),
        ] {
            std::fs::create_dir_all(&dir).map_err(|e| Error::io(&dir, e))?;
        }

        let config_path = metadata_path.join(CONFIG_FILE_NAME);
        if !config_path.exists() {
            config.save(&config_path)?;
        }

        let refs = Refs::new(metadata_path.into_boxed_path());
        if !refs.head_path().exists() {
            let default_branch = BranchName::try_parse(config.default_branch.clone())?;
            refs.set_head(&Head::Symbolic(default_branch))?;
        }

        tracing::debug!(path = %root.display(), "initialized repository");
        Self::open(&root)
    }

    pub fn report_initialized(&self) -> Result<()> {
        writeln!(
            self.writer(),
            "Initialized empty mgit repository in {}",
            self.metadata_path().display()
        )?;

        Ok(())
    }
}
