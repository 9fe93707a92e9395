use crate::areas::repository::Repository;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::Result;
use std::io::Write;
use std::path::Path;

impl Repository {
    /// Digest a working file as a blob, storing it when `write` is set
    pub fn hash_object(&self, object_path: &Path, write: bool) -> Result<ObjectId> {
        let relative = self.workspace().normalize(object_path)?;
        let blob = self.workspace().parse_blob(&relative)?;

        let object_id = if write {
            self.database().store(&blob)?
        } else {
            self.database().hash_object(&blob)?
        };

        writeln!(self.writer(), "{}", object_id)?;

        Ok(object_id)
    }
}
