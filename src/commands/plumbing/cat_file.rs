use crate::areas::repository::Repository;
use crate::artifacts::objects::object::ObjectBox;
use crate::artifacts::objects::MIN_PREFIX_LENGTH;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::{Error, Result};
use std::io::Write;

impl Repository {
    /// Look up an object by its full id or an unambiguous prefix
    pub fn read_object(&self, object_id: &str) -> Result<(ObjectId, ObjectBox)> {
        let hex_len = self.database().hasher().hex_len();

        let oid = if object_id.len() == hex_len {
            ObjectId::try_parse(object_id)?
        } else if object_id.len() >= MIN_PREFIX_LENGTH && object_id.len() < hex_len {
            let matches = self.database().find_objects_by_prefix(object_id)?;
            match matches.as_slice() {
                [] => return Err(Error::object_not_found(object_id)),
                [oid] => oid.clone(),
                candidates => {
                    return Err(Error::AmbiguousObjectId {
                        prefix: object_id.to_string(),
                        candidates: candidates.iter().map(ObjectId::to_short_oid).collect(),
                    });
                }
            }
        } else {
            return Err(Error::InvalidObjectId {
                value: object_id.to_string(),
                reason: format!("expected {MIN_PREFIX_LENGTH} to {hex_len} hex characters"),
            });
        };

        let object = self.database().parse_object(&oid)?;
        Ok((oid, object))
    }

    pub fn cat_file(&self, object_id: &str) -> Result<()> {
        let (_, object) = self.read_object(object_id)?;

        write!(self.writer(), "{}", object.display())?;

        Ok(())
    }
}
