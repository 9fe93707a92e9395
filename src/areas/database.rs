use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::{Commit, SlimCommit};
use crate::artifacts::objects::hasher::{ContentHasher, HashAlgorithm};
use crate::artifacts::objects::manifest::Manifest;
use crate::artifacts::objects::object::{Object, ObjectBox, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::{Error, Result};
use bytes::Bytes;
use fake::rand;
use std::cell::RefCell;
use std::collections::HashMap;
use std::io::{BufRead, Cursor, Read, Write};
use std::path::{Path, PathBuf};

/// Content-addressed object store
///
/// Objects are framed, zlib-compressed and kept at `objects/<2 hex>/<rest>`.
/// A key, once written, is never rewritten.
#[derive(Debug)]
pub struct Database {
    path: Box<Path>,
    hasher: HashAlgorithm,
    commit_cache: RefCell<HashMap<ObjectId, SlimCommit>>,
}

impl Database {
    pub fn new(path: Box<Path>, hasher: HashAlgorithm) -> Self {
        Database {
            path,
            hasher,
            commit_cache: RefCell::new(HashMap::new()),
        }
    }

    pub fn hasher(&self) -> HashAlgorithm {
        self.hasher
    }

    /// Digest an object without storing it
    pub fn hash_object(&self, object: &impl Object) -> Result<ObjectId> {
        object.object_id(&self.hasher)
    }

    pub fn exists(&self, object_id: &ObjectId) -> bool {
        self.path.join(object_id.to_path()).is_file()
    }

    /// Store an object unless its digest is already present
    pub fn store(&self, object: &impl Object) -> Result<ObjectId> {
        let object_content = object.serialize()?;
        let object_id = self.hasher.object_id(&object_content);
        let object_path = self.path.join(object_id.to_path());

        if object_path.exists() {
            tracing::trace!(oid = %object_id, "object already stored");
            return Ok(object_id);
        }

        let object_dir = object_path
            .parent()
            .ok_or_else(|| Error::corrupt("object path", object_path.display().to_string()))?;
        std::fs::create_dir_all(object_dir).map_err(|e| Error::io(object_dir, e))?;

        self.write_object(&object_path, object_content)?;
        tracing::debug!(oid = %object_id, kind = %object.object_type(), "stored object");

        Ok(object_id)
    }

    /// Decompressed, framed bytes of a stored object
    pub fn load(&self, object_id: &ObjectId) -> Result<Bytes> {
        let object_path = self.path.join(object_id.to_path());

        self.read_object(object_id, object_path)
    }

    pub fn parse_object(&self, object_id: &ObjectId) -> Result<ObjectBox> {
        let (object_type, object_reader) = self.parse_object_as_bytes(object_id)?;

        match object_type {
            ObjectType::Blob => Ok(ObjectBox::Blob(Box::new(Blob::deserialize(object_reader)?))),
            ObjectType::Commit => Ok(ObjectBox::Commit(Box::new(Commit::deserialize(
                object_reader,
            )?))),
        }
    }

    pub fn parse_object_as_blob(&self, object_id: &ObjectId) -> Result<Blob> {
        let (object_type, object_reader) = self.parse_object_as_bytes(object_id)?;

        match object_type {
            ObjectType::Blob => Blob::deserialize(object_reader),
            actual => Err(unexpected_type(object_id, ObjectType::Blob, actual)),
        }
    }

    pub fn parse_object_as_commit(&self, object_id: &ObjectId) -> Result<Commit> {
        let (object_type, object_reader) = self.parse_object_as_bytes(object_id)?;

        match object_type {
            ObjectType::Commit => Commit::deserialize(object_reader),
            actual => Err(unexpected_type(object_id, ObjectType::Commit, actual)),
        }
    }

    /// Parents of a commit, memoized for repeated ancestry walks
    pub fn load_slim_commit(&self, object_id: &ObjectId) -> Result<SlimCommit> {
        if let Some(slim) = self.commit_cache.borrow().get(object_id) {
            return Ok(slim.clone());
        }

        let slim = self.parse_object_as_commit(object_id)?.to_slim(object_id.clone());
        self.commit_cache
            .borrow_mut()
            .insert(object_id.clone(), slim.clone());

        Ok(slim)
    }

    /// Manifest of a commit; no commit means the empty manifest
    pub fn load_manifest(&self, object_id: Option<&ObjectId>) -> Result<Manifest> {
        match object_id {
            Some(oid) => Ok(self.parse_object_as_commit(oid)?.into_manifest()),
            None => Ok(Manifest::new()),
        }
    }

    pub fn object_type(&self, object_id: &ObjectId) -> Result<ObjectType> {
        let (object_type, _) = self.parse_object_as_bytes(object_id)?;
        Ok(object_type)
    }

    fn parse_object_as_bytes(&self, object_id: &ObjectId) -> Result<(ObjectType, impl BufRead)> {
        let object_content = self.load(object_id)?;
        let mut object_reader = Cursor::new(object_content);

        let (object_type, size) = ObjectType::parse_header(&mut object_reader)?;
        let remaining = object_reader.get_ref().len() as u64 - object_reader.position();
        if remaining != size as u64 {
            return Err(Error::corrupt(
                format!("object {object_id}"),
                format!("declared size {size}, found {remaining}"),
            ));
        }

        Ok((object_type, object_reader))
    }

    fn read_object(&self, object_id: &ObjectId, object_path: PathBuf) -> Result<Bytes> {
        let object_content = std::fs::read(&object_path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::object_not_found(object_id),
            _ => Error::io(&object_path, e),
        })?;

        Self::decompress(object_id, object_content.into())
    }

    fn write_object(&self, object_path: &Path, object_content: Bytes) -> Result<()> {
        let object_dir = object_path
            .parent()
            .ok_or_else(|| Error::corrupt("object path", object_path.display().to_string()))?;
        let temp_object_path = object_dir.join(Self::generate_temp_name());

        let object_content = Self::compress(object_content)?;

        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&temp_object_path)
            .map_err(|e| Error::io(&temp_object_path, e))?;

        file.write_all(&object_content)
            .map_err(|e| Error::io(&temp_object_path, e))?;
        drop(file);

        // the rename publishes the object in one step
        if let Err(e) = std::fs::rename(&temp_object_path, object_path) {
            if std::fs::remove_file(&temp_object_path).is_err() {
                tracing::warn!(path = %temp_object_path.display(), "left orphaned temp object");
            }
            return Err(Error::io(object_path, e));
        }

        Ok(())
    }

    fn compress(data: Bytes) -> Result<Bytes> {
        let mut encoder =
            flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(&data)?;

        Ok(encoder.finish()?.into())
    }

    fn decompress(object_id: &ObjectId, data: Bytes) -> Result<Bytes> {
        let mut decoder = flate2::read::ZlibDecoder::new(&*data);
        let mut decompressed_content = Vec::new();
        decoder
            .read_to_end(&mut decompressed_content)
            .map_err(|e| Error::corrupt(format!("object {object_id}"), e.to_string()))?;

        Ok(decompressed_content.into())
    }

    fn generate_temp_name() -> String {
        format!("tmp-obj-{}", rand::random::<u32>())
    }

    /// Find all objects whose id starts with the given prefix
    ///
    /// Only the fan-out directory named by the first two characters is scanned, so the
    /// prefix must be at least two characters long. An ambiguous prefix yields several ids.
    pub fn find_objects_by_prefix(&self, prefix: &str) -> Result<Vec<ObjectId>> {
        let prefix = prefix.to_ascii_lowercase();
        if prefix.len() < 2 || !prefix.chars().all(|c| c.is_ascii_hexdigit()) {
            return Ok(Vec::new());
        }

        let (dir_name, file_prefix) = prefix.split_at(2);
        let dir_path = self.path.join(dir_name);
        if !dir_path.is_dir() {
            return Ok(Vec::new());
        }

        let mut matches = Vec::new();
        for entry in std::fs::read_dir(&dir_path).map_err(|e| Error::io(&dir_path, e))? {
            let entry = entry.map_err(|e| Error::io(&dir_path, e))?;
            let file_name = entry.file_name();
            let file_name = file_name.to_string_lossy();

            if file_name.starts_with(file_prefix) {
                // temp files fail to parse and are skipped
                if let Ok(oid) = ObjectId::try_parse(format!("{dir_name}{file_name}")) {
                    matches.push(oid);
                }
            }
        }
        matches.sort();

        Ok(matches)
    }
}

fn unexpected_type(object_id: &ObjectId, expected: ObjectType, actual: ObjectType) -> Error {
    Error::UnexpectedObjectType {
        oid: object_id.to_string(),
        expected: expected.to_string(),
        actual: actual.to_string(),
    }
}
