use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::hasher::ContentHasher;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::Result;
use bytes::Bytes;
use std::io::{BufRead, Write};

pub trait Packable {
    fn serialize(&self) -> Result<Bytes>;
}

pub trait Unpackable {
    fn deserialize(reader: impl BufRead) -> Result<Self>
    where
        Self: Sized;
}

pub trait Object {
    fn object_type(&self) -> ObjectType;

    fn display(&self) -> String;

    /// Payload bytes, without the `<type> <size>\0` frame
    fn payload(&self) -> Result<Bytes>;

    /// Framed representation as hashed and stored
    fn serialize(&self) -> Result<Bytes> {
        let payload = self.payload()?;

        let mut framed = Vec::with_capacity(payload.len() + 16);
        write!(framed, "{} {}\0", self.object_type().as_str(), payload.len())?;
        framed.extend_from_slice(&payload);

        Ok(Bytes::from(framed))
    }

    fn object_id(&self, hasher: &impl ContentHasher) -> Result<ObjectId> {
        Ok(hasher.object_id(&self.serialize()?))
    }
}

#[derive(Debug, Clone)]
pub enum ObjectBox {
    Blob(Box<Blob>),
    Commit(Box<Commit>),
}

impl ObjectBox {
    pub fn object_type(&self) -> ObjectType {
        match self {
            ObjectBox::Blob(_) => ObjectType::Blob,
            ObjectBox::Commit(_) => ObjectType::Commit,
        }
    }

    pub fn display(&self) -> String {
        match self {
            ObjectBox::Blob(blob) => blob.display(),
            ObjectBox::Commit(commit) => commit.display(),
        }
    }
}
