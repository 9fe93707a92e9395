//! Index entry representation
//!
//! An entry is one staged change: either a path bound to a blob (an upsert) or a path
//! scheduled for removal from the next commit's manifest.

use crate::artifacts::objects::object::{Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::{Error, Result};
use byteorder::{NetworkEndian, ReadBytesExt, WriteBytesExt};
use bytes::Bytes;
use std::io::{BufRead, Write};

/// Size of the fixed part preceding the path: kind byte plus path length
pub const ENTRY_PREFIX_SIZE: usize = 3;

const UPSERT_KIND: u8 = 1;
const REMOVAL_KIND: u8 = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StagedChange {
    /// Path takes this blob in the next commit
    Upsert(ObjectId),
    /// Path is dropped from the next commit
    Removal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    /// `/`-separated path relative to the repository root
    pub path: String,
    pub change: StagedChange,
}

impl IndexEntry {
    pub fn upsert(path: impl Into<String>, oid: ObjectId) -> Self {
        IndexEntry {
            path: path.into(),
            change: StagedChange::Upsert(oid),
        }
    }

    pub fn removal(path: impl Into<String>) -> Self {
        IndexEntry {
            path: path.into(),
            change: StagedChange::Removal,
        }
    }

    /// Staged blob, if this entry is an upsert
    pub fn oid(&self) -> Option<&ObjectId> {
        match &self.change {
            StagedChange::Upsert(oid) => Some(oid),
            StagedChange::Removal => None,
        }
    }
}

impl Packable for IndexEntry {
    fn serialize(&self) -> Result<Bytes> {
        let path_len = u16::try_from(self.path.len()).map_err(|_| {
            Error::corrupt("index entry", format!("path too long: {}", self.path))
        })?;

        let mut bytes = Vec::new();
        match &self.change {
            StagedChange::Upsert(oid) => {
                bytes.write_u8(UPSERT_KIND)?;
                bytes.write_u16::<NetworkEndian>(path_len)?;
                bytes.write_all(self.path.as_bytes())?;
                bytes.write_u8(oid.as_ref().len() as u8)?;
                bytes.write_all(oid.as_ref().as_bytes())?;
            }
            StagedChange::Removal => {
                bytes.write_u8(REMOVAL_KIND)?;
                bytes.write_u16::<NetworkEndian>(path_len)?;
                bytes.write_all(self.path.as_bytes())?;
                bytes.write_u8(0)?;
            }
        }

        Ok(Bytes::from(bytes))
    }
}

impl Unpackable for IndexEntry {
    fn deserialize(mut reader: impl BufRead) -> Result<Self> {
        let truncated = |_| Error::corrupt("index entry", "truncated entry");

        let kind = reader.read_u8().map_err(truncated)?;
        let path_len = reader.read_u16::<NetworkEndian>().map_err(truncated)? as usize;
        let mut path = vec![0; path_len];
        reader.read_exact(&mut path).map_err(truncated)?;
        let path = String::from_utf8(path)
            .map_err(|_| Error::corrupt("index entry", "path is not utf-8"))?;

        let oid_len = reader.read_u8().map_err(truncated)? as usize;
        let mut oid = vec![0; oid_len];
        reader.read_exact(&mut oid).map_err(truncated)?;

        match kind {
            UPSERT_KIND => {
                let oid = String::from_utf8(oid)
                    .map_err(|_| Error::corrupt("index entry", "object id is not utf-8"))?;
                Ok(IndexEntry::upsert(path, ObjectId::try_parse(oid)?))
            }
            REMOVAL_KIND if oid_len == 0 => Ok(IndexEntry::removal(path)),
            _ => Err(Error::corrupt(
                "index entry",
                format!("unknown entry kind {kind} for '{path}'"),
            )),
        }
    }
}
