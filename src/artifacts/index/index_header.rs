use crate::artifacts::index::{HEADER_SIZE, SIGNATURE, VERSION};
use crate::artifacts::objects::object::{Packable, Unpackable};
use crate::errors::{Error, Result};
use byteorder::{NetworkEndian, ReadBytesExt, WriteBytesExt};
use bytes::Bytes;
use derive_new::new;
use std::io::{BufRead, Write};

/// Fixed-size preamble of the index file
///
/// Only the entry count varies; the signature and version are checked while decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, new)]
pub struct IndexHeader {
    pub entries_count: u32,
}

impl Packable for IndexHeader {
    fn serialize(&self) -> Result<Bytes> {
        let mut bytes = Vec::with_capacity(HEADER_SIZE);
        bytes.write_all(SIGNATURE)?;
        bytes.write_u32::<NetworkEndian>(VERSION)?;
        bytes.write_u32::<NetworkEndian>(self.entries_count)?;

        Ok(Bytes::from(bytes))
    }
}

impl Unpackable for IndexHeader {
    fn deserialize(mut reader: impl BufRead) -> Result<Self> {
        let truncated = |_| Error::corrupt("index header", "truncated header");

        let mut signature = [0u8; 4];
        reader.read_exact(&mut signature).map_err(truncated)?;
        if &signature != SIGNATURE {
            return Err(Error::corrupt("index", "invalid signature"));
        }

        let version = reader.read_u32::<NetworkEndian>().map_err(truncated)?;
        if version != VERSION {
            return Err(Error::corrupt(
                "index",
                format!("unsupported version {version}"),
            ));
        }

        Ok(IndexHeader {
            entries_count: reader.read_u32::<NetworkEndian>().map_err(truncated)?,
        })
    }
}
