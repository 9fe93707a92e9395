//! Blob object
//!
//! Blobs store the raw bytes of one tracked file at one point in time, without the
//! file name (that lives in the commit manifest).
//!
//! ## Format
//!
//! On disk: `blob <size>\0<content>`

use crate::artifacts::objects::object::{Object, Unpackable};
use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::{Error, Result};
use bytes::Bytes;
use derive_new::new;
use std::io::BufRead;

#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct Blob {
    content: Bytes,
}

impl Blob {
    pub fn content(&self) -> &Bytes {
        &self.content
    }

    pub fn into_content(self) -> Bytes {
        self.content
    }
}

impl Unpackable for Blob {
    fn deserialize(mut reader: impl BufRead) -> Result<Self> {
        // the frame header has already been consumed
        let mut content = Vec::new();
        reader
            .read_to_end(&mut content)
            .map_err(|e| Error::corrupt("blob", e.to_string()))?;

        Ok(Self::new(content.into()))
    }
}

impl Object for Blob {
    fn object_type(&self) -> ObjectType {
        ObjectType::Blob
    }

    fn display(&self) -> String {
        String::from_utf8_lossy(&self.content).into_owned()
    }

    fn payload(&self) -> Result<Bytes> {
        Ok(self.content.clone())
    }
}
