use crate::errors::{Error, Result};
use std::io::BufRead;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectType {
    Blob,
    Commit,
}

impl ObjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectType::Blob => "blob",
            ObjectType::Commit => "commit",
        }
    }

    /// Consume the `<type> <size>\0` frame header, returning the type and declared size
    pub fn parse_header(data_reader: &mut impl BufRead) -> Result<(ObjectType, usize)> {
        let mut object_type = Vec::new();
        data_reader
            .read_until(b' ', &mut object_type)
            .map_err(|e| Error::corrupt("object header", e.to_string()))?;

        let object_type = String::from_utf8(object_type)
            .map_err(|_| Error::corrupt("object header", "type is not utf-8"))?;
        let object_type = ObjectType::try_from(object_type.trim())?;

        let mut size = Vec::new();
        data_reader
            .read_until(b'\0', &mut size)
            .map_err(|e| Error::corrupt("object header", e.to_string()))?;
        if size.pop() != Some(b'\0') {
            return Err(Error::corrupt("object header", "missing size terminator"));
        }

        let size = std::str::from_utf8(&size)
            .ok()
            .and_then(|size| size.parse::<usize>().ok())
            .ok_or_else(|| Error::corrupt("object header", "invalid size"))?;

        Ok((object_type, size))
    }
}

impl TryFrom<&str> for ObjectType {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        match value {
            "blob" => Ok(ObjectType::Blob),
            "commit" => Ok(ObjectType::Commit),
            other => Err(Error::corrupt(
                "object header",
                format!("unknown object type '{other}'"),
            )),
        }
    }
}

impl std::fmt::Display for ObjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
