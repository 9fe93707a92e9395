use crate::artifacts::index::CHECKSUM_SIZE;
use crate::errors::{Error, Result};
use bytes::Bytes;
use file_guard::FileGuard;
use sha1::{Digest, Sha1};
use std::io::{Read, Write};
use std::ops::DerefMut;
use std::path::Path;

/// Reader/writer over a locked index file that digests every byte passing through it
#[derive(Debug)]
pub struct Checksum<'f> {
    file: FileGuard<&'f mut std::fs::File>,
    path: &'f Path,
    digest: Sha1,
}

impl<'f> Checksum<'f> {
    pub(crate) fn new(file: FileGuard<&'f mut std::fs::File>, path: &'f Path) -> Self {
        Checksum {
            file,
            path,
            digest: Sha1::new(),
        }
    }

    pub(crate) fn read(&mut self, size: usize) -> Result<Bytes> {
        let mut buffer = vec![0; size];
        self.file
            .deref_mut()
            .read_exact(&mut buffer)
            .map_err(|_| Error::corrupt("index", "unexpected end of file"))?;

        self.digest.update(&buffer);
        Ok(Bytes::from(buffer))
    }

    pub(crate) fn write(&mut self, data: &[u8]) -> Result<()> {
        self.file
            .deref_mut()
            .write_all(data)
            .map_err(|e| Error::io(self.path, e))?;
        self.digest.update(data);

        Ok(())
    }

    /// SHA-1 of every byte read or written so far
    fn current(&self) -> [u8; CHECKSUM_SIZE] {
        let mut checksum = [0u8; CHECKSUM_SIZE];
        checksum.copy_from_slice(&self.digest.clone().finalize());
        checksum
    }

    /// Append the running checksum, sealing the file
    pub(crate) fn write_checksum(&mut self) -> Result<()> {
        let checksum = self.current();
        self.file
            .deref_mut()
            .write_all(&checksum)
            .map_err(|e| Error::io(self.path, e))
    }

    /// Compare the trailing checksum on disk with the bytes read so far
    pub(crate) fn verify(&mut self) -> Result<()> {
        let mut stored = [0u8; CHECKSUM_SIZE];
        self.file
            .deref_mut()
            .read_exact(&mut stored)
            .map_err(|_| Error::corrupt("index", "missing checksum"))?;

        if stored != self.current() {
            return Err(Error::corrupt("index", "checksum mismatch"));
        }

        Ok(())
    }
}
