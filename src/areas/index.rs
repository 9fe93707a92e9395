//! Index (staging area)
//!
//! The index records the changes the next commit will seal: paths bound to new blobs and
//! paths scheduled for removal. Entries keep their staging order; staging a path again
//! replaces its entry in place.
//!
//! ## Index File Format
//!
//! The index file contains:
//! - Header: Signature, version, and entry count
//! - Entries: Staged changes in staging order
//! - Checksum: SHA-1 hash of the entire index for integrity verification

use crate::artifacts::index::checksum::Checksum;
use crate::artifacts::index::index_entry::{ENTRY_PREFIX_SIZE, IndexEntry};
use crate::artifacts::index::index_header::IndexHeader;
use crate::artifacts::index::HEADER_SIZE;
use crate::artifacts::objects::manifest::Manifest;
use crate::artifacts::objects::object::{Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::{Error, Result};
use byteorder::{ByteOrder, NetworkEndian};
use std::io::Cursor;
use std::ops::DerefMut;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct Index {
    /// Path to the index file (typically `.mgit/index`)
    path: Box<Path>,
    /// Staged changes in staging order
    entries: Vec<IndexEntry>,
    /// Whether the in-memory entries differ from the file
    changed: bool,
}

impl Index {
    pub fn new(path: Box<Path>) -> Self {
        Index {
            path,
            entries: Vec::new(),
            changed: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_changed(&self) -> bool {
        self.changed
    }

    /// Load the index from disk
    ///
    /// A missing or empty file is an empty index.
    ///
    /// # Locking
    ///
    /// Acquires a shared lock on the index file during reading.
    pub fn rehydrate(&mut self) -> Result<()> {
        self.reset();

        let mut index_file = match std::fs::OpenOptions::new().read(true).open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(Error::io(&self.path, e)),
        };
        let mut lock = file_guard::lock(&mut index_file, file_guard::Lock::Shared, 0, 1)
            .map_err(|e| Error::io(&self.path, e))?;

        let file_len = lock
            .deref_mut()
            .metadata()
            .map_err(|e| Error::io(&self.path, e))?
            .len();
        if file_len == 0 {
            return Ok(());
        }

        let path = self.path.clone();
        let mut reader = Checksum::new(lock, &path);
        let header_bytes = reader.read(HEADER_SIZE)?;
        let header = IndexHeader::deserialize(Cursor::new(header_bytes))?;
        self.parse_entries(header.entries_count, &mut reader)?;
        reader.verify()?;

        tracing::debug!(entries = self.entries.len(), "loaded index");
        Ok(())
    }

    fn parse_entries(&mut self, entries_count: u32, reader: &mut Checksum) -> Result<()> {
        for _ in 0..entries_count {
            let prefix = reader.read(ENTRY_PREFIX_SIZE)?;
            let path_len = NetworkEndian::read_u16(&prefix[1..3]) as usize;
            let path = reader.read(path_len)?;
            let oid_len = reader.read(1)?;
            let oid = reader.read(oid_len[0] as usize)?;

            let entry_bytes = [&prefix[..], &path[..], &oid_len[..], &oid[..]].concat();
            let entry = IndexEntry::deserialize(Cursor::new(entry_bytes))?;

            self.entries.push(entry);
        }

        Ok(())
    }

    fn reset(&mut self) {
        self.entries.clear();
        self.changed = false;
    }

    fn upsert_entry(&mut self, entry: IndexEntry) {
        match self.entries.iter_mut().find(|existing| existing.path == entry.path) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }

        self.changed = true;
    }

    /// Stage a blob for a path; the last write for a path wins
    pub fn stage(&mut self, path: impl Into<String>, oid: ObjectId) {
        self.upsert_entry(IndexEntry::upsert(path, oid));
    }

    /// Stage the removal of a path from the next commit
    pub fn stage_removal(&mut self, path: impl Into<String>) {
        self.upsert_entry(IndexEntry::removal(path));
    }

    /// Forget the staged change for a path, if any
    pub fn unstage(&mut self, path: &str) {
        let staged = self.entries.len();
        self.entries.retain(|entry| entry.path != path);

        if self.entries.len() != staged {
            self.changed = true;
        }
    }

    /// Drop every staged change
    pub fn clear(&mut self) {
        if !self.entries.is_empty() {
            self.entries.clear();
            self.changed = true;
        }
    }

    pub fn entry_by_path(&self, path: &str) -> Option<&IndexEntry> {
        self.entries.iter().find(|entry| entry.path == path)
    }

    /// Staged changes in staging order
    pub fn entries(&self) -> impl Iterator<Item = &IndexEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Overlay the staged changes on a parent manifest
    pub fn apply_to(&self, mut manifest: Manifest) -> Manifest {
        for entry in &self.entries {
            match entry.oid() {
                Some(oid) => {
                    manifest.insert(entry.path.clone(), oid.clone());
                }
                None => {
                    manifest.remove(&entry.path);
                }
            }
        }

        manifest
    }

    /// Persist the index
    ///
    /// # Locking
    ///
    /// Acquires an exclusive lock on the index file during writing.
    pub fn write_updates(&mut self) -> Result<()> {
        let path = self.path.clone();
        let mut index_file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .map_err(|e| Error::io(&path, e))?;
        let lock = file_guard::lock(&mut index_file, file_guard::Lock::Exclusive, 0, 1)
            .map_err(|e| Error::io(&path, e))?;

        let mut writer = Checksum::new(lock, &path);

        let header = IndexHeader::new(self.entries.len() as u32);
        writer.write(&header.serialize()?)?;

        for entry in &self.entries {
            writer.write(&entry.serialize()?)?;
        }

        writer.write_checksum()?;
        self.changed = false;

        tracing::debug!(entries = self.entries.len(), "wrote index");
        Ok(())
    }
}
