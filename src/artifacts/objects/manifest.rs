//! Commit manifest
//!
//! A manifest is a commit's complete snapshot of tracked files: a mapping from a
//! repository-relative path (always `/`-separated) to the digest of the blob holding
//! that path's content. Iteration is in sorted path order, which keeps commit
//! serialization reproducible regardless of staging order.

use crate::artifacts::objects::object_id::ObjectId;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    entries: BTreeMap<String, ObjectId>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &str) -> Option<&ObjectId> {
        self.entries.get(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    pub fn insert(&mut self, path: impl Into<String>, oid: ObjectId) -> Option<ObjectId> {
        self.entries.insert(path.into(), oid)
    }

    pub fn remove(&mut self, path: &str) -> Option<ObjectId> {
        self.entries.remove(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ObjectId)> {
        self.entries.iter()
    }

    pub fn paths(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }
}

impl FromIterator<(String, ObjectId)> for Manifest {
    fn from_iter<I: IntoIterator<Item = (String, ObjectId)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Manifest {
    type Item = (String, ObjectId);
    type IntoIter = std::collections::btree_map::IntoIter<String, ObjectId>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
