//! Three-way manifest resolution
//!
//! Every path in `base ∪ current ∪ incoming` is classified by comparing its blob on the
//! three sides (absence counts as a value):
//!
//! | current vs incoming | current vs base | incoming vs base | outcome            |
//! |---------------------|-----------------|------------------|--------------------|
//! | equal               | any             | any              | keep               |
//! | differ              | equal           | differ           | take incoming      |
//! | differ              | differ          | equal            | keep current       |
//! | differ              | differ          | differ           | conflict           |
//!
//! Taking incoming covers additions and deletions made only on the incoming side.
//! A conflicted path keeps its current blob in the merged manifest.

use crate::artifacts::objects::manifest::Manifest;
use crate::artifacts::objects::object_id::ObjectId;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    /// Both sides changed the content
    Content,
    /// One side changed the path, the other deleted it
    ModifyDelete,
    /// Both sides added the path with different content
    AddAdd,
}

impl ConflictKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConflictKind::Content => "content",
            ConflictKind::ModifyDelete => "modify/delete",
            ConflictKind::AddAdd => "add/add",
        }
    }
}

/// A path both sides changed in incompatible ways
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeConflict {
    pub path: String,
    pub current: Option<ObjectId>,
    pub incoming: Option<ObjectId>,
    pub base: Option<ObjectId>,
}

impl MergeConflict {
    pub fn kind(&self) -> ConflictKind {
        match (&self.base, &self.current, &self.incoming) {
            (None, _, _) => ConflictKind::AddAdd,
            (Some(_), None, _) | (Some(_), _, None) => ConflictKind::ModifyDelete,
            _ => ConflictKind::Content,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Reconciled manifest; conflicted paths keep their current blob
    pub merged: Manifest,
    /// Conflicts in path order
    pub conflicts: Vec<MergeConflict>,
}

impl Resolution {
    pub fn is_clean(&self) -> bool {
        self.conflicts.is_empty()
    }

    pub fn is_conflicted(&self, path: &str) -> bool {
        self.conflicts.iter().any(|conflict| conflict.path == path)
    }
}

pub fn resolve(base: &Manifest, current: &Manifest, incoming: &Manifest) -> Resolution {
    let paths = base
        .paths()
        .chain(current.paths())
        .chain(incoming.paths())
        .collect::<BTreeSet<_>>();

    let mut resolution = Resolution::default();

    for path in paths {
        let base_oid = base.get(path);
        let current_oid = current.get(path);
        let incoming_oid = incoming.get(path);

        let chosen = if current_oid == incoming_oid || incoming_oid == base_oid {
            current_oid
        } else if current_oid == base_oid {
            incoming_oid
        } else {
            resolution.conflicts.push(MergeConflict {
                path: path.clone(),
                current: current_oid.cloned(),
                incoming: incoming_oid.cloned(),
                base: base_oid.cloned(),
            });
            current_oid
        };

        if let Some(oid) = chosen {
            resolution.merged.insert(path.clone(), oid.clone());
        }
    }

    tracing::debug!(
        paths = resolution.merged.len(),
        conflicts = resolution.conflicts.len(),
        "resolved three-way merge"
    );
    resolution
}
