//! Merge-base search
//!
//! The merge base of two commits is found in two breadth-first passes over the commit
//! graph, following *all* parent edges in stored order (first parent first):
//!
//! 1. Walk every ancestor of `current` (itself included) and mark it.
//! 2. Walk the ancestors of `incoming` (itself included) and stop at the first commit
//!    already marked by the first pass.
//!
//! Breadth-first order from `incoming` makes the answer the common ancestor closest to
//! `incoming`, and the fixed parent order makes it deterministic when several common
//! ancestors sit at the same distance.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let finder = MergeBaseFinder::new(|oid| database.load_slim_commit(oid));
//!
//! let base = finder.find_merge_base(&current, &incoming)?;
//! ```

use crate::artifacts::objects::commit::SlimCommit;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::{Error, Result};
use bitflags::bitflags;
use std::collections::{HashMap, HashSet, VecDeque};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    struct VisitState: u8 {
        const FROM_CURRENT = 0b01;
        const FROM_INCOMING = 0b10;
    }
}

/// Finds merge bases and ancestry relations over any commit source
///
/// The commit loader returns the parents of a commit, which keeps the search independent of
/// where commits live (object store, in-memory graph in tests).
#[derive(Debug, Clone)]
pub struct MergeBaseFinder<CommitLoaderFn>
where
    CommitLoaderFn: Fn(&ObjectId) -> Result<SlimCommit>,
{
    commit_loader: CommitLoaderFn,
}

impl<CommitLoaderFn> MergeBaseFinder<CommitLoaderFn>
where
    CommitLoaderFn: Fn(&ObjectId) -> Result<SlimCommit>,
{
    pub fn new(commit_loader: CommitLoaderFn) -> Self {
        Self { commit_loader }
    }

    /// Breadth-first walk from `start`, calling `visit` once per reachable commit
    ///
    /// The walk stops early when `visit` returns `true`; that commit is returned.
    fn walk(
        &self,
        start: &ObjectId,
        mut visit: impl FnMut(&ObjectId) -> bool,
    ) -> Result<Option<ObjectId>> {
        let mut queue = VecDeque::from([start.clone()]);
        let mut seen = HashSet::from([start.clone()]);

        while let Some(oid) = queue.pop_front() {
            if visit(&oid) {
                return Ok(Some(oid));
            }

            for parent in (self.commit_loader)(&oid)?.parents {
                if seen.insert(parent.clone()) {
                    queue.push_back(parent);
                }
            }
        }

        Ok(None)
    }

    /// Every ancestor of `start`, itself first, in breadth-first order
    pub fn ancestors(&self, start: &ObjectId) -> Result<Vec<ObjectId>> {
        let mut ancestors = Vec::new();
        self.walk(start, |oid| {
            ancestors.push(oid.clone());
            false
        })?;

        Ok(ancestors)
    }

    /// Whether `ancestor` is reachable from `descendant` (a commit is its own ancestor)
    pub fn is_ancestor(&self, ancestor: &ObjectId, descendant: &ObjectId) -> Result<bool> {
        Ok(self.walk(descendant, |oid| oid == ancestor)?.is_some())
    }

    /// Common ancestor closest to `incoming`, or `None` for unrelated histories
    pub fn find_merge_base(
        &self,
        current: &ObjectId,
        incoming: &ObjectId,
    ) -> Result<Option<ObjectId>> {
        let mut states: HashMap<ObjectId, VisitState> = HashMap::new();

        self.walk(current, |oid| {
            states.insert(oid.clone(), VisitState::FROM_CURRENT);
            false
        })?;
        tracing::trace!(ancestors = states.len(), %current, "marked ancestors of current");

        let base = self.walk(incoming, |oid| {
            let state = states.entry(oid.clone()).or_insert(VisitState::empty());
            state.insert(VisitState::FROM_INCOMING);
            state.contains(VisitState::FROM_CURRENT | VisitState::FROM_INCOMING)
        })?;

        tracing::debug!(%current, %incoming, base = ?base, "merge base search finished");
        Ok(base)
    }

    /// Like [`MergeBaseFinder::find_merge_base`], failing with `Unrelated` when no
    /// common ancestor exists
    pub fn merge_base(&self, current: &ObjectId, incoming: &ObjectId) -> Result<ObjectId> {
        self.find_merge_base(current, incoming)?
            .ok_or_else(|| Error::Unrelated {
                current: current.to_string(),
                incoming: incoming.to_string(),
            })
    }
}
