use std::collections::BTreeSet;

use tracing::debug;

use crate::config::DuplicateSetting;
use crate::error::CurationError;
use crate::library::{Track, TrackId};

/// Whether the same track may appear in the set more than once.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    /// Every way of adding a track checks membership first.
    #[default]
    Reject,
    Allow,
}

impl From<DuplicateSetting> for DuplicatePolicy {
    fn from(s: DuplicateSetting) -> Self {
        match s {
            DuplicateSetting::Reject => DuplicatePolicy::Reject,
            DuplicateSetting::Allow => DuplicatePolicy::Allow,
        }
    }
}

/// A track at its 1-based place in the set.
#[derive(Debug, Clone, PartialEq)]
pub struct SetEntry {
    pub track: Track,
    pub position: usize,
}

/// The ordered working set.
///
/// After every operation `position` runs `1..=len` with no gaps. Index
/// arguments are 0-based; out-of-range indices are no-ops.
#[derive(Debug, Clone, Default)]
pub struct SetCuration {
    entries: Vec<SetEntry>,
    policy: DuplicatePolicy,
}

impl SetCuration {
    pub fn new(policy: DuplicatePolicy) -> Self {
        Self {
            entries: Vec::new(),
            policy,
        }
    }

    pub fn policy(&self) -> DuplicatePolicy {
        self.policy
    }

    pub fn entries(&self) -> &[SetEntry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&SetEntry> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: &TrackId) -> bool {
        self.entries.iter().any(|e| &e.track.id == id)
    }

    pub fn positions(&self) -> Vec<usize> {
        self.entries.iter().map(|e| e.position).collect()
    }

    /// Add `track` at the end. Returns its position.
    pub fn append(&mut self, track: Track) -> Result<usize, CurationError> {
        let at = self.entries.len();
        self.insert_at(track, at)
    }

    /// Add `track` so it ends up at `index`; an index past the end appends.
    /// Returns its position.
    pub fn insert_at(&mut self, track: Track, index: usize) -> Result<usize, CurationError> {
        if self.policy == DuplicatePolicy::Reject && self.contains(&track.id) {
            return Err(CurationError::Duplicate(track.id));
        }
        let index = index.min(self.entries.len());
        debug!(track = %track.display_name, index, "set insert");
        self.entries.insert(
            index,
            SetEntry {
                track,
                position: 0,
            },
        );
        self.renumber();
        Ok(index + 1)
    }

    pub fn remove_at(&mut self, index: usize) -> Option<Track> {
        if index >= self.entries.len() {
            return None;
        }
        let entry = self.entries.remove(index);
        debug!(track = %entry.track.display_name, index, "set remove");
        self.renumber();
        Some(entry.track)
    }

    /// Remove several entries at once. Indices refer to the set before any
    /// removal; repeats and out-of-range values are ignored. Removed tracks
    /// come back in set order.
    pub fn remove_many(&mut self, indices: &[usize]) -> Vec<Track> {
        let doomed: BTreeSet<usize> = indices
            .iter()
            .copied()
            .filter(|&i| i < self.entries.len())
            .collect();
        if doomed.is_empty() {
            return Vec::new();
        }

        let mut removed = Vec::with_capacity(doomed.len());
        let mut kept = Vec::with_capacity(self.entries.len() - doomed.len());
        for (i, entry) in std::mem::take(&mut self.entries).into_iter().enumerate() {
            if doomed.contains(&i) {
                removed.push(entry.track);
            } else {
                kept.push(entry);
            }
        }
        self.entries = kept;
        debug!(count = removed.len(), "set remove many");
        self.renumber();
        removed
    }

    /// Take the entry at `from` out and put it back so it sits at `to`.
    /// Both indices refer to the set before the move.
    pub fn reorder(&mut self, from: usize, to: usize) -> bool {
        let len = self.entries.len();
        if from >= len || to >= len || from == to {
            return false;
        }
        let entry = self.entries.remove(from);
        self.entries.insert(to, entry);
        debug!(from, to, "set reorder");
        self.renumber();
        true
    }

    pub fn move_to_top(&mut self, index: usize) -> bool {
        self.reorder(index, 0)
    }

    pub fn move_up(&mut self, index: usize) -> bool {
        match index.checked_sub(1) {
            Some(to) => self.reorder(index, to),
            None => false,
        }
    }

    pub fn move_down(&mut self, index: usize) -> bool {
        self.reorder(index, index.saturating_add(1))
    }

    pub fn move_to_bottom(&mut self, index: usize) -> bool {
        match self.entries.len().checked_sub(1) {
            Some(last) => self.reorder(index, last),
            None => false,
        }
    }

    /// Empty the set, returning how many entries were dropped.
    pub fn clear(&mut self) -> usize {
        let n = self.entries.len();
        self.entries.clear();
        n
    }

    fn renumber(&mut self) {
        for (i, e) in self.entries.iter_mut().enumerate() {
            e.position = i + 1;
        }
    }
}
