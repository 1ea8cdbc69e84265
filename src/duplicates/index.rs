//! Size-keyed and digest-keyed indices used by the classification engine.
//!
//! # Size Index
//!
//! Every distinct size gets exactly one [`SizeBucket`]. The first file of a
//! size is parked in the bucket without being read. Only when a second file
//! of the same size shows up does the bucket flip to [`SizeBucket::Digested`]
//! and hand the parked file back for digesting. Files of one-of-a-kind size
//! are therefore never read.
//!
//! # Hash Index
//!
//! Candidates are appended under their digest. Groups keep the order in
//! which their digest was first recorded, and files keep the order in which
//! they were appended, so a deterministic candidate stream produces
//! deterministic groups.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::scanner::{Candidate, Digest};

/// Per-size tracking state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SizeBucket {
    /// Only one file of this size has been seen; it has not been read.
    Unique(Candidate),
    /// The size collided; its first file has been handed out for digesting.
    Digested,
}

/// Outcome of admitting a candidate into the [`SizeIndex`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    /// First file of its size; parked, nothing to digest.
    Deferred,
    /// Second file of its size: digest `first`, then `current`.
    Collision {
        /// The parked first file of this size
        first: Candidate,
        /// The file that caused the collision
        current: Candidate,
    },
    /// Third or later file of its size: digest it directly.
    Repeat(Candidate),
}

impl Admission {
    /// Candidates that must now be digested, in order.
    #[must_use]
    pub fn into_pending(self) -> Vec<Candidate> {
        match self {
            Self::Deferred => Vec::new(),
            Self::Collision { first, current } => vec![first, current],
            Self::Repeat(candidate) => vec![candidate],
        }
    }
}

/// Index of observed file sizes.
#[derive(Debug, Default)]
pub struct SizeIndex {
    buckets: HashMap<u64, SizeBucket>,
}

impl SizeIndex {
    /// Create an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `candidate` and decide what needs digesting.
    ///
    /// The `Unique -> Digested` transition happens here and nowhere else,
    /// so a parked file is handed out at most once.
    pub fn admit(&mut self, candidate: Candidate) -> Admission {
        match self.buckets.entry(candidate.size) {
            Entry::Vacant(slot) => {
                slot.insert(SizeBucket::Unique(candidate));
                Admission::Deferred
            }
            Entry::Occupied(mut slot) => {
                match std::mem::replace(slot.get_mut(), SizeBucket::Digested) {
                    SizeBucket::Unique(first) => Admission::Collision {
                        first,
                        current: candidate,
                    },
                    SizeBucket::Digested => Admission::Repeat(candidate),
                }
            }
        }
    }

    /// Bucket for `size`, if that size has been seen.
    #[must_use]
    pub fn get(&self, size: u64) -> Option<&SizeBucket> {
        self.buckets.get(&size)
    }

    /// Number of distinct sizes seen.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Whether no size has been seen yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Number of sizes seen exactly once (their files were never read).
    #[must_use]
    pub fn unique_sizes(&self) -> usize {
        self.buckets
            .values()
            .filter(|b| matches!(b, SizeBucket::Unique(_)))
            .count()
    }
}

/// All candidates sharing one digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashGroup {
    digest: Digest,
    files: Vec<Candidate>,
}

impl HashGroup {
    /// Digest shared by every file in the group.
    #[must_use]
    pub fn digest(&self) -> &Digest {
        &self.digest
    }

    /// Files in insertion order.
    #[must_use]
    pub fn files(&self) -> &[Candidate] {
        &self.files
    }

    /// Number of files.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether the group is empty (never true for a group in an index).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Whether this group is a duplicate set.
    #[must_use]
    pub fn is_duplicate(&self) -> bool {
        self.files.len() >= 2
    }
}

/// Index of digested candidates keyed by digest.
#[derive(Debug, Default)]
pub struct HashIndex {
    slots: HashMap<Digest, usize>,
    groups: Vec<HashGroup>,
}

impl HashIndex {
    /// Create an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `candidate` to the group for `digest`, creating it if needed.
    pub fn insert(&mut self, digest: Digest, candidate: Candidate) {
        match self.slots.entry(digest) {
            Entry::Occupied(slot) => self.groups[*slot.get()].files.push(candidate),
            Entry::Vacant(slot) => {
                slot.insert(self.groups.len());
                self.groups.push(HashGroup {
                    digest,
                    files: vec![candidate],
                });
            }
        }
    }

    /// Group for `digest`, if any file with that digest was recorded.
    #[must_use]
    pub fn get(&self, digest: &Digest) -> Option<&HashGroup> {
        self.slots.get(digest).map(|&i| &self.groups[i])
    }

    /// All groups, in the order their digest was first recorded.
    pub fn iter(&self) -> std::slice::Iter<'_, HashGroup> {
        self.groups.iter()
    }

    /// Number of distinct digests.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Whether nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total number of recorded candidates.
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.groups.iter().map(HashGroup::len).sum()
    }
}

impl<'a> IntoIterator for &'a HashIndex {
    type Item = &'a HashGroup;
    type IntoIter = std::slice::Iter<'a, HashGroup>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
