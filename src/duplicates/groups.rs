//! Duplicate groups and the reporter that extracts them.
//!
//! # Overview
//!
//! Once the candidate stream has been drained, [`Reporter`] walks the
//! [`HashIndex`] and yields a [`DuplicateGroup`] for every digest shared by
//! two or more files. Reporting never mutates the index, so it can be
//! repeated as long as the index is kept around.
//!
//! # Example
//!
//! ```
//! use dupfind::duplicates::{HashIndex, Reporter};
//! use dupfind::scanner::{Candidate, Hasher};
//!
//! let digest = Hasher::new().digest_bytes(b"same");
//! let mut index = HashIndex::new();
//! index.insert(digest, Candidate::new("/a", 4, 1));
//! index.insert(digest, Candidate::new("/b", 4, 1));
//!
//! let reporter = Reporter::new(&index);
//! assert!(reporter.has_duplicates());
//! assert_eq!(reporter.groups().count(), 1);
//! ```

use std::path::PathBuf;

use super::index::{HashGroup, HashIndex};
use crate::scanner::{digest_to_hex, Candidate, Digest};

/// Confirmed group of files with identical content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateGroup {
    /// Digest of the shared content
    pub digest: Digest,
    /// File size in bytes (shared by all files in the group)
    pub size: u64,
    /// Files in the order their digest was recorded
    pub files: Vec<Candidate>,
}

impl DuplicateGroup {
    /// Create a new duplicate group.
    ///
    /// # Arguments
    ///
    /// * `digest` - Content digest
    /// * `files` - Files sharing that digest
    #[must_use]
    pub fn new(digest: Digest, files: Vec<Candidate>) -> Self {
        let size = files.first().map_or(0, |f| f.size);
        Self {
            digest,
            size,
            files,
        }
    }

    /// Number of files in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if this group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Total size of all files in this group.
    #[must_use]
    pub fn total_size(&self) -> u64 {
        self.size * self.files.len() as u64
    }

    /// Space taken by every copy but one.
    #[must_use]
    pub fn wasted_space(&self) -> u64 {
        if self.files.len() > 1 {
            self.size * (self.files.len() as u64 - 1)
        } else {
            0
        }
    }

    /// Number of redundant copies (all files minus one).
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.files.len().saturating_sub(1)
    }

    /// Digest as a hex string.
    #[must_use]
    pub fn digest_hex(&self) -> String {
        digest_to_hex(&self.digest)
    }

    /// Paths of all files in this group.
    #[must_use]
    pub fn paths(&self) -> Vec<PathBuf> {
        self.files.iter().map(|f| f.path.clone()).collect()
    }
}

impl From<&HashGroup> for DuplicateGroup {
    fn from(group: &HashGroup) -> Self {
        Self::new(*group.digest(), group.files().to_vec())
    }
}

/// Read-only view that extracts duplicate groups from a [`HashIndex`].
#[derive(Debug, Clone, Copy)]
pub struct Reporter<'a> {
    index: &'a HashIndex,
}

impl<'a> Reporter<'a> {
    /// Create a reporter over `index`.
    #[must_use]
    pub fn new(index: &'a HashIndex) -> Self {
        Self { index }
    }

    /// Lazily yield every group of two or more files, in the order their
    /// digest was first recorded.
    pub fn groups(&self) -> impl Iterator<Item = DuplicateGroup> + 'a {
        self.index
            .iter()
            .filter(|group| group.is_duplicate())
            .map(DuplicateGroup::from)
    }

    /// Whether at least one duplicate group exists.
    #[must_use]
    pub fn has_duplicates(&self) -> bool {
        self.index.iter().any(HashGroup::is_duplicate)
    }

    /// Number of duplicate groups.
    #[must_use]
    pub fn group_count(&self) -> usize {
        self.index.iter().filter(|g| g.is_duplicate()).count()
    }
}
