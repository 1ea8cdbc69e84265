//! Scanner module for directory traversal and file digesting.
//!
//! This module provides functionality for:
//! - Depth-first directory walking using walkdir
//! - Content digests with BLAKE3
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`walker`]: Directory traversal producing depth-annotated entries
//! - [`hasher`]: Streaming BLAKE3 digests behind the [`DigestProvider`] trait
//!
//! # Example
//!
//! ```no_run
//! use dupfind::scanner::{EntryKind, Walker, WalkerConfig};
//! use std::path::PathBuf;
//!
//! let config = WalkerConfig {
//!     max_depth: Some(2),
//! };
//!
//! let walker = Walker::new(vec![PathBuf::from(".")], config);
//! for entry in walker.walk() {
//!     match entry {
//!         Ok(entry) if entry.kind == EntryKind::File => {
//!             println!("{} (depth {}): {} bytes", entry.path.display(), entry.depth, entry.size)
//!         }
//!         Ok(_) => {}
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! ```

pub mod hasher;
pub mod walker;

use std::path::PathBuf;


// Re-export main types
pub use hasher::{digest_to_hex, Digest, DigestProvider, Hasher, DIGEST_LEN};
pub use walker::{normalize_roots, Walker};

/// A regular file observed by traversal.
///
/// Candidates are immutable once observed; whichever index currently
/// references a candidate owns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Path to the file, as produced by traversal
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
    /// Number of directory descents from the root (0 for a root itself)
    pub depth: usize,
}

impl Candidate {
    /// Create a new candidate.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, size: u64, depth: usize) -> Self {
        Self {
            path: path.into(),
            size,
            depth,
        }
    }
}

/// What kind of filesystem object a traversal entry refers to.
///
/// Symlinks are reported as such and never followed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// A regular file
    File,
    /// A directory
    Directory,
    /// A symbolic link (not followed)
    Symlink,
    /// Anything else: device, socket, fifo
    Other,
}

/// One entry of the depth-first traversal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraversalEntry {
    /// Path of the entry
    pub path: PathBuf,
    /// Size in bytes (from `lstat`, so a symlink reports its own size)
    pub size: u64,
    /// Depth below the root it was found under
    pub depth: usize,
    /// Kind of the entry
    pub kind: EntryKind,
}

impl TraversalEntry {
    /// Whether this entry is a regular file.
    #[must_use]
    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    /// Whether this entry is a directory.
    #[must_use]
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    /// Whether this entry is a symbolic link.
    #[must_use]
    pub fn is_symlink(&self) -> bool {
        self.kind == EntryKind::Symlink
    }

    /// Convert a file entry into a [`Candidate`].
    ///
    /// Returns `None` for anything that is not a regular file.
    #[must_use]
    pub fn into_candidate(self) -> Option<Candidate> {
        if self.is_file() {
            Some(Candidate::new(self.path, self.size, self.depth))
        } else {
            None
        }
    }
}

/// Configuration for directory walking.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalkerConfig {
    /// Deepest level to descend to. `None` means unbounded.
    pub max_depth: Option<usize>,
}

impl WalkerConfig {
    /// Create a new configuration.
    #[must_use]
    pub fn new(max_depth: Option<usize>) -> Self {
        Self { max_depth }
    }
}

/// Errors that can occur during directory scanning.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// Permission was denied when accessing a file or directory.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The specified path was not found.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// A symlink loop was detected.
    #[error("Filesystem loop at {0}")]
    Loop(PathBuf),

    /// An I/O error occurred while accessing a file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Errors that can occur while digesting a file.
#[derive(thiserror::Error, Debug)]
pub enum HashError {
    /// The file disappeared between discovery and digesting.
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Permission was denied when reading the file.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// An I/O error occurred while reading the file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl HashError {
    /// Classify an I/O error raised while digesting `path`.
    #[must_use]
    pub fn from_io(path: PathBuf, error: std::io::Error) -> Self {
        match error.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(path),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path),
            _ => Self::Io {
                path,
                source: error,
            },
        }
    }

    /// The path the failure refers to.
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::NotFound(path) | Self::PermissionDenied(path) => path,
            Self::Io { path, .. } => path,
        }
    }
}
