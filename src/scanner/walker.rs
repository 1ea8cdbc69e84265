//! Directory walker implementation using walkdir.
//!
//! # Overview
//!
//! This module provides the [`Walker`] struct, which traverses one or more
//! roots depth-first and yields a [`TraversalEntry`] for everything it sees.
//!
//! # Features
//!
//! - Depth-first, pre-order traversal; directory contents in file-name order
//! - Depth annotation (a root given directly has depth 0)
//! - `max_depth` pruning: nothing deeper is visited at all
//! - Symbolic links are reported but never followed
//! - Repeated and nested roots are walked once (see [`normalize_roots`])
//! - Graceful shutdown via atomic flag
//!
//! # Example
//!
//! ```no_run
//! use dupfind::scanner::{Walker, WalkerConfig};
//! use std::path::PathBuf;
//!
//! let walker = Walker::new(vec![PathBuf::from("/home/user/Downloads")], WalkerConfig::default());
//! let files = walker.walk().filter_map(Result::ok).filter(|e| e.is_file()).count();
//! println!("{files} files");
//! ```

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use walkdir::WalkDir;

use super::{EntryKind, ScanError, TraversalEntry, WalkerConfig};

/// Depth-first directory walker over a list of roots.
#[derive(Debug)]
pub struct Walker {
    /// Roots, visited in the given order
    roots: Vec<PathBuf>,
    /// Walker configuration
    config: WalkerConfig,
    /// Optional shutdown flag for graceful termination
    shutdown_flag: Option<Arc<AtomicBool>>,
}

impl Walker {
    /// Create a new walker for the given roots.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use dupfind::scanner::{Walker, WalkerConfig};
    /// use std::path::PathBuf;
    ///
    /// let walker = Walker::new(vec![PathBuf::from(".")], WalkerConfig::default());
    /// ```
    #[must_use]
    pub fn new(roots: Vec<PathBuf>, config: WalkerConfig) -> Self {
        Self {
            roots: normalize_roots(roots),
            config,
            shutdown_flag: None,
        }
    }

    /// Roots that will actually be walked, after normalization.
    #[must_use]
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Set the shutdown flag for graceful termination.
    ///
    /// When the flag is set to `true`, the walker stops yielding entries.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Check if shutdown has been requested.
    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Walk every root, yielding entries in depth-first order.
    ///
    /// Errors are yielded as [`ScanError`] values rather than stopping
    /// iteration, so an unreadable directory only hides its own subtree.
    pub fn walk(&self) -> impl Iterator<Item = Result<TraversalEntry, ScanError>> + '_ {
        self.roots
            .iter()
            .flat_map(move |root| self.walk_root(root))
            .take_while(move |_| !self.is_shutdown_requested())
    }

    fn walk_root<'a>(
        &'a self,
        root: &'a Path,
    ) -> impl Iterator<Item = Result<TraversalEntry, ScanError>> + 'a {
        log::debug!("Walking {}", root.display());

        let mut walk = WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name();
        if let Some(max_depth) = self.config.max_depth {
            walk = walk.max_depth(max_depth);
        }

        walk.into_iter().map(move |result| match result {
            Ok(entry) => Self::process_entry(&entry),
            Err(e) => Err(Self::handle_walkdir_error(root, e)),
        })
    }

    /// Turn a walkdir entry into a traversal entry.
    fn process_entry(entry: &walkdir::DirEntry) -> Result<TraversalEntry, ScanError> {
        let file_type = entry.file_type();
        let kind = if file_type.is_symlink() {
            EntryKind::Symlink
        } else if file_type.is_dir() {
            EntryKind::Directory
        } else if file_type.is_file() {
            EntryKind::File
        } else {
            EntryKind::Other
        };

        let size = match kind {
            EntryKind::File => entry
                .metadata()
                .map_err(|e| Self::handle_walkdir_error(entry.path(), e))?
                .len(),
            _ => 0,
        };

        log::trace!(
            "Found {:?} {} at depth {}",
            kind,
            entry.path().display(),
            entry.depth()
        );

        Ok(TraversalEntry {
            path: entry.path().to_path_buf(),
            size,
            depth: entry.depth(),
            kind,
        })
    }

    /// Map a walkdir error onto [`ScanError`].
    fn handle_walkdir_error(fallback: &Path, error: walkdir::Error) -> ScanError {
        let path = error
            .path()
            .map_or_else(|| fallback.to_path_buf(), Path::to_path_buf);

        if error.loop_ancestor().is_some() {
            return ScanError::Loop(path);
        }

        match error.into_io_error() {
            Some(io) => match io.kind() {
                std::io::ErrorKind::NotFound => ScanError::NotFound(path),
                std::io::ErrorKind::PermissionDenied => ScanError::PermissionDenied(path),
                _ => ScanError::Io { path, source: io },
            },
            None => ScanError::Io {
                path,
                source: std::io::Error::new(std::io::ErrorKind::Other, "walk error"),
            },
        }
    }
}

/// Drop roots that repeat another root or lie inside one.
///
/// Roots are compared by canonical path, so `dir`, `dir/.` and a symlink to
/// `dir` are the same root. Kept roots retain the spelling they were given
/// with and their relative order. When one root contains another the outer
/// one is kept; of two equal roots the first is kept. A root that cannot be
/// canonicalized is kept as given and reported by the walk itself.
#[must_use]
pub fn normalize_roots(roots: Vec<PathBuf>) -> Vec<PathBuf> {
    let canonical: Vec<Option<PathBuf>> = roots
        .iter()
        .map(|root| std::fs::canonicalize(root).ok())
        .collect();

    let mut kept = Vec::with_capacity(roots.len());
    for (idx, root) in roots.into_iter().enumerate() {
        let covered_by = canonical[idx].as_ref().and_then(|this| {
            canonical.iter().enumerate().find_map(|(other_idx, other)| {
                let other = other.as_ref()?;
                let covers = if other == this {
                    other_idx < idx
                } else {
                    this.starts_with(other)
                };
                covers.then_some(other_idx)
            })
        });

        match covered_by {
            Some(other_idx) => log::info!(
                "Skipping root {}: already covered by root #{}",
                root.display(),
                other_idx + 1
            ),
            None => kept.push(root),
        }
    }
    kept
}
