//! Duplicate finder: the pipeline from roots to reported groups.
//!
//! # Overview
//!
//! [`DuplicateFinder`] wires the pieces together:
//! 1. **Walk** - Depth-first traversal of every root ([`Walker`])
//! 2. **Accept** - Depth and size gates ([`AcceptanceFilter`])
//! 3. **Classify** - Size bucketing with lazy digests ([`Engine`])
//! 4. **Report** - Groups of two or more files ([`super::Reporter`])
//!
//! With a single I/O thread every candidate is classified as soon as the
//! walker yields it. With more threads the accepted candidates are buffered
//! and digested on a bounded pool; both modes report the same groups in the
//! same order.
//!
//! # Example
//!
//! ```no_run
//! use dupfind::duplicates::{DuplicateFinder, FinderConfig};
//! use std::path::PathBuf;
//!
//! let finder = DuplicateFinder::new(FinderConfig::default().with_io_threads(1));
//! let (groups, summary) = finder.find_duplicates(&[PathBuf::from(".")]).unwrap();
//!
//! println!("Found {} duplicate groups", groups.len());
//! println!("Reclaimable space: {}", summary.reclaimable_display());
//! ```

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytesize::ByteSize;

use super::engine::Engine;
use super::filter::AcceptanceFilter;
use super::groups::DuplicateGroup;
use crate::config::ScanConfig;
use crate::progress::{ProgressCallback, PHASE_WALKING};
use crate::scanner::hasher::DEFAULT_BUFFER_SIZE;
use crate::scanner::{Candidate, EntryKind, Hasher, ScanError, TraversalEntry, Walker};

/// Configuration for the duplicate finder.
#[derive(Clone)]
pub struct FinderConfig {
    /// Depth and size settings.
    pub scan_config: ScanConfig,
    /// Number of I/O threads used for digesting.
    /// 1 classifies every candidate as soon as it is discovered.
    pub io_threads: usize,
    /// Read buffer size used while digesting.
    pub buffer_size: usize,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback for reporting.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderConfig")
            .field("scan_config", &self.scan_config)
            .field("io_threads", &self.io_threads)
            .field("buffer_size", &self.buffer_size)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            scan_config: ScanConfig::default(),
            io_threads: 4,
            buffer_size: DEFAULT_BUFFER_SIZE,
            shutdown_flag: None,
            progress_callback: None,
        }
    }
}

impl FinderConfig {
    /// Set the depth and size settings.
    #[must_use]
    pub fn with_scan_config(mut self, config: ScanConfig) -> Self {
        self.scan_config = config;
        self
    }

    /// Set the I/O thread count (at least 1).
    #[must_use]
    pub fn with_io_threads(mut self, threads: usize) -> Self {
        self.io_threads = threads.max(1);
        self
    }

    /// Set the digest read buffer size.
    #[must_use]
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size;
        self
    }

    /// Set the shutdown flag for graceful termination.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Whether candidates are classified as they are discovered.
    #[must_use]
    pub fn is_streaming(&self) -> bool {
        self.io_threads <= 1
    }

    /// Check if shutdown has been requested.
    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }
}

/// Summary statistics from a duplicate scan.
#[derive(Debug, Default)]
pub struct ScanSummary {
    /// Regular files seen by the walker
    pub total_files: usize,
    /// Total size of those files in bytes
    pub total_size: u64,
    /// Files that passed the depth and size gates
    pub accepted: usize,
    /// Files rejected by the depth or size gate
    pub rejected: usize,
    /// Symlinks, devices, sockets and fifos skipped during traversal
    pub ignored_entries: usize,
    /// Files whose size was unique, never read
    pub unique_sizes: usize,
    /// Files digested successfully
    pub digested: usize,
    /// Files dropped because their digest failed
    pub digest_failures: usize,
    /// Bytes read while digesting
    pub bytes_digested: u64,
    /// Number of duplicate groups
    pub duplicate_groups: usize,
    /// Redundant copies across all groups (each group minus one)
    pub duplicate_files: usize,
    /// Space held by redundant copies
    pub reclaimable_space: u64,
    /// Duration of the entire scan
    pub scan_duration: Duration,
    /// Traversal errors that were skipped
    pub scan_errors: Vec<ScanError>,
}

impl ScanSummary {
    /// Format reclaimable space as human-readable string.
    #[must_use]
    pub fn reclaimable_display(&self) -> String {
        ByteSize(self.reclaimable_space).to_string()
    }

    /// Format total size as human-readable string.
    #[must_use]
    pub fn total_size_display(&self) -> String {
        ByteSize(self.total_size).to_string()
    }

    /// Whether any traversal or digest error was skipped.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.scan_errors.is_empty() || self.digest_failures > 0
    }
}

/// Errors that can occur during duplicate finding.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// The scan was interrupted by user (Ctrl+C or shutdown signal).
    #[error("Scan interrupted by user")]
    Interrupted,

    /// No root path was given.
    #[error("No paths to scan")]
    NoRoots,

    /// A root path does not exist.
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// A root path could not be inspected.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Duplicate finder that runs the walk, accept, classify and report pipeline.
#[derive(Debug)]
pub struct DuplicateFinder {
    config: FinderConfig,
    hasher: Arc<Hasher>,
}

impl DuplicateFinder {
    /// Create a new duplicate finder with the given configuration.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        let hasher = Hasher::new().with_buffer_size(config.buffer_size);
        Self {
            config,
            hasher: Arc::new(hasher),
        }
    }

    /// Create a new duplicate finder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(FinderConfig::default())
    }

    /// The finder's configuration.
    #[must_use]
    pub fn config(&self) -> &FinderConfig {
        &self.config
    }

    /// Find all duplicate files under the given roots.
    ///
    /// Roots are walked in the given order. A root that repeats another root
    /// or lies inside one is skipped, so no file is seen twice. Traversal
    /// errors and digest failures are logged, counted in the summary and
    /// skipped.
    ///
    /// # Errors
    ///
    /// Returns `FinderError` if:
    /// - No root is given
    /// - A root does not exist (checked before anything is walked)
    /// - The scan is interrupted by shutdown signal
    pub fn find_duplicates(
        &self,
        roots: &[PathBuf],
    ) -> Result<(Vec<DuplicateGroup>, ScanSummary), FinderError> {
        let start_time = Instant::now();
        let mut summary = ScanSummary::default();

        if roots.is_empty() {
            return Err(FinderError::NoRoots);
        }
        for root in roots {
            if let Err(e) = std::fs::symlink_metadata(root) {
                return Err(match e.kind() {
                    std::io::ErrorKind::NotFound => FinderError::PathNotFound(root.clone()),
                    _ => FinderError::Io {
                        path: root.clone(),
                        source: e,
                    },
                });
            }
        }

        let mut walker = Walker::new(roots.to_vec(), self.config.scan_config.walker_config());
        if let Some(ref flag) = self.config.shutdown_flag {
            walker = walker.with_shutdown_flag(flag.clone());
        }

        log::info!(
            "Starting duplicate scan of {} root(s): {}",
            walker.roots().len(),
            walker
                .roots()
                .iter()
                .map(|r| r.display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        );

        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_start(PHASE_WALKING, 0);
        }

        let filter = self.config.scan_config.acceptance_filter();
        let mut engine = self.engine();

        let candidates = walker
            .walk()
            .filter_map(|result| self.accept_entry(result, &filter, &mut summary));

        if self.config.is_streaming() {
            for candidate in candidates {
                engine.consider(candidate);
            }
            self.end_walking();
        } else {
            let buffered: Vec<Candidate> = candidates.collect();
            self.end_walking();
            if self.config.is_shutdown_requested() {
                return Err(FinderError::Interrupted);
            }
            engine.consider_all(buffered, self.config.io_threads);
        }

        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        Ok(Self::finish(engine, summary, start_time))
    }

    /// Classify an already discovered set of candidates.
    ///
    /// The acceptance gates still apply; nothing is walked.
    ///
    /// # Errors
    ///
    /// Returns `FinderError::Interrupted` if shutdown was requested.
    pub fn find_duplicates_from_candidates<I>(
        &self,
        candidates: I,
    ) -> Result<(Vec<DuplicateGroup>, ScanSummary), FinderError>
    where
        I: IntoIterator<Item = Candidate>,
    {
        let start_time = Instant::now();
        let mut summary = ScanSummary::default();
        let filter = self.config.scan_config.acceptance_filter();
        let mut engine = self.engine();

        let accepted = candidates.into_iter().filter_map(|candidate| {
            summary.total_files += 1;
            summary.total_size += candidate.size;
            Self::gate(candidate, &filter, &mut summary)
        });

        if self.config.is_streaming() {
            for candidate in accepted {
                engine.consider(candidate);
            }
        } else {
            let buffered: Vec<Candidate> = accepted.collect();
            engine.consider_all(buffered, self.config.io_threads);
        }

        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        Ok(Self::finish(engine, summary, start_time))
    }

    fn engine(&self) -> Engine<Arc<Hasher>> {
        let engine = Engine::new(Arc::clone(&self.hasher));
        match self.config.progress_callback {
            Some(ref callback) => engine.with_progress_callback(callback.clone()),
            None => engine,
        }
    }

    fn end_walking(&self) {
        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_end(PHASE_WALKING);
        }
    }

    /// Turn one traversal result into an accepted candidate, if any.
    fn accept_entry(
        &self,
        result: Result<TraversalEntry, ScanError>,
        filter: &AcceptanceFilter,
        summary: &mut ScanSummary,
    ) -> Option<Candidate> {
        let entry = match result {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("Skipping: {}", e);
                summary.scan_errors.push(e);
                return None;
            }
        };

        match entry.kind {
            EntryKind::Directory => None,
            EntryKind::Symlink | EntryKind::Other => {
                log::debug!("Ignoring non-regular entry: {}", entry.path.display());
                summary.ignored_entries += 1;
                None
            }
            EntryKind::File => {
                summary.total_files += 1;
                summary.total_size += entry.size;
                if let Some(ref callback) = self.config.progress_callback {
                    callback.on_progress(summary.total_files, &entry.path.to_string_lossy());
                }
                let candidate = entry.into_candidate()?;
                Self::gate(candidate, filter, summary)
            }
        }
    }

    fn gate(
        candidate: Candidate,
        filter: &AcceptanceFilter,
        summary: &mut ScanSummary,
    ) -> Option<Candidate> {
        if filter.accept(&candidate) {
            summary.accepted += 1;
            Some(candidate)
        } else {
            log::trace!(
                "Rejected {} (depth {}, {} bytes)",
                candidate.path.display(),
                candidate.depth,
                candidate.size
            );
            summary.rejected += 1;
            None
        }
    }

    /// Collect groups and fill in the engine-derived counters.
    fn finish(
        engine: Engine<Arc<Hasher>>,
        mut summary: ScanSummary,
        start_time: Instant,
    ) -> (Vec<DuplicateGroup>, ScanSummary) {
        let groups: Vec<DuplicateGroup> = engine.reporter().groups().collect();
        let stats = engine.stats();

        summary.unique_sizes = engine.state().sizes.unique_sizes();
        summary.digested = stats.digested;
        summary.digest_failures = stats.digest_failures;
        summary.bytes_digested = stats.bytes_digested;
        summary.duplicate_groups = groups.len();
        summary.duplicate_files = groups.iter().map(DuplicateGroup::duplicate_count).sum();
        summary.reclaimable_space = groups.iter().map(DuplicateGroup::wasted_space).sum();
        summary.scan_duration = start_time.elapsed();

        log::info!(
            "Scan complete: {} files ({}), {} accepted, {} digested, {} duplicate groups ({} reclaimable) in {:.2?}",
            summary.total_files,
            summary.total_size_display(),
            summary.accepted,
            summary.digested,
            summary.duplicate_groups,
            summary.reclaimable_display(),
            summary.scan_duration
        );

        (groups, summary)
    }
}
