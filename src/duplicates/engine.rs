//! Classification engine: size bucketing with lazy content digests.
//!
//! # Overview
//!
//! Every accepted candidate goes through [`Engine::consider`]:
//!
//! 1. The candidate's size is admitted into the [`SizeIndex`].
//! 2. The first file of a size is parked and never read.
//! 3. When a second file of that size arrives, the parked file is digested
//!    (once, whatever the outcome) and so is the new one.
//! 4. Any later file of the same size is digested directly.
//!
//! Digested files land in the [`HashIndex`]; a file whose digest fails is
//! dropped and the run continues.
//!
//! # Parallel mode
//!
//! [`Engine::consider_all`] keeps admission single-threaded and in stream
//! order, then digests the resulting jobs on a bounded rayon pool and
//! records them in job order. The resulting index is identical to the one
//! produced by calling [`Engine::consider`] in a loop.
//!
//! # Example
//!
//! ```no_run
//! use dupfind::duplicates::Engine;
//! use dupfind::scanner::{Candidate, Hasher};
//!
//! let mut engine = Engine::new(Hasher::new());
//! engine.consider(Candidate::new("/data/a.bin", 10, 1));
//! engine.consider(Candidate::new("/data/b.bin", 10, 1));
//!
//! for group in engine.reporter().groups() {
//!     println!("{} files share {}", group.len(), group.digest_hex());
//! }
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use rayon::prelude::*;

use super::groups::Reporter;
use super::index::{HashIndex, SizeIndex};
use crate::progress::{ProgressCallback, PHASE_HASHING};
use crate::scanner::{Candidate, Digest, DigestProvider, HashError};

/// Counters describing what the engine did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineStats {
    /// Candidates passed to the engine
    pub considered: usize,
    /// Successful digests
    pub digested: usize,
    /// Digests that failed (candidate dropped)
    pub digest_failures: usize,
    /// Bytes read while digesting
    pub bytes_digested: u64,
}

impl EngineStats {
    /// Total digest attempts.
    #[must_use]
    pub fn digest_attempts(&self) -> usize {
        self.digested + self.digest_failures
    }
}

/// The engine's mutable tables.
///
/// Owned by a single [`Engine`]; only read once the candidate stream has
/// been drained.
#[derive(Debug, Default)]
pub struct EngineState {
    /// Size-keyed buckets
    pub sizes: SizeIndex,
    /// Digest-keyed groups
    pub hashes: HashIndex,
}

/// Duplicate classification engine.
pub struct Engine<D> {
    provider: D,
    state: EngineState,
    stats: EngineStats,
    progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl<D: std::fmt::Debug> std::fmt::Debug for Engine<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("provider", &self.provider)
            .field("state", &self.state)
            .field("stats", &self.stats)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl<D: DigestProvider> Engine<D> {
    /// Create an engine with empty indices.
    #[must_use]
    pub fn new(provider: D) -> Self {
        Self {
            provider,
            state: EngineState::default(),
            stats: EngineStats::default(),
            progress_callback: None,
        }
    }

    /// Set the progress callback used by [`Engine::consider_all`].
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Classify one accepted candidate, digesting synchronously if needed.
    pub fn consider(&mut self, candidate: Candidate) {
        self.stats.considered += 1;
        for pending in self.state.sizes.admit(candidate).into_pending() {
            let result = self.provider.digest(&pending.path);
            self.record(pending, result);
        }
    }

    /// Classify a batch of candidates, digesting on `io_threads` workers.
    ///
    /// Produces the same index as calling [`Engine::consider`] on each
    /// candidate in order.
    pub fn consider_all<I>(&mut self, candidates: I, io_threads: usize)
    where
        I: IntoIterator<Item = Candidate>,
    {
        let mut pending = Vec::new();
        for candidate in candidates {
            self.stats.considered += 1;
            pending.extend(self.state.sizes.admit(candidate).into_pending());
        }

        if pending.is_empty() {
            log::debug!("No size collisions, nothing to digest");
            return;
        }

        log::info!(
            "Digesting {} files on {} threads",
            pending.len(),
            io_threads.max(1)
        );

        if let Some(ref callback) = self.progress_callback {
            callback.on_phase_start(PHASE_HASHING, pending.len());
        }

        let results = match rayon::ThreadPoolBuilder::new()
            .num_threads(io_threads.max(1))
            .build()
        {
            Ok(pool) => pool.install(|| self.digest_parallel(pending)),
            Err(e) => {
                log::warn!(
                    "Failed to create thread pool ({}), using global pool with {} threads",
                    e,
                    rayon::current_num_threads()
                );
                self.digest_parallel(pending)
            }
        };

        for (candidate, result) in results {
            self.record(candidate, result);
        }

        if let Some(ref callback) = self.progress_callback {
            callback.on_phase_end(PHASE_HASHING);
        }
    }

    /// Digest `pending` in parallel, keeping job order in the output.
    fn digest_parallel(
        &self,
        pending: Vec<Candidate>,
    ) -> Vec<(Candidate, Result<Digest, HashError>)> {
        let provider = &self.provider;
        let callback = self.progress_callback.as_ref();
        let done = AtomicUsize::new(0);
        pending
            .into_par_iter()
            .map(|candidate| {
                let result = provider.digest(&candidate.path);
                if let Some(callback) = callback {
                    let current = done.fetch_add(1, Ordering::Relaxed) + 1;
                    callback.on_progress(current, candidate.path.to_string_lossy().as_ref());
                    if result.is_ok() {
                        callback.on_item_completed(candidate.size);
                    }
                }
                (candidate, result)
            })
            .collect()
    }

    /// Apply one digest outcome to the hash index.
    fn record(&mut self, candidate: Candidate, result: Result<Digest, HashError>) {
        match result {
            Ok(digest) => {
                self.stats.digested += 1;
                self.stats.bytes_digested += candidate.size;
                self.state.hashes.insert(digest, candidate);
            }
            Err(e) => {
                self.stats.digest_failures += 1;
                log::warn!("Skipping {}: {}", candidate.path.display(), e);
            }
        }
    }
}

impl<D> Engine<D> {
    /// Counters collected so far.
    #[must_use]
    pub fn stats(&self) -> EngineStats {
        self.stats
    }

    /// Current index state.
    #[must_use]
    pub fn state(&self) -> &EngineState {
        &self.state
    }

    /// Reporter over the current hash index.
    #[must_use]
    pub fn reporter(&self) -> Reporter<'_> {
        Reporter::new(&self.state.hashes)
    }

    /// Consume the engine, keeping its state and counters.
    #[must_use]
    pub fn into_parts(self) -> (EngineState, EngineStats) {
        (self.state, self.stats)
    }
}
