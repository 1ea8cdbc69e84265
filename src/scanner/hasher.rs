//! BLAKE3 file hasher with streaming support.
//!
//! # Overview
//! This module provides the [`Hasher`] struct for computing 20-byte content
//! digests of files using memory-efficient streaming. The digest is taken
//! from the BLAKE3 extendable output, so it is a prefix of the full BLAKE3
//! output for the same content.
//!
//! The engine only depends on the [`DigestProvider`] trait, which `Hasher`
//! implements.

use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::sync::Arc;

use super::HashError;

/// Length of a content digest in bytes.
pub const DIGEST_LEN: usize = 20;

/// Default read buffer size (64 KiB).
pub const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;

/// Smallest buffer size accepted by [`Hasher::with_buffer_size`].
pub const MIN_BUFFER_SIZE: usize = 4 * 1024;

/// Fixed-length content fingerprint.
///
/// Only equality matters; two files with equal digests are treated as
/// having identical content.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Digest([u8; DIGEST_LEN]);

impl Digest {
    /// Wrap raw digest bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; DIGEST_LEN]) -> Self {
        Self(bytes)
    }

    /// Raw digest bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }

    /// Lowercase hexadecimal representation (40 characters).
    #[must_use]
    pub fn to_hex(&self) -> String {
        digest_to_hex(self)
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({self})")
    }
}

/// Convert a digest to a lowercase hex string.
#[must_use]
pub fn digest_to_hex(digest: &Digest) -> String {
    digest.to_string()
}

/// Source of content digests.
///
/// Implementations must be pure functions of file content and safe to call
/// from several worker threads at once.
pub trait DigestProvider: Send + Sync {
    /// Compute the digest of the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns a [`HashError`] if the file vanished, cannot be opened, or
    /// fails while being read.
    fn digest(&self, path: &Path) -> Result<Digest, HashError>;
}

impl<D: DigestProvider + ?Sized> DigestProvider for &D {
    fn digest(&self, path: &Path) -> Result<Digest, HashError> {
        (**self).digest(path)
    }
}

impl<D: DigestProvider + ?Sized> DigestProvider for Arc<D> {
    fn digest(&self, path: &Path) -> Result<Digest, HashError> {
        (**self).digest(path)
    }
}

/// Streaming BLAKE3 file hasher.
#[derive(Debug, Clone)]
pub struct Hasher {
    buffer_size: usize,
}

impl Default for Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher {
    /// Create a hasher with the default 64 KiB buffer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }

    /// Set the read buffer size. Values below 4 KiB are raised to 4 KiB.
    #[must_use]
    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size.max(MIN_BUFFER_SIZE);
        self
    }

    /// Configured read buffer size.
    #[must_use]
    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    /// Digest everything readable from `reader`.
    ///
    /// # Errors
    ///
    /// Propagates any read error other than `Interrupted`.
    pub fn digest_reader<R: Read>(&self, mut reader: R) -> io::Result<Digest> {
        let mut hasher = blake3::Hasher::new();
        let mut buffer = vec![0u8; self.buffer_size];
        loop {
            let n = match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            hasher.update(&buffer[..n]);
        }

        let mut out = [0u8; DIGEST_LEN];
        hasher.finalize_xof().fill(&mut out);
        Ok(Digest(out))
    }

    /// Digest an in-memory byte slice.
    #[must_use]
    pub fn digest_bytes(&self, bytes: &[u8]) -> Digest {
        let mut hasher = blake3::Hasher::new();
        hasher.update(bytes);
        let mut out = [0u8; DIGEST_LEN];
        hasher.finalize_xof().fill(&mut out);
        Digest(out)
    }

    /// Digest the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`HashError::NotFound`] or [`HashError::PermissionDenied`] for
    /// the common races with external mutation, [`HashError::Io`] otherwise.
    pub fn digest_file(&self, path: &Path) -> Result<Digest, HashError> {
        let file = File::open(path).map_err(|e| HashError::from_io(path.to_path_buf(), e))?;
        self.digest_reader(file)
            .map_err(|e| HashError::from_io(path.to_path_buf(), e))
    }
}

impl DigestProvider for Hasher {
    fn digest(&self, path: &Path) -> Result<Digest, HashError> {
        let digest = self.digest_file(path)?;
        log::trace!("Digested {}: {}", path.display(), digest);
        Ok(digest)
    }
}
