//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Accepting or rejecting discovered files (depth and size gates)
//! - Size bucketing with deferred digests
//! - Digest-keyed grouping
//! - Reporting duplicate groups
//! - Running the whole pipeline over a set of roots

pub mod engine;
pub mod filter;
pub mod finder;
pub mod groups;
pub mod index;

pub use engine::{Engine, EngineState, EngineStats};
pub use filter::{AcceptanceFilter, SizeFilter, SizeOperator, SizeParseError};
pub use finder::{DuplicateFinder, FinderConfig, FinderError, ScanSummary};
pub use groups::{DuplicateGroup, Reporter};
pub use index::{Admission, HashGroup, HashIndex, SizeBucket, SizeIndex};
