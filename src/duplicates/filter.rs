//! Per-candidate acceptance filter.
//!
//! # Overview
//!
//! Before a discovered file reaches the classification engine it must pass
//! two gates:
//!
//! - **Depth gate**: candidates shallower than `min_depth` are rejected. The
//!   walker already stops descending past `max_depth`.
//! - **Size gate**: the size is compared against a threshold with one of
//!   [`SizeOperator`]'s comparisons.
//!
//! Size expressions use `find(1)`-style syntax, `[+|-]N[unit]`:
//!
//! | prefix | meaning            |
//! |--------|--------------------|
//! | `+`    | size >= threshold  |
//! | `-`    | size <= threshold  |
//! | none   | size == threshold  |
//!
//! | unit        | multiplier |
//! |-------------|------------|
//! | none or `c` | 1          |
//! | `w`         | 2          |
//! | `b`         | 512        |
//! | `k`         | 1024       |
//! | `M`         | 1024²      |
//! | `G`         | 1024³      |
//!
//! # Example
//!
//! ```
//! use dupfind::duplicates::{AcceptanceFilter, SizeFilter};
//! use dupfind::scanner::Candidate;
//!
//! let size: SizeFilter = "-1k".parse().unwrap();
//! let filter = AcceptanceFilter::new(0, size);
//!
//! assert!(filter.accept(&Candidate::new("/small", 1024, 1)));
//! assert!(!filter.accept(&Candidate::new("/big", 2048, 1)));
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::scanner::Candidate;

/// Comparison applied by the size gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SizeOperator {
    /// Accept sizes at or above the threshold
    #[default]
    GreaterOrEqual,
    /// Accept sizes at or below the threshold
    LessOrEqual,
    /// Accept exactly the threshold
    Equal,
}

impl SizeOperator {
    /// Whether `size` satisfies this comparison against `threshold`.
    #[must_use]
    pub fn matches(self, size: u64, threshold: u64) -> bool {
        match self {
            Self::GreaterOrEqual => size >= threshold,
            Self::LessOrEqual => size <= threshold,
            Self::Equal => size == threshold,
        }
    }

    fn prefix(self) -> &'static str {
        match self {
            Self::GreaterOrEqual => "+",
            Self::LessOrEqual => "-",
            Self::Equal => "",
        }
    }
}

/// Size gate: an operator and a threshold in bytes.
///
/// The default accepts every size (`>= 0`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SizeFilter {
    /// Comparison to apply
    pub operator: SizeOperator,
    /// Threshold in bytes
    pub threshold: u64,
}

impl SizeFilter {
    /// Create a size filter.
    #[must_use]
    pub fn new(operator: SizeOperator, threshold: u64) -> Self {
        Self {
            operator,
            threshold,
        }
    }

    /// Whether a file of `size` bytes passes.
    #[must_use]
    pub fn accepts(&self, size: u64) -> bool {
        self.operator.matches(size, self.threshold)
    }
}

impl fmt::Display for SizeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}c", self.operator.prefix(), self.threshold)
    }
}

/// Errors produced while parsing a size expression.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SizeParseError {
    /// Nothing to parse.
    #[error("Size expression cannot be empty")]
    Empty,

    /// The numeric part is missing or not a number.
    #[error("Invalid size number in '{0}'")]
    InvalidNumber(String),

    /// The unit suffix is not one of `c`, `w`, `b`, `k`, `M`, `G`.
    #[error("Unknown size unit '{unit}' in '{input}' (expected one of c, w, b, k, M, G)")]
    UnknownUnit {
        /// The offending suffix
        unit: String,
        /// The full expression
        input: String,
    },

    /// The threshold does not fit in 64 bits.
    #[error("Size '{0}' is too large")]
    Overflow(String),
}

/// Byte multiplier for a unit suffix.
fn unit_multiplier(unit: &str) -> Option<u64> {
    match unit {
        "" | "c" => Some(1),
        "w" => Some(2),
        "b" => Some(512),
        "k" => Some(1024),
        "M" => Some(1024 * 1024),
        "G" => Some(1024 * 1024 * 1024),
        _ => None,
    }
}

impl FromStr for SizeFilter {
    type Err = SizeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();
        if input.is_empty() {
            return Err(SizeParseError::Empty);
        }

        let (operator, rest) = match input.as_bytes()[0] {
            b'+' => (SizeOperator::GreaterOrEqual, &input[1..]),
            b'-' => (SizeOperator::LessOrEqual, &input[1..]),
            _ => (SizeOperator::Equal, input),
        };

        let split = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        let (digits, unit) = rest.split_at(split);
        if digits.is_empty() {
            return Err(SizeParseError::InvalidNumber(input.to_string()));
        }

        let multiplier = unit_multiplier(unit).ok_or_else(|| SizeParseError::UnknownUnit {
            unit: unit.to_string(),
            input: input.to_string(),
        })?;

        let count: u64 = digits
            .parse()
            .map_err(|_| SizeParseError::Overflow(input.to_string()))?;
        let threshold = count
            .checked_mul(multiplier)
            .ok_or_else(|| SizeParseError::Overflow(input.to_string()))?;

        Ok(Self::new(operator, threshold))
    }
}

/// Pure predicate deciding whether a candidate enters the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AcceptanceFilter {
    min_depth: usize,
    size: SizeFilter,
}

impl AcceptanceFilter {
    /// Create a filter from a minimum depth and a size gate.
    #[must_use]
    pub fn new(min_depth: usize, size: SizeFilter) -> Self {
        Self { min_depth, size }
    }

    /// Minimum accepted depth.
    #[must_use]
    pub fn min_depth(&self) -> usize {
        self.min_depth
    }

    /// Size gate.
    #[must_use]
    pub fn size_filter(&self) -> SizeFilter {
        self.size
    }

    /// Whether `candidate` passes both gates.
    #[must_use]
    pub fn accept(&self, candidate: &Candidate) -> bool {
        candidate.depth >= self.min_depth && self.size.accepts(candidate.size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_operators() {
        assert_eq!(
            "+10".parse::<SizeFilter>().unwrap(),
            SizeFilter::new(SizeOperator::GreaterOrEqual, 10)
        );
        assert_eq!(
            "-10".parse::<SizeFilter>().unwrap(),
            SizeFilter::new(SizeOperator::LessOrEqual, 10)
        );
        assert_eq!(
            "10".parse::<SizeFilter>().unwrap(),
            SizeFilter::new(SizeOperator::Equal, 10)
        );
    }

    #[test]
    fn test_parse_units() {
        let threshold = |s: &str| s.parse::<SizeFilter>().unwrap().threshold;

        assert_eq!(threshold("7"), 7);
        assert_eq!(threshold("7c"), 7);
        assert_eq!(threshold("7w"), 14);
        assert_eq!(threshold("2b"), 1024);
        assert_eq!(threshold("1k"), 1024);
        assert_eq!(threshold("3M"), 3 * 1024 * 1024);
        assert_eq!(threshold("+2G"), 2 * 1024 * 1024 * 1024);
        assert_eq!(threshold("  -1k  "), 1024);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!("".parse::<SizeFilter>(), Err(SizeParseError::Empty));
        assert_eq!("   ".parse::<SizeFilter>(), Err(SizeParseError::Empty));
        assert!(matches!(
            "+".parse::<SizeFilter>(),
            Err(SizeParseError::InvalidNumber(_))
        ));
        assert!(matches!(
            "k".parse::<SizeFilter>(),
            Err(SizeParseError::InvalidNumber(_))
        ));
        assert!(matches!(
            "10K".parse::<SizeFilter>(),
            Err(SizeParseError::UnknownUnit { .. })
        ));
        assert!(matches!(
            "10kb".parse::<SizeFilter>(),
            Err(SizeParseError::UnknownUnit { .. })
        ));
        assert!(matches!(
            "99999999999999999999".parse::<SizeFilter>(),
            Err(SizeParseError::Overflow(_))
        ));
        assert!(matches!(
            "99999999999G".parse::<SizeFilter>(),
            Err(SizeParseError::Overflow(_))
        ));
    }

    #[test]
    fn test_size_operator_matches() {
        assert!(SizeOperator::GreaterOrEqual.matches(10, 10));
        assert!(SizeOperator::GreaterOrEqual.matches(11, 10));
        assert!(!SizeOperator::GreaterOrEqual.matches(9, 10));

        assert!(SizeOperator::LessOrEqual.matches(10, 10));
        assert!(!SizeOperator::LessOrEqual.matches(11, 10));

        assert!(SizeOperator::Equal.matches(10, 10));
        assert!(!SizeOperator::Equal.matches(9, 10));
    }

    #[test]
    fn test_default_accepts_everything() {
        let filter = AcceptanceFilter::default();
        assert!(filter.accept(&Candidate::new("/a", 0, 0)));
        assert!(filter.accept(&Candidate::new("/b", u64::MAX, 100)));
    }

    #[test]
    fn test_min_depth_rejects_roots() {
        let filter = AcceptanceFilter::new(1, SizeFilter::default());
        assert!(!filter.accept(&Candidate::new("/root-file", 10, 0)));
        assert!(filter.accept(&Candidate::new("/dir/file", 10, 1)));
    }

    #[test]
    fn test_less_or_equal_one_k_rejects_2048() {
        let filter = AcceptanceFilter::new(0, "-1k".parse().unwrap());
        assert!(!filter.accept(&Candidate::new("/big", 2048, 0)));
        assert!(filter.accept(&Candidate::new("/ok", 1024, 0)));
    }

    #[test]
    fn test_display() {
        assert_eq!("+1k".parse::<SizeFilter>().unwrap().to_string(), "+1024c");
        assert_eq!(SizeFilter::default().to_string(), "+0c");
        assert_eq!("12".parse::<SizeFilter>().unwrap().to_string(), "12c");
    }
}
