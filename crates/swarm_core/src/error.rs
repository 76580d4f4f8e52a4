//! # Error Types
//!
//! Everything the store, the backends and the configuration loader can
//! report. Nothing here is logged or retried by the core; failures go
//! straight back to the caller.

use thiserror::Error;

/// Errors reported by particle store operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Indexed access past the last particle.
    #[error("particle index {index} out of range for store of length {len}")]
    IndexOutOfRange {
        /// The requested index.
        index: usize,
        /// Store length at the time of the call.
        len: usize,
    },

    /// Insertion position past the end of the store.
    #[error("insert position {index} out of range for store of length {len}")]
    InsertOutOfRange {
        /// The requested position.
        index: usize,
        /// Store length at the time of the call.
        len: usize,
    },

    /// `pop` on a store with no particles.
    #[error("store is empty")]
    Empty,

    /// A column could not grow. No column was modified.
    #[error("allocation failed growing column `{field}` by {additional} elements")]
    AllocationFailed {
        /// Name of the first column that refused to grow.
        field: &'static str,
        /// Number of elements requested.
        additional: usize,
    },

    /// A per-particle input did not have one entry per particle.
    #[error("length mismatch: expected {expected} entries, found {found}")]
    LengthMismatch {
        /// Required length (the store length).
        expected: usize,
        /// Supplied length.
        found: usize,
    },

    /// A reorder table is not a permutation of `0..len`.
    #[error("reorder table is not a permutation: index {index} is out of range or repeated")]
    InvalidPermutation {
        /// The first offending table entry.
        index: usize,
    },
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Data-dependent failures of the bulk primitives.
///
/// When one of these is returned the output range was not modified.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AlgorithmError {
    /// A selected scatter target lies outside the output range.
    #[error("scatter target {target} (from element {element}) out of range for output of length {len}")]
    ScatterOutOfBounds {
        /// Input position of the offending element.
        element: usize,
        /// Its target index.
        target: usize,
        /// Output length.
        len: usize,
    },

    /// Two selected elements map to the same output slot.
    #[error("scatter map is not injective: target {target} selected more than once")]
    ScatterCollision {
        /// The contested output index.
        target: usize,
    },

    /// The compaction output cannot hold every selected element.
    #[error("output too small: {required} elements selected, room for {available}")]
    OutputTooSmall {
        /// Number of elements that passed the predicate.
        required: usize,
        /// Output length.
        available: usize,
    },
}

/// Errors loading or applying runtime configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file is not valid TOML for this schema.
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// The worker pool could not be built.
    #[error("thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = StoreError::IndexOutOfRange { index: 7, len: 3 };
        assert_eq!(
            err.to_string(),
            "particle index 7 out of range for store of length 3"
        );

        let err = AlgorithmError::ScatterCollision { target: 4 };
        assert!(err.to_string().contains("target 4"));
    }
}
