//! Container error module.
//!
//! This module defines the faults raised by the hash-indexed containers: construction
//! argument violations, direct-access misses, empty-container access, enumeration
//! invalidation and internal slot exhaustion.

use thiserror::Error;

/// Errors raised by container construction and operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    /// A construction parameter was rejected.
    #[error("Invalid argument `{name}`: {reason}")]
    InvalidArgument {
        /// Name of the offending parameter
        name: &'static str,
        /// Why the value was rejected
        reason: String,
    },

    /// Direct access to a key that is not present.
    #[error("Key not found")]
    KeyNotFound,

    /// Peek, pop, oldest or newest on an empty container.
    #[error("Container is empty")]
    Empty,

    /// The container was mutated while a cursor was enumerating it.
    #[error("Container was modified during enumeration (expected version {expected}, found {found})")]
    ConcurrentModification {
        /// Version captured when the cursor was created
        expected: u64,
        /// Version observed at the failing step
        found: u64,
    },

    /// No free slot was available even though eviction or growth ran first.
    #[error("No free slot in a table of capacity {capacity}")]
    CapacityExhausted {
        /// Slot capacity at the time of the failure
        capacity: usize,
    },
}

impl TableError {
    /// Builds an [`TableError::InvalidArgument`] for the named parameter.
    pub fn invalid_argument<S: Into<String>>(name: &'static str, reason: S) -> Self {
        Self::InvalidArgument {
            name,
            reason: reason.into(),
        }
    }
}

/// Result type for container operations.
pub type TableResult<T> = Result<T, TableError>;
