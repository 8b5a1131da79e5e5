//! Error definitions
//!
//! This module provides error types for mockgate.

use std::time::Duration;

use thiserror::Error;

/// Main error type for mockgate
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A recorded-call accessor was given an index past the end of the log.
    ///
    /// This is a programming error in the test itself; it is returned
    /// immediately and never retried.
    #[error("call index {index} is out of range ({len} calls recorded)")]
    IndexOutOfRange {
        /// The index that was requested.
        index: usize,
        /// How many calls the log held at the time.
        len: usize,
    },

    /// A completion signal arrived after the gate had already reached a
    /// terminal state.
    #[error("completion signaled more than once; gate had already {terminal}")]
    DoubleCompletion {
        /// Description of the terminal state the gate was already in.
        terminal: String,
    },

    /// The deadline elapsed before any completion signal.
    #[error("timed out after {0:?} waiting for completion")]
    Timeout(Duration),

    /// The declared assertion count was not met by the time the unit of
    /// work completed.
    #[error("expected {expected} assertion(s) to be executed, got {executed}")]
    AssertionCountMismatch {
        /// The count declared up front.
        expected: usize,
        /// The count actually executed.
        executed: usize,
    },

    /// An assertion primitive found a mismatch.
    #[error("assertion failed: {0}")]
    AssertionFailed(String),
}

impl Error {
    /// Create an assertion failure with the given message.
    #[must_use]
    pub fn assertion_failed(message: impl Into<String>) -> Self {
        Self::AssertionFailed(message.into())
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
