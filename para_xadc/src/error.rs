//! XADC error types and result codes.

use thiserror::Error;

/// Errors returned by catalog queries and value reads.
///
/// Payloads are plain strings so a failed catalog build can be cached once
/// and handed out to every later caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum XadcError {
    /// Channel index outside the catalog.
    #[error("Channel index {index} out of range (catalog holds {count})")]
    OutOfRange {
        /// Requested index
        index: usize,
        /// Number of channels in the catalog
        count: usize,
    },

    /// Allocation for a channel name failed.
    #[error("Out of memory: {0}")]
    OutOfMemory(String),

    /// A sensor attribute file could not be listed, opened or read.
    #[error("File error on {path}: {reason}")]
    FileError {
        /// Path (or entry name) that failed
        path: String,
        /// Underlying cause
        reason: String,
    },

    /// Caller supplied an unusable argument.
    #[error("Bad argument: {0}")]
    BadArgument(String),

    /// No channel name contains the requested pattern.
    #[error("No channel matching '{0}'")]
    NotFound(String),
}

impl XadcError {
    /// Result kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::OutOfRange { .. } => ErrorKind::OutOfRange,
            Self::OutOfMemory(_) => ErrorKind::OutOfMemory,
            Self::FileError { .. } => ErrorKind::FileError,
            Self::BadArgument(_) => ErrorKind::BadArgument,
            Self::NotFound(_) => ErrorKind::NotFound,
        }
    }

    pub(crate) fn file(path: impl Into<String>, reason: impl ToString) -> Self {
        Self::FileError {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

/// Failure classes with the numeric result codes used by the test drivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ErrorKind {
    /// Index outside the catalog.
    OutOfRange = 1,
    /// Allocation failure.
    OutOfMemory = 2,
    /// Sensor file unavailable.
    FileError = 5,
    /// Unusable argument.
    BadArgument = 10,
    /// Lookup without a match.
    NotFound = 12,
}

impl ErrorKind {
    /// Numeric result code (`0` is reserved for success).
    pub fn code(self) -> i32 {
        self as i32
    }
}

/// Result alias for XADC operations.
pub type XadcResult<T> = Result<T, XadcError>;
