//! Error types for GPIO operations.

use thiserror::Error;

/// Errors that can occur when driving a sysfs GPIO.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GpioError {
    /// Exporting the pin failed or its directory never appeared.
    #[error("Failed to export GPIO {pin}: {reason}")]
    Export {
        /// Pin number
        pin: u32,
        /// Underlying cause
        reason: String,
    },

    /// The pin directory vanished (unexported behind our back).
    #[error("GPIO {pin} is not exported")]
    NotExported {
        /// Pin number
        pin: u32,
    },

    /// Reading or writing a pin attribute failed.
    #[error("I/O error on {path}: {reason}")]
    Io {
        /// Attribute path
        path: String,
        /// Underlying cause
        reason: String,
    },

    /// `poll(2)` on the value attribute failed.
    #[error("poll failed: {0}")]
    Poll(String),

    /// Caller supplied an unusable argument.
    #[error("Bad argument: {0}")]
    BadArgument(String),
}

/// Result alias for GPIO operations.
pub type GpioResult<T> = Result<T, GpioError>;
