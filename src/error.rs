//! Error types for the `windisplay` compatibility layer
//!
//! This module defines all error types used throughout the crate,
//! providing clear error messages and proper error propagation.
//!
//! Most getters on the public API surface intentionally do not return
//! these errors: Win32 callers expect `GetSystemMetrics` and the
//! `SystemParametersInfo` getters to always produce something, so those
//! paths fall back to defaults instead of propagating failures.

use thiserror::Error;

/// Simple error type for wrapping string messages while implementing `std::error::Error`
#[derive(Debug, Error)]
#[error("{0}")]
pub struct StringError(pub String);

impl StringError {
    /// Create a new `StringError` from a string message
    pub fn new(msg: impl Into<String>) -> Box<Self> {
        Box::new(Self(msg.into()))
    }
}

/// Main error type for the compatibility layer
#[derive(Debug, Error)]
pub enum WinDisplayError {
    /// Requested device mode has no negotiable match or is malformed.
    /// Surfaced directly to the API caller; never retried internally.
    #[error("no supported display mode matches the request")]
    BadMode,

    /// Configuration store key could not be opened or created.
    /// Forces a topology rebuild on next access rather than being cached.
    #[error("configuration store unavailable: {0}")]
    StoreUnavailable(String),

    /// A device or store path was malformed
    #[error("invalid device path: {0}")]
    InvalidPath(String),

    /// Host driver declined to enumerate devices; callers fall back to a
    /// synthetic default adapter and monitor
    #[error("host driver unavailable: {0}")]
    DriverUnavailable(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Operation is not implemented by the host driver
    #[error("not implemented by the host driver: {0}")]
    NotImplemented(&'static str),

    /// A caller-supplied parameter value has the wrong shape for the
    /// parameter it targets
    #[error("invalid parameter")]
    InvalidParameter,

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Result type alias for `windisplay` operations
pub type Result<T> = std::result::Result<T, WinDisplayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = WinDisplayError::BadMode;
        assert_eq!(
            error.to_string(),
            "no supported display mode matches the request"
        );
    }

    #[test]
    fn test_error_from_io() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error: WinDisplayError = io_error.into();
        assert!(matches!(error, WinDisplayError::IoError(_)));
    }

    #[test]
    fn test_driver_unavailable_preserves_source() {
        let error = WinDisplayError::DriverUnavailable(StringError::new("no backend"));
        assert_eq!(error.to_string(), "host driver unavailable: no backend");
        assert!(std::error::Error::source(&error).is_some());
    }
}
