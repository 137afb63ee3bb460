//! Error types for NonAuth operations.
//!
//! A failed authentication is not an error: it is reported as
//! [`Verdict::NotAuthenticated`](crate::Verdict::NotAuthenticated) so that an
//! ordinary random hello and a forged one look the same to the caller.

use thiserror::Error;

/// Result type alias for NonAuth operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while embedding or extracting a CAM.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Input has the wrong length for a random field or CAM
    #[error("length mismatch: expected {expected} bytes, got {actual}")]
    Length {
        /// Required length
        expected: usize,
        /// Length received
        actual: usize,
    },

    /// The AEAD could not be initialized from the key material
    #[error("key setup failed: {0}")]
    KeySetup(String),

    /// The OS entropy source failed
    #[error("random generation failed: {0}")]
    RandomGeneration(String),

    /// Embedded timestamp is outside the accepted clock-skew window
    #[error("timestamp window exceeded: timestamp {timestamp}, now {now}, window {window}s")]
    ReplayWindow {
        /// Timestamp carried in the field
        timestamp: u32,
        /// Local clock reading
        now: u32,
        /// Accepted skew in seconds
        window: u32,
    },

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// AEAD operation failed for a reason other than authentication
    #[error("cryptographic error: {0}")]
    Crypto(String),
}

impl Error {
    /// Create a new key setup error
    pub fn key_setup(msg: impl Into<String>) -> Self {
        Error::KeySetup(msg.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Create a new cryptographic error
    pub fn crypto(msg: impl Into<String>) -> Self {
        Error::Crypto(msg.into())
    }

    /// Check if this error indicates misuse (malformed input or key).
    pub fn is_structural(&self) -> bool {
        matches!(self, Error::Length { .. } | Error::KeySetup(_))
    }

    /// Check if this error is a replay-window rejection
    pub fn is_replay(&self) -> bool {
        matches!(self, Error::ReplayWindow { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Length {
            expected: 32,
            actual: 31,
        };
        assert_eq!(
            err.to_string(),
            "length mismatch: expected 32 bytes, got 31"
        );

        let err = Error::ReplayWindow {
            timestamp: 100,
            now: 500,
            window: 300,
        };
        assert_eq!(
            err.to_string(),
            "timestamp window exceeded: timestamp 100, now 500, window 300s"
        );
    }

    #[test]
    fn test_error_classification() {
        assert!(Error::Length { expected: 32, actual: 0 }.is_structural());
        assert!(Error::key_setup("bad").is_structural());
        assert!(!Error::key_setup("bad").is_replay());

        let replay = Error::ReplayWindow {
            timestamp: 0,
            now: 1000,
            window: 300,
        };
        assert!(replay.is_replay());
        assert!(!replay.is_structural());
        assert!(!Error::config("x").is_structural());
    }
}
