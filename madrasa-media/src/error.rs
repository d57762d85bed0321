//! Error types for madrasa-media
//!
//! None of these escape the controllers' public operations: acquisition and
//! playback failures are converted into an idle state plus a
//! `MediaEvent::AcquisitionFailed`. They exist for `MediaLoader` and
//! `MediaHandle` implementations.

use thiserror::Error;

/// Main error type for madrasa-media
#[derive(Error, Debug)]
pub enum Error {
    /// Media resource could not be fetched or decoded
    #[error("Failed to acquire '{id}': {reason}")]
    Acquisition { id: String, reason: String },

    /// Media resource did not arrive within the configured timeout
    #[error("Timed out acquiring '{id}' after {timeout_ms}ms")]
    AcquisitionTimeout { id: String, timeout_ms: u64 },

    /// Acquired resource refused to start
    #[error("Playback error: {0}")]
    Playback(String),

    /// Configuration or other shared error
    #[error(transparent)]
    Common(#[from] madrasa_common::Error),
}

/// Convenience Result type using madrasa-media Error
pub type Result<T> = std::result::Result<T, Error>;
