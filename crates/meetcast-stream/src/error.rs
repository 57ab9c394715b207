//! Error taxonomy for a playback attempt.

use meetcast_audio::DecodeError;
use meetcast_session::{ApiError, JoinError, SessionError};

/// Every way a playback can fail. None of these are retried.
#[derive(Debug, thiserror::Error)]
pub enum PlaybackError {
    /// A required input was absent or invalid. Raised before any network
    /// activity.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The meeting could not be joined. No frames were sent.
    #[error("failed to join meeting: {0}")]
    Join(#[from] JoinError),

    /// The asset could not be read or decoded. No frames were sent.
    #[error("failed to prepare audio: {0}")]
    Decode(#[from] DecodeError),

    /// The meeting lookup before joining failed.
    #[error("meeting lookup failed: {0}")]
    Lookup(#[from] ApiError),

    /// Sending a frame, or releasing the session, failed mid-stream.
    #[error("audio transmission failed after {frames_sent} frames: {source}")]
    Transmission {
        frames_sent: usize,
        #[source]
        source: SessionError,
    },
}
