//! Shared types and constants for meetcast.
//!
//! This crate holds the data model every other crate agrees on: the
//! platform credentials, the meeting being joined, and the JSON messages
//! exchanged with the meeting endpoint. It deliberately carries no I/O so
//! that signing, session and streaming crates can depend on it without
//! pulling in a runtime.

pub mod protocol;

use std::fmt;
use thiserror::Error;

pub use protocol::{AudioParams, ClientMessage, JoinParams, JoinResponse};

/// Role code sent for a non-host participant.
pub const PARTICIPANT_ROLE: u8 = 0;

/// Size of one audio frame on the wire, in raw (pre-encoding) bytes.
pub const DEFAULT_FRAME_SIZE: usize = 16 * 1024;

/// Errors raised while constructing validated inputs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required value was absent or blank.
    #[error("missing required value: {0}")]
    Missing(&'static str),
}

/// The four static secrets issued by the platform.
///
/// The API pair authorizes account-level REST calls; the SDK pair
/// authorizes joining meetings. Values are immutable once constructed.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    api_key: String,
    api_secret: String,
    sdk_key: String,
    sdk_secret: String,
}

impl Credentials {
    /// Builds a credential set, rejecting any blank value.
    pub fn new(
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
        sdk_key: impl Into<String>,
        sdk_secret: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            api_key: require(api_key.into(), "api_key")?,
            api_secret: require(api_secret.into(), "api_secret")?,
            sdk_key: require(sdk_key.into(), "sdk_key")?,
            sdk_secret: require(sdk_secret.into(), "sdk_secret")?,
        })
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn api_secret(&self) -> &str {
        &self.api_secret
    }

    pub fn sdk_key(&self) -> &str {
        &self.sdk_key
    }

    pub fn sdk_secret(&self) -> &str {
        &self.sdk_secret
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key)
            .field("api_secret", &"[REDACTED]")
            .field("sdk_key", &self.sdk_key)
            .field("sdk_secret", &"[REDACTED]")
            .finish()
    }
}

/// The meeting to join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeetingParams {
    meeting_number: String,
    password: Option<String>,
}

impl MeetingParams {
    /// Builds meeting parameters. A blank password is treated as no password.
    pub fn new(
        meeting_number: impl Into<String>,
        password: Option<String>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            meeting_number: require(meeting_number.into(), "meeting_number")?,
            password: password.filter(|p| !p.is_empty()),
        })
    }

    pub fn meeting_number(&self) -> &str {
        &self.meeting_number
    }

    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }
}

fn require(value: String, field: &'static str) -> Result<String, ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::Missing(field))
    } else {
        Ok(value)
    }
}
