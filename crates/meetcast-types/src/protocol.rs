//! Messages exchanged with the meeting endpoint.
//!
//! Every client message is a JSON object of the form
//! `{"action": "<name>", "params": {...}}`.

use serde::{Deserialize, Serialize};

/// A message sent from this client to the meeting endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", content = "params", rename_all = "lowercase")]
pub enum ClientMessage {
    /// Request to enter the meeting.
    Join(JoinParams),
    /// One encoded audio frame.
    Audio(AudioParams),
}

impl ClientMessage {
    pub fn join(params: JoinParams) -> Self {
        Self::Join(params)
    }

    pub fn audio(data: impl Into<String>) -> Self {
        Self::Audio(AudioParams { data: data.into() })
    }

    /// Serializes the message to its JSON wire form.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Parameters of a join request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinParams {
    pub meeting_number: String,
    pub role: u8,
    pub sdk_key: String,
    pub signature: String,
    /// Empty when the meeting has no password.
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioParams {
    /// Lowercase hex encoding of the raw frame bytes.
    pub data: String,
}

/// The endpoint's answer to a join request.
///
/// A join is acknowledged only by an explicit marker: `"success": true`, or
/// `"status": "success"` when no boolean is present. An explicit
/// `"success": false` always wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct JoinResponse {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl JoinResponse {
    /// Parses a response body. Returns `None` for anything that is not a
    /// JSON object of the expected shape.
    pub fn parse(body: &str) -> Option<Self> {
        serde_json::from_str(body).ok()
    }

    pub fn is_success(&self) -> bool {
        match self.success {
            Some(flag) => flag,
            None => self
                .status
                .as_deref()
                .is_some_and(|s| s.eq_ignore_ascii_case("success")),
        }
    }

    /// Best human-readable reason the endpoint gave, if any.
    pub fn reason(&self) -> Option<&str> {
        self.error
            .as_deref()
            .or(self.message.as_deref())
            .or(self.status.as_deref())
    }
}
