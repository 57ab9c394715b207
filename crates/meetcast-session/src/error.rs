use meetcast_auth::AuthError;
use std::time::Duration;
use thiserror::Error;

/// Transport-level failures on an open or opening connection.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("invalid connection request: {0}")]
    Request(String),

    #[error("failed to encode message: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("connection is closed")]
    Closed,
}

/// Reasons a join attempt did not produce a session.
#[derive(Debug, Error)]
pub enum JoinError {
    #[error("failed to sign join request: {0}")]
    Auth(#[from] AuthError),

    #[error("failed to connect to meeting endpoint: {0}")]
    Connect(#[source] SessionError),

    #[error("failed to send join request: {0}")]
    Send(#[source] SessionError),

    #[error("connection failed while awaiting join acknowledgement: {0}")]
    Receive(#[source] SessionError),

    #[error("no join acknowledgement within {0:?}")]
    Timeout(Duration),

    #[error("connection closed before join was acknowledged")]
    ClosedBeforeAck,

    #[error("join rejected: {0}")]
    Rejected(String),
}

/// Errors from the REST API client.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("failed to sign API token: {0}")]
    Auth(#[from] AuthError),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API returned {status}: {body}")]
    Status { status: u16, body: String },
}
