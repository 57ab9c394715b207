//! Session establishment with the meeting platform.
//!
//! [`SessionNegotiator`] opens a WebSocket to the meeting endpoint, sends a
//! signed join request and waits for a single acknowledgement. A positive
//! acknowledgement yields a [`MeetingSession`], the only handle through which
//! audio frames can be sent. Any other outcome closes the connection before
//! the error is returned.
//!
//! The socket itself sits behind the [`MeetingTransport`] and [`Connector`]
//! traits so the negotiator and the streaming loop can run against in-memory
//! transports in tests.
//!
//! [`api::ApiClient`] covers the account-level REST API, authorized with a
//! fresh bearer token per request.

pub mod api;
pub mod error;
pub mod negotiator;
pub mod transport;

pub use api::{ApiClient, MeetingInfo, DEFAULT_API_BASE_URL};
pub use error::{ApiError, JoinError, SessionError};
pub use negotiator::{JoinState, MeetingSession, SessionNegotiator, DEFAULT_JOIN_TIMEOUT};
pub use transport::{
    Connector, Inbound, MeetingTransport, WsConnector, WsTransport, DEFAULT_MEETING_WS_URL,
};
