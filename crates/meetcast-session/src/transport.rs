//! The connection seam between the session layer and the network.

use crate::error::SessionError;
use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use meetcast_auth::AuthToken;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::error::ProtocolError;
use tokio_tungstenite::tungstenite::http::header::AUTHORIZATION;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, trace};

/// Production meeting endpoint.
pub const DEFAULT_MEETING_WS_URL: &str = "wss://zoom.us/mpws";

/// A data message received from the endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    Text(String),
    Binary(Vec<u8>),
    /// The peer closed the connection or the stream ended.
    Closed,
}

/// An open, message-oriented connection to the meeting endpoint.
#[async_trait]
pub trait MeetingTransport: Send {
    /// Sends one text message.
    async fn send_text(&mut self, text: String) -> Result<(), SessionError>;

    /// Waits for the next data message. Control frames are not surfaced.
    async fn recv(&mut self) -> Result<Inbound, SessionError>;

    /// Closes the connection. Closing an already closed connection succeeds.
    async fn close(&mut self) -> Result<(), SessionError>;
}

/// Opens transports to the meeting endpoint.
#[async_trait]
pub trait Connector: Send + Sync {
    type Transport: MeetingTransport;

    /// Opens a new connection authorized with `auth`.
    async fn connect(&self, auth: &AuthToken) -> Result<Self::Transport, SessionError>;
}

type RawWs = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// WebSocket transport over tokio-tungstenite.
pub struct WsTransport {
    stream: RawWs,
}

#[async_trait]
impl MeetingTransport for WsTransport {
    async fn send_text(&mut self, text: String) -> Result<(), SessionError> {
        trace!(bytes = text.len(), "--> sending text message");
        match self.stream.send(Message::text(text)).await {
            Ok(()) => Ok(()),
            Err(
                WsError::ConnectionClosed
                | WsError::AlreadyClosed
                | WsError::Protocol(ProtocolError::SendAfterClosing),
            ) => Err(SessionError::Closed),
            Err(e) => Err(e.into()),
        }
    }

    async fn recv(&mut self) -> Result<Inbound, SessionError> {
        loop {
            match self.stream.next().await {
                Some(Ok(Message::Text(text))) => {
                    trace!(bytes = text.len(), "<-- received text message");
                    return Ok(Inbound::Text(text.as_str().to_owned()));
                }
                Some(Ok(Message::Binary(data))) => {
                    trace!(bytes = data.len(), "<-- received binary message");
                    return Ok(Inbound::Binary(data.to_vec()));
                }
                Some(Ok(Message::Close(frame))) => {
                    debug!(?frame, "peer closed connection");
                    return Ok(Inbound::Closed);
                }
                Some(Ok(_)) => continue,
                Some(Err(WsError::ConnectionClosed | WsError::AlreadyClosed)) | None => {
                    return Ok(Inbound::Closed);
                }
                Some(Err(e)) => return Err(e.into()),
            }
        }
    }

    async fn close(&mut self) -> Result<(), SessionError> {
        match self.stream.close(None).await {
            Ok(())
            | Err(WsError::ConnectionClosed | WsError::AlreadyClosed)
            | Err(WsError::Protocol(ProtocolError::SendAfterClosing)) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Connects to a fixed WebSocket URL.
#[derive(Debug, Clone)]
pub struct WsConnector {
    url: String,
}

impl WsConnector {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Default for WsConnector {
    fn default() -> Self {
        Self::new(DEFAULT_MEETING_WS_URL)
    }
}

#[async_trait]
impl Connector for WsConnector {
    type Transport = WsTransport;

    async fn connect(&self, auth: &AuthToken) -> Result<WsTransport, SessionError> {
        let mut request = self.url.as_str().into_client_request()?;
        let bearer = HeaderValue::from_str(&auth.bearer())
            .map_err(|e| SessionError::Request(e.to_string()))?;
        request.headers_mut().insert(AUTHORIZATION, bearer);

        info!(url = %self.url, "dialing meeting endpoint");
        let (stream, response) = connect_async(request).await?;
        debug!(status = %response.status(), "websocket upgrade complete");

        Ok(WsTransport { stream })
    }
}
