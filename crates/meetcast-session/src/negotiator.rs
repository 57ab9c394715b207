use crate::error::{JoinError, SessionError};
use crate::transport::{Connector, Inbound, MeetingTransport};
use meetcast_auth::Signer;
use meetcast_types::{ClientMessage, JoinParams, JoinResponse, MeetingParams, PARTICIPANT_ROLE};
use std::fmt;
use std::time::Duration;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, info, warn};

/// How long to wait for the endpoint to acknowledge a join request.
pub const DEFAULT_JOIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Phases of a join attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinState {
    Disconnected,
    AwaitingAck,
    Joined,
}

impl fmt::Display for JoinState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Disconnected => "disconnected",
            Self::AwaitingAck => "awaiting_ack",
            Self::Joined => "joined",
        })
    }
}

/// A joined meeting. Frames can only be sent through this handle.
///
/// `close` consumes the session, so it can be released at most once.
pub struct MeetingSession<T: MeetingTransport> {
    transport: T,
    meeting_number: String,
}

impl<T: MeetingTransport> MeetingSession<T> {
    /// Wraps an already acknowledged transport.
    pub fn new(transport: T, meeting_number: impl Into<String>) -> Self {
        Self {
            transport,
            meeting_number: meeting_number.into(),
        }
    }

    pub fn meeting_number(&self) -> &str {
        &self.meeting_number
    }

    pub async fn send(&mut self, message: &ClientMessage) -> Result<(), SessionError> {
        let text = message.to_json()?;
        self.transport.send_text(text).await
    }

    pub async fn close(mut self) -> Result<(), SessionError> {
        info!(meeting = %self.meeting_number, "leaving meeting");
        self.transport.close().await
    }
}

impl<T: MeetingTransport> fmt::Debug for MeetingSession<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MeetingSession")
            .field("meeting_number", &self.meeting_number)
            .finish_non_exhaustive()
    }
}

/// Joins meetings through a [`Connector`].
#[derive(Debug)]
pub struct SessionNegotiator<C> {
    connector: C,
    signer: Signer,
    join_timeout: Duration,
}

impl<C: Connector> SessionNegotiator<C> {
    pub fn new(connector: C, signer: Signer) -> Self {
        Self {
            connector,
            signer,
            join_timeout: DEFAULT_JOIN_TIMEOUT,
        }
    }

    pub fn with_join_timeout(mut self, join_timeout: Duration) -> Self {
        self.join_timeout = join_timeout;
        self
    }

    /// Opens a connection, sends one join request and waits for one reply.
    ///
    /// Returns the open session only when the reply carries an explicit
    /// success marker. The join timeout covers the whole sequence from
    /// dialing to the acknowledgement. On every failure after the connection
    /// opened, the connection is closed before the error is returned.
    pub async fn join(
        &self,
        meeting: &MeetingParams,
    ) -> Result<MeetingSession<C::Transport>, JoinError> {
        let meeting_number = meeting.meeting_number();
        let auth = self.signer.auth_token()?;
        let signature = self.signer.join_signature(meeting_number)?;
        let deadline = Instant::now() + self.join_timeout;

        let mut transport = match timeout_at(deadline, self.connector.connect(&auth)).await {
            Ok(Ok(transport)) => transport,
            Ok(Err(e)) => return Err(JoinError::Connect(e)),
            Err(_) => {
                warn!(meeting = meeting_number, "timed out connecting to meeting endpoint");
                return Err(JoinError::Timeout(self.join_timeout));
            }
        };

        let request = ClientMessage::join(JoinParams {
            meeting_number: meeting_number.to_string(),
            role: PARTICIPANT_ROLE,
            sdk_key: self.signer.credentials().sdk_key().to_string(),
            signature: signature.into_string(),
            password: meeting.password().unwrap_or_default().to_string(),
        });

        let mut state = JoinState::Disconnected;
        let outcome = match request.to_json() {
            Ok(text) => match timeout_at(deadline, transport.send_text(text)).await {
                Ok(Ok(())) => {
                    state = advance(meeting_number, state, JoinState::AwaitingAck);
                    self.await_ack(&mut transport, deadline).await
                }
                Ok(Err(e)) => Err(JoinError::Send(e)),
                Err(_) => Err(JoinError::Timeout(self.join_timeout)),
            },
            Err(e) => Err(JoinError::Send(e.into())),
        };

        match outcome {
            Ok(()) => {
                advance(meeting_number, state, JoinState::Joined);
                Ok(MeetingSession::new(transport, meeting_number))
            }
            Err(err) => {
                warn!(meeting = meeting_number, error = %err, "join failed");
                if let Err(close_err) = transport.close().await {
                    debug!(error = %close_err, "failed to close connection after join failure");
                }
                advance(meeting_number, state, JoinState::Disconnected);
                Err(err)
            }
        }
    }

    async fn await_ack(
        &self,
        transport: &mut C::Transport,
        deadline: Instant,
    ) -> Result<(), JoinError> {
        let inbound = match timeout_at(deadline, transport.recv()).await {
            Ok(Ok(inbound)) => inbound,
            Ok(Err(e)) => return Err(JoinError::Receive(e)),
            Err(_) => return Err(JoinError::Timeout(self.join_timeout)),
        };

        match inbound {
            Inbound::Text(body) => check_ack(&body),
            Inbound::Binary(data) => match std::str::from_utf8(&data) {
                Ok(body) => check_ack(body),
                Err(_) => Err(JoinError::Rejected("non-text response".to_string())),
            },
            Inbound::Closed => Err(JoinError::ClosedBeforeAck),
        }
    }
}

fn check_ack(body: &str) -> Result<(), JoinError> {
    match JoinResponse::parse(body) {
        Some(response) if response.is_success() => Ok(()),
        Some(response) => Err(JoinError::Rejected(
            response
                .reason()
                .unwrap_or("response carried no success marker")
                .to_string(),
        )),
        None => Err(JoinError::Rejected("unrecognized response".to_string())),
    }
}

fn advance(meeting: &str, from: JoinState, to: JoinState) -> JoinState {
    if from != to {
        debug!(meeting, %from, %to, "join state transition");
    }
    to
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use meetcast_auth::AuthToken;
    use meetcast_types::Credentials;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};
    use tokio::time::timeout;

    #[derive(Default)]
    struct Log {
        connects: usize,
        sent: Vec<String>,
        closes: usize,
    }

    struct ScriptedTransport {
        log: Arc<Mutex<Log>>,
        replies: VecDeque<Inbound>,
    }

    #[async_trait]
    impl MeetingTransport for ScriptedTransport {
        async fn send_text(&mut self, text: String) -> Result<(), SessionError> {
            self.log.lock().unwrap().sent.push(text);
            Ok(())
        }

        async fn recv(&mut self) -> Result<Inbound, SessionError> {
            match self.replies.pop_front() {
                Some(inbound) => Ok(inbound),
                None => std::future::pending().await,
            }
        }

        async fn close(&mut self) -> Result<(), SessionError> {
            self.log.lock().unwrap().closes += 1;
            Ok(())
        }
    }

    struct ScriptedConnector {
        log: Arc<Mutex<Log>>,
        replies: Vec<Inbound>,
    }

    #[async_trait]
    impl Connector for ScriptedConnector {
        type Transport = ScriptedTransport;

        async fn connect(&self, _auth: &AuthToken) -> Result<ScriptedTransport, SessionError> {
            self.log.lock().unwrap().connects += 1;
            Ok(ScriptedTransport {
                log: self.log.clone(),
                replies: self.replies.clone().into(),
            })
        }
    }

    fn negotiator(replies: Vec<Inbound>) -> (SessionNegotiator<ScriptedConnector>, Arc<Mutex<Log>>) {
        let log = Arc::new(Mutex::new(Log::default()));
        let signer =
            Signer::new(Credentials::new("api-key", "api-secret", "sdk-key", "sdk-secret").unwrap());
        let connector = ScriptedConnector {
            log: log.clone(),
            replies,
        };
        (SessionNegotiator::new(connector, signer), log)
    }

    fn meeting() -> MeetingParams {
        MeetingParams::new("123456789", Some("pw".into())).unwrap()
    }

    #[tokio::test]
    async fn join_succeeds_on_success_marker() {
        let (negotiator, log) =
            negotiator(vec![Inbound::Text(r#"{"success": true}"#.to_string())]);

        let session = negotiator.join(&meeting()).await.expect("join should succeed");
        assert_eq!(session.meeting_number(), "123456789");

        let log = log.lock().unwrap();
        assert_eq!(log.connects, 1);
        assert_eq!(log.sent.len(), 1);
        assert_eq!(log.closes, 0);

        let request: serde_json::Value = serde_json::from_str(&log.sent[0]).unwrap();
        assert_eq!(request["action"], "join");
        assert_eq!(request["params"]["meetingNumber"], "123456789");
        assert_eq!(request["params"]["role"], 0);
        assert_eq!(request["params"]["sdkKey"], "sdk-key");
        assert_eq!(request["params"]["password"], "pw");
        assert!(!request["params"]["signature"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn join_accepts_binary_json_ack() {
        let (negotiator, _log) =
            negotiator(vec![Inbound::Binary(br#"{"status":"success"}"#.to_vec())]);
        assert!(negotiator.join(&meeting()).await.is_ok());
    }

    #[tokio::test]
    async fn substring_success_is_rejected_and_closed() {
        let (negotiator, log) =
            negotiator(vec![Inbound::Text("joined with success".to_string())]);

        let err = negotiator.join(&meeting()).await.unwrap_err();
        assert!(matches!(err, JoinError::Rejected(_)), "got {err:?}");
        assert_eq!(log.lock().unwrap().closes, 1);
    }

    #[tokio::test]
    async fn explicit_rejection_reports_reason() {
        let (negotiator, log) = negotiator(vec![Inbound::Text(
            r#"{"success": false, "error": "meeting not started"}"#.to_string(),
        )]);

        match negotiator.join(&meeting()).await {
            Err(JoinError::Rejected(reason)) => assert_eq!(reason, "meeting not started"),
            other => panic!("expected rejection, got {other:?}"),
        }
        assert_eq!(log.lock().unwrap().closes, 1);
    }

    #[tokio::test]
    async fn close_before_ack_is_a_failure() {
        let (negotiator, log) = negotiator(vec![Inbound::Closed]);
        let err = negotiator.join(&meeting()).await.unwrap_err();
        assert!(matches!(err, JoinError::ClosedBeforeAck));
        assert_eq!(log.lock().unwrap().closes, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn silence_times_out() {
        let (negotiator, log) = negotiator(Vec::new());
        let negotiator = negotiator.with_join_timeout(Duration::from_secs(3));

        let err = negotiator.join(&meeting()).await.unwrap_err();
        assert!(matches!(err, JoinError::Timeout(d) if d == Duration::from_secs(3)));
        assert_eq!(log.lock().unwrap().closes, 1);
    }

    /// Accepts the dial but never completes the handshake.
    struct StalledConnector;

    #[async_trait]
    impl Connector for StalledConnector {
        type Transport = ScriptedTransport;

        async fn connect(&self, _auth: &AuthToken) -> Result<ScriptedTransport, SessionError> {
            std::future::pending().await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_connect_is_bounded_by_join_timeout() {
        let signer =
            Signer::new(Credentials::new("api-key", "api-secret", "sdk-key", "sdk-secret").unwrap());
        let negotiator = SessionNegotiator::new(StalledConnector, signer)
            .with_join_timeout(Duration::from_secs(1));
        let start = tokio::time::Instant::now();

        let outcome = timeout(Duration::from_secs(600), negotiator.join(&meeting()))
            .await
            .expect("join should give up on its own");

        assert!(
            matches!(outcome, Err(JoinError::Timeout(d)) if d == Duration::from_secs(1)),
            "got {outcome:?}"
        );
        assert!(start.elapsed() < Duration::from_secs(2));
    }
}
