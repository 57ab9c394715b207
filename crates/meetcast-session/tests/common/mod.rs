//! A local WebSocket endpoint standing in for the meeting platform.
//!
//! Shared with the meetcast-stream integration tests through `#[path]`.

#![allow(dead_code)]

use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::protocol::Message;
use tokio_tungstenite::accept_hdr_async;

/// How the endpoint answers a join request.
#[derive(Debug, Clone)]
pub enum Reply {
    Text(String),
    /// Send a ping, then answer with the text.
    PingThenText(String),
    /// Answer with the text, then drop the socket without a close frame
    /// once `after_audio` audio messages have arrived.
    DropAfter { ack: String, after_audio: usize },
    /// Never answer.
    Silent,
    /// Close the connection instead of answering.
    Close,
}

#[derive(Debug, Default)]
pub struct Recorded {
    pub connections: usize,
    pub auth_headers: Vec<Option<String>>,
    pub messages: Vec<Value>,
    pub close_frames: usize,
}

impl Recorded {
    pub fn actions(&self, action: &str) -> Vec<&Value> {
        self.messages
            .iter()
            .filter(|m| m["action"] == action)
            .collect()
    }
}

pub struct MockEndpoint {
    pub url: String,
    pub recorded: Arc<Mutex<Recorded>>,
    finished: mpsc::UnboundedReceiver<()>,
}

impl MockEndpoint {
    pub async fn spawn(reply: Reply) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let recorded = Arc::new(Mutex::new(Recorded::default()));
        let (done_tx, done_rx) = mpsc::unbounded_channel();

        let state = recorded.clone();
        tokio::spawn(async move {
            while let Ok((tcp, _)) = listener.accept().await {
                let state = state.clone();
                let reply = reply.clone();
                let done_tx = done_tx.clone();
                tokio::spawn(async move {
                    handle_connection(tcp, state, reply).await;
                    let _ = done_tx.send(());
                });
            }
        });

        Self {
            url: format!("ws://{}", addr),
            recorded,
            finished: done_rx,
        }
    }

    /// Waits until one connection has been fully torn down on the server side.
    pub async fn wait_for_disconnect(&mut self) {
        tokio::time::timeout(Duration::from_secs(5), self.finished.recv())
            .await
            .expect("connection was not torn down in time")
            .expect("endpoint task ended");
    }
}

async fn handle_connection(tcp: tokio::net::TcpStream, state: Arc<Mutex<Recorded>>, reply: Reply) {
    state.lock().unwrap().connections += 1;

    let header_state = state.clone();
    let callback = move |req: &Request, resp: Response| -> Result<Response, ErrorResponse> {
        let auth = req
            .headers()
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        header_state.lock().unwrap().auth_headers.push(auth);
        Ok(resp)
    };

    let mut ws = match accept_hdr_async(tcp, callback).await {
        Ok(ws) => ws,
        Err(_) => return,
    };

    // The first message is the join request.
    match ws.next().await {
        Some(Ok(Message::Text(text))) => record(&state, text.as_str()),
        _ => return,
    }

    let mut drop_after = None;
    match reply {
        Reply::Text(body) => {
            if ws.send(Message::text(body)).await.is_err() {
                return;
            }
        }
        Reply::PingThenText(body) => {
            if ws.send(Message::Ping(vec![1, 2, 3].into())).await.is_err() {
                return;
            }
            if ws.send(Message::text(body)).await.is_err() {
                return;
            }
        }
        Reply::DropAfter { ack, after_audio } => {
            if ws.send(Message::text(ack)).await.is_err() {
                return;
            }
            drop_after = Some(after_audio);
        }
        Reply::Silent => {}
        Reply::Close => {
            let _ = ws.close(None).await;
        }
    }

    let mut audio_seen = 0;
    while let Some(msg) = ws.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                record(&state, text.as_str());
                audio_seen += 1;
                if drop_after == Some(audio_seen) {
                    return;
                }
            }
            Ok(Message::Close(_)) => {
                state.lock().unwrap().close_frames += 1;
                break;
            }
            Ok(_) => {}
            Err(_) => break,
        }
    }
}

fn record(state: &Arc<Mutex<Recorded>>, text: &str) {
    let value: Value = serde_json::from_str(text).unwrap_or(Value::String(text.to_string()));
    state.lock().unwrap().messages.push(value);
}
