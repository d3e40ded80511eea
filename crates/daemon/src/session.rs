// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The platform connection.
//!
//! One WebSocket at a time. Each text frame is a job request and runs on its
//! own task; report frames from every job funnel through one session-wide
//! queue that the connection loop drains, so frames queued while the
//! connection is down go out after the next connect.

use std::sync::Arc;
use std::time::Duration;

use ag_adapters::{ChannelReporter, GitAdapter, Reporter, TokenExchange};
use ag_core::{Clock, JobRequest};
use ag_engine::Dispatcher;
use ag_wire::{decode_request, encode_outbound, request_address, Outbound, ProtocolError};
use futures_util::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::AUTHORIZATION;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;

/// Report frames buffered before job tasks start waiting on the socket.
const OUTBOUND_CAPACITY: usize = 1024;

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
    #[error("token is not a valid header value")]
    InvalidToken,
}

#[derive(Clone)]
pub struct SessionConfig {
    pub url: String,
    pub token: Option<String>,
    pub reconnect_delay: Duration,
}

/// How a connection ended.
#[derive(Debug, PartialEq, Eq)]
enum Ended {
    Disconnected,
    Shutdown,
}

pub struct Session<T, G, C: Clock> {
    config: SessionConfig,
    dispatcher: Arc<Dispatcher<T, G, C>>,
    tx: mpsc::Sender<Outbound>,
    rx: mpsc::Receiver<Outbound>,
}

impl<T, G, C> Session<T, G, C>
where
    T: TokenExchange,
    G: GitAdapter,
    C: Clock,
{
    pub fn new(config: SessionConfig, dispatcher: Arc<Dispatcher<T, G, C>>) -> Self {
        let (tx, rx) = mpsc::channel(OUTBOUND_CAPACITY);
        Self { config, dispatcher, tx, rx }
    }

    /// Connect, serve, and reconnect until `cancel` fires.
    pub async fn run(mut self, cancel: CancellationToken) {
        loop {
            match connect(&self.config).await {
                Ok(socket) => {
                    tracing::info!(url = %self.config.url, "connected to platform");
                    if self.serve(socket, &cancel).await == Ended::Shutdown {
                        break;
                    }
                    tracing::warn!(url = %self.config.url, "platform connection lost");
                }
                Err(e) => tracing::warn!(url = %self.config.url, error = %e, "connect failed"),
            }

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.config.reconnect_delay) => {}
            }
        }
        tracing::info!("session stopped");
    }

    async fn serve(&mut self, socket: Socket, cancel: &CancellationToken) -> Ended {
        let (mut sink, mut stream) = socket.split();

        let ended = loop {
            tokio::select! {
                _ = cancel.cancelled() => break Ended::Shutdown,
                Some(frame) = self.rx.recv() => {
                    let text = match encode_outbound(&frame) {
                        Ok(text) => text,
                        Err(e) => {
                            tracing::error!(topic = %frame.topic, error = %e, "dropping unencodable report");
                            continue;
                        }
                    };
                    if let Err(e) = sink.send(Message::text(text)).await {
                        tracing::warn!(topic = %frame.topic, error = %e, "report lost: send failed");
                        break Ended::Disconnected;
                    }
                }
                msg = stream.next() => match msg {
                    Some(Ok(Message::Text(text))) => self.handle_frame(text.as_str()),
                    Some(Ok(Message::Close(frame))) => {
                        tracing::info!(?frame, "platform closed the connection");
                        break Ended::Disconnected;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::warn!(error = %e, "websocket read failed");
                        break Ended::Disconnected;
                    }
                    None => break Ended::Disconnected,
                },
            }
        };

        if ended == Ended::Shutdown {
            let _ = sink.close().await;
        }
        ended
    }

    /// Decode one inbound frame and start its job.
    ///
    /// A request that names its topic but fails to decode is answered with
    /// one exception. Frames without a topic have nothing to answer and are
    /// dropped.
    fn handle_frame(&self, text: &str) {
        let job = match decode_request(text) {
            Ok(job) => job,
            Err(e) => {
                self.reject_frame(text, e);
                return;
            }
        };

        let reporter = ChannelReporter::new(self.tx.clone(), job.topic.clone(), job.request_ref());
        let dispatcher = Arc::clone(&self.dispatcher);
        tokio::spawn(async move { run_job(&dispatcher, &job, &reporter).await });
    }

    fn reject_frame(&self, text: &str, error: ProtocolError) {
        let Some((topic, req)) = request_address(text) else {
            tracing::warn!(error = %error, len = text.len(), "dropping undecodable frame");
            return;
        };
        tracing::warn!(%topic, execution = ?req.execution, error = %error, "job rejected: malformed request");
        let reporter = ChannelReporter::new(self.tx.clone(), topic, req);
        let message = error.to_string();
        tokio::spawn(async move { reporter.exception(message).await });
    }
}

/// Dispatch `job`, answering a rejected request with one exception.
pub async fn run_job<T, G, C, R>(dispatcher: &Dispatcher<T, G, C>, job: &JobRequest, reporter: &R)
where
    T: TokenExchange,
    G: GitAdapter,
    C: Clock,
    R: Reporter,
{
    tracing::info!(topic = %job.topic, execution = ?job.execution, "job received");
    match dispatcher.dispatch(job, reporter).await {
        Ok(done) => tracing::debug!(topic = %job.topic, execution = ?job.execution, ?done, "job done"),
        Err(e) => {
            tracing::warn!(topic = %job.topic, execution = ?job.execution, error = %e, "job rejected");
            reporter.exception(e.to_string()).await;
        }
    }
}

async fn connect(config: &SessionConfig) -> Result<Socket, SessionError> {
    let mut request = config.url.as_str().into_client_request()?;
    if let Some(token) = &config.token {
        let value = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| SessionError::InvalidToken)?;
        request.headers_mut().insert(AUTHORIZATION, value);
    }
    let (socket, _response) = tokio_tungstenite::connect_async(request).await?;
    Ok(socket)
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
