//! Event stream client
//!
//! Opens one server-sent-event connection per query and pushes typed
//! [`StreamUpdate`]s onto a channel. The connection is owned by a spawned
//! task; dropping the returned [`AnalysisStream`] cancels it.

use super::events::AnalysisEvent;
use super::sse::{SseDecoder, SseFrame};
use crate::config::AppConfig;
use futures::{Stream, StreamExt};
use reqwest::header::ACCEPT;
use std::fmt::Display;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// How a stream ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Closure {
    /// The terminal status was seen before the connection went away
    Normal,
    /// The connection failed or ended early
    Abnormal(String),
}

/// Message sent from the stream task to the consumer
#[derive(Debug, Clone, PartialEq)]
pub enum StreamUpdate {
    Event(AnalysisEvent),
    /// A data payload that is not a valid event; the stream stays open
    DecodeError(String),
    /// Sent exactly once, last
    Closed(Closure),
}

#[derive(Error, Debug)]
pub enum StreamError {
    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Parameters of one analysis request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamRequest {
    pub message: String,
    pub user_id: String,
    pub session_id: String,
}

impl StreamRequest {
    /// New request with a fresh session id
    pub fn new(message: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            user_id: user_id.into(),
            session_id: Uuid::new_v4().simple().to_string(),
        }
    }

    fn query_pairs(&self) -> [(&'static str, &str); 3] {
        [
            ("message", self.message.as_str()),
            ("user_id", self.user_id.as_str()),
            ("session_id", self.session_id.as_str()),
        ]
    }
}

/// HTTP client for the analysis endpoint
#[derive(Debug, Clone)]
pub struct AnalysisClient {
    http: reqwest::Client,
    endpoint: String,
    bearer_token: Option<String>,
    idle_timeout: Option<Duration>,
    channel_capacity: usize,
}

impl AnalysisClient {
    pub fn new(config: &AppConfig) -> Result<Self, StreamError> {
        // No overall timeout: the body is a long-lived stream
        let http = reqwest::Client::builder()
            .user_agent(format!("aurora/{}", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            endpoint: config.analyze_url(),
            bearer_token: None,
            idle_timeout: config.idle_timeout_secs.map(Duration::from_secs),
            // tokio rejects a zero-capacity channel
            channel_capacity: config.channel_capacity.max(1),
        })
    }

    /// Attach an existing credential to every stream request
    pub fn with_bearer_token(mut self, token: Option<String>) -> Self {
        self.bearer_token = token;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Open the stream for `request`. Must be called inside a tokio runtime.
    pub fn open(&self, request: StreamRequest) -> AnalysisStream {
        let (tx, rx) = mpsc::channel(self.channel_capacity);
        let cancel = CancellationToken::new();
        let session_id = request.session_id.clone();

        let mut builder = self
            .http
            .get(&self.endpoint)
            .query(&request.query_pairs())
            .header(ACCEPT, "text/event-stream");
        if let Some(token) = &self.bearer_token {
            builder = builder.bearer_auth(token);
        }

        let idle_timeout = self.idle_timeout;
        let task_cancel = cancel.clone();
        info!(session_id = %request.session_id, endpoint = %self.endpoint, "Opening analysis stream");

        tokio::spawn(async move {
            let response = tokio::select! {
                _ = task_cancel.cancelled() => return,
                response = builder.send() => response,
            };

            let closure = match response {
                Ok(response) if response.status().is_success() => {
                    match pump(response.bytes_stream(), &tx, &task_cancel, idle_timeout).await {
                        Some(closure) => closure,
                        None => return,
                    }
                }
                Ok(response) => Closure::Abnormal(format!("HTTP {}", response.status())),
                Err(e) => Closure::Abnormal(e.to_string()),
            };

            let _ = tx.send(StreamUpdate::Closed(closure)).await;
        });

        AnalysisStream {
            rx,
            cancel,
            session_id,
        }
    }
}

/// Receiving end of one open analysis stream
#[derive(Debug)]
pub struct AnalysisStream {
    rx: mpsc::Receiver<StreamUpdate>,
    cancel: CancellationToken,
    session_id: String,
}

impl AnalysisStream {
    /// Build a stream fed by an arbitrary channel
    pub fn from_channel(rx: mpsc::Receiver<StreamUpdate>) -> (Self, CancellationToken) {
        let cancel = CancellationToken::new();
        let stream = Self {
            rx,
            cancel: cancel.clone(),
            session_id: Uuid::new_v4().simple().to_string(),
        };
        (stream, cancel)
    }

    pub async fn next(&mut self) -> Option<StreamUpdate> {
        self.rx.recv().await
    }

    /// Non-blocking receive; `Err(true)` means the sender is gone
    pub fn try_next(&mut self) -> Result<StreamUpdate, bool> {
        match self.rx.try_recv() {
            Ok(update) => Ok(update),
            Err(mpsc::error::TryRecvError::Empty) => Err(false),
            Err(mpsc::error::TryRecvError::Disconnected) => Err(true),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Close the connection; no further updates are produced
    pub fn close(&self) {
        self.cancel.cancel();
    }
}

impl Drop for AnalysisStream {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Drive an SSE body until it ends, is cancelled, or reaches the terminal
/// status. Returns `None` when cancelled or when the consumer is gone,
/// otherwise the closure to report.
pub(crate) async fn pump<S, B, E>(
    body: S,
    tx: &mpsc::Sender<StreamUpdate>,
    cancel: &CancellationToken,
    idle_timeout: Option<Duration>,
) -> Option<Closure>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: Display,
{
    let mut body = std::pin::pin!(body);
    let mut decoder = SseDecoder::new();

    loop {
        let next = async {
            match idle_timeout {
                Some(limit) => tokio::time::timeout(limit, body.next()).await.ok(),
                None => Some(body.next().await),
            }
        };

        let next = tokio::select! {
            _ = cancel.cancelled() => {
                debug!("Analysis stream cancelled");
                return None;
            }
            next = next => next,
        };

        match next {
            Some(Some(Ok(chunk))) => {
                for frame in decoder.feed(chunk.as_ref()) {
                    match dispatch(frame, tx).await {
                        Dispatch::Continue => {}
                        // We close the connection ourselves once the analysis is done
                        Dispatch::Terminal => return Some(Closure::Normal),
                        Dispatch::ConsumerGone => return None,
                    }
                }
            }
            Some(Some(Err(e))) => {
                warn!(error = %e, "Analysis stream transport error");
                return Some(Closure::Abnormal(e.to_string()));
            }
            Some(None) => {
                if decoder.finish() {
                    debug!("Dropping incomplete trailing SSE frame");
                }
                return Some(Closure::Abnormal(
                    "stream ended before analysis completed".to_string(),
                ));
            }
            None => {
                warn!(?idle_timeout, "Analysis stream idle timeout");
                return Some(Closure::Abnormal("idle timeout".to_string()));
            }
        }
    }
}

enum Dispatch {
    Continue,
    Terminal,
    ConsumerGone,
}

async fn dispatch(frame: SseFrame, tx: &mpsc::Sender<StreamUpdate>) -> Dispatch {
    // Only unnamed (`message`) events carry analysis payloads
    if frame.event.as_deref().is_some_and(|name| name != "message") {
        debug!(event = ?frame.event, "Skipping named SSE event");
        return Dispatch::Continue;
    }

    let update = match AnalysisEvent::decode(&frame.data) {
        Ok(event) => {
            debug!(kind = event.kind(), "Analysis event");
            event
        }
        Err(e) => {
            return match tx.send(StreamUpdate::DecodeError(e.to_string())).await {
                Ok(()) => Dispatch::Continue,
                Err(_) => Dispatch::ConsumerGone,
            };
        }
    };

    let terminal = update.is_terminal();
    if tx.send(StreamUpdate::Event(update)).await.is_err() {
        return Dispatch::ConsumerGone;
    }

    if terminal {
        Dispatch::Terminal
    } else {
        Dispatch::Continue
    }
}
