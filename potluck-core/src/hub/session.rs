//! Client sessions.
//!
//! A session has two halves. The writer half lives here: it drains the
//! client's bounded queue into a [`ClientSink`] until the hub evicts the
//! client or a write fails. The reader half belongs to the transport; it
//! holds a [`ClientHandle`] and calls [`ClientHandle::unregister`] when the
//! connection goes away.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, warn};

use super::{ClientId, Hub};

/// Upper bound on a graceful close of the transport.
const CLOSE_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Error)]
#[error("client write failed: {0}")]
pub struct SinkError(#[source] Box<dyn std::error::Error + Send + Sync>);

impl SinkError {
    pub fn new(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self(err.into())
    }
}

/// Outbound half of a client transport.
#[async_trait]
pub trait ClientSink: Send + 'static {
    async fn send(&mut self, payload: Bytes) -> Result<(), SinkError>;

    /// Best-effort graceful close.
    async fn close(&mut self) {}
}

/// In-process sink, used by tests and local subscribers.
#[async_trait]
impl ClientSink for mpsc::Sender<Bytes> {
    async fn send(&mut self, payload: Bytes) -> Result<(), SinkError> {
        mpsc::Sender::send(self, payload)
            .await
            .map_err(SinkError::new)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientState {
    Connecting,
    Registered,
    Active,
    Closing,
    Closed,
}

impl ClientState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClientState::Connecting => "connecting",
            ClientState::Registered => "registered",
            ClientState::Active => "active",
            ClientState::Closing => "closing",
            ClientState::Closed => "closed",
        }
    }

    pub(super) fn transition(&mut self, id: ClientId, next: ClientState) {
        debug!(client_id = id, from = %self, to = %next, "Client state changed");
        *self = next;
    }
}

impl fmt::Display for ClientState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CloseReason {
    Evicted,
    WriteFailed,
}

/// Writer half of a session. A client the hub never admitted skips
/// `Active` and goes straight to closing.
pub(super) async fn run_writer<S: ClientSink>(
    id: ClientId,
    mut state: ClientState,
    mut sink: S,
    mut queue: mpsc::Receiver<Bytes>,
    mut evicted: oneshot::Receiver<()>,
    hub: Hub,
    done: watch::Sender<bool>,
) {
    if state == ClientState::Registered {
        state.transition(id, ClientState::Active);
    }

    let reason = loop {
        let payload = tokio::select! {
            biased;
            _ = &mut evicted => break CloseReason::Evicted,
            next = queue.recv() => match next {
                Some(payload) => payload,
                None => break CloseReason::Evicted,
            },
        };

        tokio::select! {
            biased;
            _ = &mut evicted => break CloseReason::Evicted,
            res = sink.send(payload) => {
                if let Err(e) = res {
                    warn!(client_id = id, error = %e, "Write to client failed");
                    break CloseReason::WriteFailed;
                }
            }
        }
    };

    state.transition(id, ClientState::Closing);
    if reason == CloseReason::WriteFailed {
        hub.unregister(id);
    }
    if tokio::time::timeout(CLOSE_TIMEOUT, sink.close())
        .await
        .is_err()
    {
        debug!(client_id = id, "Client did not close in time");
    }
    drop(sink);
    state.transition(id, ClientState::Closed);
    let _ = done.send(true);
}

/// Reader-side handle of a registered client.
pub struct ClientHandle {
    id: ClientId,
    hub: Hub,
    done: watch::Receiver<bool>,
}

impl ClientHandle {
    pub(super) fn new(id: ClientId, hub: Hub, done: watch::Receiver<bool>) -> Self {
        Self { id, hub, done }
    }

    pub fn id(&self) -> ClientId {
        self.id
    }

    /// Leave the registry. Safe to call more than once.
    pub fn unregister(&self) {
        self.hub.unregister(self.id);
    }

    /// Resolves once the writer has stopped and the sink is closed, whether
    /// the client left on its own or was dropped by the hub.
    pub async fn closed(&mut self) {
        let _ = self.done.wait_for(|closed| *closed).await;
    }
}
