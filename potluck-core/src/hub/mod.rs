//! Connection Registry.
//!
//! The set of live clients is owned by a single [`HubActor`] task. Every
//! other component talks to it through a cloneable [`Hub`] handle which only
//! sends messages, so the client map itself is never shared or locked.
//!
//! Each client gets a bounded outbound queue drained by its own writer task
//! (see [`session`]). A broadcast that finds a client's queue full drops that
//! client instead of waiting for it.

pub mod session;

pub use session::{ClientHandle, ClientSink, ClientState, SinkError};

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use bytes::Bytes;
use potluck_sdk::objects::Notification;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info, warn};

pub type ClientId = u64;

/// Default number of payloads buffered per client before it is dropped.
pub const DEFAULT_CLIENT_QUEUE_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HubConfig {
    pub client_queue_capacity: usize,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            client_queue_capacity: DEFAULT_CLIENT_QUEUE_CAPACITY,
        }
    }
}

enum HubCommand {
    Register { id: ClientId, entry: ClientEntry },
    Unregister { id: ClientId },
    Broadcast { payload: Bytes },
    ClientCount { reply: oneshot::Sender<usize> },
}

/// The actor's side of a client. Dropping it closes the queue and wakes the
/// writer through `_evict`.
struct ClientEntry {
    queue: mpsc::Sender<Bytes>,
    _evict: oneshot::Sender<()>,
}

/// Cloneable handle to the registry.
#[derive(Clone)]
pub struct Hub {
    commands: mpsc::UnboundedSender<HubCommand>,
    next_id: Arc<AtomicU64>,
    config: HubConfig,
}

impl Hub {
    /// Create a hub handle and the actor that backs it. The actor does
    /// nothing until [`HubActor::run`] is spawned.
    pub fn new(config: HubConfig) -> (Hub, HubActor) {
        let (tx, rx) = mpsc::unbounded_channel();
        let hub = Hub {
            commands: tx,
            next_id: Arc::new(AtomicU64::new(1)),
            config: HubConfig {
                client_queue_capacity: config.client_queue_capacity.max(1),
            },
        };
        let actor = HubActor {
            commands: rx,
            clients: HashMap::new(),
        };
        (hub, actor)
    }

    /// Admit a connection. Spawns its writer task and returns the handle the
    /// connection's reader uses to leave.
    pub fn register<S: ClientSink>(&self, sink: S) -> ClientHandle {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut state = ClientState::Connecting;

        let (queue_tx, queue_rx) = mpsc::channel(self.config.client_queue_capacity);
        let (evict_tx, evict_rx) = oneshot::channel();
        let (done_tx, done_rx) = watch::channel(false);

        let entry = ClientEntry {
            queue: queue_tx,
            _evict: evict_tx,
        };
        // If the actor is gone the entry is dropped here and the writer
        // closes the sink straight away.
        match self.commands.send(HubCommand::Register { id, entry }) {
            Ok(()) => state.transition(id, ClientState::Registered),
            Err(_) => warn!(client_id = id, "Hub is not running, client will be closed"),
        }

        tokio::spawn(session::run_writer(
            id,
            state,
            sink,
            queue_rx,
            evict_rx,
            self.clone(),
            done_tx,
        ));

        ClientHandle::new(id, self.clone(), done_rx)
    }

    /// Remove a client. Unknown or already removed ids are ignored.
    pub fn unregister(&self, id: ClientId) {
        let _ = self.commands.send(HubCommand::Unregister { id });
    }

    /// Queue `payload` for every registered client and return immediately.
    pub fn broadcast(&self, payload: impl Into<Bytes>) {
        let payload = payload.into();
        if self
            .commands
            .send(HubCommand::Broadcast { payload })
            .is_err()
        {
            debug!("Hub is not running, broadcast dropped");
        }
    }

    /// Encode `notification` and broadcast it.
    pub fn notify(&self, notification: &Notification) -> Result<(), serde_json::Error> {
        let text = notification.encode()?;
        debug!(kind = notification.kind(), "Broadcasting notification");
        self.broadcast(text);
        Ok(())
    }

    /// Number of clients currently registered. Returns 0 once the actor has
    /// stopped.
    pub async fn client_count(&self) -> usize {
        let (reply, rx) = oneshot::channel();
        if self.commands.send(HubCommand::ClientCount { reply }).is_err() {
            return 0;
        }
        rx.await.unwrap_or(0)
    }
}

/// Task owning the live client set.
pub struct HubActor {
    commands: mpsc::UnboundedReceiver<HubCommand>,
    clients: HashMap<ClientId, ClientEntry>,
}

impl HubActor {
    /// Process commands until the shutdown signal fires. Every remaining
    /// client is closed on the way out.
    pub async fn run(mut self, mut shutdown_rx: watch::Receiver<bool>) {
        info!("Hub started");

        loop {
            tokio::select! {
                biased;

                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        info!("Hub received shutdown signal");
                        break;
                    }
                }

                Some(command) = self.commands.recv() => self.handle(command),

                else => break,
            }
        }

        let remaining = self.clients.len();
        self.clients.clear();
        info!(clients = remaining, "Hub shutdown complete");
    }

    fn handle(&mut self, command: HubCommand) {
        match command {
            HubCommand::Register { id, entry } => {
                self.clients.insert(id, entry);
                debug!(client_id = id, clients = self.clients.len(), "Client registered");
            }
            HubCommand::Unregister { id } => {
                if self.clients.remove(&id).is_some() {
                    debug!(client_id = id, clients = self.clients.len(), "Client unregistered");
                }
            }
            HubCommand::Broadcast { payload } => self.broadcast(payload),
            HubCommand::ClientCount { reply } => {
                let _ = reply.send(self.clients.len());
            }
        }
    }

    fn broadcast(&mut self, payload: Bytes) {
        self.clients
            .retain(|id, entry| match entry.queue.try_send(payload.clone()) {
                Ok(()) => true,
                Err(TrySendError::Full(_)) => {
                    warn!(client_id = id, "Client queue is full, dropping client");
                    false
                }
                Err(TrySendError::Closed(_)) => {
                    debug!(client_id = id, "Client queue closed, removing client");
                    false
                }
            });
    }
}
