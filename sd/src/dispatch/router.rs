//! Dispatcher - actor that owns the session registry

use std::collections::HashMap;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::events::{InboundEvent, SessionKey};
use crate::session::{DialogContext, SessionSnapshot};

use super::DEFAULT_CHANNEL_BUFFER;
use super::messages::{DispatchCommand, DispatchError, DispatchResponse, WorkerMessage};
use super::worker::{SessionWorker, WorkerHandle};

/// Handle to send commands to the router
#[derive(Clone)]
pub struct Dispatcher {
    tx: mpsc::Sender<DispatchCommand>,
}

impl Dispatcher {
    /// Spawn the router with the default queue size
    pub fn spawn(ctx: DialogContext) -> Self {
        Self::with_buffer(ctx, DEFAULT_CHANNEL_BUFFER)
    }

    /// Spawn the router with a command queue of `buffer` entries
    pub fn with_buffer(ctx: DialogContext, buffer: usize) -> Self {
        debug!(buffer, corpus_ready = ctx.corpus.is_ready(), "with_buffer: called");
        let (tx, rx) = mpsc::channel(buffer.max(1));
        tokio::spawn(router_loop(ctx, rx));
        info!("Dispatcher spawned");
        Self { tx }
    }

    /// Queue an event for its session
    ///
    /// Returns once the event is queued, not once it is applied.
    pub async fn submit(&self, event: InboundEvent) -> DispatchResponse<()> {
        debug!(key = %event.session_key, event = event.kind.name(), "submit: called");
        self.tx
            .send(DispatchCommand::Submit(event))
            .await
            .map_err(|_| DispatchError::ChannelError)
    }

    /// Current state of one session, after everything queued for it so far
    ///
    /// `None` when the key has never been seen.
    pub async fn snapshot(&self, key: &SessionKey) -> DispatchResponse<Option<SessionSnapshot>> {
        debug!(%key, "snapshot: called");
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(DispatchCommand::Snapshot {
                key: key.clone(),
                reply: reply_tx,
            })
            .await
            .map_err(|_| DispatchError::ChannelError)?;
        reply_rx.await.map_err(|_| DispatchError::ChannelError)
    }

    /// Number of live sessions
    pub async fn session_count(&self) -> DispatchResponse<usize> {
        debug!("session_count: called");
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(DispatchCommand::SessionCount { reply: reply_tx })
            .await
            .map_err(|_| DispatchError::ChannelError)?;
        reply_rx.await.map_err(|_| DispatchError::ChannelError)
    }

    /// Stop the router and wait for all queued events to be applied
    pub async fn shutdown(&self) -> DispatchResponse<()> {
        debug!("shutdown: called");
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(DispatchCommand::Shutdown { reply: reply_tx })
            .await
            .map_err(|_| DispatchError::ChannelError)?;
        reply_rx.await.map_err(|_| DispatchError::ChannelError)
    }
}

async fn router_loop(ctx: DialogContext, mut rx: mpsc::Receiver<DispatchCommand>) {
    debug!("router_loop: called");
    let mut workers: HashMap<SessionKey, WorkerHandle> = HashMap::new();

    while let Some(cmd) = rx.recv().await {
        match cmd {
            DispatchCommand::Submit(InboundEvent { session_key, kind }) => {
                debug!(key = %session_key, event = kind.name(), "router_loop: Submit command");
                route(&mut workers, &ctx, session_key, WorkerMessage::Event(kind));
            }

            DispatchCommand::Snapshot { key, reply } => {
                debug!(%key, "router_loop: Snapshot command");
                match workers.get(&key) {
                    Some(handle) => {
                        if let Err(mpsc::error::SendError(WorkerMessage::Snapshot(reply))) =
                            handle.tx.send(WorkerMessage::Snapshot(reply))
                        {
                            warn!(%key, "Worker gone before snapshot");
                            let _ = reply.send(None);
                        }
                    }
                    None => {
                        let _ = reply.send(None);
                    }
                }
            }

            DispatchCommand::SessionCount { reply } => {
                debug!(count = workers.len(), "router_loop: SessionCount command");
                let _ = reply.send(workers.len());
            }

            DispatchCommand::Shutdown { reply } => {
                info!(sessions = workers.len(), "Dispatcher shutting down");
                drain(&mut workers).await;
                let _ = reply.send(());
                return;
            }
        }
    }

    // Every handle dropped without an explicit shutdown
    drain(&mut workers).await;
    debug!("router_loop: exiting");
}

/// Hand `msg` to the worker for `key`, starting one if needed
///
/// A worker that died (panicked) is replaced with a fresh session rather than
/// losing the message.
fn route(workers: &mut HashMap<SessionKey, WorkerHandle>, ctx: &DialogContext, key: SessionKey, msg: WorkerMessage) {
    let msg = match workers.get(&key) {
        Some(handle) => match handle.tx.send(msg) {
            Ok(()) => return,
            Err(mpsc::error::SendError(msg)) => {
                warn!(%key, "Session worker gone, starting a new one");
                msg
            }
        },
        None => msg,
    };

    let handle = SessionWorker::spawn(key.clone(), ctx.clone());
    if handle.tx.send(msg).is_err() {
        warn!(%key, "New session worker rejected its first message");
    }
    info!(%key, sessions = workers.len() + 1, "Session created");
    workers.insert(key, handle);
}

/// Close every worker queue and wait for the workers to finish
async fn drain(workers: &mut HashMap<SessionKey, WorkerHandle>) {
    let tasks: Vec<_> = workers.drain().map(|(_, handle)| handle.task).collect();
    for task in tasks {
        if let Err(e) = task.await {
            warn!(error = %e, "Session worker ended abnormally");
        }
    }
}
