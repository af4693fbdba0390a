//! Dispatcher messages
//!
//! Commands for the router actor and the per-session workers it feeds.

use thiserror::Error;
use tokio::sync::oneshot;

use crate::events::{EventKind, InboundEvent, SessionKey};
use crate::session::SessionSnapshot;

/// Errors from dispatcher operations
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Channel error")]
    ChannelError,
}

/// Response from dispatcher operations
pub type DispatchResponse<T> = Result<T, DispatchError>;

/// Commands sent to the router
#[derive(Debug)]
pub enum DispatchCommand {
    /// Route an event to its session, creating the session on first contact
    Submit(InboundEvent),
    /// Answered once every event already queued for `key` has been applied
    Snapshot {
        key: SessionKey,
        reply: oneshot::Sender<Option<SessionSnapshot>>,
    },
    SessionCount {
        reply: oneshot::Sender<usize>,
    },
    /// Stop accepting work and wait for every worker to drain
    Shutdown {
        reply: oneshot::Sender<()>,
    },
}

/// Messages sent from the router to one session worker
#[derive(Debug)]
pub enum WorkerMessage {
    Event(EventKind),
    Snapshot(oneshot::Sender<Option<SessionSnapshot>>),
}
