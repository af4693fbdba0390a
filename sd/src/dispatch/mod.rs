//! Session dispatch
//!
//! A router task owns the session registry and forwards each event to a
//! per-session worker task. Workers own their [`Session`](crate::session::Session)
//! outright, so same-key events are applied strictly in arrival order while
//! different keys run fully in parallel.

mod messages;
mod router;
mod worker;

pub use messages::{DispatchCommand, DispatchError, DispatchResponse, WorkerMessage};
pub use router::Dispatcher;

/// Default capacity of the router's command queue
pub const DEFAULT_CHANNEL_BUFFER: usize = 256;
