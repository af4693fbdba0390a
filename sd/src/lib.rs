//! siftdaemon - guided search dialogs over a static line corpus
//!
//! Many users talk to the daemon at once. Each one is walked through a short
//! dialog (pick a mode, give a site name or search term, give a result limit)
//! and gets the matching corpus lines back as a text file.
//!
//! # Core Concepts
//!
//! - **One task per session**: events for a key are applied in arrival order,
//!   different keys never block each other
//! - **Pure transitions**: [`session::Session::handle`] only mutates the
//!   session and says what to send or run
//! - **Transport agnostic**: everything outbound goes through
//!   [`transport::Messenger`]
//! - **Bounded searches**: scans run on the blocking pool with a timeout and
//!   cooperative cancellation
//!
//! # Modules
//!
//! - [`events`] - Inbound events and outbound directives
//! - [`session`] - Per-user dialog state machine
//! - [`assembler`] - Result files and summaries
//! - [`dispatch`] - Session registry and per-session workers
//! - [`transport`] - JSON-lines, console and in-memory messengers
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface

pub mod assembler;
pub mod cli;
pub mod config;
pub mod dispatch;
pub mod events;
pub mod session;
pub mod transport;

pub use assembler::{Artifact, Assembly, AssemblyOptions, ResultLabel, assemble};
pub use config::Config;
pub use dispatch::{DispatchError, Dispatcher};
pub use events::{Choice, Directive, EventKind, InboundEvent, OutboundDirective, PromptRef, SessionKey};
pub use session::{DialogContext, DialogSettings, Session, SessionError, Step};
pub use transport::{DeliveryError, Messenger};
