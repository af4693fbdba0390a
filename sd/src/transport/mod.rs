//! Outbound delivery
//!
//! The dialog core talks to the outside world only through [`Messenger`].
//! Three implementations ship with the daemon:
//!
//! - [`JsonLinesMessenger`] - one JSON directive per line, for piping into a
//!   chat bridge
//! - [`ConsoleMessenger`] - human-readable terminal output for local use
//! - [`MemoryMessenger`] - in-process capture, for embedding and tests

mod console;
mod jsonl;
mod memory;
mod messenger;

pub use console::{ConsoleInput, ConsoleMessenger, parse_console_line, render, run_console};
pub use jsonl::{JsonLinesMessenger, serve};
pub use memory::MemoryMessenger;
pub use messenger::{DeliveryError, Messenger};
