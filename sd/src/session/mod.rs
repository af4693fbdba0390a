//! Per-user dialog state machine
//!
//! A [`Session`] walks one user through mode selection, parameter collection
//! and limit collection. [`Session::handle`] is synchronous and pure with
//! respect to the outside world: it mutates only the session and returns a
//! [`Step`] describing what the caller should send or run.

mod error;
mod limit;
mod machine;
mod state;
pub mod text;

use std::sync::Arc;
use std::time::Duration;

use corpusstore::{Corpus, SiteSet};

use crate::assembler::AssemblyOptions;
use crate::transport::Messenger;

pub use error::SessionError;
pub use limit::{LimitInputError, parse_limit};
pub use machine::{Execution, Step};
pub use state::{Mode, ParameterKind, Session, SessionSnapshot, Stage, StageKind};

/// Runtime settings shared by every session
#[derive(Debug, Clone, Default)]
pub struct DialogSettings {
    /// Upper bound on one search; `None` waits forever
    pub search_timeout: Option<Duration>,
    pub assembly: AssemblyOptions,
}

/// Everything a session needs from the process: the corpus, the compiled
/// site list, the outbound transport and settings
#[derive(Clone)]
pub struct DialogContext {
    pub corpus: Arc<Corpus>,
    /// `None` when no sites are configured
    pub sites: Option<Arc<SiteSet>>,
    pub messenger: Arc<dyn Messenger>,
    pub settings: DialogSettings,
}

impl DialogContext {
    pub fn new(corpus: Arc<Corpus>, sites: Option<Arc<SiteSet>>, messenger: Arc<dyn Messenger>) -> Self {
        Self {
            corpus,
            sites,
            messenger,
            settings: DialogSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: DialogSettings) -> Self {
        self.settings = settings;
        self
    }
}
