//! Per-session worker task

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use corpusstore::{SearchRequest, SearchResult};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::assembler::{Assembly, assemble};
use crate::events::{Directive, EventKind, SessionKey};
use crate::session::{DialogContext, Execution, Session, SessionError, Step, text};
use crate::transport::DeliveryError;

use super::messages::WorkerMessage;

/// Router-side handle to a running worker
pub(super) struct WorkerHandle {
    pub tx: mpsc::UnboundedSender<WorkerMessage>,
    pub task: JoinHandle<()>,
}

/// Owns one session and applies its events one at a time
pub(super) struct SessionWorker {
    session: Session,
    ctx: DialogContext,
    rx: mpsc::UnboundedReceiver<WorkerMessage>,
}

impl SessionWorker {
    /// Start a worker for `key`
    ///
    /// The queue is unbounded so a session busy with a long search never
    /// stalls the router for everyone else.
    pub fn spawn(key: SessionKey, ctx: DialogContext) -> WorkerHandle {
        debug!(%key, "SessionWorker::spawn: called");
        let (tx, rx) = mpsc::unbounded_channel();
        let worker = Self {
            session: Session::new(key),
            ctx,
            rx,
        };
        let task = tokio::spawn(worker.run());
        WorkerHandle { tx, task }
    }

    async fn run(mut self) {
        while let Some(msg) = self.rx.recv().await {
            match msg {
                WorkerMessage::Event(event) => self.apply(event).await,
                WorkerMessage::Snapshot(reply) => {
                    let _ = reply.send(Some(self.session.snapshot()));
                }
            }
        }
        debug!(key = %self.session.key(), "SessionWorker::run: queue closed");
    }

    async fn apply(&mut self, event: EventKind) {
        match self.session.handle(event, &self.ctx) {
            Step::Reply(directive) => self.send(directive).await,
            Step::Execute(execution) => self.execute(execution).await,
        }
    }

    /// Run a committed search and deliver its outcome plus the follow-up menu
    async fn execute(&mut self, execution: Execution) {
        let Execution { mode, request, label } = execution;
        info!(key = %self.session.key(), ?mode, strategy = request.strategy.name(), limit = %request.limit, "Running search");

        let result = match self.search(request).await {
            Ok(result) => result,
            Err(err) => {
                let directive = self.session.fail(&err);
                self.send(directive).await;
                return;
            }
        };
        info!(
            key = %self.session.key(),
            ?mode,
            match_count = result.match_count(),
            truncated = result.truncated,
            "Search finished"
        );

        let assembly = assemble(&result.matches, &label, result.truncated, &self.ctx.settings.assembly);
        let headline = match assembly {
            Assembly::Empty { summary } => summary,
            Assembly::Artifact(artifact) => {
                let file_name = artifact.file_name.clone();
                match self
                    .ctx
                    .messenger
                    .deliver(self.session.key(), Directive::DeliverArtifact { artifact })
                    .await
                {
                    Ok(_) => {
                        info!(key = %self.session.key(), %file_name, "Results delivered");
                        text::FILE_SENT.to_string()
                    }
                    Err(e) => {
                        error!(key = %self.session.key(), %file_name, error = %e, "Failed to deliver results");
                        text::FILE_NOT_SENT.to_string()
                    }
                }
            }
        };

        let menu = self.session.completion(&headline);
        self.send(menu).await;
    }

    /// Scan the corpus off the async runtime, bounded by the search timeout
    async fn search(&self, request: SearchRequest) -> Result<SearchResult, SessionError> {
        let corpus = Arc::clone(&self.ctx.corpus);
        let cancel = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancel);
        let task = tokio::task::spawn_blocking(move || corpusstore::execute_with_cancel(&corpus, &request, &flag));

        let joined = match self.ctx.settings.search_timeout {
            Some(limit) => match tokio::time::timeout(limit, task).await {
                Ok(joined) => joined,
                Err(_) => {
                    cancel.store(true, Ordering::Relaxed);
                    let after_ms = u64::try_from(limit.as_millis()).unwrap_or(u64::MAX);
                    warn!(key = %self.session.key(), after_ms, "Search timed out, cancelling");
                    return Err(SessionError::SearchTimeout { after_ms });
                }
            },
            None => task.await,
        };

        joined
            .map_err(|e| SessionError::Internal(format!("search task failed: {}", e)))?
            .map_err(|e| SessionError::Internal(e.to_string()))
    }

    /// Deliver one directive and remember the prompt it created
    ///
    /// A prompt that can no longer be replaced in place is sent fresh instead.
    async fn send(&mut self, directive: Directive) {
        let is_prompt = directive.is_prompt();
        let key = self.session.key().clone();

        let delivered = match self.ctx.messenger.deliver(&key, directive.clone()).await {
            Err(DeliveryError::PromptGone(prior)) => {
                warn!(%key, %prior, "Prompt could not be replaced, sending a new one");
                self.ctx.messenger.deliver(&key, directive.replacing(None)).await
            }
            other => other,
        };

        match delivered {
            Ok(prompt_ref) => {
                if is_prompt {
                    self.session.remember_prompt(prompt_ref);
                }
            }
            Err(e) => {
                let err = SessionError::from(e);
                error!(%key, error = %err, "Failed to deliver directive");
                if is_prompt {
                    self.session.remember_prompt(None);
                }
            }
        }
    }
}
