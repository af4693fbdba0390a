//! Interactive console transport
//!
//! Drives a single session from a terminal: slash commands and typed answers
//! become events, directives are printed, and result files are written to
//! disk.

use std::path::PathBuf;

use async_trait::async_trait;
use colored::Colorize;
use eyre::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, info};

use crate::dispatch::Dispatcher;
use crate::events::{Directive, EventKind, InboundEvent, PromptRef, SessionKey};
use crate::session::{Mode, StageKind};

use super::messenger::{DeliveryError, Messenger};

/// Prints directives to stdout and saves artifacts under `output_dir`
#[derive(Debug, Clone)]
pub struct ConsoleMessenger {
    output_dir: PathBuf,
}

impl ConsoleMessenger {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &PathBuf {
        &self.output_dir
    }
}

#[async_trait]
impl Messenger for ConsoleMessenger {
    async fn deliver(&self, key: &SessionKey, directive: Directive) -> Result<Option<PromptRef>, DeliveryError> {
        debug!(%key, "ConsoleMessenger::deliver: called");
        match &directive {
            Directive::Prompt { replaces, .. } => {
                println!();
                println!("{}", render(&directive));
                // A terminal cannot rewrite earlier output; reuse the ref
                Ok(Some(replaces.clone().unwrap_or_else(PromptRef::generate)))
            }
            Directive::Notice { .. } => {
                println!();
                println!("{}", render(&directive).yellow());
                Ok(None)
            }
            Directive::DeliverArtifact { artifact } => {
                tokio::fs::create_dir_all(&self.output_dir).await?;
                let path = self.output_dir.join(&artifact.file_name);
                tokio::fs::write(&path, artifact.content.as_bytes()).await?;
                info!(%key, path = %path.display(), match_count = artifact.match_count, "Saved results file");

                println!();
                println!("{}", render(&directive).green());
                println!("Saved to {}", path.display().to_string().cyan());
                Ok(None)
            }
        }
    }
}

/// Plain-text rendering of a directive
pub fn render(directive: &Directive) -> String {
    match directive {
        Directive::Prompt { text, choices, .. } => {
            let mut out = text.clone();
            for choice in choices {
                out.push_str(&format!("\n  [{}] {}", choice.id, choice.label));
            }
            out
        }
        Directive::Notice { text } => text.clone(),
        Directive::DeliverArtifact { artifact } => format!("{} ({})", artifact.summary, artifact.file_name),
    }
}

/// One line of console input, interpreted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleInput {
    Quit,
    Help,
    Event(EventKind),
}

/// Interpret one input line
///
/// `at_menu` says whether the session is waiting for a mode choice, in which
/// case a bare `1`..`3` (or `mode_N`) picks that mode and a bare `cancel`
/// cancels. Anywhere else bare words are search text; only `/cancel` cancels.
pub fn parse_console_line(line: &str, at_menu: bool) -> ConsoleInput {
    let trimmed = line.trim();
    let mut parts = trimmed.splitn(2, char::is_whitespace);
    let head = parts.next().unwrap_or("");
    let rest = parts.next().map(str::trim).unwrap_or("");

    match head {
        "/quit" | "/q" | "/exit" => ConsoleInput::Quit,
        "/help" | "/h" => ConsoleInput::Help,
        "/start" => ConsoleInput::Event(EventKind::Restart {
            display_name: (!rest.is_empty()).then(|| rest.to_string()),
        }),
        "/cancel" if rest.is_empty() => ConsoleInput::Event(EventKind::Cancel),
        "cancel" if at_menu && rest.is_empty() => ConsoleInput::Event(EventKind::Cancel),
        "/attach" => ConsoleInput::Event(EventKind::Attachment),
        "/mode" => ConsoleInput::Event(EventKind::ModeSelect {
            choice: rest.to_string(),
        }),
        _ if at_menu && Mode::from_choice(trimmed).is_some() => ConsoleInput::Event(EventKind::ModeSelect {
            choice: trimmed.to_string(),
        }),
        _ => ConsoleInput::Event(EventKind::Text { text: line.to_string() }),
    }
}

fn print_help() {
    println!();
    println!("  {:14} Show the main menu", "/start".yellow());
    println!("  {:14} Abandon the current operation", "/cancel".yellow());
    println!("  {:14} Pick a mode from the menu", "/mode N".yellow());
    println!("  {:14} Send an attachment", "/attach".yellow());
    println!("  {:14} Exit", "/quit".yellow());
}

/// Run one interactive session until `/quit` or end of input
///
/// Each event is fully applied before the next line is read.
pub async fn run_console<R>(
    dispatcher: &Dispatcher,
    key: SessionKey,
    display_name: Option<String>,
    reader: R,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    debug!(%key, ?display_name, "run_console: called");
    println!("{}", "siftdaemon console".bright_cyan().bold());
    println!("Type {} for help, {} to quit", "/help".yellow(), "/quit".yellow());

    let mut at_menu = submit_and_wait(dispatcher, &key, EventKind::Restart { display_name }).await?;

    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await.context("Failed to read console input")? {
        if line.trim().is_empty() {
            continue;
        }
        match parse_console_line(&line, at_menu) {
            ConsoleInput::Quit => break,
            ConsoleInput::Help => print_help(),
            ConsoleInput::Event(event) => {
                at_menu = submit_and_wait(dispatcher, &key, event).await?;
            }
        }
    }

    info!(%key, "Console session ended");
    Ok(())
}

/// Submit `event` and wait until it has been applied; returns whether the
/// session is back at the menu
async fn submit_and_wait(dispatcher: &Dispatcher, key: &SessionKey, event: EventKind) -> Result<bool> {
    dispatcher
        .submit(InboundEvent::new(key.clone(), event))
        .await
        .context("Failed to submit event")?;
    let snapshot = dispatcher.snapshot(key).await.context("Failed to read session state")?;
    Ok(snapshot.is_none_or(|s| s.stage == StageKind::SelectingMode))
}
