//! JSON-lines transport
//!
//! One [`InboundEvent`] per input line, one [`OutboundDirective`] per output
//! line. Intended for piping between the daemon and a chat bridge.

use async_trait::async_trait;
use eyre::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::dispatch::Dispatcher;
use crate::events::{Directive, InboundEvent, OutboundDirective, PromptRef, SessionKey};

use super::messenger::{DeliveryError, Messenger};

/// Maximum accepted size of one inbound line
const MAX_LINE_SIZE: usize = 64 * 1024;

/// Writes each directive as a single JSON line
///
/// Prompt refs are minted here and echoed in the `prompt-ref` field so the
/// bridge can map them onto its own message ids.
pub struct JsonLinesMessenger<W> {
    writer: Mutex<W>,
}

impl<W> JsonLinesMessenger<W>
where
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Give back the underlying writer
    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

#[async_trait]
impl<W> Messenger for JsonLinesMessenger<W>
where
    W: AsyncWrite + Unpin + Send,
{
    async fn deliver(&self, key: &SessionKey, directive: Directive) -> Result<Option<PromptRef>, DeliveryError> {
        let prompt_ref = match &directive {
            Directive::Prompt {
                replaces: Some(prior), ..
            } => Some(prior.clone()),
            Directive::Prompt { replaces: None, .. } => Some(PromptRef::generate()),
            _ => None,
        };

        let out = OutboundDirective {
            session_key: key.clone(),
            prompt_ref: prompt_ref.clone(),
            directive,
        };
        let mut line = serde_json::to_vec(&out)?;
        line.push(b'\n');

        let mut writer = self.writer.lock().await;
        writer.write_all(&line).await?;
        writer.flush().await?;
        debug!(%key, bytes = line.len(), "deliver: wrote directive");
        Ok(prompt_ref)
    }
}

/// Outcome of one bounded line read
enum LineRead {
    Eof,
    Line,
    Oversized,
}

/// Read one line into `buf`, never buffering more than `MAX_LINE_SIZE + 1` bytes
///
/// The tail of an oversized line is consumed and dropped in bounded chunks.
async fn read_bounded_line<R>(reader: &mut R, buf: &mut Vec<u8>) -> std::io::Result<LineRead>
where
    R: AsyncBufRead + Unpin,
{
    buf.clear();
    let limit = MAX_LINE_SIZE as u64 + 1;
    if (&mut *reader).take(limit).read_until(b'\n', buf).await? == 0 {
        return Ok(LineRead::Eof);
    }
    if buf.last() == Some(&b'\n') || buf.len() <= MAX_LINE_SIZE {
        return Ok(LineRead::Line);
    }

    loop {
        buf.clear();
        (&mut *reader).take(limit).read_until(b'\n', buf).await?;
        if buf.is_empty() || buf.last() == Some(&b'\n') {
            return Ok(LineRead::Oversized);
        }
    }
}

/// Feed events from `reader` into `dispatcher` until end of input
///
/// Blank lines are ignored; malformed or oversized lines are logged and
/// skipped. Returns the number of events submitted.
pub async fn serve<R>(dispatcher: &Dispatcher, mut reader: R) -> Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    debug!("serve: called");
    let mut buf = Vec::with_capacity(1024);
    let mut submitted = 0usize;
    let mut line_no = 0usize;

    loop {
        let read = read_bounded_line(&mut reader, &mut buf)
            .await
            .context("Failed to read event line")?;
        match read {
            LineRead::Eof => break,
            LineRead::Oversized => {
                line_no += 1;
                warn!(line_no, limit = MAX_LINE_SIZE, "Skipping oversized event line");
                continue;
            }
            LineRead::Line => line_no += 1,
        }

        let line = String::from_utf8_lossy(&buf);
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let event: InboundEvent = match serde_json::from_str(line) {
            Ok(event) => event,
            Err(e) => {
                warn!(line_no, error = %e, "Skipping malformed event line");
                continue;
            }
        };

        dispatcher
            .submit(event)
            .await
            .map_err(|e| eyre::eyre!("Dispatcher stopped: {}", e))?;
        submitted += 1;
    }

    info!(submitted, "Input closed");
    Ok(submitted)
}
