//! The outbound transport contract

use async_trait::async_trait;
use thiserror::Error;

use crate::events::{Directive, PromptRef, SessionKey};

/// Errors from delivering a directive
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("Prompt {0} can no longer be replaced")]
    PromptGone(PromptRef),

    #[error("Transport closed")]
    Closed,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// Something that can put directives in front of a user
///
/// Implementations own rendering, escaping and message identity. For a
/// [`Directive::Prompt`] they return the [`PromptRef`] the session should hand
/// back when it wants that prompt replaced; for other directives they return
/// `None`.
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn deliver(&self, key: &SessionKey, directive: Directive) -> Result<Option<PromptRef>, DeliveryError>;
}
