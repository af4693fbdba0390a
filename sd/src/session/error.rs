//! Session error taxonomy

use thiserror::Error;

use crate::transport::DeliveryError;

/// Errors raised while driving a dialog
///
/// Validation errors end in a re-prompt; every other kind ends in a reset to
/// the main menu. None of them leave a session stuck mid-flow.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Malformed or empty user input
    #[error("{0}")]
    Validation(String),

    /// The corpus (or the site list a mode needs) is not available
    #[error("Data unavailable: {0}")]
    DataUnavailable(String),

    /// The transport could not deliver a directive
    #[error("Delivery failed: {0}")]
    Delivery(#[from] DeliveryError),

    /// A search ran longer than the configured bound
    #[error("Search timed out after {after_ms} ms")]
    SearchTimeout { after_ms: u64 },

    /// Something the session relied on went missing
    #[error("Internal error: {0}")]
    Internal(String),
}

impl SessionError {
    /// Text shown to the user for this error
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(msg) => msg.clone(),
            Self::DataUnavailable(reason) => format!("Mode unavailable\n\n{}", reason),
            Self::Delivery(_) | Self::Internal(_) => "An unexpected internal error occurred. Please try again.".to_string(),
            Self::SearchTimeout { .. } => {
                "The search took too long and was stopped. Try a narrower search or a smaller limit.".to_string()
            }
        }
    }

    pub fn is_recoverable_in_place(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
