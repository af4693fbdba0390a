//! In-process messenger that records everything it is asked to deliver

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use tracing::debug;

use crate::events::{Directive, OutboundDirective, PromptRef, SessionKey};

use super::messenger::{DeliveryError, Messenger};

/// Records directives in delivery order
///
/// Prompts get a fresh [`PromptRef`]; a replacing prompt keeps the ref it
/// replaced. Replacement can be made to fail to exercise the fallback path.
#[derive(Debug, Default)]
pub struct MemoryMessenger {
    delivered: Mutex<Vec<OutboundDirective>>,
    fail_replacements: AtomicBool,
}

impl MemoryMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every in-place replacement with [`DeliveryError::PromptGone`]
    pub fn set_fail_replacements(&self, fail: bool) {
        self.fail_replacements.store(fail, Ordering::SeqCst);
    }

    /// Everything delivered so far, across all sessions
    pub fn directives(&self) -> Vec<OutboundDirective> {
        self.lock().clone()
    }

    /// Directives delivered to one session, in order
    pub fn for_session(&self, key: &SessionKey) -> Vec<Directive> {
        self.lock()
            .iter()
            .filter(|out| &out.session_key == key)
            .map(|out| out.directive.clone())
            .collect()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, Vec<OutboundDirective>> {
        // A panicked test thread must not hide what was recorded
        self.delivered.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl Messenger for MemoryMessenger {
    async fn deliver(&self, key: &SessionKey, directive: Directive) -> Result<Option<PromptRef>, DeliveryError> {
        let prompt_ref = match &directive {
            Directive::Prompt {
                replaces: Some(prior), ..
            } => {
                if self.fail_replacements.load(Ordering::SeqCst) {
                    debug!(%key, %prior, "deliver: refusing replacement");
                    return Err(DeliveryError::PromptGone(prior.clone()));
                }
                Some(prior.clone())
            }
            Directive::Prompt { replaces: None, .. } => Some(PromptRef::generate()),
            _ => None,
        };

        self.lock().push(OutboundDirective {
            session_key: key.clone(),
            prompt_ref: prompt_ref.clone(),
            directive,
        });
        Ok(prompt_ref)
    }
}
