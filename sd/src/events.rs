//! Inbound events and outbound directives
//!
//! The only contract between the dialog core and whatever transport carries
//! it. Everything here is plain text; rendering and escaping belong to the
//! transport.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::assembler::Artifact;

/// Identity of one conversation (chat or user id)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionKey(String);

impl SessionKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<i64> for SessionKey {
    fn from(key: i64) -> Self {
        Self::new(key.to_string())
    }
}

/// Opaque handle to a delivered prompt
///
/// Minted by the transport; the core only hands it back to ask for an
/// in-place replacement.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PromptRef(String);

impl PromptRef {
    /// Mint a fresh, time-ordered reference
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PromptRef {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for PromptRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What the user did
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum EventKind {
    /// Picked an entry from a choice list
    ModeSelect { choice: String },
    /// Sent free text
    Text { text: String },
    /// Asked to abandon the current operation
    Cancel,
    /// Asked for the main menu
    Restart {
        #[serde(default, rename = "display-name", skip_serializing_if = "Option::is_none")]
        display_name: Option<String>,
    },
    /// Sent a file, photo or other attachment
    Attachment,
}

impl EventKind {
    /// Short name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            Self::ModeSelect { .. } => "mode-select",
            Self::Text { .. } => "text",
            Self::Cancel => "cancel",
            Self::Restart { .. } => "restart",
            Self::Attachment => "attachment",
        }
    }
}

/// One event for one session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundEvent {
    #[serde(rename = "session-key")]
    pub session_key: SessionKey,
    #[serde(flatten)]
    pub kind: EventKind,
}

impl InboundEvent {
    pub fn new(session_key: impl Into<SessionKey>, kind: EventKind) -> Self {
        Self {
            session_key: session_key.into(),
            kind,
        }
    }
}

/// A selectable option attached to a prompt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub id: String,
    pub label: String,
}

impl Choice {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

/// What the transport should do next
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum Directive {
    /// A question awaiting an answer; replaces `replaces` when set
    Prompt {
        text: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        choices: Vec<Choice>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        replaces: Option<PromptRef>,
    },
    /// An informational message that expects no answer
    Notice { text: String },
    /// A result file
    DeliverArtifact { artifact: Artifact },
}

impl Directive {
    pub fn prompt(text: impl Into<String>, choices: Vec<Choice>) -> Self {
        Self::Prompt {
            text: text.into(),
            choices,
            replaces: None,
        }
    }

    pub fn notice(text: impl Into<String>) -> Self {
        Self::Notice { text: text.into() }
    }

    /// Ask for this prompt to overwrite `prior` instead of being sent fresh
    pub fn replacing(self, prior: Option<PromptRef>) -> Self {
        match self {
            Self::Prompt { text, choices, .. } => Self::Prompt {
                text,
                choices,
                replaces: prior,
            },
            other => other,
        }
    }

    /// Text of a prompt or notice
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Prompt { text, .. } | Self::Notice { text } => Some(text),
            Self::DeliverArtifact { .. } => None,
        }
    }

    pub fn is_prompt(&self) -> bool {
        matches!(self, Self::Prompt { .. })
    }
}

/// A directive addressed to one session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundDirective {
    #[serde(rename = "session-key")]
    pub session_key: SessionKey,
    /// Reference assigned to a delivered prompt
    #[serde(default, rename = "prompt-ref", skip_serializing_if = "Option::is_none")]
    pub prompt_ref: Option<PromptRef>,
    #[serde(flatten)]
    pub directive: Directive,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inbound_text_deserialize() {
        let json = r#"{"session-key":"42","kind":"text","text":"netflix"}"#;
        let event: InboundEvent = serde_json::from_str(json).unwrap();
        assert_eq!(
            event,
            InboundEvent::new(
                "42",
                EventKind::Text {
                    text: "netflix".to_string()
                }
            )
        );
    }

    #[test]
    fn test_inbound_restart_without_name() {
        let json = r#"{"session-key":"7","kind":"restart"}"#;
        let event: InboundEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.kind, EventKind::Restart { display_name: None });
    }

    #[test]
    fn test_inbound_mode_select_deserialize() {
        let json = r#"{"session-key":"7","kind":"mode-select","choice":"mode_2"}"#;
        let event: InboundEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.kind.name(), "mode-select");
    }

    #[test]
    fn test_notice_serialize() {
        let out = OutboundDirective {
            session_key: SessionKey::from(5),
            prompt_ref: None,
            directive: Directive::notice("hi"),
        };
        let json = serde_json::to_string(&out).unwrap();
        assert_eq!(json, r#"{"session-key":"5","action":"notice","text":"hi"}"#);
    }

    #[test]
    fn test_prompt_serialize_omits_empty_fields() {
        let out = OutboundDirective {
            session_key: SessionKey::from("a"),
            prompt_ref: Some(PromptRef::from("p9")),
            directive: Directive::prompt("pick", Vec::new()),
        };
        let json = serde_json::to_string(&out).unwrap();
        assert_eq!(json, r#"{"session-key":"a","prompt-ref":"p9","action":"prompt","text":"pick"}"#);
    }

    #[test]
    fn test_replacing_only_touches_prompts() {
        let prior = Some(PromptRef::from("p1"));
        let prompt = Directive::prompt("x", Vec::new()).replacing(prior.clone());
        assert!(matches!(prompt, Directive::Prompt { replaces, .. } if replaces == prior));

        let notice = Directive::notice("y").replacing(prior);
        assert_eq!(notice, Directive::notice("y"));
    }

    #[test]
    fn test_generated_prompt_refs_differ() {
        assert_ne!(PromptRef::generate(), PromptRef::generate());
    }
}
