//! Session data: modes, stages and the per-user record

use corpusstore::Strategy;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::events::{PromptRef, SessionKey};

/// Search modes offered in the main menu
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    /// Mode 1: lines containing a site name
    FilterBySiteName,
    /// Mode 2: lines naming one of the configured sites exactly
    FilterByCommonSites,
    /// Mode 3: lines containing free text
    SearchAll,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::FilterBySiteName, Mode::FilterByCommonSites, Mode::SearchAll];

    /// Parse a menu choice id (`mode_1`..`mode_3`, or the bare digit)
    pub fn from_choice(choice: &str) -> Option<Self> {
        match choice.trim() {
            "mode_1" | "1" => Some(Self::FilterBySiteName),
            "mode_2" | "2" => Some(Self::FilterByCommonSites),
            "mode_3" | "3" => Some(Self::SearchAll),
            _ => None,
        }
    }

    pub fn number(self) -> u8 {
        match self {
            Self::FilterBySiteName => 1,
            Self::FilterByCommonSites => 2,
            Self::SearchAll => 3,
        }
    }

    pub fn choice_id(self) -> String {
        format!("mode_{}", self.number())
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::FilterBySiteName => "Filter by Site Name",
            Self::FilterByCommonSites => "Filter Common Sites",
            Self::SearchAll => "Search All Data",
        }
    }
}

/// Which free-text parameter a mode asks for first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParameterKind {
    SiteName,
    SearchTerm,
}

impl ParameterKind {
    pub fn mode(self) -> Mode {
        match self {
            Self::SiteName => Mode::FilterBySiteName,
            Self::SearchTerm => Mode::SearchAll,
        }
    }
}

/// Where a session is in its dialog
///
/// Each variant carries exactly what is legal at that point: the limit stage
/// holds a complete strategy, so a limit can never arrive without its
/// parameter.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Stage {
    #[default]
    SelectingMode,
    AwaitingParameter(ParameterKind),
    AwaitingLimit { mode: Mode, strategy: Strategy },
}

impl Stage {
    pub fn kind(&self) -> StageKind {
        match self {
            Self::SelectingMode => StageKind::SelectingMode,
            Self::AwaitingParameter(_) => StageKind::AwaitingParameter,
            Self::AwaitingLimit { .. } => StageKind::AwaitingLimit,
        }
    }

    pub fn mode(&self) -> Option<Mode> {
        match self {
            Self::SelectingMode => None,
            Self::AwaitingParameter(kind) => Some(kind.mode()),
            Self::AwaitingLimit { mode, .. } => Some(*mode),
        }
    }
}

/// Payload-free view of [`Stage`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StageKind {
    SelectingMode,
    AwaitingParameter,
    AwaitingLimit,
}

/// One user's dialog state
#[derive(Debug, Clone)]
pub struct Session {
    key: SessionKey,
    pub(super) stage: Stage,
    pub(super) pending_prompt: Option<PromptRef>,
    pub(super) oriented: bool,
    pub(super) display_name: Option<String>,
}

impl Session {
    pub fn new(key: SessionKey) -> Self {
        debug!(%key, "Session::new: called");
        Self {
            key,
            stage: Stage::SelectingMode,
            pending_prompt: None,
            oriented: false,
            display_name: None,
        }
    }

    pub fn key(&self) -> &SessionKey {
        &self.key
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    pub fn mode(&self) -> Option<Mode> {
        self.stage.mode()
    }

    pub fn pending_prompt(&self) -> Option<&PromptRef> {
        self.pending_prompt.as_ref()
    }

    /// Whether the user has already seen the orientation text
    pub fn is_oriented(&self) -> bool {
        self.oriented
    }

    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    /// Record the reference the transport returned for the latest prompt
    pub fn remember_prompt(&mut self, prompt: Option<PromptRef>) {
        debug!(key = %self.key, ?prompt, "remember_prompt: called");
        self.pending_prompt = prompt;
    }

    /// Drop collected parameters and the pending prompt
    ///
    /// Orientation and display name survive.
    pub fn reset(&mut self) {
        debug!(key = %self.key, stage = ?self.stage.kind(), "reset: called");
        self.stage = Stage::SelectingMode;
        self.pending_prompt = None;
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            key: self.key.clone(),
            stage: self.stage.kind(),
            mode: self.stage.mode(),
            pending_prompt: self.pending_prompt.clone(),
            oriented: self.oriented,
        }
    }
}

/// Read-only copy of a session for diagnostics and tests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub key: SessionKey,
    pub stage: StageKind,
    pub mode: Option<Mode>,
    #[serde(rename = "pending-prompt")]
    pub pending_prompt: Option<PromptRef>,
    pub oriented: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_from_choice() {
        assert_eq!(Mode::from_choice("mode_1"), Some(Mode::FilterBySiteName));
        assert_eq!(Mode::from_choice("2"), Some(Mode::FilterByCommonSites));
        assert_eq!(Mode::from_choice(" mode_3 "), Some(Mode::SearchAll));
        assert_eq!(Mode::from_choice("mode_4"), None);
        assert_eq!(Mode::from_choice("start_again"), None);
    }

    #[test]
    fn test_choice_ids_round_trip() {
        for mode in Mode::ALL {
            assert_eq!(Mode::from_choice(&mode.choice_id()), Some(mode));
        }
    }

    #[test]
    fn test_reset_keeps_orientation() {
        let mut session = Session::new(SessionKey::from("u1"));
        session.oriented = true;
        session.display_name = Some("Ada".to_string());
        session.stage = Stage::AwaitingParameter(ParameterKind::SearchTerm);
        session.remember_prompt(Some(PromptRef::from("p")));

        session.reset();

        assert_eq!(session.stage(), &Stage::SelectingMode);
        assert!(session.pending_prompt().is_none());
        assert!(session.is_oriented());
        assert_eq!(session.display_name(), Some("Ada"));
    }

    #[test]
    fn test_snapshot_reflects_stage() {
        let mut session = Session::new(SessionKey::from("u2"));
        session.stage = Stage::AwaitingLimit {
            mode: Mode::SearchAll,
            strategy: Strategy::FreeText("x".to_string()),
        };

        let snap = session.snapshot();
        assert_eq!(snap.stage, StageKind::AwaitingLimit);
        assert_eq!(snap.mode, Some(Mode::SearchAll));
    }
}
