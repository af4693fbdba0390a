//! Transition function of the dialog

use corpusstore::{SearchRequest, Strategy};
use tracing::{debug, info, warn};

use crate::assembler::ResultLabel;
use crate::events::{Directive, EventKind};

use super::error::SessionError;
use super::limit::parse_limit;
use super::state::{Mode, ParameterKind, Session, Stage};
use super::{DialogContext, text};

/// What the caller must do after an event was applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Deliver exactly one directive
    Reply(Directive),
    /// Run a search, then deliver its result and the follow-up menu
    Execute(Execution),
}

/// A search the session has committed to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Execution {
    pub mode: Mode,
    pub request: SearchRequest,
    pub label: ResultLabel,
}

impl Session {
    /// Apply one event
    ///
    /// Mutates only this session. Invalid input never changes the stage or
    /// any collected parameter.
    pub fn handle(&mut self, event: EventKind, ctx: &DialogContext) -> Step {
        debug!(key = %self.key(), event = event.name(), stage = ?self.stage.kind(), "handle: called");
        match event {
            EventKind::Restart { display_name } => self.restart(display_name, ctx),
            EventKind::Cancel => self.cancel(ctx),
            // The Cancel button offered alongside parameter and limit prompts
            EventKind::ModeSelect { choice } if choice.trim() == text::CANCEL_CHOICE => self.cancel(ctx),
            EventKind::Attachment => {
                warn!(key = %self.key(), "Unexpected attachment");
                Step::Reply(Directive::notice(text::UNEXPECTED_ATTACHMENT))
            }
            EventKind::ModeSelect { choice } => {
                if self.stage == Stage::SelectingMode {
                    self.select_mode(&choice, ctx)
                } else {
                    warn!(key = %self.key(), %choice, "Mode selected outside the menu");
                    Step::Reply(Directive::notice(text::STALE_MENU))
                }
            }
            EventKind::Text { text: input } => match self.stage.clone() {
                Stage::SelectingMode => {
                    info!(key = %self.key(), "Text received while the menu is showing");
                    Step::Reply(Directive::notice(text::UNEXPECTED_TEXT))
                }
                Stage::AwaitingParameter(kind) => self.accept_parameter(kind, &input),
                Stage::AwaitingLimit { mode, strategy } => self.accept_limit(mode, strategy, &input),
            },
        }
    }

    /// Abandon the current flow after `err` and offer the menu again
    pub fn fail(&mut self, err: &SessionError) -> Directive {
        warn!(key = %self.key(), error = %err, "Operation aborted");
        let prior = self.pending_prompt.clone();
        self.reset();
        Directive::prompt(format!("{}\n\nChoose an operation:", err.user_message()), text::menu_choices())
            .replacing(prior)
    }

    /// Menu shown once a search has been delivered
    pub fn completion(&self, headline: &str) -> Directive {
        Directive::prompt(
            format!("{}\n{}", headline, text::ANOTHER_OPERATION),
            text::menu_choices(),
        )
    }

    fn restart(&mut self, display_name: Option<String>, ctx: &DialogContext) -> Step {
        if display_name.is_some() {
            self.display_name = display_name;
        }
        self.reset();
        let first_visit = !self.oriented;
        self.oriented = true;
        info!(key = %self.key(), first_visit, "Session started");

        let menu = text::menu(self.display_name(), ctx.corpus.is_ready(), first_visit);
        Step::Reply(Directive::prompt(menu, text::menu_choices()))
    }

    fn cancel(&mut self, ctx: &DialogContext) -> Step {
        let prior = self.pending_prompt.clone();
        let was = self.stage.kind();
        self.reset();
        info!(key = %self.key(), ?was, "Operation cancelled");

        let menu = text::menu(self.display_name(), ctx.corpus.is_ready(), false);
        Step::Reply(Directive::prompt(format!("{}\n\n{}", text::CANCELLED, menu), text::menu_choices()).replacing(prior))
    }

    fn select_mode(&mut self, choice: &str, ctx: &DialogContext) -> Step {
        let Some(mode) = Mode::from_choice(choice) else {
            warn!(key = %self.key(), %choice, "Unknown mode choice");
            let menu = text::menu(self.display_name(), ctx.corpus.is_ready(), false);
            return Step::Reply(
                Directive::prompt(text::correction(&menu, text::INVALID_SELECTION), text::menu_choices())
                    .replacing(self.pending_prompt.clone()),
            );
        };

        match self.enter_mode(mode, ctx) {
            Ok(step) => step,
            Err(err) => Step::Reply(self.fail(&err)),
        }
    }

    fn enter_mode(&mut self, mode: Mode, ctx: &DialogContext) -> Result<Step, SessionError> {
        if !ctx.corpus.is_ready() {
            return Err(SessionError::DataUnavailable(text::CORPUS_UNAVAILABLE.to_string()));
        }

        let (stage, prompt) = match mode {
            Mode::FilterBySiteName => (
                Stage::AwaitingParameter(ParameterKind::SiteName),
                text::parameter_prompt(mode),
            ),
            Mode::SearchAll => (
                Stage::AwaitingParameter(ParameterKind::SearchTerm),
                text::parameter_prompt(mode),
            ),
            Mode::FilterByCommonSites => {
                let sites = ctx
                    .sites
                    .clone()
                    .ok_or_else(|| SessionError::DataUnavailable(text::NO_SITES.to_string()))?;
                let prompt = text::common_limit_prompt(sites.len());
                (
                    Stage::AwaitingLimit {
                        mode,
                        strategy: Strategy::CommonSites(sites),
                    },
                    prompt,
                )
            }
        };

        info!(key = %self.key(), ?mode, "Mode selected");
        self.stage = stage;
        Ok(Step::Reply(self.prompt_in_place(prompt)))
    }

    fn accept_parameter(&mut self, kind: ParameterKind, input: &str) -> Step {
        let value = match validate_parameter(kind, input) {
            Ok(value) => value,
            Err(err) => return self.correct(&text::parameter_prompt(kind.mode()), &err),
        };

        let (strategy, prompt) = match kind {
            ParameterKind::SiteName => (Strategy::SiteName(value.clone()), text::site_limit_prompt(&value)),
            ParameterKind::SearchTerm => (Strategy::FreeText(value.clone()), text::term_limit_prompt(&value)),
        };
        info!(key = %self.key(), ?kind, %value, "Parameter accepted");

        self.stage = Stage::AwaitingLimit {
            mode: kind.mode(),
            strategy,
        };
        Step::Reply(self.prompt_in_place(prompt))
    }

    fn accept_limit(&mut self, mode: Mode, strategy: Strategy, input: &str) -> Step {
        let limit = match parse_limit(input) {
            Ok(limit) => limit,
            Err(e) => {
                return self.correct(&limit_prompt(&strategy), &SessionError::Validation(e.to_string()));
            }
        };

        let label = result_label(&strategy);
        let request = SearchRequest::new(strategy, limit);
        info!(key = %self.key(), ?mode, %limit, "Search requested");

        self.reset();
        Step::Execute(Execution { mode, request, label })
    }

    fn prompt_in_place(&self, body: String) -> Directive {
        Directive::prompt(body, text::cancel_choices()).replacing(self.pending_prompt.clone())
    }

    /// Re-issue `base` with the validation error inlined, over the pending prompt
    fn correct(&self, base: &str, err: &SessionError) -> Step {
        debug!(key = %self.key(), error = %err, "correct: re-prompting");
        Step::Reply(self.prompt_in_place(text::correction(base, &err.user_message())))
    }
}

fn validate_parameter(kind: ParameterKind, input: &str) -> Result<String, SessionError> {
    let trimmed = input.trim();
    match kind {
        _ if trimmed.is_empty() => {
            let msg = match kind {
                ParameterKind::SiteName => text::EMPTY_SITE,
                ParameterKind::SearchTerm => text::EMPTY_TERM,
            };
            Err(SessionError::Validation(msg.to_string()))
        }
        ParameterKind::SiteName => Ok(trimmed.to_lowercase()),
        ParameterKind::SearchTerm => Ok(trimmed.to_string()),
    }
}

fn limit_prompt(strategy: &Strategy) -> String {
    match strategy {
        Strategy::SiteName(site) => text::site_limit_prompt(site),
        Strategy::CommonSites(sites) => text::common_limit_prompt(sites.len()),
        Strategy::FreeText(term) => text::term_limit_prompt(term),
    }
}

fn result_label(strategy: &Strategy) -> ResultLabel {
    match strategy {
        Strategy::SiteName(site) => {
            ResultLabel::new(format!("Mode 1 Results containing '{}'", site), format!("M1_Filter_{}", site))
        }
        Strategy::CommonSites(sites) => ResultLabel::new(
            format!("Mode 2 Results for {} Common Domains", sites.len()),
            "M2_Filter_Common",
        ),
        Strategy::FreeText(term) => ResultLabel::new(
            format!("Mode 3 Results for '{}'", term),
            format!("M3_Search_{}", term.chars().take(20).collect::<String>()),
        ),
    }
}
