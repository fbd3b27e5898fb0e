//! Conversation engine
//!
//! [`DialogueEngine::handle_message`] is the single entry point shared by
//! the terminal and the WhatsApp webhook. It detects the session language
//! once, handles exit keywords and operator menus, asks the language model
//! what to do, runs the proposed operation, and always returns a localized
//! reply.

pub mod operations;
pub mod session;

pub use operations::{operation_schemas, Proposal, SYSTEM_PROMPT};
pub use session::{
    clean_history, ConversationSession, DialogueState, PendingDisambiguation, SessionStore,
};

use crate::error::{HelpyError, Result};
use crate::i18n::Language;
use crate::language::{is_numeric, LanguageDetector};
use crate::providers::{Message, Provider};
use crate::reference::LinesAtStopResolver;
use crate::transit::{AlertSource, ResolutionResult, TransitQuery, TransitResolver};
use async_trait::async_trait;
use operations::{parse_lines_at_stop, parse_transit_times, GET_LINES_AT_STOP, GET_TRANSIT_TIMES};
use std::sync::Arc;

/// Default number of arrival estimates shown in one reply
pub const DEFAULT_MAX_DISPLAYED_ETAS: usize = 3;

/// Side channel for notices sent before the final reply
#[async_trait]
pub trait Outbox: Send + Sync {
    /// Deliver `text` to the user now
    async fn send(&self, text: &str) -> Result<()>;
}

/// How a handled message left the conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyOutcome {
    /// Ordinary turn
    Continue,
    /// Arrival estimates were delivered
    Arrivals,
    /// An operator menu is waiting for a numeric answer
    AwaitingChoice,
    /// The user left
    Ended,
}

/// Replies for one handled message, in delivery order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub messages: Vec<String>,
    pub outcome: ReplyOutcome,
}

impl Reply {
    fn new(messages: Vec<String>, outcome: ReplyOutcome) -> Self {
        Self { messages, outcome }
    }

    fn text(text: impl Into<String>) -> Self {
        Self::new(vec![text.into()], ReplyOutcome::Continue)
    }

    /// Whether the conversation is over
    pub fn is_end(&self) -> bool {
        self.outcome == ReplyOutcome::Ended
    }
}

/// Runs the message pipeline against one session at a time
pub struct DialogueEngine {
    provider: Arc<dyn Provider>,
    detector: Arc<dyn LanguageDetector>,
    resolver: TransitResolver,
    lines: LinesAtStopResolver,
    alerts: Option<Arc<dyn AlertSource>>,
    default_language: Language,
    max_displayed_etas: usize,
}

impl DialogueEngine {
    /// Create an engine without service alerts
    pub fn new(
        provider: Arc<dyn Provider>,
        detector: Arc<dyn LanguageDetector>,
        resolver: TransitResolver,
        lines: LinesAtStopResolver,
        default_language: Language,
    ) -> Self {
        Self {
            provider,
            detector,
            resolver,
            lines,
            alerts: None,
            default_language,
            max_displayed_etas: DEFAULT_MAX_DISPLAYED_ETAS,
        }
    }

    /// Attach a service alerts source
    pub fn with_alerts(mut self, alerts: Arc<dyn AlertSource>) -> Self {
        self.alerts = Some(alerts);
        self
    }

    /// Override how many estimates a reply lists
    pub fn with_max_displayed_etas(mut self, max: usize) -> Self {
        self.max_displayed_etas = max.max(1);
        self
    }

    /// Language used when detection is skipped or fails
    pub fn default_language(&self) -> Language {
        self.default_language
    }

    /// Handle one inbound message and produce the replies for it
    ///
    /// Never fails: pipeline errors are logged and turned into the
    /// localized generic error reply.
    pub async fn handle_message(
        &self,
        session: &mut ConversationSession,
        text: &str,
        outbox: &dyn Outbox,
    ) -> Reply {
        if session.state == DialogueState::Terminal {
            tracing::debug!("Restarting finished session for {}", session.user_id);
            session.reset();
        }
        session.touch();

        let text = text.trim();
        let language = self.session_language(session, text);
        let messages = language.messages();

        if language.is_exit_keyword(text) {
            tracing::info!("Session {} ended by user", session.user_id);
            session.pending = None;
            session.state = DialogueState::Terminal;
            session.push_assistant(messages.goodbye);
            return Reply::new(vec![messages.goodbye.to_string()], ReplyOutcome::Ended);
        }

        if text.is_empty() {
            return Reply::text(messages.empty_input);
        }

        if session.history.is_empty() {
            session.history.push(Message::system(SYSTEM_PROMPT));
            session.push_assistant(messages.greeting);
        }

        match self.run(session, text, language, outbox).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::error!("Failed to handle message for {}: {:#}", session.user_id, e);
                session.push_assistant(messages.generic_error);
                Reply::text(messages.generic_error)
            }
        }
    }

    fn session_language(&self, session: &mut ConversationSession, text: &str) -> Language {
        if let Some(language) = session.detected_language {
            return language;
        }

        session.state = DialogueState::AwaitLanguage;
        let language = if text.is_empty() || is_numeric(text) {
            self.default_language
        } else {
            self.detector.detect(text).unwrap_or(self.default_language)
        };
        tracing::info!("Session {} language set to {}", session.user_id, language);

        session.detected_language = Some(language);
        session.state = DialogueState::Active;
        language
    }

    async fn run(
        &self,
        session: &mut ConversationSession,
        text: &str,
        language: Language,
        outbox: &dyn Outbox,
    ) -> Result<Reply> {
        if session.state == DialogueState::AwaitDisambiguation {
            if let Some(reply) = self.handle_choice(session, text, language).await {
                return Ok(reply);
            }
        }

        session.history.push(Message::user(text));
        let history = clean_history(&session.history);
        tracing::debug!(
            "Asking provider with {} turns for {}",
            history.len(),
            session.user_id
        );
        let response = self
            .provider
            .complete(&history, &operation_schemas())
            .await?;

        match Proposal::from_response(&response.message) {
            Proposal::Reply(reply) if reply.is_empty() => {
                tracing::warn!("Provider returned an empty reply");
                let text = language.messages().empty_input;
                session.push_assistant(text);
                Ok(Reply::text(text))
            }
            Proposal::Reply(reply) => {
                session.push_assistant(&reply);
                Ok(Reply::text(reply))
            }
            Proposal::Call { name, arguments } => {
                tracing::info!("Provider proposed {}({})", name, arguments);
                self.dispatch(session, &name, &arguments, language, outbox)
                    .await
            }
        }
    }

    /// Numeric answer to a pending operator menu; `None` means the user
    /// moved on and the message goes through the normal pipeline
    async fn handle_choice(
        &self,
        session: &mut ConversationSession,
        text: &str,
        language: Language,
    ) -> Option<Reply> {
        let Some(pending) = session.pending.clone() else {
            session.state = DialogueState::Active;
            return None;
        };

        if !is_numeric(text) {
            tracing::debug!("Operator menu abandoned by {}", session.user_id);
            session.pending = None;
            session.state = DialogueState::Active;
            return None;
        }

        session.history.push(Message::user(text));
        let chosen = text
            .parse::<usize>()
            .ok()
            .and_then(|choice| pending.operator_for_choice(choice));

        match chosen {
            Some(operator) => {
                session.pending = None;
                session.state = DialogueState::Active;
                let query = pending.query.with_operator(operator);
                let result = self.resolver.resolve(&query, language).await;
                Some(self.render_resolution(session, &query, result, language).await)
            }
            None => {
                let text = language
                    .messages()
                    .invalid_choice_reply(&pending.display_options);
                session.push_assistant(&text);
                Some(Reply::new(vec![text], ReplyOutcome::AwaitingChoice))
            }
        }
    }

    async fn dispatch(
        &self,
        session: &mut ConversationSession,
        name: &str,
        arguments: &str,
        language: Language,
        outbox: &dyn Outbox,
    ) -> Result<Reply> {
        let messages = language.messages();

        match name {
            GET_TRANSIT_TIMES => {
                let query = match parse_transit_times(arguments) {
                    Ok(query) => query,
                    Err(e) => {
                        tracing::warn!("Rejected {} call: {}", name, e);
                        session.push_assistant(messages.invalid_parameters);
                        return Ok(Reply::text(messages.invalid_parameters));
                    }
                };
                let result = self.resolver.resolve(&query, language).await;
                Ok(self.render_resolution(session, &query, result, language).await)
            }
            GET_LINES_AT_STOP => {
                let stop = match parse_lines_at_stop(arguments) {
                    Ok(stop) => stop,
                    Err(e) => {
                        tracing::warn!("Rejected {} call: {}", name, e);
                        session.push_assistant(messages.invalid_parameters);
                        return Ok(Reply::text(messages.invalid_parameters));
                    }
                };

                if let Err(e) = outbox.send(messages.wait).await {
                    tracing::warn!("Failed to send wait notice: {}", e);
                }

                let text = match self.lines.resolve(&stop) {
                    Ok(found) => messages.lines_reply(&found.stop_number, &found.short_names()),
                    Err(e) if is_not_found(&e) => messages.stop_not_found_reply(&stop),
                    Err(e) => return Err(e),
                };
                session.push_assistant(&text);
                Ok(Reply::text(text))
            }
            other => Err(HelpyError::InvalidArguments(format!("Unknown operation: {}", other)).into()),
        }
    }

    async fn render_resolution(
        &self,
        session: &mut ConversationSession,
        query: &TransitQuery,
        result: ResolutionResult,
        language: Language,
    ) -> Reply {
        let messages = language.messages();

        match result {
            ResolutionResult::Success {
                stop,
                line,
                operator_label,
                line_ref,
                etas,
                ..
            } => {
                let text = messages.eta_reply(
                    &stop,
                    &line,
                    &operator_label,
                    &etas,
                    self.max_displayed_etas,
                );
                let mut replies = Vec::new();
                if let (Some(alerts), Some(line_ref)) = (&self.alerts, line_ref.as_deref()) {
                    replies.extend(alerts.warnings_for_line(line_ref, language).await);
                }
                session.push_assistant(&text);
                replies.push(text);
                Reply::new(replies, ReplyOutcome::Arrivals)
            }
            ResolutionResult::AmbiguousOperator {
                candidates,
                display_options,
            } => {
                let text = messages.ambiguous_reply(
                    &query.stop_number,
                    &query.line_number,
                    &display_options,
                );
                session.pending = Some(PendingDisambiguation {
                    query: query.clone(),
                    candidates,
                    display_options,
                });
                session.state = DialogueState::AwaitDisambiguation;
                session.push_assistant(&text);
                Reply::new(vec![text], ReplyOutcome::AwaitingChoice)
            }
            ResolutionResult::Failure { kind, reason } => {
                tracing::debug!("Resolution failed ({:?}) for {:?}", kind, query);
                session.push_assistant(&reason);
                Reply::text(reason)
            }
        }
    }
}

fn is_not_found(error: &anyhow::Error) -> bool {
    matches!(
        error.downcast_ref::<HelpyError>(),
        Some(HelpyError::NotFound(_))
    )
}
