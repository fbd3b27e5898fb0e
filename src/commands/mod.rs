/*!
Command handlers for the CLI

This module provides the handlers invoked by the CLI entrypoint:

- `chat`: interactive terminal conversation
- `serve`: WhatsApp webhook server
- `arrivals`: one-shot arrival lookup
- `lines`: one-shot lines-at-stop lookup

The handlers only wire configuration into the library components; all
conversation behavior lives in [`crate::dialogue`].
*/

use crate::config::Config;
use crate::dialogue::DialogueEngine;
use crate::error::Result;
use crate::language::WhatlangDetector;
use crate::providers::{create_provider, Provider};
use crate::reference::{GtfsTables, LinesAtStopResolver, OperatorDirectory};
use crate::transit::{ServiceAlertsClient, SiriFeedClient, SystemClock, TransitResolver};
use std::sync::Arc;
use std::time::Duration;

/// Build the resolver over the live feed and the agency table
///
/// # Errors
///
/// Returns error if the feed HTTP client cannot be built
pub fn build_resolver(config: &Config) -> Result<TransitResolver> {
    let feed = SiriFeedClient::new(&config.feed)?;
    let operators = OperatorDirectory::load_or_empty(&config.reference.agency_file);
    Ok(TransitResolver::new(
        Arc::new(feed),
        Arc::new(operators),
        Arc::new(SystemClock),
    ))
}

/// Build the dialogue engine used by both transports
///
/// # Errors
///
/// Returns error if the provider is unknown or lacks credentials, or an
/// HTTP client cannot be built
pub fn build_engine(config: &Config, provider_name: Option<&str>) -> Result<DialogueEngine> {
    let provider_type = provider_name.unwrap_or(&config.provider.provider_type);
    let provider: Arc<dyn Provider> = Arc::from(create_provider(provider_type, &config.provider)?);
    let lines = LinesAtStopResolver::new(GtfsTables::load_or_empty(&config.reference.gtfs_dir));

    let mut engine = DialogueEngine::new(
        provider,
        Arc::new(WhatlangDetector::new()),
        build_resolver(config)?,
        lines,
        config.default_language(),
    )
    .with_max_displayed_etas(config.dialogue.max_displayed_etas);

    if let Some(alerts) = ServiceAlertsClient::from_config(&config.feed)? {
        tracing::info!("Service alerts enabled");
        engine = engine.with_alerts(Arc::new(alerts));
    }

    Ok(engine)
}

fn seconds(value: u64) -> Option<Duration> {
    (value > 0).then(|| Duration::from_secs(value))
}

// Chat command handler
pub mod chat {
    //! Interactive terminal conversation.
    //!
    //! The greeting is printed up front, every input is read with an
    //! inactivity timeout, and each arrivals reply is followed by a yes/no
    //! question asking whether the user needs anything else.

    use super::*;
    use crate::dialogue::{ConversationSession, Outbox, ReplyOutcome};
    use crate::error::HelpyError;
    use crate::i18n::{Language, YesNo};
    use async_trait::async_trait;
    use colored::Colorize;
    use rustyline::error::ReadlineError;
    use rustyline::DefaultEditor;
    use tokio::sync::mpsc;

    const PROMPT: &str = "> ";

    #[derive(Debug, PartialEq, Eq)]
    enum Input {
        Line(String),
        Closed,
        TimedOut,
    }

    /// Reads lines on a dedicated thread so a pending read never blocks
    /// shutdown after an inactivity timeout
    struct LineReader {
        prompts: std::sync::mpsc::Sender<String>,
        lines: mpsc::UnboundedReceiver<Option<String>>,
    }

    impl LineReader {
        fn spawn() -> Self {
            let (prompt_tx, prompt_rx) = std::sync::mpsc::channel::<String>();
            let (line_tx, line_rx) = mpsc::unbounded_channel();

            std::thread::spawn(move || {
                let mut editor = match DefaultEditor::new() {
                    Ok(editor) => editor,
                    Err(e) => {
                        tracing::error!("Failed to open terminal editor: {}", e);
                        return;
                    }
                };
                while let Ok(prompt) = prompt_rx.recv() {
                    let line = match editor.readline(&prompt) {
                        Ok(line) => {
                            let _ = editor.add_history_entry(line.as_str());
                            Some(line)
                        }
                        Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => None,
                        Err(e) => {
                            tracing::error!("Readline error: {}", e);
                            None
                        }
                    };
                    let closed = line.is_none();
                    if line_tx.send(line).is_err() || closed {
                        break;
                    }
                }
            });

            Self::from_channels(prompt_tx, line_rx)
        }

        /// Reader over an arbitrary line source; `None` marks end of input
        fn from_channels(
            prompts: std::sync::mpsc::Sender<String>,
            lines: mpsc::UnboundedReceiver<Option<String>>,
        ) -> Self {
            Self { prompts, lines }
        }

        async fn read(&mut self, timeout: Option<Duration>) -> Result<Input> {
            self.prompts
                .send(PROMPT.to_string())
                .map_err(|_| HelpyError::Transport("terminal reader stopped".to_string()))?;

            let next = match timeout {
                Some(limit) => match tokio::time::timeout(limit, self.lines.recv()).await {
                    Ok(next) => next,
                    Err(_) => return Ok(Input::TimedOut),
                },
                None => self.lines.recv().await,
            };

            Ok(match next.flatten() {
                Some(line) => Input::Line(line),
                None => Input::Closed,
            })
        }
    }

    struct TerminalOutbox;

    #[async_trait]
    impl Outbox for TerminalOutbox {
        async fn send(&self, text: &str) -> Result<()> {
            println!("{}", text.dimmed());
            Ok(())
        }
    }

    fn say(text: &str) {
        println!("{} {}", "Helpy:".bold().green(), text);
    }

    /// Start the terminal conversation
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration (consumed)
    /// * `provider_name` - Optional override for the configured provider
    pub async fn run_chat(config: Config, provider_name: Option<String>) -> Result<()> {
        tracing::info!("Starting terminal chat");

        let engine = build_engine(&config, provider_name.as_deref())?;
        let timeout = seconds(config.dialogue.input_timeout_seconds);
        let mut reader = LineReader::spawn();
        let mut session = ConversationSession::new("terminal");
        let mut awaiting_follow_up = false;

        say(engine.default_language().messages().greeting);

        loop {
            let language: Language = session
                .detected_language
                .unwrap_or_else(|| engine.default_language());
            let messages = language.messages();

            let line = match reader.read(timeout).await? {
                Input::Line(line) => line,
                Input::TimedOut => {
                    println!();
                    say(messages.inactive);
                    break;
                }
                Input::Closed => {
                    say(messages.goodbye);
                    break;
                }
            };

            if awaiting_follow_up {
                match messages.classify_yes_no(&line) {
                    YesNo::Yes => {
                        awaiting_follow_up = false;
                        say(messages.continuation);
                    }
                    YesNo::No => {
                        say(messages.goodbye);
                        break;
                    }
                    YesNo::Unclear => say(messages.yes_no_hint),
                }
                continue;
            }

            let reply = engine
                .handle_message(&mut session, &line, &TerminalOutbox)
                .await;
            for message in &reply.messages {
                say(message);
            }

            match reply.outcome {
                ReplyOutcome::Ended => break,
                ReplyOutcome::Arrivals => {
                    let follow_up = session
                        .detected_language
                        .unwrap_or(language)
                        .messages()
                        .follow_up;
                    say(follow_up);
                    awaiting_follow_up = true;
                }
                ReplyOutcome::Continue | ReplyOutcome::AwaitingChoice => {}
            }
        }

        tracing::info!("Terminal chat finished");
        Ok(())
    }

}

// Webhook server handler
pub mod serve {
    //! WhatsApp webhook server with periodic session eviction.

    use super::*;
    use crate::dialogue::SessionStore;
    use crate::error::HelpyError;
    use crate::transport::{router, WebhookState, WhapiClient};

    /// Run the webhook server until Ctrl-C
    ///
    /// # Errors
    ///
    /// Returns error if the WhatsApp credentials are missing, the address
    /// cannot be bound, or the server fails
    pub async fn run_serve(config: Config, bind: Option<String>) -> Result<()> {
        let engine = build_engine(&config, None)?;
        let sender = WhapiClient::from_config(&config.whatsapp)?;

        let idle_ttl = Duration::from_secs(config.session.idle_ttl_seconds);
        let sessions = Arc::new(SessionStore::new(idle_ttl));
        let sweep_every = seconds(config.session.sweep_interval_seconds)
            .unwrap_or_else(|| Duration::from_secs(60));
        let sweeper = sessions.spawn_sweeper(sweep_every);

        let state = Arc::new(WebhookState::new(engine, sessions, Arc::new(sender)));
        let app = router(state, &config.whatsapp.webhook_path);

        let addr = bind.unwrap_or_else(|| config.whatsapp.bind_address.clone());
        let listener = tokio::net::TcpListener::bind(&addr).await.map_err(|e| {
            tracing::error!("Failed to bind to {}: {}", addr, e);
            HelpyError::Transport(format!("Failed to bind to {}: {}", addr, e))
        })?;

        tracing::info!(
            "Helpy webhook listening on http://{}{}",
            addr,
            config.whatsapp.webhook_path
        );

        let served = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await;
        sweeper.abort();

        served.map_err(|e| HelpyError::Transport(format!("Server error: {}", e)))?;
        tracing::info!("Webhook server stopped");
        Ok(())
    }

    async fn shutdown_signal() {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
        tracing::info!("Shutdown requested");
    }
}

// One-shot arrival lookup
pub mod arrivals {
    use super::*;
    use crate::error::HelpyError;
    use crate::transit::{AlertSource, FailureKind, ResolutionResult, TransitQuery};
    use colored::Colorize;

    /// Print the next arrivals of `line` at `stop`
    ///
    /// An operator menu is printed with the ids to pass back through
    /// `--operator`.
    ///
    /// # Errors
    ///
    /// Returns error if the arguments are blank, the feed is unavailable, or
    /// no operator runs the line at the stop
    pub async fn run_arrivals(
        config: &Config,
        stop: &str,
        line: &str,
        operator: Option<&str>,
    ) -> Result<()> {
        let query = TransitQuery::new(stop, line, operator)?;
        let language = config.default_language();
        let messages = language.messages();
        let resolver = build_resolver(config)?;

        match resolver.resolve(&query, language).await {
            ResolutionResult::Success {
                stop,
                line,
                operator_label,
                line_ref,
                etas,
                ..
            } => {
                if let (Some(alerts), Some(line_ref)) =
                    (ServiceAlertsClient::from_config(&config.feed)?, line_ref)
                {
                    for warning in alerts.warnings_for_line(&line_ref, language).await {
                        println!("{}", warning.yellow());
                    }
                }
                println!(
                    "{}",
                    messages.eta_reply(
                        &stop,
                        &line,
                        &operator_label,
                        &etas,
                        config.dialogue.max_displayed_etas
                    )
                );
                Ok(())
            }
            ResolutionResult::AmbiguousOperator {
                candidates,
                display_options,
            } => {
                println!(
                    "{}",
                    messages.ambiguous_reply(&query.stop_number, &query.line_number, &[])
                );
                for ((_, operator), option) in candidates.iter().zip(&display_options) {
                    println!("{}  {}", option, format!("--operator {}", operator).dimmed());
                }
                Ok(())
            }
            ResolutionResult::Failure { kind, reason } => {
                eprintln!("{}", reason.red());
                Err(match kind {
                    FailureKind::FeedUnavailable => HelpyError::FeedUnavailable(reason),
                    FailureKind::NoOperatorFound => HelpyError::NoOperatorFound {
                        stop: query.stop_number.clone(),
                        line: query.line_number.clone(),
                    },
                }
                .into())
            }
        }
    }
}

// One-shot lines-at-stop lookup
pub mod lines {
    use super::*;
    use colored::Colorize;

    /// Print the lines serving `stop` from the static GTFS tables
    ///
    /// # Errors
    ///
    /// Returns error if the GTFS tables cannot be loaded or the stop is
    /// unknown
    pub fn run_lines(config: &Config, stop: &str) -> Result<()> {
        let tables = GtfsTables::load(&config.reference.gtfs_dir)?;
        let found = LinesAtStopResolver::new(tables).resolve(stop)?;
        let messages = config.default_language().messages();

        println!(
            "{}",
            messages.lines_reply(&found.stop_number, &found.short_names())
        );
        for line in &found.lines {
            println!("  {:>6}  {}", line.short_name.bold(), line.long_name);
        }
        Ok(())
    }
}
