//! Conversation sessions and the per-user session store
//!
//! A session is only ever mutated by one request at a time: the store hands
//! out `Arc<tokio::sync::Mutex<_>>` handles and transports hold the lock for
//! the whole message pipeline.

use crate::i18n::Language;
use crate::providers::Message;
use crate::transit::TransitQuery;
use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex, MutexGuard};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// Where a conversation stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DialogueState {
    /// No message handled yet
    #[default]
    Init,
    /// Resolving the session language from the first message
    AwaitLanguage,
    /// Normal conversation
    Active,
    /// An operator menu was shown; a numeric reply selects from it
    AwaitDisambiguation,
    /// The user left; the next message starts over
    Terminal,
}

/// Operator choice waiting for the user's answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDisambiguation {
    /// Stop and line being resolved
    pub query: TransitQuery,
    /// Distinct (line, operator id) pairs, in menu order
    pub candidates: Vec<(String, String)>,
    /// Menu lines shown to the user
    pub display_options: Vec<String>,
}

impl PendingDisambiguation {
    /// Operator id for a 1-based menu choice
    pub fn operator_for_choice(&self, choice: usize) -> Option<&str> {
        choice
            .checked_sub(1)
            .and_then(|idx| self.candidates.get(idx))
            .map(|(_, operator)| operator.as_str())
    }
}

/// State of one user's conversation
#[derive(Debug, Clone)]
pub struct ConversationSession {
    /// Transport-level identity (phone number, "terminal")
    pub user_id: String,
    /// Ordered turns replayed to the provider
    pub history: Vec<Message>,
    /// Set on the first message, then fixed for the session lifetime
    pub detected_language: Option<Language>,
    /// Dialogue state
    pub state: DialogueState,
    /// Operator menu awaiting an answer
    pub pending: Option<PendingDisambiguation>,
    /// Last time a message was handled
    pub last_activity: Instant,
}

impl ConversationSession {
    /// Fresh session for `user_id`
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            history: Vec::new(),
            detected_language: None,
            state: DialogueState::Init,
            pending: None,
            last_activity: Instant::now(),
        }
    }

    /// Start over, keeping the identity
    pub fn reset(&mut self) {
        *self = Self::new(std::mem::take(&mut self.user_id));
    }

    /// Record activity now
    pub fn touch(&mut self) {
        self.last_activity = Instant::now();
    }

    /// Append an assistant turn
    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.history.push(Message::assistant(content));
    }
}

/// Turns with a non-empty role and content, in their original order
///
/// # Examples
///
/// ```
/// use helpy::dialogue::clean_history;
/// use helpy::providers::Message;
///
/// let history = vec![
///     Message::system("prompt"),
///     Message { role: String::new(), content: Some("orphan".into()), tool_calls: None },
///     Message::assistant(""),
///     Message::user("123"),
/// ];
/// let cleaned = clean_history(&history);
/// assert_eq!(cleaned, vec![Message::system("prompt"), Message::user("123")]);
/// ```
pub fn clean_history(history: &[Message]) -> Vec<Message> {
    history
        .iter()
        .filter(|m| !m.role.is_empty() && m.content.as_deref().is_some_and(|c| !c.is_empty()))
        .cloned()
        .collect()
}

struct SessionEntry {
    session: Arc<Mutex<ConversationSession>>,
    last_seen: Instant,
}

/// Per-user session map with idle eviction
///
/// Lookups and sweeps hold the map lock only briefly; the per-session
/// `tokio` mutex serializes requests from the same user.
pub struct SessionStore {
    sessions: StdMutex<HashMap<String, SessionEntry>>,
    idle_ttl: Duration,
}

impl SessionStore {
    /// Store evicting sessions idle longer than `idle_ttl`
    pub fn new(idle_ttl: Duration) -> Self {
        Self {
            sessions: StdMutex::new(HashMap::new()),
            idle_ttl,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, SessionEntry>> {
        self.sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Session handle for `user_id`, creating or replacing an expired one
    pub fn session(&self, user_id: &str) -> Arc<Mutex<ConversationSession>> {
        let now = Instant::now();
        let mut sessions = self.lock();

        if let Some(entry) = sessions.get_mut(user_id) {
            if now.duration_since(entry.last_seen) <= self.idle_ttl {
                entry.last_seen = now;
                return Arc::clone(&entry.session);
            }
            tracing::debug!("Session for {} expired, starting a new one", user_id);
        }

        let session = Arc::new(Mutex::new(ConversationSession::new(user_id)));
        sessions.insert(
            user_id.to_string(),
            SessionEntry {
                session: Arc::clone(&session),
                last_seen: now,
            },
        );
        session
    }

    /// Drop sessions idle at `now`; sessions currently in use are kept
    pub fn evict_idle_at(&self, now: Instant) -> usize {
        let mut sessions = self.lock();
        let before = sessions.len();
        sessions.retain(|_, entry| {
            now.duration_since(entry.last_seen) <= self.idle_ttl
                || Arc::strong_count(&entry.session) > 1
        });
        before - sessions.len()
    }

    /// Drop sessions idle now
    pub fn evict_idle(&self) -> usize {
        self.evict_idle_at(Instant::now())
    }

    /// Number of live sessions
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether no sessions are held
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Run [`SessionStore::evict_idle`] every `interval`
    pub fn spawn_sweeper(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let store = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let evicted = store.evict_idle();
                if evicted > 0 {
                    tracing::info!("Evicted {} idle sessions", evicted);
                }
            }
        })
    }
}
