//! WhatsApp transport over the WHAPI gateway
//!
//! Inbound messages arrive on a webhook; each one runs the dialogue
//! pipeline under its sender's session lock and the replies are posted back
//! through `POST {api_url}/messages/text`.

use crate::config::WhatsAppConfig;
use crate::dialogue::{DialogueEngine, Outbox, SessionStore};
use crate::error::{HelpyError, Result};
use async_trait::async_trait;
use axum::{
    body::Bytes,
    extract::State,
    response::Json,
    routing::{get, post},
    Router,
};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

const WHATSAPP_SUFFIX: &str = "@s.whatsapp.net";
const GROUP_SUFFIX: &str = "@g.us";
const MESSAGES_EVENT: &str = "messages";

/// Webhook envelope
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub event: Option<WebhookEvent>,
    #[serde(default)]
    pub messages: Vec<InboundMessage>,
    #[serde(default)]
    pub statuses: Vec<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookEvent {
    #[serde(rename = "type", default)]
    pub event_type: String,
}

/// One inbound message
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InboundMessage {
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub from_me: bool,
    #[serde(default)]
    pub chat_id: Option<String>,
    #[serde(rename = "type", default)]
    pub message_type: Option<String>,
    #[serde(default)]
    pub text: Option<TextBody>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TextBody {
    #[serde(default)]
    pub body: String,
}

impl InboundMessage {
    /// Sender and text of a direct text message from someone else
    ///
    /// Our own echoes, group chats, and media are skipped.
    pub fn direct_text(&self) -> Option<(&str, &str)> {
        if self.from_me {
            return None;
        }
        if self
            .chat_id
            .as_deref()
            .is_some_and(|chat| chat.ends_with(GROUP_SUFFIX))
        {
            return None;
        }
        if self.message_type.as_deref().is_some_and(|t| t != "text") {
            return None;
        }
        let from = self.from.as_deref().filter(|f| !f.is_empty())?;
        let body = self.text.as_ref()?.body.as_str();
        Some((from, body))
    }
}

impl WebhookPayload {
    /// Whether the envelope announces new messages
    ///
    /// Envelopes without an `event` block are treated as message events.
    pub fn is_message_event(&self) -> bool {
        self.event
            .as_ref()
            .map_or(true, |event| event.event_type == MESSAGES_EVENT)
    }

    /// Messages the assistant should answer, in arrival order
    ///
    /// Empty for status, presence and other non-message events.
    pub fn direct_texts(&self) -> Vec<(&str, &str)> {
        if !self.is_message_event() {
            return Vec::new();
        }
        self.messages
            .iter()
            .filter_map(InboundMessage::direct_text)
            .collect()
    }
}

/// Outbound text delivery
#[async_trait]
pub trait MessageSender: Send + Sync {
    /// Send `body` to the user `to`
    async fn send_text(&self, to: &str, body: &str) -> Result<()>;
}

#[derive(Debug, Serialize)]
struct SendTextRequest<'a> {
    typing_time: u32,
    to: String,
    body: &'a str,
}

/// WHAPI HTTP client
#[derive(Debug, Clone)]
pub struct WhapiClient {
    client: Client,
    api_url: String,
    token: String,
}

impl WhapiClient {
    /// Create a client from the WhatsApp section of the configuration
    ///
    /// # Errors
    ///
    /// Returns [`HelpyError::Config`] when the API URL or channel token is
    /// missing
    pub fn from_config(config: &WhatsAppConfig) -> Result<Self> {
        let api_url = config
            .api_url
            .as_deref()
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| HelpyError::Config("whatsapp.api_url is required".to_string()))?;
        let token = config
            .channel_token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| HelpyError::Config("whatsapp.channel_token is required".to_string()))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("helpy/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| HelpyError::Transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    fn recipient(to: &str) -> String {
        if to.contains('@') {
            to.to_string()
        } else {
            format!("{}{}", to, WHATSAPP_SUFFIX)
        }
    }
}

#[async_trait]
impl MessageSender for WhapiClient {
    async fn send_text(&self, to: &str, body: &str) -> Result<()> {
        let url = format!("{}/messages/text", self.api_url);
        let request = SendTextRequest {
            typing_time: 0,
            to: Self::recipient(to),
            body,
        };

        tracing::debug!("Sending {} chars to {}", body.chars().count(), request.to);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(&request)
            .send()
            .await
            .map_err(|e| HelpyError::Transport(format!("WhatsApp send failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            tracing::error!("WhatsApp API returned {}: {}", status, text);
            return Err(HelpyError::Transport(format!(
                "WhatsApp API returned {}: {}",
                status, text
            ))
            .into());
        }
        Ok(())
    }
}

/// Delivers notices to the sender of the message being handled
struct WhatsAppOutbox<'a> {
    sender: &'a dyn MessageSender,
    to: &'a str,
}

#[async_trait]
impl Outbox for WhatsAppOutbox<'_> {
    async fn send(&self, text: &str) -> Result<()> {
        self.sender.send_text(self.to, text).await
    }
}

/// Shared state behind the webhook router
pub struct WebhookState {
    engine: DialogueEngine,
    sessions: Arc<SessionStore>,
    sender: Arc<dyn MessageSender>,
}

impl WebhookState {
    pub fn new(
        engine: DialogueEngine,
        sessions: Arc<SessionStore>,
        sender: Arc<dyn MessageSender>,
    ) -> Self {
        Self {
            engine,
            sessions,
            sender,
        }
    }

    /// Run the pipeline for every direct text in `payload`
    ///
    /// Returns how many messages were answered. A failed delivery does not
    /// stop the remaining replies.
    ///
    /// # Errors
    ///
    /// Returns [`HelpyError::Transport`] listing every reply that could not
    /// be delivered
    pub async fn process(&self, payload: &WebhookPayload) -> Result<usize> {
        if !payload.is_message_event() {
            tracing::debug!(
                "Ignoring webhook event {}",
                payload
                    .event
                    .as_ref()
                    .map(|event| event.event_type.as_str())
                    .unwrap_or_default()
            );
            return Ok(0);
        }

        let texts = payload.direct_texts();
        if texts.is_empty() {
            tracing::debug!(
                "Webhook carried nothing to answer ({} messages, {} statuses)",
                payload.messages.len(),
                payload.statuses.len()
            );
        }

        let mut attempted = 0;
        let mut failures = Vec::new();
        for (from, body) in &texts {
            let session = self.sessions.session(from);
            let mut session = session.lock().await;
            let outbox = WhatsAppOutbox {
                sender: self.sender.as_ref(),
                to: from,
            };

            let reply = self.engine.handle_message(&mut session, body, &outbox).await;
            for message in &reply.messages {
                attempted += 1;
                if let Err(e) = self.sender.send_text(from, message).await {
                    tracing::error!("Reply to {} failed: {}", from, e);
                    failures.push(format!("{}: {}", from, e));
                }
            }
        }

        if !failures.is_empty() {
            return Err(HelpyError::Transport(format!(
                "{} of {} replies failed: {}",
                failures.len(),
                attempted,
                failures.join("; ")
            ))
            .into());
        }
        Ok(texts.len())
    }
}

/// Webhook and health routes
pub fn router(state: Arc<WebhookState>, webhook_path: &str) -> Router {
    Router::new()
        .route(webhook_path, post(handle_webhook))
        .route("/health", get(health))
        .with_state(state)
}

async fn handle_webhook(State(state): State<Arc<WebhookState>>, body: Bytes) -> Json<Value> {
    let payload: WebhookPayload = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::warn!("Rejected webhook payload: {}", e);
            return Json(json!({"status": "error", "reason": format!("invalid payload: {}", e)}));
        }
    };

    match state.process(&payload).await {
        Ok(_) => Json(json!({"success": true})),
        Err(e) => {
            tracing::error!("Webhook processing failed: {}", e);
            Json(json!({"status": "error", "reason": e.to_string()}))
        }
    }
}

async fn health(State(state): State<Arc<WebhookState>>) -> Json<Value> {
    Json(json!({"status": "ok", "sessions": state.sessions.len()}))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(value: Value) -> InboundMessage {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_direct_text_accepted() {
        let msg = message(json!({
            "from": "972501234567",
            "from_me": false,
            "chat_id": "972501234567@s.whatsapp.net",
            "type": "text",
            "text": {"body": "123"}
        }));
        assert_eq!(msg.direct_text(), Some(("972501234567", "123")));
    }

    #[test]
    fn test_own_group_and_media_skipped() {
        let own = message(json!({"from": "1", "from_me": true, "type": "text", "text": {"body": "x"}}));
        let group = message(json!({"from": "1", "chat_id": "120363@g.us", "type": "text", "text": {"body": "x"}}));
        let image = message(json!({"from": "1", "type": "image"}));
        let no_sender = message(json!({"type": "text", "text": {"body": "x"}}));
        assert_eq!(own.direct_text(), None);
        assert_eq!(group.direct_text(), None);
        assert_eq!(image.direct_text(), None);
        assert_eq!(no_sender.direct_text(), None);
    }

    #[test]
    fn test_status_only_payload_has_no_texts() {
        let payload: WebhookPayload = serde_json::from_value(json!({
            "event": {"type": "statuses", "event": "post"},
            "statuses": [{"id": "abc", "status": "read"}]
        }))
        .unwrap();
        assert!(payload.direct_texts().is_empty());
        assert_eq!(payload.event.unwrap().event_type, "statuses");
    }

    #[test]
    fn test_non_message_event_is_not_answered() {
        let payload: WebhookPayload = serde_json::from_value(json!({
            "event": {"type": "statuses", "event": "post"},
            "messages": [{"from": "1", "type": "text", "text": {"body": "123"}}]
        }))
        .unwrap();
        assert!(!payload.is_message_event());
        assert!(payload.direct_texts().is_empty());
    }

    #[test]
    fn test_message_event_and_bare_envelope_are_answered() {
        let tagged: WebhookPayload = serde_json::from_value(json!({
            "event": {"type": "messages", "event": "post"},
            "messages": [{"from": "1", "type": "text", "text": {"body": "123"}}]
        }))
        .unwrap();
        let bare: WebhookPayload = serde_json::from_value(json!({
            "messages": [{"from": "1", "type": "text", "text": {"body": "123"}}]
        }))
        .unwrap();
        assert_eq!(tagged.direct_texts(), vec![("1", "123")]);
        assert_eq!(bare.direct_texts(), vec![("1", "123")]);
    }

    #[test]
    fn test_recipient_suffix() {
        assert_eq!(
            WhapiClient::recipient("972501234567"),
            "972501234567@s.whatsapp.net"
        );
        assert_eq!(
            WhapiClient::recipient("972501234567@s.whatsapp.net"),
            "972501234567@s.whatsapp.net"
        );
    }

    #[test]
    fn test_client_requires_credentials() {
        let config = WhatsAppConfig {
            api_url: Some("https://gate.whapi.cloud".to_string()),
            channel_token: None,
            ..WhatsAppConfig::default()
        };
        assert!(WhapiClient::from_config(&config).is_err());
    }
}
