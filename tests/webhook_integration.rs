//! WhatsApp webhook router and WHAPI sender

mod common;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{feed_config, now, CountingDetector, Recorder, AGENCY_CSV};
use helpy::config::WhatsAppConfig;
use helpy::dialogue::SessionStore;
use helpy::providers::{CompletionResponse, Message, Provider};
use helpy::reference::{LinesAtStopResolver, OperatorDirectory};
use helpy::transit::{FixedClock, SiriFeedClient, TransitResolver};
use helpy::transport::{router, MessageSender, WebhookState, WhapiClient};
use helpy::{DialogueEngine, Language};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct AskForStop;

/// Rejects every reply to one recipient and records the rest
struct RejectOne {
    rejected: &'static str,
    delivered: Recorder,
}

#[async_trait]
impl MessageSender for RejectOne {
    async fn send_text(&self, to: &str, body: &str) -> helpy::Result<()> {
        if to == self.rejected {
            return Err(helpy::HelpyError::Transport("gateway refused".to_string()).into());
        }
        self.delivered.send_text(to, body).await
    }
}

#[async_trait]
impl Provider for AskForStop {
    async fn complete(
        &self,
        _messages: &[Message],
        _tools: &[Value],
    ) -> helpy::Result<CompletionResponse> {
        Ok(CompletionResponse::new(Message::assistant(
            "What is your stop number?",
        )))
    }
}

fn app(sender: Arc<dyn MessageSender>) -> (axum::Router, Arc<SessionStore>) {
    let resolver = TransitResolver::new(
        Arc::new(SiriFeedClient::new(&feed_config("http://127.0.0.1:9")).unwrap()),
        Arc::new(OperatorDirectory::from_csv(AGENCY_CSV).unwrap()),
        Arc::new(FixedClock(now())),
    );
    let engine = DialogueEngine::new(
        Arc::new(AskForStop),
        Arc::new(CountingDetector::new(None)),
        resolver,
        LinesAtStopResolver::default(),
        Language::English,
    );
    let sessions = Arc::new(SessionStore::new(Duration::from_secs(600)));
    let state = Arc::new(WebhookState::new(engine, sessions.clone(), sender));
    (router(state, "/webhook/whatsapp"), sessions)
}

async fn post_json(app: &axum::Router, body: String) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/webhook/whatsapp")
                .header("content-type", "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn inbound(from: &str, text: &str) -> String {
    json!({
        "messages": [{
            "id": "wamid.1",
            "from_me": false,
            "type": "text",
            "chat_id": format!("{}@s.whatsapp.net", from),
            "from": from,
            "text": {"body": text}
        }],
        "event": {"type": "messages", "event": "post"}
    })
    .to_string()
}

#[tokio::test]
async fn test_text_message_gets_reply() {
    let sender = Arc::new(Recorder::default());
    let (app, sessions) = app(sender.clone());

    let (status, body) = post_json(&app, inbound("972501234567", "hello")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true}));
    assert_eq!(
        sender.sent(),
        vec![(
            "972501234567".to_string(),
            "What is your stop number?".to_string()
        )]
    );
    assert_eq!(sessions.len(), 1);
}

#[tokio::test]
async fn test_group_and_own_messages_ignored() {
    let sender = Arc::new(Recorder::default());
    let (app, sessions) = app(sender.clone());

    let payload = json!({
        "messages": [
            {"from": "1", "from_me": true, "type": "text", "text": {"body": "echo"}},
            {"from": "2", "chat_id": "120363@g.us", "type": "text", "text": {"body": "group"}},
            {"from": "3", "type": "image"}
        ]
    });
    let (status, body) = post_json(&app, payload.to_string()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true}));
    assert!(sender.sent().is_empty());
    assert!(sessions.is_empty());
}

#[tokio::test]
async fn test_status_event_is_not_answered() {
    let sender = Arc::new(Recorder::default());
    let (app, sessions) = app(sender.clone());

    let payload = json!({
        "event": {"type": "statuses", "event": "post"},
        "messages": [{
            "from": "972501234567",
            "from_me": false,
            "type": "text",
            "text": {"body": "hello"}
        }],
        "statuses": [{"id": "wamid.1", "status": "delivered"}]
    });
    let (status, body) = post_json(&app, payload.to_string()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true}));
    assert!(sender.sent().is_empty());
    assert!(sessions.is_empty());
}

#[tokio::test]
async fn test_failed_delivery_does_not_drop_other_replies() {
    let sender = Arc::new(RejectOne {
        rejected: "111",
        delivered: Recorder::default(),
    });
    let (app, sessions) = app(sender.clone());

    let payload = json!({
        "event": {"type": "messages", "event": "post"},
        "messages": [
            {"from": "111", "type": "text", "text": {"body": "hello"}},
            {"from": "222", "type": "text", "text": {"body": "hello"}}
        ]
    });
    let (status, body) = post_json(&app, payload.to_string()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "error");
    let reason = body["reason"].as_str().unwrap();
    assert!(reason.contains("1 of 2 replies failed"), "{}", reason);
    assert!(reason.contains("111"));
    assert_eq!(
        sender.delivered.sent(),
        vec![("222".to_string(), "What is your stop number?".to_string())]
    );
    assert_eq!(sessions.len(), 2);
}

#[tokio::test]
async fn test_malformed_payload_still_200() {
    let sender = Arc::new(Recorder::default());
    let (app, _) = app(sender);

    let (status, body) = post_json(&app, "{not json".to_string()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "error");
    assert!(body["reason"].as_str().unwrap().contains("invalid payload"));
}

#[tokio::test]
async fn test_exit_then_health_reports_sessions() {
    let sender = Arc::new(Recorder::default());
    let (app, _) = app(sender.clone());

    post_json(&app, inbound("111", "bye")).await;
    assert_eq!(
        sender.bodies(),
        vec![Language::English.messages().goodbye.to_string()]
    );

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let health: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(health, json!({"status": "ok", "sessions": 1}));
}

#[tokio::test]
async fn test_whapi_client_posts_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/messages/text"))
        .and(header("authorization", "Bearer channel-token"))
        .and(body_json(json!({
            "typing_time": 0,
            "to": "972501234567@s.whatsapp.net",
            "body": "Line 5 arrives in 4 minutes."
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"sent": true})))
        .expect(1)
        .mount(&server)
        .await;

    let client = WhapiClient::from_config(&WhatsAppConfig {
        api_url: Some(format!("{}/", server.uri())),
        channel_token: Some("channel-token".to_string()),
        ..WhatsAppConfig::default()
    })
    .unwrap();
    client
        .send_text("972501234567", "Line 5 arrives in 4 minutes.")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_whapi_error_status_fails() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad token"))
        .mount(&server)
        .await;

    let client = WhapiClient::from_config(&WhatsAppConfig {
        api_url: Some(server.uri()),
        channel_token: Some("wrong".to_string()),
        ..WhatsAppConfig::default()
    })
    .unwrap();
    let err = client.send_text("1", "hi").await.unwrap_err();
    assert!(err.to_string().contains("401"));
}
