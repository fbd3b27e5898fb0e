//! Test utilities for Helpy
//!
//! Scripted collaborators for the dialogue engine and builders for SIRI
//! snapshots anchored at a fixed clock.

use crate::dialogue::Outbox;
use crate::error::{HelpyError, Result};
use crate::i18n::Language;
use crate::language::LanguageDetector;
use crate::providers::{CompletionResponse, FunctionCall, Message, Provider, ToolCall};
use crate::transit::{AlertSource, FeedClient};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tempfile::TempDir;

/// Create a temporary directory for testing
pub fn temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temporary directory")
}

/// Write `content` to `name` inside `dir`
///
/// # Panics
///
/// Panics if writing fails
pub fn create_test_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("Failed to write test file");
    path
}

/// Assert that an error contains the expected message
///
/// # Panics
///
/// Panics if the result is Ok or if the error doesn't contain the expected message
pub fn assert_error_contains<T>(result: Result<T>, expected: &str) {
    match result {
        Ok(_) => panic!("Expected error containing '{}' but got Ok", expected),
        Err(e) => {
            let error_msg = e.to_string();
            assert!(
                error_msg.contains(expected),
                "Error message '{}' does not contain '{}'",
                error_msg,
                expected
            );
        }
    }
}

/// Clock reading shared by snapshot builders and resolvers under test
pub fn test_now() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2024-05-01T10:00:00+03:00")
        .expect("valid timestamp")
        .with_timezone(&Utc)
}

/// One `MonitoredStopVisit` arriving `seconds` after [`test_now`]
pub fn visit_in(stop: &str, line: &str, operator: &str, seconds: i64) -> Value {
    let arrival = test_now() + Duration::seconds(seconds);
    json!({
        "MonitoringRef": stop,
        "MonitoredVehicleJourney": {
            "LineRef": format!("{}-{}", operator, line),
            "PublishedLineName": line,
            "OperatorRef": operator,
            "MonitoredCall": {"ExpectedArrivalTime": arrival.to_rfc3339()}
        }
    })
}

/// Wrap visits in the SIRI envelope
pub fn snapshot(visits: Vec<Value>) -> Value {
    json!({
        "Siri": {
            "ServiceDelivery": {
                "StopMonitoringDelivery": [{"MonitoredStopVisit": visits}]
            }
        }
    })
}

/// Feed returning the same snapshot for every stop, or failing when unset
pub struct StaticFeed(Option<Value>);

impl StaticFeed {
    pub fn new(snapshot: Value) -> Self {
        Self(Some(snapshot))
    }

    /// Snapshot with no visits
    pub fn empty() -> Self {
        Self::new(snapshot(Vec::new()))
    }

    pub fn unavailable() -> Self {
        Self(None)
    }
}

#[async_trait]
impl FeedClient for StaticFeed {
    async fn stop_monitoring(&self, _stop_number: &str) -> Result<Value> {
        self.0
            .clone()
            .ok_or_else(|| HelpyError::FeedUnavailable("static feed is down".to_string()).into())
    }
}

/// Provider replaying canned completions in order; errors once exhausted
pub struct ScriptedProvider {
    responses: Mutex<VecDeque<Message>>,
    requests: Mutex<Vec<Vec<Message>>>,
}

impl ScriptedProvider {
    pub fn new(responses: Vec<Message>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Assistant message proposing one operation call
    pub fn call(name: &str, arguments: &str) -> Message {
        Message::assistant_with_tools(vec![ToolCall {
            id: "call_0".to_string(),
            function: FunctionCall {
                name: name.to_string(),
                arguments: arguments.to_string(),
            },
        }])
    }

    /// Histories received so far
    pub fn requests(&self) -> Vec<Vec<Message>> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    async fn complete(
        &self,
        messages: &[Message],
        _tools: &[Value],
    ) -> Result<CompletionResponse> {
        self.requests.lock().unwrap().push(messages.to_vec());
        let next = self.responses.lock().unwrap().pop_front();
        match next {
            Some(message) => Ok(CompletionResponse::new(message)),
            None => Err(HelpyError::Provider("no scripted response left".to_string()).into()),
        }
    }
}

/// Detector returning a fixed answer and counting calls
pub struct CountingDetector {
    language: Option<Language>,
    calls: AtomicUsize,
}

impl CountingDetector {
    pub fn new(language: Option<Language>) -> Self {
        Self {
            language,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl LanguageDetector for CountingDetector {
    fn detect(&self, _text: &str) -> Option<Language> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.language
    }
}

/// Outbox keeping everything sent through it
#[derive(Default)]
pub struct RecordingOutbox {
    sent: Mutex<Vec<String>>,
}

impl RecordingOutbox {
    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Outbox for RecordingOutbox {
    async fn send(&self, text: &str) -> Result<()> {
        self.sent.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

/// Alert source returning the same warnings for every line
pub struct StaticAlerts(pub Vec<String>);

#[async_trait]
impl AlertSource for StaticAlerts {
    async fn warnings_for_line(&self, _line_ref: &str, _language: Language) -> Vec<String> {
        self.0.clone()
    }
}
