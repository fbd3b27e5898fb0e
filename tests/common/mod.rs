//! Shared helpers for Helpy integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use helpy::config::FeedConfig;
use helpy::dialogue::Outbox;
use helpy::language::LanguageDetector;
use helpy::transport::MessageSender;
use helpy::Language;
use serde_json::{json, Value};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Agency table with two operators sharing line numbers
pub const AGENCY_CSV: &str = "\u{feff}agency_id,agency_name,agency_english_name\n3,אגד,Egged\n5,דן,Dan\n";

/// Fixed clock reading used to anchor arrival timestamps
pub fn now() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2024-05-01T10:00:00+03:00")
        .unwrap()
        .with_timezone(&Utc)
}

/// `MonitoredStopVisit` arriving `seconds` after [`now`]
pub fn visit(stop: &str, line: &str, operator: &str, seconds: i64) -> Value {
    let arrival = now() + Duration::seconds(seconds);
    json!({
        "RecordedAtTime": now().to_rfc3339(),
        "MonitoringRef": stop,
        "MonitoredVehicleJourney": {
            "LineRef": format!("{}{}", operator, line),
            "DirectionRef": "1",
            "PublishedLineName": line,
            "OperatorRef": operator,
            "MonitoredCall": {
                "StopPointRef": stop,
                "ExpectedArrivalTime": arrival.to_rfc3339()
            }
        }
    })
}

/// SIRI envelope around `visits`
pub fn siri(visits: Vec<Value>) -> Value {
    json!({
        "Siri": {
            "ServiceDelivery": {
                "ResponseTimestamp": now().to_rfc3339(),
                "StopMonitoringDelivery": [{
                    "version": "2.8",
                    "MonitoredStopVisit": visits
                }]
            }
        }
    })
}

/// Feed configuration pointing at a mock server
pub fn feed_config(base: &str) -> FeedConfig {
    FeedConfig {
        url: format!("{}/siri/sm", base),
        api_key: Some("test-key".to_string()),
        ..FeedConfig::default()
    }
}

/// Write a small GTFS directory where stop 123 is served by lines 1 and 18
pub fn write_gtfs(dir: &Path) {
    std::fs::write(
        dir.join("stops.txt"),
        "stop_id,stop_code,stop_name\n100,123,Central\n200,456,Depot\n",
    )
    .unwrap();
    std::fs::write(
        dir.join("stop_times.txt"),
        "trip_id,arrival_time,departure_time,stop_id,stop_sequence\n\
         t1,08:00:00,08:00:00,100,1\n\
         t2,08:10:00,08:10:00,100,1\n",
    )
    .unwrap();
    std::fs::write(
        dir.join("trips.txt"),
        "route_id,service_id,trip_id\nr1,s,t1\nr18,s,t2\n",
    )
    .unwrap();
    std::fs::write(
        dir.join("routes.txt"),
        "route_id,agency_id,route_short_name,route_long_name\n\
         r1,3,1,Center - North\n\
         r18,5,18,Center - South\n",
    )
    .unwrap();
}

/// OpenAI completion body proposing one call
pub fn openai_call(name: &str, arguments: Value) -> Value {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": {
                "role": "assistant",
                "content": null,
                "tool_calls": [{
                    "id": "call_1",
                    "type": "function",
                    "function": {"name": name, "arguments": arguments.to_string()}
                }]
            },
            "finish_reason": "tool_calls"
        }],
        "usage": {"prompt_tokens": 120, "completion_tokens": 18, "total_tokens": 138}
    })
}

/// OpenAI completion body with plain text
pub fn openai_text(text: &str) -> Value {
    json!({
        "id": "chatcmpl-2",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": text},
            "finish_reason": "stop"
        }]
    })
}

/// Detector with a fixed answer that counts calls
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

/// Outbox and sender that keep what they were asked to deliver
#[derive(Default)]
pub struct Recorder {
    sent: Mutex<Vec<(String, String)>>,
}

impl Recorder {
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn bodies(&self) -> Vec<String> {
        self.sent().into_iter().map(|(_, body)| body).collect()
    }
}

#[async_trait]
impl Outbox for Recorder {
    async fn send(&self, text: &str) -> helpy::Result<()> {
        self.sent
            .lock()
            .unwrap()
            .push((String::new(), text.to_string()));
        Ok(())
    }
}

#[async_trait]
impl MessageSender for Recorder {
    async fn send_text(&self, to: &str, body: &str) -> helpy::Result<()> {
        self.sent
            .lock()
            .unwrap()
            .push((to.to_string(), body.to_string()));
        Ok(())
    }
}
