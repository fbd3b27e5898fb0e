//! Real-time resolution against a mocked SIRI feed

mod common;

use common::{feed_config, now, siri, visit, AGENCY_CSV};
use helpy::reference::OperatorDirectory;
use helpy::transit::{
    FailureKind, FeedClient, FixedClock, ResolutionResult, SiriFeedClient, TransitQuery,
    TransitResolver,
};
use helpy::{HelpyError, Language};
use serde_json::Value;
use std::sync::Arc;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn feed_with(visits: Vec<Value>) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/siri/sm"))
        .respond_with(ResponseTemplate::new(200).set_body_json(siri(visits)))
        .mount(&server)
        .await;
    server
}

fn resolver(server: &MockServer) -> TransitResolver {
    let feed = SiriFeedClient::new(&feed_config(&server.uri())).unwrap();
    TransitResolver::new(
        Arc::new(feed),
        Arc::new(OperatorDirectory::from_csv(AGENCY_CSV).unwrap()),
        Arc::new(FixedClock(now())),
    )
}

fn query(stop: &str, line: &str) -> TransitQuery {
    TransitQuery::new(stop, line, None).unwrap()
}

#[tokio::test]
async fn test_feed_request_carries_key_stop_and_window() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/siri/sm"))
        .and(query_param("Key", "test-key"))
        .and(query_param("MonitoringRef", "123"))
        .and(query_param("PreviewInterval", "PT1H"))
        .respond_with(ResponseTemplate::new(200).set_body_json(siri(Vec::new())))
        .expect(1)
        .mount(&server)
        .await;

    let client = SiriFeedClient::new(&feed_config(&server.uri())).unwrap();
    let snapshot = client.stop_monitoring("123").await.unwrap();
    assert!(snapshot.pointer("/Siri/ServiceDelivery").is_some());
}

#[tokio::test]
async fn test_feed_error_status_is_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = SiriFeedClient::new(&feed_config(&server.uri())).unwrap();
    let err = client.stop_monitoring("123").await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<HelpyError>(),
        Some(HelpyError::FeedUnavailable(_))
    ));

    let result = resolver(&server)
        .resolve(&query("123", "5"), Language::English)
        .await;
    assert!(matches!(
        result,
        ResolutionResult::Failure {
            kind: FailureKind::FeedUnavailable,
            ..
        }
    ));
}

#[tokio::test]
async fn test_feed_invalid_json_is_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let client = SiriFeedClient::new(&feed_config(&server.uri())).unwrap();
    assert!(client.stop_monitoring("123").await.is_err());
}

#[tokio::test]
async fn test_single_operator_yields_arrivals() {
    let server = feed_with(vec![visit("123", "5", "3", 4 * 60)]).await;
    let result = resolver(&server)
        .resolve(&query("123", "5"), Language::English)
        .await;

    match result {
        ResolutionResult::Success {
            operator,
            operator_label,
            etas,
            line_ref,
            ..
        } => {
            assert_eq!(operator, "3");
            assert_eq!(operator_label, "אגד / Egged");
            assert_eq!(etas, vec![Some(4)]);
            assert_eq!(line_ref.as_deref(), Some("35"));
        }
        other => panic!("Expected Success, got {:?}", other),
    }
}

#[tokio::test]
async fn test_two_operators_need_a_choice() {
    let server = feed_with(vec![
        visit("123", "5", "3", 4 * 60),
        visit("123", "5", "5", 6 * 60),
        visit("123", "5", "3", 14 * 60),
    ])
    .await;
    let result = resolver(&server)
        .resolve(&query("123", "5"), Language::English)
        .await;

    match result {
        ResolutionResult::AmbiguousOperator {
            candidates,
            display_options,
        } => {
            assert_eq!(
                candidates,
                vec![
                    ("5".to_string(), "3".to_string()),
                    ("5".to_string(), "5".to_string())
                ]
            );
            assert_eq!(
                display_options,
                vec!["1. אגד / Egged".to_string(), "2. דן / Dan".to_string()]
            );
        }
        other => panic!("Expected AmbiguousOperator, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unknown_stop_has_no_operator() {
    let server = feed_with(vec![visit("123", "5", "3", 4 * 60)]).await;
    let result = resolver(&server)
        .resolve(&query("999", "5"), Language::English)
        .await;

    assert_eq!(
        result,
        ResolutionResult::Failure {
            kind: FailureKind::NoOperatorFound,
            reason: Language::English.messages().no_operator.to_string(),
        }
    );
}

#[tokio::test]
async fn test_departed_vehicle_gives_no_arrivals_reply() {
    let server = feed_with(vec![visit("123", "5", "3", -30)]).await;
    let result = resolver(&server)
        .resolve(&query("123", "5"), Language::English)
        .await;

    let ResolutionResult::Success {
        stop,
        line,
        operator_label,
        etas,
        ..
    } = result
    else {
        panic!("Expected Success");
    };
    assert_eq!(etas, vec![None]);

    let messages = Language::English.messages();
    let reply = messages.eta_reply(&stop, &line, &operator_label, &etas, 3);
    assert_eq!(reply, messages.no_arrivals_reply("5"));
}
