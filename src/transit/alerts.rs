//! GTFS-Realtime service alerts
//!
//! The alerts endpoint returns a protobuf `FeedMessage`. Only the subset of
//! the GTFS-Realtime schema needed to match alerts to a route is declared
//! here; unknown fields are skipped by the decoder.

use crate::config::FeedConfig;
use crate::error::{HelpyError, Result};
use crate::i18n::Language;
use async_trait::async_trait;
use prost::Message as _;
use reqwest::Client;
use std::time::Duration;

/// Top-level GTFS-Realtime message
#[derive(Clone, PartialEq, prost::Message)]
pub struct FeedMessage {
    /// Feed metadata
    #[prost(message, optional, tag = "1")]
    pub header: Option<FeedHeader>,
    /// Feed entities
    #[prost(message, repeated, tag = "2")]
    pub entity: Vec<FeedEntity>,
}

/// Feed metadata
#[derive(Clone, PartialEq, prost::Message)]
pub struct FeedHeader {
    /// GTFS-realtime version, e.g. "2.0"
    #[prost(string, optional, tag = "1")]
    pub gtfs_realtime_version: Option<String>,
    /// POSIX time the feed was generated
    #[prost(uint64, optional, tag = "3")]
    pub timestamp: Option<u64>,
}

/// One entity of the feed; only alerts are read
#[derive(Clone, PartialEq, prost::Message)]
pub struct FeedEntity {
    /// Entity id
    #[prost(string, optional, tag = "1")]
    pub id: Option<String>,
    /// Service alert payload
    #[prost(message, optional, tag = "5")]
    pub alert: Option<Alert>,
}

/// A service alert
#[derive(Clone, PartialEq, prost::Message)]
pub struct Alert {
    /// Periods during which the alert applies
    #[prost(message, repeated, tag = "1")]
    pub active_period: Vec<TimeRange>,
    /// Entities the alert affects
    #[prost(message, repeated, tag = "5")]
    pub informed_entity: Vec<EntitySelector>,
    /// Cause enum value
    #[prost(int32, optional, tag = "6")]
    pub cause: Option<i32>,
    /// Effect enum value
    #[prost(int32, optional, tag = "7")]
    pub effect: Option<i32>,
    /// More information
    #[prost(message, optional, tag = "8")]
    pub url: Option<TranslatedString>,
    /// Short summary
    #[prost(message, optional, tag = "10")]
    pub header_text: Option<TranslatedString>,
    /// Full description
    #[prost(message, optional, tag = "11")]
    pub description_text: Option<TranslatedString>,
}

/// Time interval in POSIX seconds; open ends are absent
#[derive(Clone, PartialEq, prost::Message)]
pub struct TimeRange {
    /// Start
    #[prost(uint64, optional, tag = "1")]
    pub start: Option<u64>,
    /// End
    #[prost(uint64, optional, tag = "2")]
    pub end: Option<u64>,
}

/// Selector for the entities an alert applies to
#[derive(Clone, PartialEq, prost::Message)]
pub struct EntitySelector {
    /// Agency id
    #[prost(string, optional, tag = "1")]
    pub agency_id: Option<String>,
    /// Route id
    #[prost(string, optional, tag = "2")]
    pub route_id: Option<String>,
    /// Route type
    #[prost(int32, optional, tag = "3")]
    pub route_type: Option<i32>,
    /// Trip
    #[prost(message, optional, tag = "4")]
    pub trip: Option<TripDescriptor>,
    /// Stop id
    #[prost(string, optional, tag = "5")]
    pub stop_id: Option<String>,
}

/// Trip reference inside a selector
#[derive(Clone, PartialEq, prost::Message)]
pub struct TripDescriptor {
    /// Trip id
    #[prost(string, optional, tag = "1")]
    pub trip_id: Option<String>,
    /// Route id
    #[prost(string, optional, tag = "5")]
    pub route_id: Option<String>,
}

/// Text in several languages
#[derive(Clone, PartialEq, prost::Message)]
pub struct TranslatedString {
    /// Translations
    #[prost(message, repeated, tag = "1")]
    pub translation: Vec<Translation>,
}

/// One translation
#[derive(Clone, PartialEq, prost::Message)]
pub struct Translation {
    /// Text
    #[prost(string, optional, tag = "1")]
    pub text: Option<String>,
    /// BCP-47 language code
    #[prost(string, optional, tag = "2")]
    pub language: Option<String>,
}

impl TranslatedString {
    /// Best text for `language`
    ///
    /// Prefers the requested language, then English, then the first
    /// non-empty translation.
    pub fn text_for(&self, language: Language) -> Option<&str> {
        let non_empty = || {
            self.translation
                .iter()
                .filter(|t| t.text.as_deref().is_some_and(|text| !text.trim().is_empty()))
        };
        let in_language = |wanted: Language| {
            non_empty().find(|t| {
                t.language
                    .as_deref()
                    .and_then(Language::from_code)
                    .is_some_and(|lang| lang == wanted)
            })
        };

        in_language(language)
            .or_else(|| in_language(Language::English))
            .or_else(|| non_empty().next())
            .and_then(|t| t.text.as_deref())
    }
}

impl Alert {
    /// Whether any informed entity names `route_id`
    pub fn affects_route(&self, route_id: &str) -> bool {
        self.informed_entity
            .iter()
            .any(|entity| entity.route_id.as_deref() == Some(route_id))
    }

    /// `"{header}: {description}"` in the best available language
    pub fn summary(&self, language: Language) -> Option<String> {
        let header = self.header_text.as_ref().and_then(|t| t.text_for(language));
        let description = self
            .description_text
            .as_ref()
            .and_then(|t| t.text_for(language));
        match (header, description) {
            (Some(h), Some(d)) => Some(format!("{}: {}", h, d)),
            (Some(text), None) | (None, Some(text)) => Some(text.to_string()),
            (None, None) => None,
        }
    }
}

/// Localized warning lines for alerts affecting `route_id`
pub fn warnings_for_route(feed: &FeedMessage, route_id: &str, language: Language) -> Vec<String> {
    let messages = language.messages();
    feed.entity
        .iter()
        .filter_map(|entity| entity.alert.as_ref())
        .filter(|alert| alert.affects_route(route_id))
        .filter_map(|alert| alert.summary(language))
        .map(|summary| messages.warning(&summary))
        .collect()
}

/// Source of service alert warnings for a line
///
/// Alerts are advisory: implementations log failures and return no
/// warnings rather than failing the arrival reply.
#[async_trait]
pub trait AlertSource: Send + Sync {
    /// Warning lines for the feed line reference `line_ref`
    async fn warnings_for_line(&self, line_ref: &str, language: Language) -> Vec<String>;
}

/// reqwest-backed GTFS-Realtime alerts client
#[derive(Debug, Clone)]
pub struct ServiceAlertsClient {
    client: Client,
    url: String,
    api_key: Option<String>,
}

impl ServiceAlertsClient {
    /// Build a client when `feed.alerts_url` is configured
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built
    pub fn from_config(config: &FeedConfig) -> Result<Option<Self>> {
        let Some(url) = config.alerts_url.clone() else {
            return Ok(None);
        };
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("helpy/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| HelpyError::FeedUnavailable(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Some(Self {
            client,
            url,
            api_key: config.api_key.clone(),
        }))
    }

    /// Fetch and decode the alerts feed
    ///
    /// # Errors
    ///
    /// Returns [`HelpyError::FeedUnavailable`] on transport errors, error
    /// statuses or undecodable payloads
    pub async fn fetch(&self) -> Result<FeedMessage> {
        let mut request = self.client.get(&self.url);
        if let Some(key) = &self.api_key {
            request = request.query(&[("Key", key.as_str())]);
        }

        let response = request.send().await.map_err(|e| {
            HelpyError::FeedUnavailable(format!("Alerts request failed: {}", e))
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(
                HelpyError::FeedUnavailable(format!("Alerts feed returned error {}", status)).into(),
            );
        }

        let body = response.bytes().await.map_err(|e| {
            HelpyError::FeedUnavailable(format!("Failed to read alerts feed: {}", e))
        })?;

        let feed = FeedMessage::decode(body).map_err(|e| {
            HelpyError::FeedUnavailable(format!("Failed to decode alerts feed: {}", e))
        })?;
        tracing::debug!("Decoded alerts feed with {} entities", feed.entity.len());
        Ok(feed)
    }
}

#[async_trait]
impl AlertSource for ServiceAlertsClient {
    async fn warnings_for_line(&self, line_ref: &str, language: Language) -> Vec<String> {
        match self.fetch().await {
            Ok(feed) => warnings_for_route(&feed, line_ref, language),
            Err(e) => {
                tracing::warn!("Service alerts unavailable: {}", e);
                Vec::new()
            }
        }
    }
}
