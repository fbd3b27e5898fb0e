//! SIRI stop-monitoring feed client
//!
//! The feed is queried once per resolution with
//! `GET {url}?Key=..&MonitoringRef={stop}&PreviewInterval=PT1H`.
//! Failures are not retried.

use crate::config::FeedConfig;
use crate::error::{HelpyError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Fetches a stop-monitoring snapshot for a stop
#[async_trait]
pub trait FeedClient: Send + Sync {
    /// Raw JSON snapshot for `stop_number`
    ///
    /// # Errors
    ///
    /// Returns [`HelpyError::FeedUnavailable`] when the feed cannot be
    /// reached, answers with an error status or sends invalid JSON
    async fn stop_monitoring(&self, stop_number: &str) -> Result<serde_json::Value>;
}

/// reqwest-backed SIRI client
#[derive(Debug, Clone)]
pub struct SiriFeedClient {
    client: Client,
    url: String,
    api_key: Option<String>,
    preview_interval: String,
}

impl SiriFeedClient {
    /// Build a client from feed configuration
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built
    pub fn new(config: &FeedConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("helpy/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| HelpyError::FeedUnavailable(format!("Failed to create HTTP client: {}", e)))?;

        if config.url.is_empty() {
            tracing::warn!("feed.url is not configured; arrival lookups will fail");
        }

        Ok(Self {
            client,
            url: config.url.clone(),
            api_key: config.api_key.clone(),
            preview_interval: config.preview_interval.clone(),
        })
    }
}

#[async_trait]
impl FeedClient for SiriFeedClient {
    async fn stop_monitoring(&self, stop_number: &str) -> Result<serde_json::Value> {
        if self.url.is_empty() {
            return Err(HelpyError::FeedUnavailable("feed.url is not configured".to_string()).into());
        }

        let mut params: Vec<(&str, &str)> = Vec::with_capacity(3);
        if let Some(key) = &self.api_key {
            params.push(("Key", key.as_str()));
        }
        params.push(("MonitoringRef", stop_number));
        params.push(("PreviewInterval", self.preview_interval.as_str()));

        tracing::debug!("Fetching stop monitoring for stop {}", stop_number);

        let response = self
            .client
            .get(&self.url)
            .query(&params)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Feed request failed: {}", e);
                HelpyError::FeedUnavailable(format!("Feed request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Feed returned error {}: {}", status, body);
            return Err(HelpyError::FeedUnavailable(format!("Feed returned error {}", status)).into());
        }

        let snapshot = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse feed response: {}", e);
            HelpyError::FeedUnavailable(format!("Failed to parse feed response: {}", e))
        })?;

        Ok(snapshot)
    }
}
