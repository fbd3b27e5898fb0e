//! Configuration management for Helpy
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{HelpyError, Result};
use crate::i18n::Language;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure for Helpy
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// NLU provider configuration (OpenAI, Ollama)
    #[serde(default)]
    pub provider: ProviderConfig,
    /// Real-time feed configuration
    #[serde(default)]
    pub feed: FeedConfig,
    /// Static reference tables (agencies, GTFS)
    #[serde(default)]
    pub reference: ReferenceConfig,
    /// Dialogue behavior
    #[serde(default)]
    pub dialogue: DialogueConfig,
    /// Session store behavior for the messaging flow
    #[serde(default)]
    pub session: SessionConfig,
    /// WhatsApp (WHAPI) transport
    #[serde(default)]
    pub whatsapp: WhatsAppConfig,
}

/// Provider configuration
///
/// Specifies which NLU provider backs the dialogue engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Type of provider to use
    #[serde(rename = "type", default = "default_provider_type")]
    pub provider_type: String,

    /// OpenAI-compatible chat completions configuration
    #[serde(default)]
    pub openai: OpenAiConfig,

    /// Ollama configuration
    #[serde(default)]
    pub ollama: OllamaConfig,
}

fn default_provider_type() -> String {
    "openai".to_string()
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            provider_type: default_provider_type(),
            openai: OpenAiConfig::default(),
            ollama: OllamaConfig::default(),
        }
    }
}

/// OpenAI provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    /// API key; usually supplied through `OPENAI_API_KEY`
    #[serde(default)]
    pub api_key: Option<String>,

    /// Model to use for function calling
    #[serde(default = "default_openai_model")]
    pub model: String,

    /// API base URL (useful for tests and compatible gateways)
    #[serde(default = "default_openai_api_base")]
    pub api_base: String,

    /// Request timeout in seconds
    #[serde(default = "default_openai_timeout")]
    pub timeout_seconds: u64,
}

fn default_openai_model() -> String {
    "gpt-4o".to_string()
}

fn default_openai_api_base() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_openai_timeout() -> u64 {
    60
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_openai_model(),
            api_base: default_openai_api_base(),
            timeout_seconds: default_openai_timeout(),
        }
    }
}

/// Ollama provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    /// Ollama server host
    #[serde(default = "default_ollama_host")]
    pub host: String,

    /// Model to use for Ollama
    #[serde(default = "default_ollama_model")]
    pub model: String,
}

fn default_ollama_host() -> String {
    "http://localhost:11434".to_string()
}

fn default_ollama_model() -> String {
    "llama3.2:latest".to_string()
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: default_ollama_host(),
            model: default_ollama_model(),
        }
    }
}

/// Real-time SIRI stop-monitoring feed configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Stop monitoring endpoint
    #[serde(default)]
    pub url: String,

    /// API key sent as the `Key` query parameter
    #[serde(default)]
    pub api_key: Option<String>,

    /// Look-ahead window (ISO 8601 duration)
    #[serde(default = "default_preview_interval")]
    pub preview_interval: String,

    /// Request timeout in seconds
    #[serde(default = "default_feed_timeout")]
    pub timeout_seconds: u64,

    /// Optional GTFS-Realtime service alerts endpoint
    #[serde(default)]
    pub alerts_url: Option<String>,
}

fn default_preview_interval() -> String {
    "PT1H".to_string()
}

fn default_feed_timeout() -> u64 {
    15
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            api_key: None,
            preview_interval: default_preview_interval(),
            timeout_seconds: default_feed_timeout(),
            alerts_url: None,
        }
    }
}

/// Static reference data locations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceConfig {
    /// Agency table (agency_id, agency_name, agency_english_name)
    #[serde(default = "default_agency_file")]
    pub agency_file: PathBuf,

    /// Directory holding stops.txt, stop_times.txt, trips.txt and routes.txt
    #[serde(default = "default_gtfs_dir")]
    pub gtfs_dir: PathBuf,
}

fn default_agency_file() -> PathBuf {
    PathBuf::from("data/agency_simple.txt")
}

fn default_gtfs_dir() -> PathBuf {
    PathBuf::from("data")
}

impl Default for ReferenceConfig {
    fn default() -> Self {
        Self {
            agency_file: default_agency_file(),
            gtfs_dir: default_gtfs_dir(),
        }
    }
}

/// Dialogue engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogueConfig {
    /// Language used when detection is skipped or unsupported
    #[serde(default = "default_language")]
    pub default_language: String,

    /// Terminal inactivity timeout (seconds)
    #[serde(default = "default_input_timeout")]
    pub input_timeout_seconds: u64,

    /// Number of arrivals shown in an ETA reply
    #[serde(default = "default_max_displayed_etas")]
    pub max_displayed_etas: usize,
}

fn default_language() -> String {
    "en".to_string()
}

fn default_input_timeout() -> u64 {
    30
}

fn default_max_displayed_etas() -> usize {
    3
}

impl Default for DialogueConfig {
    fn default() -> Self {
        Self {
            default_language: default_language(),
            input_timeout_seconds: default_input_timeout(),
            max_displayed_etas: default_max_displayed_etas(),
        }
    }
}

/// Session store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Sessions idle for longer than this are evicted (seconds)
    #[serde(default = "default_idle_ttl")]
    pub idle_ttl_seconds: u64,

    /// How often the eviction sweep runs (seconds)
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_seconds: u64,
}

fn default_idle_ttl() -> u64 {
    3600
}

fn default_sweep_interval() -> u64 {
    300
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_ttl_seconds: default_idle_ttl(),
            sweep_interval_seconds: default_sweep_interval(),
        }
    }
}

/// WhatsApp (WHAPI) transport configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhatsAppConfig {
    /// WHAPI base URL, e.g. `https://gate.whapi.cloud/`
    #[serde(default)]
    pub api_url: Option<String>,

    /// Channel bearer token
    #[serde(default)]
    pub channel_token: Option<String>,

    /// Address the webhook server binds to
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Route that receives webhook deliveries
    #[serde(default = "default_webhook_path")]
    pub webhook_path: String,
}

fn default_bind_address() -> String {
    "0.0.0.0:8000".to_string()
}

fn default_webhook_path() -> String {
    "/webhook/whatsapp".to_string()
}

impl Default for WhatsAppConfig {
    fn default() -> Self {
        Self {
            api_url: None,
            channel_token: None,
            bind_address: default_bind_address(),
            webhook_path: default_webhook_path(),
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// A missing file is not an error: defaults are used and a warning is
    /// logged, so the assistant can run purely from environment variables.
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| HelpyError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| HelpyError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        // Provider overrides
        if let Ok(provider_type) = std::env::var("HELPY_PROVIDER") {
            self.provider.provider_type = provider_type;
        }

        if let Some(api_key) = env_any(&["HELPY_OPENAI_API_KEY", "OPENAI_API_KEY"]) {
            self.provider.openai.api_key = Some(api_key);
        }

        if let Ok(model) = std::env::var("HELPY_OPENAI_MODEL") {
            self.provider.openai.model = model;
        }

        if let Ok(api_base) = std::env::var("HELPY_OPENAI_API_BASE") {
            self.provider.openai.api_base = api_base;
        }

        if let Ok(ollama_host) = std::env::var("HELPY_OLLAMA_HOST") {
            self.provider.ollama.host = ollama_host;
        }

        if let Ok(ollama_model) = std::env::var("HELPY_OLLAMA_MODEL") {
            self.provider.ollama.model = ollama_model;
        }

        // Feed overrides; the bare names are what existing deployments export
        if let Some(url) = env_any(&["HELPY_FEED_URL", "GTFS_RT_URL"]) {
            self.feed.url = url;
        }

        if let Some(api_key) = env_any(&["HELPY_FEED_API_KEY", "API_KEY"]) {
            self.feed.api_key = Some(api_key);
        }

        if let Some(alerts_url) = env_any(&["HELPY_ALERTS_URL", "SM_URL"]) {
            self.feed.alerts_url = Some(alerts_url);
        }

        if let Ok(timeout) = std::env::var("HELPY_FEED_TIMEOUT_SECONDS") {
            match timeout.parse() {
                Ok(value) => self.feed.timeout_seconds = value,
                Err(_) => tracing::warn!("Invalid HELPY_FEED_TIMEOUT_SECONDS: {}", timeout),
            }
        }

        // Reference data
        if let Ok(agency_file) = std::env::var("HELPY_AGENCY_FILE") {
            self.reference.agency_file = PathBuf::from(agency_file);
        }

        if let Ok(gtfs_dir) = std::env::var("HELPY_GTFS_DIR") {
            self.reference.gtfs_dir = PathBuf::from(gtfs_dir);
        }

        // Dialogue
        if let Ok(language) = std::env::var("HELPY_DEFAULT_LANGUAGE") {
            self.dialogue.default_language = language;
        }

        if let Ok(timeout) = std::env::var("HELPY_INPUT_TIMEOUT_SECONDS") {
            match timeout.parse() {
                Ok(value) => self.dialogue.input_timeout_seconds = value,
                Err(_) => tracing::warn!("Invalid HELPY_INPUT_TIMEOUT_SECONDS: {}", timeout),
            }
        }

        if let Ok(ttl) = std::env::var("HELPY_SESSION_IDLE_TTL_SECONDS") {
            match ttl.parse() {
                Ok(value) => self.session.idle_ttl_seconds = value,
                Err(_) => tracing::warn!("Invalid HELPY_SESSION_IDLE_TTL_SECONDS: {}", ttl),
            }
        }

        // WhatsApp transport
        if let Some(api_url) = env_any(&["HELPY_WHAPI_URL", "WHAPI_URL"]) {
            self.whatsapp.api_url = Some(api_url);
        }

        if let Some(token) = env_any(&["HELPY_WHAPI_CHANNEL_TOKEN", "WHAPI_CHANNEL_TOKEN"]) {
            self.whatsapp.channel_token = Some(token);
        }

        if let Ok(bind) = std::env::var("HELPY_BIND_ADDRESS") {
            self.whatsapp.bind_address = bind;
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if cli.verbose {
            tracing::debug!("Verbose mode enabled");
        }
        if let Some(language) = &cli.language {
            self.dialogue.default_language = language.clone();
        }
    }

    /// Default language as a typed value
    ///
    /// Falls back to English when the configured code is not supported;
    /// `validate` rejects such configs, so this only matters for configs
    /// built in code.
    pub fn default_language(&self) -> Language {
        Language::from_code(&self.dialogue.default_language).unwrap_or_default()
    }

    /// Validate the configuration
    ///
    /// Ensures all configuration values are within acceptable ranges.
    /// Credentials are not required here: the `arrivals` and `lines`
    /// commands work without an NLU provider, so missing keys are reported
    /// by the component that needs them.
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        if self.provider.provider_type.is_empty() {
            return Err(HelpyError::Config("Provider type cannot be empty".to_string()).into());
        }

        let valid_providers = ["openai", "ollama"];
        if !valid_providers.contains(&self.provider.provider_type.as_str()) {
            return Err(HelpyError::Config(format!(
                "Invalid provider type: {}. Must be one of: {}",
                self.provider.provider_type,
                valid_providers.join(", ")
            ))
            .into());
        }

        validate_url("provider.openai.api_base", &self.provider.openai.api_base)?;
        if !self.feed.url.is_empty() {
            validate_url("feed.url", &self.feed.url)?;
        }
        if let Some(alerts_url) = &self.feed.alerts_url {
            validate_url("feed.alerts_url", alerts_url)?;
        }
        if let Some(api_url) = &self.whatsapp.api_url {
            validate_url("whatsapp.api_url", api_url)?;
        }

        if self.feed.preview_interval.trim().is_empty() {
            return Err(
                HelpyError::Config("feed.preview_interval cannot be empty".to_string()).into(),
            );
        }

        if self.feed.timeout_seconds == 0 {
            return Err(HelpyError::Config(
                "feed.timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        if self.provider.openai.timeout_seconds == 0 {
            return Err(HelpyError::Config(
                "provider.openai.timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        if Language::from_code(&self.dialogue.default_language).is_none() {
            return Err(HelpyError::Config(format!(
                "Unsupported dialogue.default_language: {}. Must be one of: {}",
                self.dialogue.default_language,
                Language::ALL
                    .iter()
                    .map(|l| l.code())
                    .collect::<Vec<_>>()
                    .join(", ")
            ))
            .into());
        }

        if self.dialogue.input_timeout_seconds == 0 {
            return Err(HelpyError::Config(
                "dialogue.input_timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        if self.dialogue.max_displayed_etas == 0 {
            return Err(HelpyError::Config(
                "dialogue.max_displayed_etas must be greater than 0".to_string(),
            )
            .into());
        }

        if self.session.idle_ttl_seconds == 0 || self.session.sweep_interval_seconds == 0 {
            return Err(HelpyError::Config(
                "session.idle_ttl_seconds and session.sweep_interval_seconds must be greater than 0"
                    .to_string(),
            )
            .into());
        }

        if !self.whatsapp.webhook_path.starts_with('/') || self.whatsapp.webhook_path == "/health"
        {
            return Err(HelpyError::Config(format!(
                "whatsapp.webhook_path must start with '/' and differ from /health: {}",
                self.whatsapp.webhook_path
            ))
            .into());
        }

        Ok(())
    }
}

/// First set, non-empty environment variable among `names`
fn env_any(names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .find(|value| !value.trim().is_empty())
}

fn validate_url(field: &str, value: &str) -> Result<()> {
    url::Url::parse(value)
        .map(|_| ())
        .map_err(|e| HelpyError::Config(format!("{} is not a valid URL ({}): {}", field, e, value)).into())
}
