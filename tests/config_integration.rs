//! Configuration files, environment overrides and CLI overrides

use clap::Parser;
use helpy::cli::Cli;
use helpy::{Config, Language};
use serial_test::serial;
use std::io::Write;

const FULL_CONFIG: &str = r#"
provider:
  type: ollama
  ollama:
    host: http://ollama.internal:11434
    model: qwen2.5:7b
feed:
  url: https://feed.example.com/siri/sm
  preview_interval: PT30M
  alerts_url: https://feed.example.com/gtfsrt/alerts
reference:
  agency_file: /srv/helpy/agency.txt
  gtfs_dir: /srv/helpy/gtfs
dialogue:
  default_language: he
  input_timeout_seconds: 45
  max_displayed_etas: 2
session:
  idle_ttl_seconds: 900
  sweep_interval_seconds: 60
whatsapp:
  api_url: https://gate.whapi.cloud/
  bind_address: 127.0.0.1:9000
  webhook_path: /hooks/wa
"#;

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

fn clear_env() {
    for name in [
        "HELPY_PROVIDER",
        "HELPY_FEED_URL",
        "GTFS_RT_URL",
        "HELPY_DEFAULT_LANGUAGE",
        "WHAPI_CHANNEL_TOKEN",
        "HELPY_WHAPI_CHANNEL_TOKEN",
    ] {
        std::env::remove_var(name);
    }
}

#[test]
#[serial]
fn test_full_file_loads_and_validates() {
    clear_env();
    let file = write_config(FULL_CONFIG);
    let config = Config::load(file.path().to_str().unwrap(), &Cli::default()).unwrap();
    config.validate().unwrap();

    assert_eq!(config.provider.provider_type, "ollama");
    assert_eq!(config.provider.ollama.model, "qwen2.5:7b");
    assert_eq!(config.feed.preview_interval, "PT30M");
    assert_eq!(config.default_language(), Language::Hebrew);
    assert_eq!(config.dialogue.max_displayed_etas, 2);
    assert_eq!(config.session.idle_ttl_seconds, 900);
    assert_eq!(config.whatsapp.webhook_path, "/hooks/wa");
    assert_eq!(
        config.reference.gtfs_dir,
        std::path::PathBuf::from("/srv/helpy/gtfs")
    );
}

#[test]
#[serial]
fn test_env_then_cli_overrides() {
    clear_env();
    std::env::set_var("GTFS_RT_URL", "https://other.example.com/siri");
    std::env::set_var("HELPY_DEFAULT_LANGUAGE", "es");
    std::env::set_var("WHAPI_CHANNEL_TOKEN", "secret");

    let file = write_config(FULL_CONFIG);
    let cli = Cli::try_parse_from(["helpy", "--language", "ru", "lines", "--stop", "1"]).unwrap();
    let config = Config::load(file.path().to_str().unwrap(), &cli).unwrap();
    clear_env();

    assert_eq!(config.feed.url, "https://other.example.com/siri");
    assert_eq!(config.whatsapp.channel_token.as_deref(), Some("secret"));
    assert_eq!(config.default_language(), Language::Russian);
}

#[test]
#[serial]
fn test_missing_file_uses_defaults() {
    clear_env();
    let config = Config::load("/nonexistent/helpy.yaml", &Cli::default()).unwrap();
    assert_eq!(config.provider.provider_type, "openai");
    assert_eq!(config.dialogue.input_timeout_seconds, 30);
    assert!(config.validate().is_ok());
}

#[test]
#[serial]
fn test_malformed_file_is_config_error() {
    clear_env();
    let file = write_config("provider: [not, a, map");
    let err = Config::load(file.path().to_str().unwrap(), &Cli::default()).unwrap_err();
    assert!(err.to_string().contains("Failed to parse config"));
}
