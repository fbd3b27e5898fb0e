//! Helpy - transit arrival chat assistant library
//!
//! This library provides the core functionality for Helpy, a conversational
//! assistant that answers "when is my next bus?" from a real-time SIRI feed,
//! in the terminal or over WhatsApp.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `dialogue`: Per-session conversation engine, session store, and the
//!   operations offered to the language model
//! - `transit`: Real-time feed client, visit filters, resolver, and service alerts
//! - `reference`: Agency names and the static GTFS lines-at-stop index
//! - `providers`: Language model abstraction and implementations (OpenAI, Ollama)
//! - `transport`: WhatsApp webhook server and sender
//! - `i18n` / `language`: Localized replies and first-message language detection
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use helpy::cli::Cli;
//! use helpy::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config/config.yaml", &Cli::default())?;
//!     config.validate()?;
//!
//!     let _engine = helpy::commands::build_engine(&config, None)?;
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod dialogue;
pub mod error;
pub mod i18n;
pub mod language;
pub mod providers;
pub mod reference;
pub mod transit;
pub mod transport;

// Re-export commonly used types
pub use config::Config;
pub use dialogue::{DialogueEngine, Reply, ReplyOutcome};
pub use error::{HelpyError, Result};
pub use i18n::Language;
pub use transit::{ResolutionResult, TransitQuery, TransitResolver};

#[cfg(test)]
pub mod test_utils;
