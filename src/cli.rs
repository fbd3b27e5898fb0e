//! Command-line interface definition for Helpy
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for the terminal chat, the WhatsApp webhook server,
//! and one-shot arrival and line lookups.

use clap::{Parser, Subcommand};

/// Helpy - transit arrival chat assistant
///
/// Ask for a stop and a line in plain language and get the next
/// arrival times, in the terminal or over WhatsApp.
#[derive(Parser, Debug, Clone)]
#[command(name = "helpy")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Override the default reply language (en, he, fr, es, it, ar, ru)
    #[arg(short, long, global = true)]
    pub language: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for Helpy
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start an interactive chat in the terminal
    Chat {
        /// Override the provider from config (openai, ollama)
        #[arg(short, long)]
        provider: Option<String>,
    },

    /// Run the WhatsApp webhook server
    Serve {
        /// Override the bind address from config (e.g. 0.0.0.0:8000)
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Look up the next arrivals of a line at a stop
    Arrivals {
        /// Stop code as written on the stop sign
        #[arg(short, long)]
        stop: String,

        /// Line number
        #[arg(long)]
        line: String,

        /// Operator id, required when several operators run the line
        #[arg(short, long)]
        operator: Option<String>,
    },

    /// List the lines that serve a stop
    Lines {
        /// Stop code as written on the stop sign
        #[arg(short, long)]
        stop: String,
    },
}

impl Cli {
    /// Parse command line arguments
    ///
    /// # Returns
    ///
    /// Returns the parsed CLI structure
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            verbose: false,
            language: None,
            command: Commands::Chat { provider: None },
        }
    }
}
