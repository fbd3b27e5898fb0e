//! Helpy - transit arrival chat assistant
//!
//! Main entry point for the `helpy` binary.

use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use helpy::cli::{Cli, Commands};
use helpy::commands;
use helpy::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    init_tracing(cli.verbose);

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    match cli.command {
        Commands::Chat { provider } => {
            if let Some(p) = &provider {
                tracing::debug!("Using provider override: {}", p);
            }
            commands::chat::run_chat(config, provider).await?;
        }
        Commands::Serve { bind } => {
            tracing::info!("Starting webhook server");
            commands::serve::run_serve(config, bind).await?;
        }
        Commands::Arrivals {
            stop,
            line,
            operator,
        } => {
            tracing::debug!("Arrivals lookup for stop {} line {}", stop, line);
            commands::arrivals::run_arrivals(&config, &stop, &line, operator.as_deref()).await?;
        }
        Commands::Lines { stop } => {
            tracing::debug!("Lines lookup for stop {}", stop);
            commands::lines::run_lines(&config, &stop)?;
        }
    }

    Ok(())
}

/// Initialize tracing subscriber with environment filter
///
/// `RUST_LOG` wins when set; otherwise `helpy=info`, or `helpy=debug` with
/// `--verbose`. `HELPY_LOG_FORMAT=json` switches to JSON lines. Logs go to
/// stderr so one-shot command output stays clean.
fn init_tracing(verbose: bool) {
    let default_directive = if verbose { "helpy=debug" } else { "helpy=info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    let json = std::env::var("HELPY_LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(env_filter);
    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
