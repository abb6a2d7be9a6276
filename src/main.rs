//! Folio - conversational SQL assistant for real-estate portfolios
//!
#![doc = "Folio - portfolio chat CLI"]
#![doc = "Main entry point for the Folio application."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use folio::cli::{Cli, Commands};
use folio::commands;
use folio::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose);

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    // Execute command
    match cli.command {
        Commands::Chat { provider } => {
            if let Some(p) = &provider {
                tracing::debug!("Using provider override: {}", p);
            }
            commands::chat::run_chat(config, provider).await?;
            Ok(())
        }
        Commands::Ask {
            question,
            provider,
            json,
        } => {
            tracing::info!("Answering a single question");
            commands::ask::run_ask(config, question, provider, json).await?;
            Ok(())
        }
        Commands::Samples => {
            commands::samples::run_samples();
            Ok(())
        }
        Commands::Schema => {
            commands::schema::run_schema(&config);
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "folio=debug" } else { "folio=info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
