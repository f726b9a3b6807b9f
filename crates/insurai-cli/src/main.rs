//! InsurAI CLI - Insurance policy analyzer
//!
//! Usage:
//!   insurai analyze --file policy.txt    Analyze a policy
//!   insurai analyze --sample --demo      Try the bundled sample offline
//!   insurai quota                        Show today's live analysis usage
//!   insurai config                       Show the effective configuration

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let config = commands::load_config(
        cli.config.as_deref(),
        cli.api_url.as_deref(),
        cli.password.as_deref(),
    )?;

    match cli.command {
        Commands::Analyze {
            file,
            text,
            sample,
            policy_type,
            jurisdiction,
            demo,
            json,
        } => {
            let source = commands::PolicySource::from_args(file, text, sample);
            let store = commands::open_store(cli.db.as_deref())?;
            let options = commands::AnalyzeOptions {
                policy_type,
                jurisdiction,
                demo,
                json,
            };
            commands::cmd_analyze(config, store, &source, &options).await
        }
        Commands::Sample => commands::cmd_sample(),
        Commands::Quota => {
            let store = commands::open_store(cli.db.as_deref())?;
            commands::cmd_quota(&config, store)
        }
        Commands::Config => commands::cmd_config(&config, cli.config.as_deref()),
    }
}
