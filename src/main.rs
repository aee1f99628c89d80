mod args;
mod cmd_completions;
mod cmd_logs;
mod cmd_open;
mod cmd_stack;

use args::{Cli, Commands};
use clap::Parser;
use cmd_stack::{BulkAction, ServiceAction};
use lampctl::config::StackConfig;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let mut config = StackConfig::load()?;
    if let Some(base) = cli.base {
        config = config.with_base(base);
    }

    match cli.command {
        Commands::Start { service } => {
            cmd_stack::cmd_service(config, ServiceAction::Start, &service).await?
        }
        Commands::Stop { service } => {
            cmd_stack::cmd_service(config, ServiceAction::Stop, &service).await?
        }
        Commands::Restart { service } => {
            cmd_stack::cmd_service(config, ServiceAction::Restart, &service).await?
        }
        Commands::Toggle { service } => {
            cmd_stack::cmd_service(config, ServiceAction::Toggle, &service).await?
        }
        Commands::StartAll => cmd_stack::cmd_bulk(config, BulkAction::StartAll).await?,
        Commands::StopAll => cmd_stack::cmd_bulk(config, BulkAction::StopAll).await?,
        Commands::RestartAll => cmd_stack::cmd_bulk(config, BulkAction::RestartAll).await?,
        Commands::Reload => cmd_stack::cmd_bulk(config, BulkAction::Reload).await?,
        Commands::Status { json } => cmd_stack::cmd_status(config, json).await?,
        Commands::Logs { service, lines } => cmd_logs::cmd_logs(&config, &service, lines)?,
        Commands::Open { target } => cmd_open::cmd_open(&config, target).await?,
        Commands::Completions { shell } => cmd_completions::cmd_completions(shell),
    }

    Ok(())
}
